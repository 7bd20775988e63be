use crate::models::{CollegeRecord, RawCell};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

/// Value of the institution-code cell on repeated header rows.
const HEADER_SENTINEL: &str = "Inst\n Code";
/// Value of the institution-name cell on trailing disclaimer rows.
const DISCLAIMER_SENTINEL: &str = "Disclaimer:";

/// One record as it appears in the exported last-rank-statement JSON. The
/// column keys are positional artifacts of the export, so they are mapped to
/// named fields here and nowhere else.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "TGEAPCET-2024 LAST RANK STATEMENT FIRST PHASE")]
    pub inst_code: Option<RawCell>,
    #[serde(rename = "Column2")]
    pub name: Option<RawCell>,
    #[serde(rename = "Column3")]
    pub place: Option<RawCell>,
    #[serde(rename = "Column4")]
    pub district: Option<RawCell>,
    #[serde(rename = "Column5")]
    pub co_education: Option<RawCell>,
    #[serde(rename = "Column6")]
    pub college_type: Option<RawCell>,
    #[serde(rename = "Column7")]
    pub year_established: Option<RawCell>,
    #[serde(rename = "Column8")]
    pub branch_code: Option<RawCell>,
    #[serde(rename = "Column9")]
    pub branch_name: Option<RawCell>,
    #[serde(rename = "Column10")]
    pub oc_boys: Option<RawCell>,
    #[serde(rename = "Column11")]
    pub oc_girls: Option<RawCell>,
    #[serde(rename = "Column12")]
    pub bc_a_boys: Option<RawCell>,
    #[serde(rename = "Column13")]
    pub bc_a_girls: Option<RawCell>,
    #[serde(rename = "Column14")]
    pub bc_b_boys: Option<RawCell>,
    #[serde(rename = "Column15")]
    pub bc_b_girls: Option<RawCell>,
    #[serde(rename = "Column16")]
    pub bc_c_boys: Option<RawCell>,
    #[serde(rename = "Column17")]
    pub bc_c_girls: Option<RawCell>,
    #[serde(rename = "Column18")]
    pub bc_d_boys: Option<RawCell>,
    #[serde(rename = "Column19")]
    pub bc_d_girls: Option<RawCell>,
    #[serde(rename = "Column20")]
    pub bc_e_boys: Option<RawCell>,
    #[serde(rename = "Column21")]
    pub bc_e_girls: Option<RawCell>,
    #[serde(rename = "Column22")]
    pub sc_boys: Option<RawCell>,
    #[serde(rename = "Column23")]
    pub sc_girls: Option<RawCell>,
    #[serde(rename = "Column24")]
    pub st_boys: Option<RawCell>,
    #[serde(rename = "Column25")]
    pub st_girls: Option<RawCell>,
    #[serde(rename = "Column26")]
    pub ews_boys: Option<RawCell>,
    #[serde(rename = "Column27")]
    pub ews_girls: Option<RawCell>,
    #[serde(rename = "Column28")]
    pub tuition_fee: Option<RawCell>,
    #[serde(rename = "Column29")]
    pub affiliation: Option<RawCell>,
}

/// Classification of a raw record. Header and disclaimer rows are layout
/// artifacts of the source spreadsheet; malformed rows lack a usable
/// institution code.
#[derive(Debug)]
pub enum RecordKind {
    Row(Box<CollegeRecord>),
    Header,
    Disclaimer,
    Malformed,
}

#[derive(Debug, Default, Clone)]
pub struct DatasetStats {
    pub rows: usize,
    pub headers: usize,
    pub disclaimers: usize,
    pub malformed: usize,
}

fn cell_text(cell: &Option<RawCell>) -> String {
    cell.as_ref()
        .map(|c| c.display())
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn classify(raw: RawRecord) -> RecordKind {
    let inst_code = match &raw.inst_code {
        Some(RawCell::Text(code)) => code.clone(),
        _ => return RecordKind::Malformed,
    };
    if inst_code == HEADER_SENTINEL {
        return RecordKind::Header;
    }
    if let Some(RawCell::Text(name)) = &raw.name {
        if name.trim() == DISCLAIMER_SENTINEL {
            return RecordKind::Disclaimer;
        }
    }

    let record = CollegeRecord {
        inst_code,
        name: cell_text(&raw.name),
        place: cell_text(&raw.place),
        district: cell_text(&raw.district),
        co_education: cell_text(&raw.co_education),
        college_type: cell_text(&raw.college_type),
        year_established: cell_text(&raw.year_established),
        branch_code: cell_text(&raw.branch_code),
        branch_name: cell_text(&raw.branch_name),
        tuition_fee: cell_text(&raw.tuition_fee),
        affiliation: cell_text(&raw.affiliation),
        cutoffs: [
            raw.oc_boys,
            raw.oc_girls,
            raw.bc_a_boys,
            raw.bc_a_girls,
            raw.bc_b_boys,
            raw.bc_b_girls,
            raw.bc_c_boys,
            raw.bc_c_girls,
            raw.bc_d_boys,
            raw.bc_d_girls,
            raw.bc_e_boys,
            raw.bc_e_girls,
            raw.sc_boys,
            raw.sc_girls,
            raw.st_boys,
            raw.st_girls,
            raw.ews_boys,
            raw.ews_girls,
        ],
    };
    RecordKind::Row(Box::new(record))
}

/// Parse an in-memory JSON export into clean college records, discarding
/// layout artifacts. One bad row never fails the whole dataset.
pub fn parse_dataset(content: &str) -> Result<(Vec<CollegeRecord>, DatasetStats)> {
    let raw_records: Vec<RawRecord> =
        serde_json::from_str(content).context("Failed to parse dataset JSON")?;

    let mut records = Vec::with_capacity(raw_records.len());
    let mut stats = DatasetStats::default();

    for raw in raw_records {
        match classify(raw) {
            RecordKind::Row(record) => {
                records.push(*record);
                stats.rows += 1;
            }
            RecordKind::Header => stats.headers += 1,
            RecordKind::Disclaimer => stats.disclaimers += 1,
            RecordKind::Malformed => stats.malformed += 1,
        }
    }

    Ok((records, stats))
}

pub fn load_dataset(file_path: &str) -> Result<(Vec<CollegeRecord>, DatasetStats)> {
    let content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read dataset file: {}", file_path))?;
    parse_dataset(&content)
}
