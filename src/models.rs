use regex::Regex;
use serde::{Deserialize, Serialize};

/// Sentinel branch selector meaning "match any branch".
pub const ALL_BRANCHES: &str = "ALL";

pub const DEFAULT_RANK_WINDOW: u32 = 500;
pub const DEFAULT_COLLEGE_LIMIT: usize = 20;
pub const MAX_COLLEGE_LIMIT: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub dataset_path: String,
    /// How far below the candidate's rank a cutoff may sit and still count
    /// as a nearby college.
    pub rank_window: u32,
    pub output_directory: Option<String>,
    pub advisor: Option<AdvisorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout_seconds: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset_path: "data/college-data.json".to_string(),
            rank_window: DEFAULT_RANK_WINDOW,
            output_directory: Some("output".to_string()),
            advisor: None,
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }
}

/// A raw dataset cell. The source JSON mixes numbers and strings freely,
/// so every cell is kept as it arrived and interpreted on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    Number(f64),
    Text(String),
}

impl RawCell {
    /// Original display form of the cell, for UI fidelity.
    pub fn display(&self) -> String {
        match self {
            RawCell::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            RawCell::Number(n) => n.to_string(),
            RawCell::Text(s) => s.clone(),
        }
    }

    /// Interpret the cell as a cutoff rank. Placeholder tokens ("NA" in any
    /// case, "-", empty) and unparseable values all map to None.
    pub fn as_rank(&self) -> Option<u32> {
        match self {
            RawCell::Number(n) => {
                if n.is_finite() && *n >= 0.0 {
                    Some(*n as u32)
                } else {
                    None
                }
            }
            RawCell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() || trimmed == "-" || trimmed.eq_ignore_ascii_case("NA") {
                    return None;
                }
                trimmed.parse::<u32>().ok()
            }
        }
    }
}

/// Total normalizer over an optional cell: absent cells have no cutoff.
pub fn parse_rank(cell: Option<&RawCell>) -> Option<u32> {
    cell.and_then(|c| c.as_rank())
}

/// One valid historical admission record, with the 18 demographic cutoff
/// cells kept in resolver order (see `RankSlice::cutoff_index`).
#[derive(Debug, Clone, Serialize)]
pub struct CollegeRecord {
    pub inst_code: String,
    pub name: String,
    pub place: String,
    pub district: String,
    pub co_education: String,
    pub college_type: String,
    pub year_established: String,
    pub branch_code: String,
    pub branch_name: String,
    pub tuition_fee: String,
    pub affiliation: String,
    pub cutoffs: [Option<RawCell>; 18],
}

#[derive(Debug, Clone)]
pub struct CandidateQuery {
    pub rank: u32,
    /// Reservation category as supplied by the user; resolved against the
    /// known column mappings at prediction time.
    pub category: String,
    pub gender: String,
    /// Selected branch names; may contain the `ALL_BRANCHES` sentinel.
    pub branches: Vec<String>,
    pub limit: Option<usize>,
    pub preferences: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictedCollege {
    pub inst_code: String,
    pub college_name: String,
    pub tuition_fee: String,
    pub cutoff_rank: u32,
    /// Original cell text of the cutoff, preserved for display.
    pub cutoff_display: String,
    pub place: String,
    pub district: String,
    pub branch_name: String,
    /// Label of the demographic column the cutoff was read from, e.g. "OC BOYS".
    pub rank_category_used: String,
}

/// Normalize a branch name for comparison: trim, collapse internal runs of
/// whitespace, uppercase. Raw dataset branch strings are inconsistently
/// spaced and cased.
pub fn normalize_branch(branch: &str) -> String {
    let collapsed = Regex::new(r"\s+")
        .unwrap()
        .replace_all(branch.trim(), " ")
        .to_string();
    collapsed.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_parsing_handles_every_cell_shape() {
        assert_eq!(parse_rank(None), None);
        assert_eq!(parse_rank(Some(&RawCell::Number(15000.0))), Some(15000));
        assert_eq!(parse_rank(Some(&RawCell::Number(f64::NAN))), None);
        assert_eq!(parse_rank(Some(&RawCell::Text("15000".to_string()))), Some(15000));
        assert_eq!(parse_rank(Some(&RawCell::Text("  72315 ".to_string()))), Some(72315));
        assert_eq!(parse_rank(Some(&RawCell::Text("NA".to_string()))), None);
        assert_eq!(parse_rank(Some(&RawCell::Text("na".to_string()))), None);
        assert_eq!(parse_rank(Some(&RawCell::Text("Na".to_string()))), None);
        assert_eq!(parse_rank(Some(&RawCell::Text("-".to_string()))), None);
        assert_eq!(parse_rank(Some(&RawCell::Text("".to_string()))), None);
        assert_eq!(parse_rank(Some(&RawCell::Text("   ".to_string()))), None);
        assert_eq!(parse_rank(Some(&RawCell::Text("not a rank".to_string()))), None);
    }

    #[test]
    fn display_preserves_original_form() {
        assert_eq!(RawCell::Number(15000.0).display(), "15000");
        assert_eq!(RawCell::Text("15000".to_string()).display(), "15000");
        assert_eq!(RawCell::Text("NA".to_string()).display(), "NA");
    }

    #[test]
    fn branch_normalization_collapses_case_and_spacing() {
        assert_eq!(
            normalize_branch(" computer   Science and Engineering "),
            "COMPUTER SCIENCE AND ENGINEERING"
        );
        assert_eq!(normalize_branch("CSE"), "CSE");
        assert_eq!(normalize_branch("c s e"), "C S E");
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = Config {
            advisor: Some(AdvisorConfig {
                endpoint: "https://api.example.com/v1/chat/completions".to_string(),
                api_key: "key".to_string(),
                model: "advisor-model".to_string(),
                timeout_seconds: Some(20),
            }),
            ..Config::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.dataset_path, config.dataset_path);
        assert_eq!(parsed.rank_window, DEFAULT_RANK_WINDOW);
        assert_eq!(parsed.advisor.unwrap().model, "advisor-model");
    }
}
