use crate::models::{
    normalize_branch, parse_rank, CandidateQuery, CollegeRecord, PredictedCollege, ALL_BRANCHES,
    DEFAULT_COLLEGE_LIMIT, DEFAULT_RANK_WINDOW, MAX_COLLEGE_LIMIT,
};
use anyhow::{anyhow, Result};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankCategory {
    Oc,
    BcA,
    BcB,
    BcC,
    BcD,
    BcE,
    Sc,
    St,
    Ews,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Boys,
    Girls,
}

/// A resolved demographic slice: the pair that picks one of the 18 cutoff
/// columns out of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankSlice {
    pub category: RankCategory,
    pub gender: Gender,
}

impl RankCategory {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "OC" => Some(RankCategory::Oc),
            "BC_A" => Some(RankCategory::BcA),
            "BC_B" => Some(RankCategory::BcB),
            "BC_C" => Some(RankCategory::BcC),
            "BC_D" => Some(RankCategory::BcD),
            "BC_E" => Some(RankCategory::BcE),
            "SC" => Some(RankCategory::Sc),
            "ST" => Some(RankCategory::St),
            "EWS" => Some(RankCategory::Ews),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            RankCategory::Oc => "OC",
            RankCategory::BcA => "BC_A",
            RankCategory::BcB => "BC_B",
            RankCategory::BcC => "BC_C",
            RankCategory::BcD => "BC_D",
            RankCategory::BcE => "BC_E",
            RankCategory::Sc => "SC",
            RankCategory::St => "ST",
            RankCategory::Ews => "EWS",
        }
    }

    fn ordinal(&self) -> usize {
        match self {
            RankCategory::Oc => 0,
            RankCategory::BcA => 1,
            RankCategory::BcB => 2,
            RankCategory::BcC => 3,
            RankCategory::BcD => 4,
            RankCategory::BcE => 5,
            RankCategory::Sc => 6,
            RankCategory::St => 7,
            RankCategory::Ews => 8,
        }
    }
}

impl Gender {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "BOYS" => Some(Gender::Boys),
            "GIRLS" => Some(Gender::Girls),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Gender::Boys => "BOYS",
            Gender::Girls => "GIRLS",
        }
    }
}

impl RankSlice {
    /// Resolve the user-supplied category/gender pair against the known
    /// column mappings. None means the pair has no cutoff column.
    pub fn resolve(category: &str, gender: &str) -> Option<Self> {
        Some(Self {
            category: RankCategory::parse(category)?,
            gender: Gender::parse(gender)?,
        })
    }

    /// Index of this slice's cutoff cell within `CollegeRecord::cutoffs`.
    /// Columns come in category order with BOYS before GIRLS, mirroring the
    /// Column10..Column27 layout of the source export.
    pub fn cutoff_index(&self) -> usize {
        self.category.ordinal() * 2
            + match self.gender {
                Gender::Boys => 0,
                Gender::Girls => 1,
            }
    }

    /// Positional column key of this slice in the raw export.
    pub fn column_key(&self) -> String {
        format!("Column{}", 10 + self.cutoff_index())
    }

    /// Human-readable column label. The EWS columns carry historical names
    /// in the source statement instead of the regular "{category} {gender}"
    /// pattern.
    pub fn label(&self) -> String {
        if self.category == RankCategory::Ews {
            return match self.gender {
                Gender::Boys => "EWS GEN OU".to_string(),
                Gender::Girls => "EWS GIRLS OU".to_string(),
            };
        }
        format!("{} {}", self.category.as_str(), self.gender.as_str())
    }
}

/// Clamp the requested result count: zero or absent falls back to the
/// default, anything above the maximum is capped.
fn effective_limit(requested: Option<usize>) -> usize {
    match requested {
        None | Some(0) => DEFAULT_COLLEGE_LIMIT,
        Some(n) => n.min(MAX_COLLEGE_LIMIT),
    }
}

pub struct CollegePredictor<'a> {
    records: &'a [CollegeRecord],
    rank_window: u32,
}

impl<'a> CollegePredictor<'a> {
    pub fn new(records: &'a [CollegeRecord]) -> Self {
        Self {
            records,
            rank_window: DEFAULT_RANK_WINDOW,
        }
    }

    pub fn with_rank_window(records: &'a [CollegeRecord], rank_window: u32) -> Self {
        Self {
            records,
            rank_window,
        }
    }

    /// Find the colleges a candidate plausibly qualifies for, tightest fit
    /// first. An unknown category/gender pair is the only hard failure;
    /// a query matching nothing returns Ok with an empty list.
    pub fn predict(&self, query: &CandidateQuery) -> Result<Vec<PredictedCollege>> {
        let slice = RankSlice::resolve(&query.category, &query.gender).ok_or_else(|| {
            anyhow!(
                "No cutoff column mapping for category '{}' and gender '{}'",
                query.category,
                query.gender
            )
        })?;

        let any_branch = query.branches.iter().any(|b| b == ALL_BRANCHES);
        let wanted_branches: HashSet<String> = query
            .branches
            .iter()
            .map(|b| normalize_branch(b))
            .collect();

        let mut matches: Vec<PredictedCollege> = Vec::new();
        for record in self.records {
            let cell = record.cutoffs[slice.cutoff_index()].as_ref();
            let Some(cutoff) = parse_rank(cell) else {
                continue;
            };
            if !any_branch && !wanted_branches.contains(&normalize_branch(&record.branch_name)) {
                continue;
            }
            if !self.rank_qualifies(query.rank, cutoff) {
                continue;
            }
            matches.push(PredictedCollege {
                inst_code: record.inst_code.clone(),
                college_name: record.name.clone(),
                tuition_fee: record.tuition_fee.clone(),
                cutoff_rank: cutoff,
                cutoff_display: cell
                    .map(|c| c.display())
                    .unwrap_or_else(|| "N/A".to_string()),
                place: record.place.clone(),
                district: record.district.clone(),
                branch_name: record.branch_name.clone(),
                rank_category_used: slice.label(),
            });
        }

        // Lower cutoff first: the hardest colleges the candidate still
        // clears. Stable, so equal cutoffs keep dataset order.
        matches.sort_by_key(|college| college.cutoff_rank);
        matches.truncate(effective_limit(query.limit));
        Ok(matches)
    }

    /// A cutoff qualifies when the candidate clears it and it is not far
    /// more generous than the candidate's own tier.
    fn rank_qualifies(&self, rank: u32, cutoff: u32) -> bool {
        let floor = rank.saturating_sub(self.rank_window).max(1);
        rank <= cutoff && cutoff >= floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawCell;

    fn record(inst_code: &str, branch: &str, oc_boys: Option<RawCell>) -> CollegeRecord {
        let mut cutoffs: [Option<RawCell>; 18] = Default::default();
        cutoffs[0] = oc_boys;
        CollegeRecord {
            inst_code: inst_code.to_string(),
            name: format!("{} Institute of Technology", inst_code),
            place: "HYDERABAD".to_string(),
            district: "HYD".to_string(),
            co_education: "COED".to_string(),
            college_type: "PVT".to_string(),
            year_established: "1998".to_string(),
            branch_code: "CSE".to_string(),
            branch_name: branch.to_string(),
            tuition_fee: "85000".to_string(),
            affiliation: "JNTUH".to_string(),
            cutoffs,
        }
    }

    fn query(rank: u32, branches: &[&str]) -> CandidateQuery {
        CandidateQuery {
            rank,
            category: "OC".to_string(),
            gender: "BOYS".to_string(),
            branches: branches.iter().map(|b| b.to_string()).collect(),
            limit: None,
            preferences: String::new(),
        }
    }

    #[test]
    fn resolver_maps_all_slices_to_distinct_columns() {
        let mut seen = std::collections::HashSet::new();
        for category in ["OC", "BC_A", "BC_B", "BC_C", "BC_D", "BC_E", "SC", "ST", "EWS"] {
            for gender in ["BOYS", "GIRLS"] {
                let slice = RankSlice::resolve(category, gender).unwrap();
                assert!(seen.insert(slice.column_key()));
            }
        }
        assert_eq!(seen.len(), 18);
        assert_eq!(
            RankSlice::resolve("OC", "BOYS").unwrap().column_key(),
            "Column10"
        );
        assert_eq!(
            RankSlice::resolve("EWS", "GIRLS").unwrap().column_key(),
            "Column27"
        );
    }

    #[test]
    fn ews_labels_follow_source_naming() {
        assert_eq!(RankSlice::resolve("EWS", "BOYS").unwrap().label(), "EWS GEN OU");
        assert_eq!(
            RankSlice::resolve("EWS", "GIRLS").unwrap().label(),
            "EWS GIRLS OU"
        );
        assert_eq!(RankSlice::resolve("OC", "BOYS").unwrap().label(), "OC BOYS");
        assert_eq!(RankSlice::resolve("sc", "girls").unwrap().label(), "SC GIRLS");
    }

    #[test]
    fn unknown_category_is_a_hard_failure_not_an_empty_result() {
        let records = vec![record("C1", "CSE", Some(RawCell::Text("15000".to_string())))];
        let predictor = CollegePredictor::new(&records);
        let mut bad = query(14000, &["CSE"]);
        bad.category = "XX".to_string();
        assert!(predictor.predict(&bad).is_err());
    }

    #[test]
    fn qualifying_row_comes_back_with_parsed_and_display_cutoff() {
        let records = vec![record("C1", "CSE", Some(RawCell::Text("15000".to_string())))];
        let predictor = CollegePredictor::new(&records);
        let results = predictor.predict(&query(14000, &["CSE"])).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].cutoff_rank, 15000);
        assert_eq!(results[0].cutoff_display, "15000");
        assert_eq!(results[0].rank_category_used, "OC BOYS");
    }

    #[test]
    fn candidate_below_cutoff_gets_empty_result_not_error() {
        let records = vec![record("C1", "CSE", Some(RawCell::Text("15000".to_string())))];
        let predictor = CollegePredictor::new(&records);
        let results = predictor.predict(&query(20000, &["CSE"])).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn unavailable_cutoff_cell_never_matches() {
        let records = vec![
            record("C1", "CSE", Some(RawCell::Text("NA".to_string()))),
            record("C2", "CSE", None),
            record("C3", "CSE", Some(RawCell::Text("-".to_string()))),
        ];
        let predictor = CollegePredictor::new(&records);
        let results = predictor.predict(&query(1, &["CSE"])).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn branch_match_ignores_case_and_extra_whitespace() {
        let records = vec![record(
            "C1",
            " computer   Science and Engineering ",
            Some(RawCell::Number(9000.0)),
        )];
        let predictor = CollegePredictor::new(&records);
        let results = predictor
            .predict(&query(8800, &["COMPUTER SCIENCE AND ENGINEERING"]))
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn all_branches_sentinel_overrides_other_selections() {
        let records = vec![
            record("C1", "CSE", Some(RawCell::Number(5000.0))),
            record("C2", "ECE", Some(RawCell::Number(5100.0))),
            record("C3", "CIVIL ENGINEERING", Some(RawCell::Number(5200.0))),
        ];
        let predictor = CollegePredictor::new(&records);
        let results = predictor
            .predict(&query(5000, &["CSE", ALL_BRANCHES]))
            .unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn results_sort_ascending_by_cutoff_with_stable_ties() {
        let records = vec![
            record("LOOSE", "CSE", Some(RawCell::Number(5400.0))),
            record("TIE_FIRST", "CSE", Some(RawCell::Number(5200.0))),
            record("TIE_SECOND", "CSE", Some(RawCell::Number(5200.0))),
            record("TIGHT", "CSE", Some(RawCell::Number(5100.0))),
        ];
        let predictor = CollegePredictor::new(&records);
        let results = predictor.predict(&query(5100, &["CSE"])).unwrap();
        let order: Vec<&str> = results.iter().map(|c| c.inst_code.as_str()).collect();
        assert_eq!(order, vec!["TIGHT", "TIE_FIRST", "TIE_SECOND", "LOOSE"]);
        for pair in results.windows(2) {
            assert!(pair[0].cutoff_rank <= pair[1].cutoff_rank);
        }
    }

    #[test]
    fn window_bound_holds_for_every_result() {
        let records: Vec<CollegeRecord> = (0..40)
            .map(|i| {
                record(
                    &format!("C{}", i),
                    "CSE",
                    Some(RawCell::Number((9000 + i * 100) as f64)),
                )
            })
            .collect();
        let predictor = CollegePredictor::new(&records);
        let rank = 9500;
        let results = predictor.predict(&query(rank, &["CSE"])).unwrap();
        assert!(!results.is_empty());
        let floor = (rank - 500).max(1);
        for college in &results {
            assert!(college.cutoff_rank >= floor);
            assert!(rank <= college.cutoff_rank);
        }
    }

    #[test]
    fn window_floor_clamps_at_one_for_top_ranks() {
        let records = vec![record("C1", "CSE", Some(RawCell::Number(10.0)))];
        let predictor = CollegePredictor::with_rank_window(&records, 500);
        let results = predictor.predict(&query(3, &["CSE"])).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn limit_is_clamped_to_sane_bounds() {
        let records: Vec<CollegeRecord> = (0..120)
            .map(|i| {
                record(
                    &format!("C{}", i),
                    "CSE",
                    Some(RawCell::Number((7000 + i) as f64)),
                )
            })
            .collect();
        let predictor = CollegePredictor::new(&records);

        let mut q = query(7000, &["CSE"]);
        q.limit = Some(1000);
        assert_eq!(predictor.predict(&q).unwrap().len(), 50);

        q.limit = Some(0);
        assert_eq!(predictor.predict(&q).unwrap().len(), 20);

        q.limit = None;
        assert_eq!(predictor.predict(&q).unwrap().len(), 20);

        q.limit = Some(5);
        assert_eq!(predictor.predict(&q).unwrap().len(), 5);
    }

    #[test]
    fn girls_column_is_read_for_girls_queries() {
        let mut rec = record("C1", "CSE", Some(RawCell::Number(4000.0)));
        rec.cutoffs[1] = Some(RawCell::Number(4800.0));
        let records = vec![rec];
        let predictor = CollegePredictor::new(&records);

        let mut q = query(4500, &["CSE"]);
        q.gender = "GIRLS".to_string();
        let results = predictor.predict(&q).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].cutoff_rank, 4800);
        assert_eq!(results[0].rank_category_used, "OC GIRLS");

        // the boys column for the same row would not qualify
        q.gender = "BOYS".to_string();
        assert!(predictor.predict(&q).unwrap().is_empty());
    }
}
