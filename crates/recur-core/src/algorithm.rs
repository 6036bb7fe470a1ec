use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::params::RecurrenceParams;
use crate::theorem::Case;

/// A named divide-and-conquer algorithm and its recurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Algorithm {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub params: RecurrenceParams,
    pub description: String,
    /// Reference implementation snippet.
    pub code: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_complexity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity_analysis: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Algorithm {
    pub fn new(name: String, params: RecurrenceParams, description: String, code: String) -> Self {
        let now = Utc::now();
        Self {
            id: ulid::Ulid::new().to_string(),
            name,
            params,
            description,
            code,
            case: None,
            time_complexity: None,
            complexity_analysis: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_analysis(mut self, analysis: impl Into<String>) -> Self {
        self.complexity_analysis = Some(analysis.into());
        self
    }

    /// Fill `case` and `time_complexity` from the classifier.
    pub fn analyze(mut self) -> Self {
        let classification = self.params.classify();
        self.case = Some(classification.case_label);
        self.time_complexity = Some(classification.complexity);
        self
    }

    /// Case number recomputed from the parameters, independent of what is stored.
    pub fn master_case(&self) -> Case {
        Case::of(self.params.log_b_a(), self.params.k())
    }
}

#[derive(Debug, Clone, Default)]
pub struct CatalogStats {
    pub total: usize,
    pub by_case: Vec<(Case, usize)>,
    pub newest: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge_sort() -> Algorithm {
        Algorithm::new(
            "Merge Sort".into(),
            RecurrenceParams::new(2, 2, 1).unwrap(),
            "Sort by halving and merging".into(),
            "def merge_sort(xs): ...".into(),
        )
    }

    #[test]
    fn test_new_is_unanalyzed() {
        let algo = merge_sort();
        assert!(algo.case.is_none());
        assert!(algo.time_complexity.is_none());
        assert_eq!(algo.created_at, algo.updated_at);
        assert_eq!(algo.id.len(), 26);
    }

    #[test]
    fn test_analyze_fills_classification() {
        let algo = merge_sort().analyze();
        assert_eq!(algo.time_complexity.as_deref(), Some("Θ(n log n)"));
        assert!(algo.case.as_deref().unwrap().starts_with("Case 2"));
        assert_eq!(algo.master_case(), Case::Two);
    }

    #[test]
    fn test_serde_round_trip_keeps_params_valid() {
        let algo = merge_sort().with_analysis("log n levels of n work");
        let json = serde_json::to_string(&algo).unwrap();
        let back: Algorithm = serde_json::from_str(&json).unwrap();
        assert_eq!(back.params, algo.params);
        assert_eq!(back.complexity_analysis.as_deref(), Some("log n levels of n work"));

        let broken = json.replace("\"b\":2", "\"b\":1");
        assert!(serde_json::from_str::<Algorithm>(&broken).is_err());
    }
}
