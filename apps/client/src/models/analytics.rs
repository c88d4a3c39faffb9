use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::application::ApplicationStatus;

/// Per-status application counts that always carry every status.
///
/// Missing keys in a service payload are filled with zero while decoding, so
/// display code never has to special-case an absent status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<ApplicationStatus, usize>",
    into = "BTreeMap<ApplicationStatus, usize>"
)]
pub struct StatusCounts(BTreeMap<ApplicationStatus, usize>);

impl StatusCounts {
    pub fn get(&self, status: ApplicationStatus) -> usize {
        self.0.get(&status).copied().unwrap_or(0)
    }

    pub(crate) fn increment(&mut self, status: ApplicationStatus) {
        *self.0.entry(status).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Iterates in lifecycle order.
    pub fn iter(&self) -> impl Iterator<Item = (ApplicationStatus, usize)> + '_ {
        self.0.iter().map(|(status, count)| (*status, *count))
    }
}

impl Default for StatusCounts {
    fn default() -> Self {
        Self(
            ApplicationStatus::ordered()
                .into_iter()
                .map(|status| (status, 0))
                .collect(),
        )
    }
}

impl From<BTreeMap<ApplicationStatus, usize>> for StatusCounts {
    fn from(partial: BTreeMap<ApplicationStatus, usize>) -> Self {
        let mut counts = StatusCounts::default();
        counts.0.extend(partial);
        counts
    }
}

impl From<StatusCounts> for BTreeMap<ApplicationStatus, usize> {
    fn from(counts: StatusCounts) -> Self {
        counts.0
    }
}

/// Dashboard aggregate over one HR user's jobs and applications.
///
/// Derived and read-only. Never kept beyond a single dashboard load.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_jobs: usize,
    pub active_jobs: usize,
    pub total_applications: usize,
    pub avg_match_score: f64,
    #[serde(default)]
    pub status_counts: StatusCounts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_counts_hold_every_status() {
        let counts = StatusCounts::default();
        assert_eq!(counts.iter().count(), 5);
        assert_eq!(counts.total(), 0);
    }

    #[test]
    fn test_partial_payload_is_filled_with_zeros() {
        let summary: AnalyticsSummary = serde_json::from_value(json!({
            "totalJobs": 3,
            "activeJobs": 2,
            "totalApplications": 4,
            "avgMatchScore": 71.5,
            "statusCounts": { "applied": 3, "hired": 1 }
        }))
        .unwrap();
        assert_eq!(summary.status_counts.get(ApplicationStatus::Applied), 3);
        assert_eq!(summary.status_counts.get(ApplicationStatus::Shortlisted), 0);
        assert_eq!(summary.status_counts.iter().count(), 5);
    }

    #[test]
    fn test_counts_serialize_with_wire_keys() {
        let mut counts = StatusCounts::default();
        counts.increment(ApplicationStatus::UnderReview);
        let value = serde_json::to_value(&counts).unwrap();
        assert_eq!(value["under_review"], json!(1));
        assert_eq!(value["rejected"], json!(0));
    }
}
