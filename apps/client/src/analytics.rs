//! Analytics Aggregator.
//!
//! Pure functions that turn job and application collections into the numbers
//! shown on dashboards. Same input, same output; nothing is cached.

use serde::Serialize;

use crate::models::{AnalyticsSummary, Application, ApplicationStatus, Job, StatusCounts};

/// Builds the HR summary over `jobs` and every application visible to the
/// same user (the union across those jobs).
pub fn summarize(jobs: &[Job], applications: &[Application]) -> AnalyticsSummary {
    AnalyticsSummary {
        total_jobs: jobs.len(),
        active_jobs: jobs.iter().filter(|job| job.is_active()).count(),
        total_applications: applications.len(),
        avg_match_score: average_match_score(applications),
        status_counts: count_by_status(applications),
    }
}

/// Arithmetic mean of the match scores; `0.0` for no applications.
pub fn average_match_score(applications: &[Application]) -> f64 {
    if applications.is_empty() {
        return 0.0;
    }
    let total: f64 = applications
        .iter()
        .map(|app| app.match_score().value())
        .sum();
    total / applications.len() as f64
}

/// Counts for all five statuses, zero entries included.
pub fn count_by_status(applications: &[Application]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for app in applications {
        counts.increment(app.status());
    }
    counts
}

/// Overview cards on the applicant dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantStats {
    pub total: usize,
    /// Applied or under review.
    pub in_progress: usize,
    pub shortlisted: usize,
    pub rejected: usize,
    pub hired: usize,
    pub resumes: usize,
    pub status_counts: StatusCounts,
}

impl ApplicantStats {
    pub fn from_applications(applications: &[Application], resume_count: usize) -> Self {
        let status_counts = count_by_status(applications);
        Self {
            total: applications.len(),
            in_progress: status_counts.get(ApplicationStatus::Applied)
                + status_counts.get(ApplicationStatus::UnderReview),
            shortlisted: status_counts.get(ApplicationStatus::Shortlisted),
            rejected: status_counts.get(ApplicationStatus::Rejected),
            hired: status_counts.get(ApplicationStatus::Hired),
            resumes: resume_count,
            status_counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{application, job};
    use crate::models::JobStatus;
    use ApplicationStatus::*;

    fn sample() -> (Vec<Job>, Vec<Application>) {
        let mut closed = job("j-2", "hr-1");
        closed.status = JobStatus::Closed;
        let jobs = vec![job("j-1", "hr-1"), closed, job("j-3", "hr-1")];
        let apps = vec![
            application("a-1", "j-1", "u-1", 90.0, Applied, 1),
            application("a-2", "j-1", "u-2", 70.0, Shortlisted, 2),
            application("a-3", "j-2", "u-3", 50.0, Rejected, 3),
            application("a-4", "j-3", "u-1", 62.0, Applied, 4),
        ];
        (jobs, apps)
    }

    #[test]
    fn test_summary_counts_jobs_and_applications() {
        let (jobs, apps) = sample();
        let summary = summarize(&jobs, &apps);
        assert_eq!(summary.total_jobs, 3);
        assert_eq!(summary.active_jobs, 2);
        assert_eq!(summary.total_applications, 4);
        assert!((summary.avg_match_score - 68.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_input_averages_to_zero() {
        let summary = summarize(&[], &[]);
        assert_eq!(summary.avg_match_score, 0.0);
        assert_eq!(summary.total_applications, 0);
        assert_eq!(summary.status_counts.iter().count(), 5);
    }

    #[test]
    fn test_status_counts_cover_every_status_and_sum_to_total() {
        let (jobs, apps) = sample();
        let summary = summarize(&jobs, &apps);
        let counts = &summary.status_counts;
        assert_eq!(counts.iter().count(), 5);
        assert_eq!(counts.get(Applied), 2);
        assert_eq!(counts.get(UnderReview), 0);
        assert_eq!(counts.get(Hired), 0);
        assert_eq!(counts.total(), summary.total_applications);
    }

    #[test]
    fn test_recomputing_is_idempotent() {
        let (jobs, apps) = sample();
        assert_eq!(summarize(&jobs, &apps), summarize(&jobs, &apps));
    }

    #[test]
    fn test_applicant_stats_group_in_progress() {
        let (_, apps) = sample();
        let stats = ApplicantStats::from_applications(&apps, 2);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.in_progress, 2);
        assert_eq!(stats.shortlisted, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.resumes, 2);
    }
}
