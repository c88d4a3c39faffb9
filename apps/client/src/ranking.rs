//! Candidate Ranking View: one job's applications ordered for HR review.
//!
//! Order: match score descending, then creation time ascending (earlier
//! applicants first on equal score). The sort is stable, so applications with
//! identical score and timestamp keep their order from the source collection.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::errors::ClientError;
use crate::lifecycle::{self, Transition};
use crate::models::{Application, ApplicationId, ApplicationStatus, Job, Resume, ResumeId, User};

/// Resume-derived display data for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDigest {
    pub file_name: String,
    pub skills: Vec<String>,
    /// Required skills of the job found on the resume, in the job's order.
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

impl ResumeDigest {
    pub fn new(resume: &Resume, job: &Job) -> Self {
        let has = |skill: &str| resume.skills.iter().any(|s| s.eq_ignore_ascii_case(skill));
        let mut matched_skills = Vec::new();
        let mut missing_skills = Vec::new();
        for skill in &job.required_skills {
            let bucket = if has(skill.as_str()) {
                &mut matched_skills
            } else {
                &mut missing_skills
            };
            if !bucket.iter().any(|s: &String| s.eq_ignore_ascii_case(skill)) {
                bucket.push(skill.clone());
            }
        }
        Self {
            file_name: resume.file_name.clone(),
            skills: resume.skills.clone(),
            matched_skills,
            missing_skills,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    /// 1-based position.
    pub rank: usize,
    pub application: Application,
    pub resume: Option<ResumeDigest>,
}

#[derive(Debug, Clone)]
pub struct CandidateRanking {
    job: Job,
    candidates: Vec<RankedCandidate>,
}

/// Ranking order: higher score first, then earlier application first.
pub fn compare(a: &Application, b: &Application) -> Ordering {
    b.match_score()
        .value()
        .total_cmp(&a.match_score().value())
        .then_with(|| a.created_at.cmp(&b.created_at))
}

impl CandidateRanking {
    /// Ranks the applications of `job`. Applications referencing another job
    /// are dropped; resumes are matched by id when available.
    pub fn build(job: &Job, applications: &[Application], resumes: &[Resume]) -> Self {
        let by_id: HashMap<&ResumeId, &Resume> =
            resumes.iter().map(|resume| (&resume.id, resume)).collect();

        let mut selected: Vec<&Application> = applications
            .iter()
            .filter(|app| {
                let resolved = app.job_id == job.id;
                if !resolved {
                    warn!(
                        "Skipping application {} for job {} while ranking job {}",
                        app.id, app.job_id, job.id
                    );
                }
                resolved
            })
            .collect();
        selected.sort_by(|a, b| compare(a, b));

        let candidates = selected
            .into_iter()
            .enumerate()
            .map(|(index, app)| RankedCandidate {
                rank: index + 1,
                application: app.clone(),
                resume: by_id
                    .get(&app.resume_id)
                    .map(|resume| ResumeDigest::new(resume, job)),
            })
            .collect();

        Self {
            job: job.clone(),
            candidates,
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn candidates(&self) -> &[RankedCandidate] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn top(&self, n: usize) -> &[RankedCandidate] {
        &self.candidates[..n.min(self.candidates.len())]
    }

    pub fn with_status(&self, status: ApplicationStatus) -> Vec<&RankedCandidate> {
        self.candidates
            .iter()
            .filter(|c| c.application.status() == status)
            .collect()
    }

    pub fn shortlist(&self) -> Vec<&RankedCandidate> {
        self.with_status(ApplicationStatus::Shortlisted)
    }

    pub fn get(&self, application_id: &ApplicationId) -> Option<&RankedCandidate> {
        self.candidates
            .iter()
            .find(|c| &c.application.id == application_id)
    }

    /// Validates a status change requested from this view. The ranking itself
    /// is left untouched; send the returned transition through the gateway.
    pub fn request_status(
        &self,
        application_id: &ApplicationId,
        requested: ApplicationStatus,
        actor: &User,
    ) -> Result<Transition, ClientError> {
        let candidate = self.get(application_id).ok_or_else(|| {
            ClientError::NotFound(format!(
                "application {application_id} is not listed for job {}",
                self.job.id
            ))
        })?;
        lifecycle::transition(&candidate.application, &self.job, requested, actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{application, hr, job, resume};
    use ApplicationStatus::*;

    fn ids(ranking: &CandidateRanking) -> Vec<&str> {
        ranking
            .candidates()
            .iter()
            .map(|c| c.application.id.as_str())
            .collect()
    }

    #[test]
    fn test_equal_scores_rank_earlier_first() {
        let posting = job("j-1", "hr-1");
        let apps = vec![
            application("late", "j-1", "u-2", 90.0, Applied, 20),
            application("early", "j-1", "u-1", 90.0, Applied, 10),
        ];
        let ranking = CandidateRanking::build(&posting, &apps, &[]);
        assert_eq!(ids(&ranking), vec!["early", "late"]);
        assert_eq!(ranking.candidates()[0].rank, 1);
    }

    #[test]
    fn test_higher_score_wins_regardless_of_time() {
        let posting = job("j-1", "hr-1");
        let apps = vec![
            application("low", "j-1", "u-1", 80.0, Applied, 1),
            application("high", "j-1", "u-2", 95.0, Applied, 500),
        ];
        let ranking = CandidateRanking::build(&posting, &apps, &[]);
        assert_eq!(ids(&ranking), vec!["high", "low"]);
    }

    #[test]
    fn test_exact_ties_keep_source_order() {
        let posting = job("j-1", "hr-1");
        let apps = vec![
            application("first", "j-1", "u-1", 75.0, Applied, 5),
            application("second", "j-1", "u-2", 75.0, Applied, 5),
            application("third", "j-1", "u-3", 75.0, Applied, 5),
        ];
        let ranking = CandidateRanking::build(&posting, &apps, &[]);
        assert_eq!(ids(&ranking), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_applications_for_other_jobs_are_dropped() {
        let posting = job("j-1", "hr-1");
        let apps = vec![
            application("mine", "j-1", "u-1", 60.0, Applied, 1),
            application("stray", "j-404", "u-2", 99.0, Applied, 1),
        ];
        let ranking = CandidateRanking::build(&posting, &apps, &[]);
        assert_eq!(ids(&ranking), vec!["mine"]);
    }

    #[test]
    fn test_resume_digest_splits_required_skills() {
        let posting = job("j-1", "hr-1");
        let apps = vec![application("a-1", "j-1", "u-1", 60.0, Applied, 1)];
        let resumes = vec![resume("r-u-1", "u-1", &["rust", "Go"])];
        let ranking = CandidateRanking::build(&posting, &apps, &resumes);

        let digest = ranking.candidates()[0].resume.as_ref().unwrap();
        assert_eq!(digest.matched_skills, vec!["Rust"]);
        assert_eq!(digest.missing_skills, vec!["SQL", "Kubernetes"]);
    }

    #[test]
    fn test_status_requests_route_through_lifecycle() {
        let posting = job("j-1", "hr-1");
        let apps = vec![application("a-1", "j-1", "u-1", 60.0, Applied, 1)];
        let ranking = CandidateRanking::build(&posting, &apps, &[]);

        let ok = ranking
            .request_status(&ApplicationId::new("a-1"), UnderReview, &hr("hr-1"))
            .unwrap();
        assert_eq!(ok.to, UnderReview);

        let err = ranking
            .request_status(&ApplicationId::new("a-1"), Hired, &hr("hr-1"))
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidTransition { .. }));
        assert_eq!(ranking.candidates()[0].application.status(), Applied);

        let missing = ranking
            .request_status(&ApplicationId::new("nope"), UnderReview, &hr("hr-1"))
            .unwrap_err();
        assert!(matches!(missing, ClientError::NotFound(_)));
    }

    #[test]
    fn test_top_and_shortlist_projections() {
        let posting = job("j-1", "hr-1");
        let apps = vec![
            application("a-1", "j-1", "u-1", 60.0, Shortlisted, 1),
            application("a-2", "j-1", "u-2", 70.0, Applied, 2),
        ];
        let ranking = CandidateRanking::build(&posting, &apps, &[]);
        assert_eq!(ranking.top(1).len(), 1);
        assert_eq!(ranking.top(10).len(), 2);
        assert_eq!(ranking.shortlist().len(), 1);
    }
}
