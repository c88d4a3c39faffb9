use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use super::job::JobId;
use super::resume::ResumeId;
use super::user::UserId;

string_id!(ApplicationId);

/// Lifecycle stage of a single application.
///
/// Declaration order is the display order used by dashboards and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    UnderReview,
    Shortlisted,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Applied,
            Self::UnderReview,
            Self::Shortlisted,
            Self::Rejected,
            Self::Hired,
        ]
    }

    /// Wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::UnderReview => "under_review",
            Self::Shortlisted => "shortlisted",
            Self::Rejected => "rejected",
            Self::Hired => "hired",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Applied => "Applied",
            Self::UnderReview => "Under Review",
            Self::Shortlisted => "Shortlisted",
            Self::Rejected => "Rejected",
            Self::Hired => "Hired",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Hired)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ordered()
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| format!("unknown application status '{value}'"))
    }
}

/// Compatibility percentage produced by the remote scoring service.
///
/// Only constructed from service payloads (or `new` for fixtures); there is no
/// way to change a score once it exists.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct MatchScore(f64);

impl MatchScore {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && (Self::MIN..=Self::MAX).contains(&value)).then_some(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for MatchScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        MatchScore::new(value)
            .ok_or_else(|| D::Error::custom(format!("match score {value} is outside 0-100")))
    }
}

impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.0)
    }
}

/// One applicant's application to one job.
///
/// `match_score` and `status` are read-only on the client: the score comes
/// from the scoring service and status changes come back from the server after
/// a validated transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    #[serde(alias = "userId")]
    pub applicant_id: UserId,
    pub resume_id: ResumeId,
    match_score: MatchScore,
    status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
}

impl Application {
    /// A freshly created application, always in the initial `applied` state.
    pub fn new(
        id: ApplicationId,
        job_id: JobId,
        applicant_id: UserId,
        resume_id: ResumeId,
        match_score: MatchScore,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            job_id,
            applicant_id,
            resume_id,
            match_score,
            status: ApplicationStatus::Applied,
            created_at,
            applicant_name: None,
            applicant_email: None,
            job_title: None,
        }
    }

    pub fn match_score(&self) -> MatchScore {
        self.match_score
    }

    pub fn status(&self) -> ApplicationStatus {
        self.status
    }
}

/// Body of `POST applications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub job_id: JobId,
    pub resume_id: ResumeId,
}
