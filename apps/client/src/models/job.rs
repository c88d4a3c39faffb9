use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::{User, UserId};

string_id!(JobId);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Active,
    Closed,
}

impl JobStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Closed => "closed",
        }
    }
}

/// A job posting owned by one HR user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    #[serde(alias = "hrId", alias = "userId")]
    pub owner_id: UserId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub job_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub experience_level: String,
    /// Ordered as posted; duplicates are kept.
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    /// Server-side projection for display only. Never authoritative and never
    /// used for aggregation; count the applications instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_count: Option<u32>,
}

impl Job {
    pub fn is_active(&self) -> bool {
        self.status == JobStatus::Active
    }

    /// True when `user` is the HR user who posted this job.
    pub fn is_owned_by(&self, user: &User) -> bool {
        user.is_hr() && self.owner_id == user.id
    }
}

/// Payload for creating or editing a job posting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub location: String,
    pub experience_level: String,
    pub required_skills: Vec<String>,
    pub status: JobStatus,
}

impl JobDraft {
    /// Local checks run before the draft is sent.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Job title is required".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("Job description is required".to_string());
        }
        Ok(())
    }
}
