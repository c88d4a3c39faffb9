use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserId;

string_id!(ResumeId);

/// An uploaded resume. `skills` is filled in by the remote parsing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: ResumeId,
    #[serde(alias = "userId")]
    pub applicant_id: UserId,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, alias = "extractedSkills")]
    pub skills: Vec<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(alias = "createdAt")]
    pub uploaded_at: DateTime<Utc>,
}

/// Mutable resume attributes accepted by `PUT resumes/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}
