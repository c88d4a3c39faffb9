//! Shared builders and a scripted transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};

use crate::errors::TransportError;
use crate::gateway::{ApiRequest, ApiResponse, Method, Transport};
use crate::models::{Application, ApplicationStatus, Job, Resume, Role, User, UserId};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

pub fn at(minutes: i64) -> DateTime<Utc> {
    base_time() + Duration::minutes(minutes)
}

pub fn hr(id: &str) -> User {
    User::new(UserId::new(id), format!("{id}@corp.example"), "Helen Reyes", Role::Hr)
}

pub fn applicant(id: &str) -> User {
    User::new(UserId::new(id), format!("{id}@mail.example"), "Alex Doe", Role::Applicant)
}

pub fn job_json(id: &str, owner: &str, status: &str) -> Value {
    json!({
        "id": id,
        "hrId": owner,
        "title": format!("Role {id}"),
        "description": "Ship reliable services",
        "type": "full-time",
        "location": "Remote",
        "experienceLevel": "mid",
        "requiredSkills": ["Rust", "SQL", "Kubernetes"],
        "status": status,
        "createdAt": base_time().to_rfc3339()
    })
}

pub fn job(id: &str, owner: &str) -> Job {
    serde_json::from_value(job_json(id, owner, "active")).unwrap()
}

pub fn application_json(
    id: &str,
    job_id: &str,
    applicant_id: &str,
    score: f64,
    status: &str,
    created_at: &str,
) -> Value {
    json!({
        "id": id,
        "jobId": job_id,
        "applicantId": applicant_id,
        "resumeId": format!("r-{applicant_id}"),
        "matchScore": score,
        "status": status,
        "createdAt": created_at
    })
}

/// Application created `minutes` after [`base_time`].
pub fn application(
    id: &str,
    job_id: &str,
    applicant_id: &str,
    score: f64,
    status: ApplicationStatus,
    minutes: i64,
) -> Application {
    serde_json::from_value(application_json(
        id,
        job_id,
        applicant_id,
        score,
        status.as_str(),
        &at(minutes).to_rfc3339(),
    ))
    .unwrap()
}

pub fn resume_json(id: &str, owner: &str, skills: &[&str]) -> Value {
    json!({
        "id": id,
        "applicantId": owner,
        "fileName": format!("{owner}-cv.pdf"),
        "skills": skills,
        "isActive": true,
        "uploadedAt": base_time().to_rfc3339()
    })
}

pub fn resume(id: &str, owner: &str, skills: &[&str]) -> Resume {
    serde_json::from_value(resume_json(id, owner, skills)).unwrap()
}

/// Replays canned responses keyed by method and path, recording every request.
/// Unscripted routes answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<(Method, String), VecDeque<ApiResponse>>>,
    requests: Mutex<Vec<ApiRequest>>,
    pending_polls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply; the last queued reply for a route repeats once the
    /// queue would otherwise run dry.
    pub fn reply(&self, method: Method, path: &str, status: u16, body: Value) {
        let body = if body.is_null() {
            String::new()
        } else {
            body.to_string()
        };
        self.replies
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(ApiResponse::new(status, body));
    }

    /// Every request stays pending for `polls` polls before it is answered.
    pub fn set_pending_polls(&self, polls: usize) {
        self.pending_polls.store(polls, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        for _ in 0..self.pending_polls.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        let key = (request.method, request.path.clone());
        self.requests.lock().unwrap().push(request);

        let mut replies = self.replies.lock().unwrap();
        let response = match replies.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or_else(|| ApiResponse::new(404, r#"{"error":"no such route"}"#)))
    }
}
