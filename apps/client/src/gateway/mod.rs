//! Resource Gateway: typed calls against the recruitment service.
//!
//! Every call attaches the gateway's credential as a bearer token and goes
//! through [`envelope`] so a response without `success: true` is an error. The
//! gateway is stateless: it never touches a caller's collections, so a failed
//! call leaves whatever the caller holds exactly as it was.
//!
//! Failures are logged here and returned as `Err`; nothing panics past this
//! boundary.

pub(crate) mod envelope;
pub mod transport;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::errors::{ClientError, TransportError};
use crate::lifecycle::Transition;
use crate::models::application::NewApplication;
use crate::models::{
    AnalyticsSummary, Application, ApplicationId, Job, JobDraft, JobId, Resume, ResumeId,
    ResumeUpdate, User,
};
use crate::session::Credential;

pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, RequestBody, Transport};

/// Applications of one job together with the resumes they reference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobApplications {
    pub applications: Vec<Application>,
    #[serde(default)]
    pub resumes: Vec<Resume>,
}

/// Result of the credential exchange.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInPayload {
    access_token: String,
    user: User,
}

#[derive(Clone)]
pub struct ResourceGateway {
    transport: Arc<dyn Transport>,
    credential: Credential,
}

impl ResourceGateway {
    pub fn new(transport: Arc<dyn Transport>, credential: Credential) -> Self {
        Self {
            transport,
            credential,
        }
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Same transport, different bearer (e.g. after signing in).
    pub fn with_credential(&self, credential: Credential) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            credential,
        }
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<ApiResponse, ClientError> {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            bearer: self.credential.as_str().to_string(),
            body,
        };
        Ok(self.transport.send(request).await?)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        field: &str,
    ) -> Result<T, ClientError> {
        let response = self.call(method, path, body).await?;
        envelope::decode(&response, field)
    }

    async fn remove(&self, path: &str) -> Result<(), ClientError> {
        let response = self.call(Method::Delete, path, RequestBody::Empty).await?;
        envelope::expect_status(&response)
    }

    // ── resumes ────────────────────────────────────────────────────────────

    pub async fn list_my_resumes(&self) -> Result<Vec<Resume>, ClientError> {
        self.fetch(Method::Get, "resumes/my-resumes", RequestBody::Empty, "resumes")
            .await
            .inspect_err(|e| error!("Error loading resumes: {e}"))
    }

    pub async fn upload_resume(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<Resume, ClientError> {
        let body = RequestBody::File {
            field: "resume",
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        };
        let resume: Resume = self
            .fetch(Method::Post, "resumes/upload", body, "resume")
            .await
            .inspect_err(|e| error!("Error uploading resume: {e}"))?;
        info!("Uploaded resume {} ({})", resume.id, resume.file_name);
        Ok(resume)
    }

    pub async fn update_resume(
        &self,
        resume_id: &ResumeId,
        update: &ResumeUpdate,
    ) -> Result<Resume, ClientError> {
        let body = RequestBody::Json(serde_json::to_value(update)?);
        self.fetch(Method::Put, &format!("resumes/{resume_id}"), body, "resume")
            .await
            .inspect_err(|e| error!("Error updating resume {resume_id}: {e}"))
    }

    pub async fn delete_resume(&self, resume_id: &ResumeId) -> Result<(), ClientError> {
        self.remove(&format!("resumes/{resume_id}"))
            .await
            .inspect_err(|e| error!("Error deleting resume {resume_id}: {e}"))
    }

    // ── jobs ───────────────────────────────────────────────────────────────

    pub async fn list_my_jobs(&self) -> Result<Vec<Job>, ClientError> {
        self.fetch(Method::Get, "jobs/my-jobs", RequestBody::Empty, "jobs")
            .await
            .inspect_err(|e| error!("Error loading jobs: {e}"))
    }

    /// Open postings an applicant can browse.
    pub async fn list_open_jobs(&self) -> Result<Vec<Job>, ClientError> {
        self.fetch(Method::Get, "jobs", RequestBody::Empty, "jobs")
            .await
            .inspect_err(|e| error!("Error loading open jobs: {e}"))
    }

    pub async fn create_job(&self, draft: &JobDraft) -> Result<Job, ClientError> {
        draft.validate().map_err(ClientError::Validation)?;
        let body = RequestBody::Json(serde_json::to_value(draft)?);
        let job: Job = self
            .fetch(Method::Post, "jobs", body, "job")
            .await
            .inspect_err(|e| error!("Error creating job: {e}"))?;
        info!("Created job {} ({})", job.id, job.title);
        Ok(job)
    }

    pub async fn update_job(&self, job_id: &JobId, draft: &JobDraft) -> Result<Job, ClientError> {
        draft.validate().map_err(ClientError::Validation)?;
        let body = RequestBody::Json(serde_json::to_value(draft)?);
        self.fetch(Method::Put, &format!("jobs/{job_id}"), body, "job")
            .await
            .inspect_err(|e| error!("Error updating job {job_id}: {e}"))
    }

    pub async fn delete_job(&self, job_id: &JobId) -> Result<(), ClientError> {
        self.remove(&format!("jobs/{job_id}"))
            .await
            .inspect_err(|e| error!("Error deleting job {job_id}: {e}"))?;
        info!("Deleted job {job_id}");
        Ok(())
    }

    // ── applications ───────────────────────────────────────────────────────

    pub async fn list_my_applications(&self) -> Result<Vec<Application>, ClientError> {
        self.fetch(
            Method::Get,
            "applications/my-applications",
            RequestBody::Empty,
            "applications",
        )
        .await
        .inspect_err(|e| error!("Error loading applications: {e}"))
    }

    pub async fn list_job_applications(
        &self,
        job_id: &JobId,
    ) -> Result<JobApplications, ClientError> {
        let response = self
            .call(Method::Get, &format!("applications/job/{job_id}"), RequestBody::Empty)
            .await
            .inspect_err(|e| error!("Error loading applications for job {job_id}: {e}"))?;
        let envelope = envelope::checked_envelope(&response)
            .inspect_err(|e| error!("Error loading applications for job {job_id}: {e}"))?;
        Ok(serde_json::from_value::<JobApplications>(envelope)
            .inspect_err(|e| error!("Error decoding applications for job {job_id}: {e}"))?)
    }

    pub async fn create_application(
        &self,
        job_id: &JobId,
        resume_id: &ResumeId,
    ) -> Result<Application, ClientError> {
        let payload = NewApplication {
            job_id: job_id.clone(),
            resume_id: resume_id.clone(),
        };
        let body = RequestBody::Json(serde_json::to_value(&payload)?);
        let application: Application = self
            .fetch(Method::Post, "applications", body, "application")
            .await
            .inspect_err(|e| error!("Error applying to job {job_id}: {e}"))?;
        info!("Applied to job {job_id} as application {}", application.id);
        Ok(application)
    }

    /// Sends a transition already validated by the lifecycle engine.
    pub async fn update_application_status(
        &self,
        transition: &Transition,
    ) -> Result<Application, ClientError> {
        let path = format!("applications/{}/status", transition.application_id);
        let body = RequestBody::Json(json!({ "status": transition.to }));
        let application: Application = self
            .fetch(Method::Put, &path, body, "application")
            .await
            .inspect_err(|e| {
                error!(
                    "Error moving application {} to {}: {e}",
                    transition.application_id, transition.to
                )
            })?;
        info!(
            "Application {} moved {} -> {}",
            application.id,
            transition.from,
            application.status()
        );
        Ok(application)
    }

    pub async fn delete_application(&self, application_id: &ApplicationId) -> Result<(), ClientError> {
        self.remove(&format!("applications/{application_id}"))
            .await
            .inspect_err(|e| error!("Error withdrawing application {application_id}: {e}"))
    }

    // ── analytics & reports ────────────────────────────────────────────────

    pub async fn dashboard_analytics(&self) -> Result<AnalyticsSummary, ClientError> {
        self.fetch(Method::Get, "analytics/dashboard", RequestBody::Empty, "analytics")
            .await
            .inspect_err(|e| error!("Error loading analytics: {e}"))
    }

    /// Raw CSV candidate report for one job.
    pub async fn fetch_report(&self, job_id: &JobId) -> Result<String, ClientError> {
        self.fetch(Method::Get, &format!("reports/{job_id}"), RequestBody::Empty, "csv")
            .await
            .inspect_err(|e| error!("Error downloading report for job {job_id}: {e}"))
    }

    /// Downloads the report into `dir` as `candidates-report-{jobId}.csv`.
    pub async fn export_report(&self, job_id: &JobId, dir: &Path) -> Result<PathBuf, ClientError> {
        let csv = self.fetch_report(job_id).await?;
        let path = dir.join(report_file_name(job_id));
        let written = match tokio::fs::create_dir_all(dir).await {
            Ok(()) => tokio::fs::write(&path, csv).await,
            Err(e) => Err(e),
        };
        written.map_err(|e| {
            error!("Error writing report {}: {e}", path.display());
            ClientError::Validation(format!("Could not save report to {}: {e}", path.display()))
        })?;
        info!("Saved candidate report to {}", path.display());
        Ok(path)
    }

    // ── auth ───────────────────────────────────────────────────────────────

    pub(crate) async fn register_account(&self, body: Value) -> Result<(), ClientError> {
        let response = self
            .call(Method::Post, "auth/register", RequestBody::Json(body))
            .await?;
        envelope::checked_envelope(&response).map(|_| ())
    }

    pub(crate) async fn exchange_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(User, Credential), ClientError> {
        let body = RequestBody::Json(json!({ "email": email, "password": password }));
        let response = self.call(Method::Post, "auth/login", body).await?;
        let envelope = envelope::checked_envelope(&response).map_err(|e| match e {
            ClientError::Transport(TransportError::Unsuccessful(message)) => {
                ClientError::Auth(message)
            }
            other => other,
        })?;
        let payload: SignInPayload = serde_json::from_value(envelope)?;
        Ok((payload.user, Credential::new(payload.access_token)))
    }
}

pub fn report_file_name(job_id: &JobId) -> String {
    format!("candidates-report-{job_id}.csv")
}
