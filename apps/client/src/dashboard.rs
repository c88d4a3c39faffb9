//! Dashboard Composition: role-based HR and applicant views.
//!
//! The role picks one variant of the closed [`Dashboard`] enum; each variant
//! loads its own resources and has its own renderer.
//!
//! A load cycle issues its independent reads together and waits for all of
//! them before anything becomes visible. Each resource is kept as `Ready` or
//! `Failed`, so a failed fetch is never shown as an empty list. Mutations wait
//! for the service to confirm and then reload; nothing is patched locally. A
//! plain reload that fails keeps what was on screen, but a reload that fails
//! after a mutation marks the resource failed, since the old data is known
//! to be out of date.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::analytics::{self, ApplicantStats};
use crate::errors::{ClientError, TransportError};
use crate::gateway::ResourceGateway;
use crate::lifecycle;
use crate::models::{
    AnalyticsSummary, Application, ApplicationId, ApplicationStatus, Job, JobDraft, JobId, Resume,
    ResumeId, Role, User,
};
use crate::ranking::CandidateRanking;

/// Number of required skills listed on a job card before "+N more".
const SKILLS_SHOWN: usize = 8;

// ────────────────────────────────────────────────────────────────────────────
// Resource state
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of fetching one resource during a load cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    Ready(T),
    Failed(String),
}

impl<T> Resource<T> {
    pub fn from_result(result: Result<T, ClientError>) -> Self {
        match result {
            Ok(value) => Resource::Ready(value),
            Err(e) => Resource::Failed(e.user_message()),
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Resource::Ready(value) => Some(value),
            Resource::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Resource::Failed(_))
    }

    /// Applies a reload. Success replaces the value; a failure keeps data
    /// that was already loaded and hands the error back.
    fn refresh(&mut self, result: Result<T, ClientError>) -> Option<ClientError> {
        match result {
            Ok(value) => {
                *self = Resource::Ready(value);
                None
            }
            Err(e) => {
                if self.is_failed() {
                    *self = Resource::Failed(e.user_message());
                }
                Some(e)
            }
        }
    }

    /// Applies a reload that follows a confirmed mutation. A failure replaces
    /// the old value, which no longer matches the service.
    fn resync(&mut self, result: Result<T, ClientError>) -> Option<ClientError> {
        match result {
            Ok(value) => {
                *self = Resource::Ready(value);
                None
            }
            Err(e) => {
                *self = Resource::Failed(e.user_message());
                Some(e)
            }
        }
    }
}

fn not_loaded(what: &str) -> ClientError {
    ClientError::Validation(format!("{what} have not loaded; refresh and try again"))
}

// ────────────────────────────────────────────────────────────────────────────
// Load cycles
// ────────────────────────────────────────────────────────────────────────────

/// Identifies one load cycle of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum ViewPhase<T> {
    Loading,
    Ready(T),
    Unmounted,
}

/// Gates rendering on complete load cycles.
///
/// Results are committed with the ticket of the cycle that produced them.
/// Results from a superseded cycle, or arriving after the view was left, are
/// dropped.
#[derive(Debug)]
pub struct ViewState<T> {
    generation: u64,
    phase: ViewPhase<T>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            phase: ViewPhase::Loading,
        }
    }
}

impl<T> ViewState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new cycle; the view shows as loading until it commits.
    pub fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        self.phase = ViewPhase::Loading;
        LoadTicket(self.generation)
    }

    /// Returns `false` when the result was discarded.
    pub fn commit(&mut self, ticket: LoadTicket, value: T) -> bool {
        if matches!(self.phase, ViewPhase::Unmounted) || ticket.0 != self.generation {
            debug!(
                "Discarding stale load result (cycle {}, current {})",
                ticket.0, self.generation
            );
            return false;
        }
        self.phase = ViewPhase::Ready(value);
        true
    }

    /// Leaves the view; pending cycles can no longer commit.
    pub fn unmount(&mut self) {
        self.generation += 1;
        self.phase = ViewPhase::Unmounted;
    }

    pub fn phase(&self) -> &ViewPhase<T> {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, ViewPhase::Loading)
    }

    pub fn current(&self) -> Option<&T> {
        match &self.phase {
            ViewPhase::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn current_mut(&mut self) -> Option<&mut T> {
        match &mut self.phase {
            ViewPhase::Ready(value) => Some(value),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Role dispatch
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Dashboard {
    Hr(HrDashboard),
    Applicant(ApplicantDashboard),
}

impl Dashboard {
    pub async fn load(user: &User, gateway: &ResourceGateway) -> Self {
        match user.role() {
            Role::Hr => Dashboard::Hr(HrDashboard::load(user.clone(), gateway).await),
            Role::Applicant => {
                Dashboard::Applicant(ApplicantDashboard::load(user.clone(), gateway).await)
            }
        }
    }

    /// Runs one full load cycle against `view`.
    ///
    /// The view is only locked to take the ticket and to commit, so other
    /// tasks can start a newer cycle or unmount while the fetches run.
    pub async fn load_into(
        view: &Mutex<ViewState<Dashboard>>,
        user: &User,
        gateway: &ResourceGateway,
    ) -> bool {
        let ticket = view.lock().await.begin();
        let dashboard = Dashboard::load(user, gateway).await;
        view.lock().await.commit(ticket, dashboard)
    }

    pub fn user(&self) -> &User {
        match self {
            Dashboard::Hr(d) => &d.user,
            Dashboard::Applicant(d) => &d.user,
        }
    }

    pub fn render(&self) -> String {
        match self {
            Dashboard::Hr(d) => d.render(),
            Dashboard::Applicant(d) => d.render(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HR
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct HrDashboard {
    pub user: User,
    pub jobs: Resource<Vec<Job>>,
    /// Service-side aggregate, refreshed after every mutation.
    pub analytics: Resource<AnalyticsSummary>,
    /// Last user-visible problem from a reload or mutation.
    pub notice: Option<String>,
}

impl HrDashboard {
    pub async fn load(user: User, gateway: &ResourceGateway) -> Self {
        let (jobs, analytics) =
            tokio::join!(gateway.list_my_jobs(), gateway.dashboard_analytics());
        Self {
            user,
            jobs: Resource::from_result(jobs),
            analytics: Resource::from_result(analytics),
            notice: None,
        }
    }

    pub async fn reload(&mut self, gateway: &ResourceGateway) {
        let (jobs, analytics) =
            tokio::join!(gateway.list_my_jobs(), gateway.dashboard_analytics());
        let jobs_error = self.jobs.refresh(jobs);
        let analytics_error = self.analytics.refresh(analytics);
        self.notice = jobs_error.or(analytics_error).map(|e| e.user_message());
    }

    async fn resync(&mut self, gateway: &ResourceGateway) {
        let (jobs, analytics) =
            tokio::join!(gateway.list_my_jobs(), gateway.dashboard_analytics());
        let jobs_error = self.jobs.resync(jobs);
        let analytics_error = self.analytics.resync(analytics);
        self.notice = jobs_error.or(analytics_error).map(|e| e.user_message());
    }

    /// Resolves one of this user's jobs.
    pub fn job(&self, job_id: &JobId) -> Result<&Job, ClientError> {
        self.jobs
            .ready()
            .ok_or_else(|| not_loaded("Jobs"))?
            .iter()
            .find(|job| &job.id == job_id)
            .ok_or_else(|| ClientError::NotFound(format!("job {job_id}")))
    }

    /// Creates a job, or edits `job_id` when given.
    pub async fn save_job(
        &mut self,
        gateway: &ResourceGateway,
        job_id: Option<&JobId>,
        draft: &JobDraft,
    ) -> Result<Job, ClientError> {
        let saved = match job_id {
            Some(id) => {
                self.job(id)?;
                gateway.update_job(id, draft).await?
            }
            None => gateway.create_job(draft).await?,
        };
        self.resync(gateway).await;
        Ok(saved)
    }

    pub async fn delete_job(
        &mut self,
        gateway: &ResourceGateway,
        job_id: &JobId,
    ) -> Result<(), ClientError> {
        self.job(job_id)?;
        gateway.delete_job(job_id).await?;
        self.resync(gateway).await;
        Ok(())
    }

    /// Loads and ranks the candidates of one of this user's jobs.
    pub async fn candidates(
        &self,
        gateway: &ResourceGateway,
        job_id: &JobId,
    ) -> Result<CandidateRanking, ClientError> {
        let job = self.job(job_id)?;
        let loaded = gateway.list_job_applications(job_id).await?;
        Ok(CandidateRanking::build(
            job,
            &loaded.applications,
            &loaded.resumes,
        ))
    }

    /// Validates a status change through the lifecycle engine, sends it, and
    /// refreshes jobs and analytics once the service confirms.
    pub async fn apply_transition(
        &mut self,
        gateway: &ResourceGateway,
        ranking: &CandidateRanking,
        application_id: &ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Application, ClientError> {
        let transition = ranking.request_status(application_id, status, &self.user)?;
        let updated = gateway.update_application_status(&transition).await?;
        self.resync(gateway).await;
        Ok(updated)
    }

    pub async fn export_report(
        &self,
        gateway: &ResourceGateway,
        job_id: &JobId,
        dir: &Path,
    ) -> Result<PathBuf, ClientError> {
        self.job(job_id)?;
        gateway.export_report(job_id, dir).await
    }

    /// Recomputes the summary locally from every job's applications.
    ///
    /// All per-job fetches must succeed; one failure fails the whole summary.
    pub async fn local_summary(
        &self,
        gateway: &ResourceGateway,
    ) -> Result<AnalyticsSummary, ClientError> {
        let jobs = self.jobs.ready().ok_or_else(|| not_loaded("Jobs"))?;

        let mut fetches = JoinSet::new();
        for job in jobs {
            let gateway = gateway.clone();
            let job_id = job.id.clone();
            fetches.spawn(async move { gateway.list_job_applications(&job_id).await });
        }

        let mut applications = Vec::new();
        while let Some(joined) = fetches.join_next().await {
            let loaded = joined.map_err(|e| {
                TransportError::Unsuccessful(format!("application fetch task failed: {e}"))
            })??;
            applications.extend(loaded.applications);
        }

        Ok(analytics::summarize(jobs, &applications))
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "HR Dashboard - {} <{}>", self.user.display_name(), self.user.email);
        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "! {notice}");
        }
        let _ = writeln!(out);

        match &self.analytics {
            Resource::Ready(summary) => {
                let _ = writeln!(
                    out,
                    "  Total Jobs       {} ({} active)",
                    summary.total_jobs, summary.active_jobs
                );
                let _ = writeln!(out, "  Applications     {}", summary.total_applications);
                let _ = writeln!(out, "  Avg Match Score  {:.0}%", summary.avg_match_score);
                let _ = writeln!(
                    out,
                    "  Shortlisted      {}",
                    summary.status_counts.get(ApplicationStatus::Shortlisted)
                );
                let breakdown: Vec<String> = summary
                    .status_counts
                    .iter()
                    .map(|(status, count)| format!("{} {count}", status.label()))
                    .collect();
                let _ = writeln!(out, "  Pipeline         {}", breakdown.join(" | "));
            }
            Resource::Failed(message) => {
                let _ = writeln!(out, "  Analytics unavailable: {message}");
            }
        }

        let _ = writeln!(out, "\nJob Postings");
        match &self.jobs {
            Resource::Ready(jobs) if jobs.is_empty() => {
                let _ = writeln!(out, "  No job postings yet.");
            }
            Resource::Ready(jobs) => {
                for job in jobs {
                    render_job_card(&mut out, job);
                }
            }
            Resource::Failed(message) => {
                let _ = writeln!(out, "  Jobs unavailable: {message}");
            }
        }
        out
    }
}

fn render_job_card(out: &mut String, job: &Job) {
    let _ = writeln!(
        out,
        "  [{}] {} ({})",
        job.status.as_str(),
        job.title,
        job.id
    );
    let _ = writeln!(
        out,
        "      {} | {} | {} | {} applicants",
        job.job_type,
        job.location,
        job.experience_level,
        job.applicant_count.unwrap_or(0)
    );
    if !job.required_skills.is_empty() {
        let shown: Vec<&str> = job
            .required_skills
            .iter()
            .take(SKILLS_SHOWN)
            .map(String::as_str)
            .collect();
        let mut line = shown.join(", ");
        if job.required_skills.len() > SKILLS_SHOWN {
            let _ = write!(line, " +{} more", job.required_skills.len() - SKILLS_SHOWN);
        }
        let _ = writeln!(out, "      Skills: {line}");
    }
    let _ = writeln!(out, "      Posted {}", job.created_at.format("%Y-%m-%d"));
}

/// Text table for the candidate review screen, optionally cut to the best
/// `limit` candidates.
pub fn render_ranking(ranking: &CandidateRanking, limit: Option<usize>) -> String {
    let mut out = String::new();
    let job = ranking.job();
    let _ = writeln!(out, "Candidates for {} ({})", job.title, job.id);
    if ranking.is_empty() {
        let _ = writeln!(out, "  No applications yet.");
        return out;
    }
    let shown = match limit {
        Some(n) => ranking.top(n),
        None => ranking.candidates(),
    };
    for candidate in shown {
        let app = &candidate.application;
        let who = app
            .applicant_name
            .as_deref()
            .or(app.applicant_email.as_deref())
            .unwrap_or(app.applicant_id.as_str());
        let _ = writeln!(
            out,
            "  #{:<3} {:>4}  {:<13} {}  (application {})",
            candidate.rank,
            app.match_score().to_string(),
            app.status().label(),
            who,
            app.id
        );
        if let Some(resume) = &candidate.resume {
            let _ = writeln!(
                out,
                "        {} | matched: {} | missing: {}",
                resume.file_name,
                list_or_dash(&resume.matched_skills),
                list_or_dash(&resume.missing_skills)
            );
        }
    }
    out
}

fn list_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Applicant
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ApplicantDashboard {
    pub user: User,
    pub resumes: Resource<Vec<Resume>>,
    pub applications: Resource<Vec<Application>>,
    pub notice: Option<String>,
}

impl ApplicantDashboard {
    pub async fn load(user: User, gateway: &ResourceGateway) -> Self {
        let (resumes, applications) =
            tokio::join!(gateway.list_my_resumes(), gateway.list_my_applications());
        Self {
            user,
            resumes: Resource::from_result(resumes),
            applications: Resource::from_result(applications),
            notice: None,
        }
    }

    pub async fn reload(&mut self, gateway: &ResourceGateway) {
        let (resumes, applications) =
            tokio::join!(gateway.list_my_resumes(), gateway.list_my_applications());
        let resumes_error = self.resumes.refresh(resumes);
        let applications_error = self.applications.refresh(applications);
        self.notice = resumes_error
            .or(applications_error)
            .map(|e| e.user_message());
    }

    async fn resync(&mut self, gateway: &ResourceGateway) {
        let (resumes, applications) =
            tokio::join!(gateway.list_my_resumes(), gateway.list_my_applications());
        let resumes_error = self.resumes.resync(resumes);
        let applications_error = self.applications.resync(applications);
        self.notice = resumes_error
            .or(applications_error)
            .map(|e| e.user_message());
    }

    /// Overview numbers; `None` until both resources loaded.
    pub fn stats(&self) -> Option<ApplicantStats> {
        let resumes = self.resumes.ready()?;
        let applications = self.applications.ready()?;
        Some(ApplicantStats::from_applications(applications, resumes.len()))
    }

    pub fn has_resume(&self) -> bool {
        self.resumes.ready().is_some_and(|r| !r.is_empty())
    }

    /// Applies to `job` with one of this user's resumes.
    pub async fn apply(
        &mut self,
        gateway: &ResourceGateway,
        job: &Job,
        resume_id: &ResumeId,
    ) -> Result<Application, ClientError> {
        let existing = self
            .applications
            .ready()
            .ok_or_else(|| not_loaded("Applications"))?;
        lifecycle::ensure_can_apply(existing, job, &self.user)?;

        let resumes = self.resumes.ready().ok_or_else(|| not_loaded("Resumes"))?;
        if !resumes.iter().any(|resume| &resume.id == resume_id) {
            return Err(ClientError::NotFound(format!("resume {resume_id}")));
        }

        let created = gateway.create_application(&job.id, resume_id).await?;

        let refreshed = gateway.list_my_applications().await;
        if let Some(e) = self.applications.resync(refreshed) {
            warn!("Applications refresh failed after applying: {e}");
            self.notice = Some(e.user_message());
        }
        Ok(created)
    }

    pub async fn upload_resume(
        &mut self,
        gateway: &ResourceGateway,
        path: &Path,
    ) -> Result<Resume, ClientError> {
        let content_type = resume_content_type(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ClientError::Validation("Resume path has no file name".to_string()))?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| unreadable_file(path, e))?;
        if bytes.is_empty() {
            return Err(ClientError::Validation(format!("{file_name} is empty")));
        }

        let resume = gateway
            .upload_resume(&file_name, content_type, Bytes::from(bytes))
            .await?;
        info!("Resume {} uploaded; reloading dashboard", resume.id);
        self.resync(gateway).await;
        Ok(resume)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Applicant Dashboard - {} <{}>", self.user.display_name(), self.user.email);
        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "! {notice}");
        }
        let _ = writeln!(out);

        match self.stats() {
            Some(stats) => {
                let _ = writeln!(out, "  Total Applications  {}", stats.total);
                let _ = writeln!(out, "  In Progress         {}", stats.in_progress);
                let _ = writeln!(out, "  Shortlisted         {}", stats.shortlisted);
                let _ = writeln!(out, "  Resumes             {}", stats.resumes);
            }
            None => {
                let _ = writeln!(out, "  Overview unavailable until all data loads.");
            }
        }

        let _ = writeln!(out, "\nMy Applications");
        match &self.applications {
            Resource::Ready(apps) if apps.is_empty() => {
                let _ = writeln!(out, "  You have not applied to any jobs yet.");
            }
            Resource::Ready(apps) => {
                for app in apps {
                    let title = app.job_title.as_deref().unwrap_or(app.job_id.as_str());
                    let _ = writeln!(
                        out,
                        "  {:<30} {:<13} {:>4} match  applied {}",
                        title,
                        app.status().label(),
                        app.match_score().to_string(),
                        app.created_at.format("%Y-%m-%d")
                    );
                }
            }
            Resource::Failed(message) => {
                let _ = writeln!(out, "  Applications unavailable: {message}");
            }
        }

        let _ = writeln!(out, "\nResumes");
        match &self.resumes {
            Resource::Ready(resumes) if resumes.is_empty() => {
                let _ = writeln!(out, "  Upload a resume to get job recommendations.");
            }
            Resource::Ready(resumes) => {
                for resume in resumes {
                    let _ = writeln!(
                        out,
                        "  {}{} ({}) skills: {}",
                        resume.file_name,
                        if resume.is_active { " [active]" } else { "" },
                        resume.id,
                        list_or_dash(&resume.skills)
                    );
                }
            }
            Resource::Failed(message) => {
                let _ = writeln!(out, "  Resumes unavailable: {message}");
            }
        }
        out
    }
}

fn unreadable_file(path: &Path, e: io::Error) -> ClientError {
    match e.kind() {
        io::ErrorKind::NotFound => ClientError::NotFound(format!("file {}", path.display())),
        _ => ClientError::Validation(format!("Could not read {}: {e}", path.display())),
    }
}

fn resume_content_type(path: &Path) -> Result<&'static str, ClientError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => Ok("application/pdf"),
        Some("doc") => Ok("application/msword"),
        Some("docx") => {
            Ok("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        Some("txt") => Ok("text/plain"),
        _ => Err(ClientError::Validation(
            "Only PDF, DOC, DOCX or TXT resumes are supported".to_string(),
        )),
    }
}
