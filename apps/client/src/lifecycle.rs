//! Application Lifecycle Engine.
//!
//! ```text
//! applied -> under_review -> shortlisted -> hired
//!                         \-> rejected
//! ```
//!
//! `rejected` and `hired` are terminal. Only the HR user who owns the job may
//! move an application, one hop at a time. Validation is pure: the engine never
//! mutates an application. The validated [`Transition`] is sent to the service,
//! and the updated application comes back from there.

use std::collections::HashSet;

use tracing::debug;

use crate::errors::{ClientError, TransitionDenial};
use crate::models::{Application, ApplicationId, ApplicationStatus, Job, JobId, User};

/// A status change that passed validation and may be sent to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub application_id: ApplicationId,
    pub job_id: JobId,
    pub from: ApplicationStatus,
    pub to: ApplicationStatus,
}

/// Statuses reachable from `status` in one hop.
pub const fn allowed_next(status: ApplicationStatus) -> &'static [ApplicationStatus] {
    use ApplicationStatus::*;
    match status {
        Applied => &[UnderReview],
        UnderReview => &[Shortlisted, Rejected],
        Shortlisted => &[Hired],
        Rejected | Hired => &[],
    }
}

pub fn can_transition(from: ApplicationStatus, to: ApplicationStatus) -> bool {
    allowed_next(from).contains(&to)
}

/// Validates moving `application` to `requested` on behalf of `actor`.
pub fn transition(
    application: &Application,
    job: &Job,
    requested: ApplicationStatus,
    actor: &User,
) -> Result<Transition, ClientError> {
    let from = application.status();
    let deny = |reason: TransitionDenial| {
        debug!(
            "Refused transition of {} from {from} to {requested}: {reason}",
            application.id
        );
        ClientError::InvalidTransition {
            from,
            to: requested,
            reason,
        }
    };

    if !job.is_owned_by(actor) {
        return Err(deny(TransitionDenial::NotJobOwner));
    }
    if application.job_id != job.id {
        return Err(deny(TransitionDenial::JobMismatch));
    }
    if from.is_terminal() {
        return Err(deny(TransitionDenial::Terminal));
    }
    if !can_transition(from, requested) {
        return Err(deny(TransitionDenial::NotReachable));
    }

    Ok(Transition {
        application_id: application.id.clone(),
        job_id: job.id.clone(),
        from,
        to: requested,
    })
}

/// Applications in `status`, each id counted once.
pub fn list_by_status(
    applications: &[Application],
    status: ApplicationStatus,
) -> Vec<&Application> {
    let mut seen = HashSet::new();
    applications
        .iter()
        .filter(|app| app.status() == status)
        .filter(|app| seen.insert(&app.id))
        .collect()
}

/// Adds a newly created application to `collection`.
///
/// A second application for the same (job, applicant) pair is rejected, never
/// merged.
pub fn admit(
    collection: &mut Vec<Application>,
    application: Application,
) -> Result<(), ClientError> {
    let duplicate = collection.iter().any(|existing| {
        existing.id == application.id
            || (existing.job_id == application.job_id
                && existing.applicant_id == application.applicant_id)
    });
    if duplicate {
        return Err(ClientError::Validation(format!(
            "An application for job {} by {} already exists",
            application.job_id, application.applicant_id
        )));
    }
    collection.push(application);
    Ok(())
}

/// Pre-flight check before `applicant` applies to `job`.
pub fn ensure_can_apply(
    existing: &[Application],
    job: &Job,
    applicant: &User,
) -> Result<(), ClientError> {
    if applicant.is_hr() {
        return Err(ClientError::Validation(
            "HR accounts cannot apply to jobs".to_string(),
        ));
    }
    if !job.is_active() {
        return Err(ClientError::Validation(format!(
            "Job '{}' is no longer accepting applications",
            job.title
        )));
    }
    if existing
        .iter()
        .any(|app| app.job_id == job.id && app.applicant_id == applicant.id)
    {
        return Err(ClientError::Validation(format!(
            "You have already applied to '{}'",
            job.title
        )));
    }
    Ok(())
}
