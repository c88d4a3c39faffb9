/// Declares a string-backed identifier that serializes as a bare JSON string.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

pub mod analytics;
pub mod application;
pub mod job;
pub mod resume;
pub mod user;

pub use analytics::{AnalyticsSummary, StatusCounts};
pub use application::{Application, ApplicationId, ApplicationStatus, MatchScore};
pub use job::{Job, JobDraft, JobId, JobStatus};
pub use resume::{Resume, ResumeId, ResumeUpdate};
pub use user::{Role, User, UserId};

