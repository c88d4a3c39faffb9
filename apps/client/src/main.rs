use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use recruit_client::auth::{self, RegistrationForm};
use recruit_client::config::Config;
use recruit_client::dashboard::{self, ApplicantDashboard, Dashboard, HrDashboard, ViewState};
use recruit_client::errors::ClientError;
use recruit_client::gateway::{HttpTransport, ResourceGateway, Transport};
use recruit_client::models::{
    ApplicationId, ApplicationStatus, JobDraft, JobId, JobStatus, ResumeId, Role,
};
use recruit_client::session::{Credential, FileStorage, Session, SessionStore};

#[derive(Parser, Debug)]
#[command(
    name = "recruit",
    about = "Post jobs, review ranked candidates, and track applications",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and sign in
    Register(RegisterArgs),
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show the dashboard for the signed-in role
    Dashboard,
    /// List open job postings
    Jobs,
    /// Rank the candidates of one of your jobs (HR)
    Candidates {
        job: String,
        /// Only show the best N candidates
        #[arg(long)]
        top: Option<usize>,
    },
    /// Move an application to a new status (HR)
    SetStatus {
        job: String,
        application: String,
        status: ApplicationStatus,
    },
    /// Recompute analytics from every job's applications (HR)
    Summary,
    /// Download the candidate report of a job as CSV (HR)
    Report {
        job: String,
        /// Target directory (defaults to RECRUIT_DOWNLOAD_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Create a job posting, or edit one with --job (HR)
    PostJob(PostJobArgs),
    /// Delete one of your job postings (HR)
    DeleteJob { job: String },
    /// Apply to an open job with one of your resumes
    Apply { job: String, resume: String },
    /// Upload a PDF, DOC, DOCX or TXT resume
    UploadResume { path: PathBuf },
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[arg(long)]
    confirm_password: String,
    /// `applicant` or `hr`
    #[arg(long, default_value = "applicant")]
    role: Role,
}

#[derive(Args, Debug)]
struct PostJobArgs {
    /// Existing job to edit
    #[arg(long)]
    job: Option<String>,
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: String,
    #[arg(long = "type", default_value = "full-time")]
    job_type: String,
    #[arg(long, default_value = "Remote")]
    location: String,
    #[arg(long, default_value = "mid")]
    experience_level: String,
    /// Comma-separated required skills
    #[arg(long, value_delimiter = ',')]
    skills: Vec<String>,
    /// Publish as closed
    #[arg(long)]
    closed: bool,
}

impl PostJobArgs {
    fn draft(&self) -> JobDraft {
        JobDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            job_type: self.job_type.clone(),
            location: self.location.clone(),
            experience_level: self.experience_level.clone(),
            required_skills: self
                .skills
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            status: if self.closed {
                JobStatus::Closed
            } else {
                JobStatus::Active
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("recruit_client={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!("recruit v{}", env!("CARGO_PKG_VERSION"));

    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(
        config.api_base_url.clone(),
        config.http_timeout(),
    )?);
    let mut sessions = SessionStore::init(FileStorage::new(&config.session_dir));

    if let Err(err) = run(cli.command, &config, transport, &mut sessions).await {
        eprintln!("error: {}", err.user_message());
        std::process::exit(1);
    }
    Ok(())
}

async fn run(
    command: Command,
    config: &Config,
    transport: Arc<dyn Transport>,
    sessions: &mut SessionStore<FileStorage>,
) -> Result<(), ClientError> {
    let anonymous = ResourceGateway::new(transport, Credential::new(config.anon_key.clone()));

    match command {
        Command::Register(args) => {
            let form = RegistrationForm {
                name: args.name,
                email: args.email,
                password: args.password,
                confirm_password: args.confirm_password,
                role: args.role,
            };
            let signed_in = auth::register(&anonymous, &form).await?;
            let session = sessions.login(signed_in.user, signed_in.credential)?;
            println!(
                "Welcome, {} ({})",
                session.user.display_name(),
                session.user.role().label()
            );
        }
        Command::Login { email, password } => {
            let signed_in = auth::sign_in(&anonymous, &email, &password).await?;
            let session = sessions.login(signed_in.user, signed_in.credential)?;
            println!(
                "Signed in as {} ({})",
                session.user.display_name(),
                session.user.role().label()
            );
        }
        Command::Logout => {
            sessions.logout()?;
            println!("Signed out.");
        }
        Command::Whoami => match sessions.current() {
            Some(session) => println!(
                "{} <{}> - {}",
                session.user.display_name(),
                session.user.email,
                session.user.role().label()
            ),
            None => println!("Not signed in."),
        },
        Command::Dashboard => {
            let session = signed_in(sessions)?;
            let gateway = anonymous.with_credential(session.credential.clone());
            let view = Mutex::new(ViewState::new());
            if Dashboard::load_into(&view, &session.user, &gateway).await {
                if let Some(dashboard) = view.lock().await.current() {
                    print!("{}", dashboard.render());
                }
            }
        }
        Command::Jobs => {
            let session = signed_in(sessions)?;
            let gateway = anonymous.with_credential(session.credential.clone());
            let jobs = gateway.list_open_jobs().await?;
            if jobs.is_empty() {
                println!("No open positions right now.");
            }
            for job in jobs {
                println!(
                    "{}  {} | {} | {} | {}",
                    job.id, job.title, job.job_type, job.location, job.experience_level
                );
            }
        }
        Command::Candidates { job, top } => {
            let (hr, gateway) = hr_dashboard(&anonymous, sessions).await?;
            let ranking = hr.candidates(&gateway, &JobId::new(job)).await?;
            print!("{}", dashboard::render_ranking(&ranking, top));
        }
        Command::SetStatus {
            job,
            application,
            status,
        } => {
            let (mut hr, gateway) = hr_dashboard(&anonymous, sessions).await?;
            let ranking = hr.candidates(&gateway, &JobId::new(job)).await?;
            let updated = hr
                .apply_transition(&gateway, &ranking, &ApplicationId::new(application), status)
                .await?;
            println!("Application {} is now {}", updated.id, updated.status().label());
        }
        Command::Summary => {
            let (hr, gateway) = hr_dashboard(&anonymous, sessions).await?;
            let summary = hr.local_summary(&gateway).await?;
            println!(
                "Jobs {} ({} active), applications {}, avg match {:.0}%",
                summary.total_jobs,
                summary.active_jobs,
                summary.total_applications,
                summary.avg_match_score
            );
            for (status, count) in summary.status_counts.iter() {
                println!("  {:<13} {count}", status.label());
            }
        }
        Command::Report { job, dir } => {
            let (hr, gateway) = hr_dashboard(&anonymous, sessions).await?;
            let dir = dir.unwrap_or_else(|| config.download_dir.clone());
            let path = hr.export_report(&gateway, &JobId::new(job), &dir).await?;
            println!("Report saved to {}", path.display());
        }
        Command::PostJob(args) => {
            let (mut hr, gateway) = hr_dashboard(&anonymous, sessions).await?;
            let job_id = args.job.as_deref().map(JobId::new);
            let saved = hr.save_job(&gateway, job_id.as_ref(), &args.draft()).await?;
            println!("Saved job {} ({})", saved.title, saved.id);
        }
        Command::DeleteJob { job } => {
            let (mut hr, gateway) = hr_dashboard(&anonymous, sessions).await?;
            hr.delete_job(&gateway, &JobId::new(job.clone())).await?;
            println!("Deleted job {job}");
        }
        Command::Apply { job, resume } => {
            let (mut applicant, gateway) = applicant_dashboard(&anonymous, sessions).await?;
            let job_id = JobId::new(job);
            let posting = gateway
                .list_open_jobs()
                .await?
                .into_iter()
                .find(|posting| posting.id == job_id)
                .ok_or_else(|| ClientError::NotFound(format!("open job {job_id}")))?;
            let created = applicant
                .apply(&gateway, &posting, &ResumeId::new(resume))
                .await?;
            println!(
                "Applied to {} with a {} match",
                posting.title,
                created.match_score()
            );
        }
        Command::UploadResume { path } => {
            let (mut applicant, gateway) = applicant_dashboard(&anonymous, sessions).await?;
            let resume = applicant.upload_resume(&gateway, &path).await?;
            println!(
                "Uploaded {} ({}); extracted skills: {}",
                resume.file_name,
                resume.id,
                resume.skills.join(", ")
            );
        }
    }
    Ok(())
}

fn signed_in(sessions: &SessionStore<FileStorage>) -> Result<Session, ClientError> {
    sessions
        .current()
        .cloned()
        .ok_or_else(|| ClientError::Auth("Not signed in; run `recruit login` first".to_string()))
}

async fn hr_dashboard(
    anonymous: &ResourceGateway,
    sessions: &SessionStore<FileStorage>,
) -> Result<(HrDashboard, ResourceGateway), ClientError> {
    let session = signed_in(sessions)?;
    if !session.user.is_hr() {
        return Err(ClientError::Auth(
            "This command is only available to HR accounts".to_string(),
        ));
    }
    let gateway = anonymous.with_credential(session.credential);
    let hr = HrDashboard::load(session.user, &gateway).await;
    Ok((hr, gateway))
}

async fn applicant_dashboard(
    anonymous: &ResourceGateway,
    sessions: &SessionStore<FileStorage>,
) -> Result<(ApplicantDashboard, ResourceGateway), ClientError> {
    let session = signed_in(sessions)?;
    if session.user.is_hr() {
        return Err(ClientError::Auth(
            "This command is only available to applicant accounts".to_string(),
        ));
    }
    let gateway = anonymous.with_credential(session.credential);
    let applicant = ApplicantDashboard::load(session.user, &gateway).await;
    Ok((applicant, gateway))
}
