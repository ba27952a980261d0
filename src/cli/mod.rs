mod session;

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::watch;
use tracing::debug;

use crate::core::commands::{self, AppState};
use crate::core::models::{RuntimeSettingsUpdate, SubmissionState};
use crate::core::render;
use crate::core::service::CoreService;
use crate::core::validator::{self, ACCEPTED_EXTENSIONS};

#[derive(Parser)]
#[command(
    name = "jobfit",
    version,
    about = "Match a resume against a job description using the Jobfit analysis service"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a resume and a job description, then print the match report
    Match {
        /// Resume document (.pdf, .doc, .docx, .txt)
        #[arg(short, long, value_name = "FILE")]
        resume: PathBuf,

        /// Job description as a document
        #[arg(long, value_name = "FILE", conflicts_with = "jd_text")]
        jd_file: Option<PathBuf>,

        /// Job description as pasted text
        #[arg(long, value_name = "TEXT")]
        jd_text: Option<String>,

        /// Bearer token issued by the service (falls back to JOBFIT_TOKEN)
        #[arg(long, conflicts_with = "username")]
        token: Option<String>,

        /// Log in before submitting
        #[arg(short, long, requires = "password")]
        username: Option<String>,

        #[arg(short, long, requires = "username")]
        password: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Interactive session: log in, pick documents, submit, reset
    Session,
    /// Show or change the client settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the effective settings and where they are stored
    Show,
    /// Change and persist settings
    Set {
        /// Base URL of the analysis service
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,

        /// Per-request timeout in seconds; 0 removes it (no client-side timeout)
        #[arg(long, value_name = "SECONDS")]
        timeout_seconds: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let state = AppState {
        core: CoreService::new()
            .await
            .context("failed to initialize client")?,
    };

    match cli.command {
        Commands::Match {
            resume,
            jd_file,
            jd_text,
            token,
            username,
            password,
            output,
        } => {
            run_match(
                &state,
                MatchArgs {
                    resume,
                    jd_file,
                    jd_text,
                    token,
                    credentials: username.zip(password),
                    output,
                },
            )
            .await
        }
        Commands::Session => session::run(state).await,
        Commands::Settings { action } => match action {
            SettingsAction::Show => show_settings(&state).await,
            SettingsAction::Set {
                api_url,
                timeout_seconds,
            } => {
                let saved = commands::save_settings(
                    &state,
                    RuntimeSettingsUpdate {
                        api_base_url: api_url,
                        request_timeout_seconds: timeout_seconds,
                    },
                )
                .await
                .map_err(anyhow::Error::msg)?;
                println!("{}", serde_json::to_string_pretty(&saved)?);
                Ok(())
            }
        },
    }
}

struct MatchArgs {
    resume: PathBuf,
    jd_file: Option<PathBuf>,
    jd_text: Option<String>,
    token: Option<String>,
    credentials: Option<(String, String)>,
    output: OutputFormat,
}

async fn run_match(state: &AppState, args: MatchArgs) -> anyhow::Result<()> {
    if let Some(token) = args.token {
        state.core.use_token(token);
    }
    if let Some((username, password)) = args.credentials {
        commands::login(state, username, password)
            .await
            .map_err(anyhow::Error::msg)?;
    }

    let resume_name = commands::select_resume(state, &args.resume)
        .await
        .map_err(anyhow::Error::msg)?;
    warn_on_extension(&resume_name);

    if let Some(path) = args.jd_file {
        let name = commands::select_job_description_file(state, &path)
            .await
            .map_err(anyhow::Error::msg)?;
        warn_on_extension(&name);
    } else if let Some(text) = args.jd_text {
        commands::enter_job_description_text(state, text)
            .await
            .map_err(anyhow::Error::msg)?;
    }

    let progress = tokio::spawn(print_progress(state.core.subscribe()));
    let view = commands::submit(state).await.map_err(anyhow::Error::msg);
    progress.abort();
    let view = view?;

    match (&view.state, args.output) {
        (SubmissionState::Succeeded(report), OutputFormat::Table) => {
            println!("{}", render::render_report(report));
        }
        (SubmissionState::Succeeded(report), OutputFormat::Json) => {
            println!("{}", render::report_json(report)?);
        }
        (SubmissionState::Failed(reason), _) => {
            debug!(code = reason.code(), "submission failed");
            if reason.is_auth_rejection() {
                eprintln!("{AUTH_HINT}");
            }
            bail!(reason.user_message());
        }
        (other, _) => println!("{}", render::render_state(other)),
    }

    Ok(())
}

const AUTH_HINT: &str =
    "The service rejected the session token. Log in again with --username/--password or pass --token.";

async fn print_progress(mut updates: watch::Receiver<SubmissionState>) {
    while updates.changed().await.is_ok() {
        let current = updates.borrow_and_update().clone();
        if current.is_in_flight() {
            eprintln!("{}", render::render_state(&current));
        }
        if current.is_terminal() {
            break;
        }
    }
}

pub(crate) fn warn_on_extension(file_name: &str) {
    if !validator::is_accepted_file_type(file_name) {
        eprintln!(
            "Warning: {file_name} is not one of .{}; submitting anyway.",
            ACCEPTED_EXTENSIONS.join(", .")
        );
    }
}

async fn show_settings(state: &AppState) -> anyhow::Result<()> {
    let settings = commands::get_settings(state)
        .await
        .map_err(anyhow::Error::msg)?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    println!("stored at {}", state.core.settings_path().display());
    Ok(())
}
