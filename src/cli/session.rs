use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use crate::core::commands::{self, AppState};
use crate::core::models::{RegistrationRequest, SubmissionState};
use crate::core::render;

const HELP: &str = "\
Commands:
  login <username> <password>
  register <username> <email> <password> <confirm-password> <full name>
  logout
  resume <path>          select the resume document
  clear-resume
  jd-file <path>         select the job description document
  clear-jd-file
  jd-text <text>         paste the job description (replaces any file)
  submit                 run the match in the background
  reset                  clear everything and discard a running match
  status
  help
  quit";

#[derive(Debug, PartialEq, Eq)]
enum SessionCommand {
    Empty,
    Login {
        username: String,
        password: String,
    },
    Register {
        username: String,
        email: String,
        password: String,
        confirm_password: String,
        full_name: String,
    },
    Logout,
    Resume(PathBuf),
    ClearResume,
    JdFile(PathBuf),
    ClearJdFile,
    JdText(String),
    Submit,
    Reset,
    Status,
    Help,
    Quit,
    Usage(&'static str),
    Unknown(String),
}

fn parse_line(line: &str) -> SessionCommand {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let mut words = rest.split_whitespace().map(str::to_string);
    let mut next = || words.next().unwrap_or_default();

    match command {
        "" => SessionCommand::Empty,
        "login" => SessionCommand::Login {
            username: next(),
            password: next(),
        },
        "register" => {
            let username = next();
            let email = next();
            let password = next();
            let confirm_password = next();
            let full_name = rest
                .split_whitespace()
                .skip(4)
                .collect::<Vec<_>>()
                .join(" ");
            SessionCommand::Register {
                username,
                email,
                password,
                confirm_password,
                full_name,
            }
        }
        "logout" => SessionCommand::Logout,
        "resume" if rest.is_empty() => SessionCommand::Usage("resume <path>"),
        "resume" => SessionCommand::Resume(PathBuf::from(rest)),
        "clear-resume" => SessionCommand::ClearResume,
        "jd-file" if rest.is_empty() => SessionCommand::Usage("jd-file <path>"),
        "jd-file" => SessionCommand::JdFile(PathBuf::from(rest)),
        "clear-jd-file" => SessionCommand::ClearJdFile,
        "jd-text" => SessionCommand::JdText(rest.to_string()),
        "submit" => SessionCommand::Submit,
        "reset" => SessionCommand::Reset,
        "status" => SessionCommand::Status,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        other => SessionCommand::Unknown(other.to_string()),
    }
}

pub async fn run(state: AppState) -> anyhow::Result<()> {
    let state = Arc::new(state);
    let watcher = tokio::spawn(announce_phases(state.core.subscribe()));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{HELP}");
    println!("\n{}", render::IDLE_PLACEHOLDER);

    loop {
        prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_line(&line) {
            SessionCommand::Empty => {}
            SessionCommand::Quit => break,
            SessionCommand::Help => println!("{HELP}"),
            SessionCommand::Usage(usage) => println!("usage: {usage}"),
            SessionCommand::Unknown(command) => {
                println!("unknown command {command:?}; type `help`")
            }
            SessionCommand::Login { username, password } => {
                match commands::login(&state, username, password).await {
                    Ok(_) => println!("Signed in."),
                    Err(message) => println!("{message}"),
                }
            }
            SessionCommand::Register {
                username,
                email,
                password,
                confirm_password,
                full_name,
            } => {
                print!("Agree to the Terms and Conditions? [y/N] ");
                flush();
                let answer = lines.next_line().await?.unwrap_or_default();
                let request = RegistrationRequest {
                    username,
                    full_name,
                    email,
                    password,
                    confirm_password,
                    agree_to_terms: matches!(answer.trim(), "y" | "Y" | "yes"),
                };
                match commands::register(&state, request).await {
                    Ok(_) => println!("Account created. Signed in."),
                    Err(message) => println!("{message}"),
                }
            }
            SessionCommand::Logout => {
                commands::logout(&state)
                    .await
                    .map_err(anyhow::Error::msg)?;
                println!("Signed out.");
            }
            SessionCommand::Resume(path) => {
                match commands::select_resume(&state, &path).await {
                    Ok(name) => {
                        super::warn_on_extension(&name);
                        println!("Resume: {name}");
                    }
                    Err(message) => println!("{message}"),
                }
            }
            SessionCommand::ClearResume => {
                commands::clear_resume(&state)
                    .await
                    .map_err(anyhow::Error::msg)?;
            }
            SessionCommand::JdFile(path) => {
                match commands::select_job_description_file(&state, &path).await {
                    Ok(name) => {
                        super::warn_on_extension(&name);
                        println!("Job description: {name}");
                    }
                    Err(message) => println!("{message}"),
                }
            }
            SessionCommand::ClearJdFile => {
                commands::clear_job_description_file(&state)
                    .await
                    .map_err(anyhow::Error::msg)?;
            }
            SessionCommand::JdText(text) => {
                commands::enter_job_description_text(&state, text)
                    .await
                    .map_err(anyhow::Error::msg)?;
            }
            SessionCommand::Submit => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    if let Err(message) = commands::submit(&state).await {
                        println!("{message}");
                    }
                });
            }
            SessionCommand::Reset => {
                commands::reset(&state).await.map_err(anyhow::Error::msg)?;
            }
            SessionCommand::Status => print_status(&state).await?,
        }
    }

    watcher.abort();
    Ok(())
}

async fn announce_phases(mut updates: watch::Receiver<SubmissionState>) {
    while updates.changed().await.is_ok() {
        let current = updates.borrow_and_update().clone();
        println!("\n{}", render::render_state(&current));
        if current
            .failure()
            .map(|reason| reason.is_auth_rejection())
            .unwrap_or(false)
        {
            println!("The service rejected the session token. Use `login` and submit again.");
        }
    }
}

async fn print_status(state: &AppState) -> anyhow::Result<()> {
    let auth = commands::auth_status(state).map_err(anyhow::Error::msg)?;
    let input = state.core.input().await;
    let view = commands::get_submission_status(state)
        .await
        .map_err(anyhow::Error::msg)?;

    println!("signed in:       {}", auth.signed_in);
    println!(
        "resume:          {}",
        input
            .resume
            .as_ref()
            .map(|blob| blob.file_name.as_str())
            .unwrap_or("-")
    );
    let job_description = match (input.job_description_file(), input.job_description_text()) {
        (Some(file), _) => format!("file {}", file.file_name),
        (None, Some(text)) => format!("{} chars of text", text.chars().count()),
        (None, None) => "-".to_string(),
    };
    println!("job description: {job_description}");
    println!("phase:           {}", view.phase.as_str());
    if let Some(run_id) = view.run_id {
        println!("run:             {run_id}");
    }
    if let Some(message) = view.message {
        println!("message:         {message}");
    }
    Ok(())
}

fn prompt() {
    print!("jobfit> ");
    flush();
}

fn flush() {
    let _ = std::io::stdout().flush();
}
