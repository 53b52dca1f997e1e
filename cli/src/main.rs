use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use report_client::config::ConfigError;
use report_client::state::report::{DownloadedReport, greeting};
use report_client::state::session::SessionError;
use report_client::util::nav::guard;
use report_client::{
    ApiClient, ApiError, ClientConfig, FileTokenStore, GeneratedReport, Navigator, ReportDesk, ReportError, Route,
    SessionStore, TokenStore,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("{0}")]
    Report(#[from] ReportError),
    #[error("not logged in; run `report-cli login` first")]
    NotLoggedIn,
    #[error("failed to write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "report-cli", about = "Generate and download AI reports")]
struct Cli {
    /// Service base URL; overrides `REPORT_API_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Token file path; overrides `REPORT_TOKEN_FILE`.
    #[arg(long)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and log in.
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "REPORT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in and remember the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "REPORT_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Print the logged-in user as JSON.
    Whoami,
    /// Show what the landing page would: greeting or login hint.
    Status,
    /// Generate a report on a topic.
    Generate {
        topic: Vec<String>,
        /// Download the PDF once it is ready.
        #[arg(long, default_value_t = false)]
        download: bool,
        /// Directory or file path for the downloaded PDF.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Download a previously generated report.
    Download {
        filename: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Sends the user back to `login` when the server rejects the token.
struct CliNavigator;

impl Navigator for CliNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(%route, "navigate");
        match route {
            Route::Login => eprintln!("session expired or invalid; run `report-cli login` to sign in again"),
            Route::Signup => eprintln!("run `report-cli signup` to create an account"),
            Route::Home | Route::Dashboard => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // `.env` must be loaded before clap reads REPORT_PASSWORD.
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::resolve(cli.base_url.as_deref(), cli.token_file.as_deref())?;
    tracing::debug!(api_url = %config.api_url, token_file = %config.token_file.display(), "config loaded");

    let tokens: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(&config.token_file));
    let api = Arc::new(ApiClient::new(&config.api_url, tokens, Arc::new(CliNavigator))?);
    let session = SessionStore::new(api);

    match cli.command {
        Command::Signup { email, username, password } => run_signup(&session, &email, &username, &password).await,
        Command::Login { email, password } => run_login(&session, &email, &password).await,
        Command::Logout => {
            session.logout();
            println!("logged out");
            Ok(())
        }
        Command::Whoami => run_whoami(&session).await,
        Command::Status => run_status(&session).await,
        Command::Generate { topic, download, out } => {
            run_generate(&session, &topic.join(" "), download, out.as_deref()).await
        }
        Command::Download { filename, out } => run_download(&session, filename, out.as_deref()).await,
    }
}

async fn run_signup(session: &SessionStore, email: &str, username: &str, password: &str) -> Result<(), CliError> {
    let user = session.signup(email, username, password).await.map_err(explain)?;
    println!("{}", greeting(Some(&user)));
    Ok(())
}

async fn run_login(session: &SessionStore, email: &str, password: &str) -> Result<(), CliError> {
    let user = session.login(email, password).await.map_err(explain)?;
    println!("{}", greeting(Some(&user)));
    Ok(())
}

async fn run_whoami(session: &SessionStore) -> Result<(), CliError> {
    let user = session.restore().await.ok_or(CliError::NotLoggedIn)?;
    println!("{}", serde_json::to_string_pretty(&user)?);
    Ok(())
}

async fn run_status(session: &SessionStore) -> Result<(), CliError> {
    session.restore().await;
    let state = session.state();
    match guard(Route::Dashboard, &state) {
        Route::Dashboard => {
            println!("{}", greeting(state.user.as_ref()));
            println!("Generate comprehensive reports on any topic using AI: `report-cli generate <topic>`");
        }
        _ => println!("Not logged in. Run `report-cli login` or `report-cli signup` to get started."),
    }
    Ok(())
}

async fn run_generate(session: &SessionStore, topic: &str, download: bool, out: Option<&Path>) -> Result<(), CliError> {
    require_dashboard(session).await?;

    let mut desk = ReportDesk::new(session.api().clone());
    desk.set_topic(topic);
    let report = desk.generate().await?;
    if let Some(success) = &desk.state().success {
        println!("{success}");
    }
    println!("{}", report.message);
    println!("filename: {}", report.filename);

    if download {
        if let Some(downloaded) = desk.download().await? {
            save(&downloaded, out)?;
        }
    }
    Ok(())
}

async fn run_download(session: &SessionStore, filename: String, out: Option<&Path>) -> Result<(), CliError> {
    require_dashboard(session).await?;

    let mut desk = ReportDesk::new(session.api().clone());
    desk.adopt(GeneratedReport {
        download_url: format!("/download/{filename}"),
        filename,
        message: String::new(),
    });
    if let Some(downloaded) = desk.download().await? {
        save(&downloaded, out)?;
    }
    Ok(())
}

/// Apply the dashboard route guard after re-validating the stored token.
async fn require_dashboard(session: &SessionStore) -> Result<(), CliError> {
    session.restore().await;
    match guard(Route::Dashboard, &session.state()) {
        Route::Dashboard => Ok(()),
        _ => Err(CliError::NotLoggedIn),
    }
}

fn explain(err: SessionError) -> SessionError {
    if let Some(detail) = err.source.detail() {
        eprintln!("server said: {detail}");
    }
    err
}

fn save(downloaded: &DownloadedReport, out: Option<&Path>) -> Result<(), CliError> {
    let path = output_path(&downloaded.filename, out);
    std::fs::write(&path, &downloaded.bytes).map_err(|source| CliError::Write {
        path: path.display().to_string(),
        source,
    })?;
    println!("saved {} ({} bytes)", path.display(), downloaded.bytes.len());
    Ok(())
}

/// Where to write a downloaded report. Server filenames are reduced to their
/// final component.
fn output_path(filename: &str, out: Option<&Path>) -> PathBuf {
    let name = Path::new(filename)
        .file_name()
        .map_or_else(|| PathBuf::from("report.pdf"), PathBuf::from);
    match out {
        Some(dir) if dir.is_dir() => dir.join(name),
        Some(path) => path.to_path_buf(),
        None => name,
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
