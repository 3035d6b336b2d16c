use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use titlecheck_api::ApiClient;
use titlecheck_core::{
    ExportOutcome, NoticeLevel, Session, SessionEvent, SpreadsheetFile, UploadOutcome,
};

mod config_file;
mod interactive;
mod output;

use output::{ColorMode, EventPrinter};

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Title Check - browse, search, upload and export manuscript review records
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// API base URL (overrides TITLECHECK_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session token
    Signin {
        email: String,
        /// Password (falls back to TITLECHECK_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and discard the session token
    Signout,

    /// Browse records page by page
    Browse {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Search records by title or conference name
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Upload a spreadsheet and show the server-derived response
    Upload {
        /// Path to the .xlsx/.xls file to upload
        file_path: PathBuf,
    },

    /// Export every page of the active source to a spreadsheet
    Export {
        /// Search query to export; omitted exports the full response data
        #[arg(long)]
        query: Option<String>,

        /// Upload this spreadsheet first and export the uploaded view
        #[arg(long)]
        upload: Option<PathBuf>,

        /// Directory the export file is written into
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Interactive session: type queries, flip pages, upload and export
    Interactive,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let color = ColorMode(!cli.no_color);

    // Resolve configuration: CLI flags > env vars > config file > default
    let base_url = cli
        .api_url
        .or_else(|| std::env::var("TITLECHECK_API_URL").ok())
        .or_else(|| config_file::load_config().api.and_then(|a| a.base_url))
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    match cli.command {
        Command::Signin { email, password } => signin(&base_url, &email, password).await,
        Command::Signout => signout(&base_url).await,
        Command::Browse { page } => show_page(&base_url, None, page, color).await,
        Command::Search { query, page } => show_page(&base_url, Some(query), page, color).await,
        Command::Upload { file_path } => upload(&base_url, &file_path, color).await,
        Command::Export {
            query,
            upload,
            out_dir,
        } => export(&base_url, query, upload, &out_dir, color).await,
        Command::Interactive => {
            let (session, events) = build_session(&base_url);
            interactive::run(session, events, color).await
        }
    }
}

fn build_session(base_url: &str) -> (Arc<Session>, mpsc::UnboundedReceiver<SessionEvent>) {
    let client = Arc::new(ApiClient::with_token(base_url, config_file::load_token()));
    let (tx, rx) = mpsc::unbounded_channel();
    (Session::new(client, tx), rx)
}

/// Map a picked file's extension to its declared spreadsheet MIME type,
/// the way a browser would populate `file.type`.
fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        _ => "application/octet-stream",
    }
}

pub(crate) fn read_spreadsheet(path: &Path) -> anyhow::Result<SpreadsheetFile> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(SpreadsheetFile {
        name,
        mime: mime_for_path(path).to_string(),
        bytes,
    })
}

async fn signin(base_url: &str, email: &str, password: Option<String>) -> anyhow::Result<()> {
    let password = password
        .or_else(|| std::env::var("TITLECHECK_PASSWORD").ok())
        .ok_or_else(|| anyhow::anyhow!("pass --password or set TITLECHECK_PASSWORD"))?;

    let client = ApiClient::new(base_url);
    let token = client.signin(email, &password).await?;
    config_file::save_token(&token)?;
    println!("Signed in as {}", email);
    Ok(())
}

async fn signout(base_url: &str) -> anyhow::Result<()> {
    let client = ApiClient::with_token(base_url, config_file::load_token());
    let result = client.signout().await;
    config_file::delete_token();
    // The local token is gone either way; only report the server side.
    match result {
        Ok(()) => println!("Signed out."),
        Err(err) => println!("Signed out locally (server signout failed: {})", err),
    }
    Ok(())
}

/// One-shot browse/search: load page 1 to learn the page count, then let
/// the debounced scheduler settle on the requested page.
async fn show_page(
    base_url: &str,
    query: Option<String>,
    page: u32,
    color: ColorMode,
) -> anyhow::Result<()> {
    let (session, mut events) = build_session(base_url);
    let mut printer = EventPrinter::new(color);

    if let Some(query) = &query {
        session.set_query(query);
    }
    session.refresh().await;
    drain_events(&mut events, &mut printer);

    if printer.session_expired() {
        config_file::delete_token();
        anyhow::bail!("session expired");
    }

    if page > 1 {
        session.set_page(page);
        wait_for_table(&mut events, &mut printer).await;
    }

    output::print_table(&session.visible_table(), &session.view(), color);

    if printer.session_expired() {
        config_file::delete_token();
    }
    Ok(())
}

async fn upload(base_url: &str, file_path: &Path, color: ColorMode) -> anyhow::Result<()> {
    let (session, mut events) = build_session(base_url);
    let mut printer = EventPrinter::new(color);

    let file = read_spreadsheet(file_path)?;
    let outcome = session.upload(file).await;
    drain_events(&mut events, &mut printer);
    if printer.session_expired() {
        config_file::delete_token();
    }

    match outcome? {
        UploadOutcome::Uploaded { .. } => {
            output::print_table(&session.visible_table(), &session.view(), color);
            Ok(())
        }
        UploadOutcome::Rejected(violations) => {
            anyhow::bail!("{} row(s) failed validation", violations.len())
        }
        UploadOutcome::Cancelled => Ok(()),
    }
}

async fn export(
    base_url: &str,
    query: Option<String>,
    upload: Option<PathBuf>,
    out_dir: &Path,
    color: ColorMode,
) -> anyhow::Result<()> {
    let (session, mut events) = build_session(base_url);
    let mut printer = EventPrinter::new(color);

    if let Some(path) = &upload {
        let file = read_spreadsheet(path)?;
        match session.upload(file).await? {
            UploadOutcome::Uploaded { .. } => {}
            UploadOutcome::Rejected(violations) => {
                drain_events(&mut events, &mut printer);
                anyhow::bail!("{} row(s) failed validation", violations.len());
            }
            UploadOutcome::Cancelled => return Ok(()),
        }
        drain_events(&mut events, &mut printer);
    }
    if let Some(query) = &query {
        session.set_query(query);
    }

    let mut task = {
        let session = session.clone();
        let out_dir = out_dir.to_path_buf();
        tokio::spawn(async move { session.export(&out_dir).await })
    };

    let outcome = loop {
        tokio::select! {
            result = &mut task => break result?,
            event = events.recv() => {
                if let Some(event) = event {
                    printer.handle(&event);
                }
            }
        }
    };
    drain_events(&mut events, &mut printer);
    if printer.session_expired() {
        config_file::delete_token();
    }

    match outcome? {
        ExportOutcome::Written { path, rows } => {
            println!("Exported {} row(s) to {}", rows, path.display());
            Ok(())
        }
        ExportOutcome::Cancelled => Ok(()),
        ExportOutcome::Empty => anyhow::bail!("no data to export"),
    }
}

fn drain_events(events: &mut mpsc::UnboundedReceiver<SessionEvent>, printer: &mut EventPrinter) {
    while let Ok(event) = events.try_recv() {
        printer.handle(&event);
    }
}

/// Wait until the next committed table update, surfacing notices along
/// the way. Stops early on an error notice or forced logout.
async fn wait_for_table(
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
    printer: &mut EventPrinter,
) {
    while let Some(event) = events.recv().await {
        let done = matches!(event, SessionEvent::TableReplaced { .. });
        let failed = matches!(
            event,
            SessionEvent::SessionExpired
                | SessionEvent::Notice {
                    level: NoticeLevel::Error,
                    ..
                }
        );
        printer.handle(&event);
        if done || failed {
            break;
        }
    }
}
