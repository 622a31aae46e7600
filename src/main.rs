//! `SnapLabel` command-line client
//!
//! Log in, upload images for AI labeling, edit and submit labels, and search
//! labeled images from the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use snaplabel::{
    SnapLabelError,
    api::HttpGateway,
    auth::{AccountFlow, AuthOutcome, RegistrationForm},
    config::{AppConfig, ConfigManager},
    error::{ErrorKind, get_user_friendly_error},
    navigation::{NoticeLevel, View},
    search::ImageSearch,
    session::{FileSessionStore, SessionStore},
    utils,
    workflow::{ImageFile, LabelId, LabelOrigin, LabelSet, LabelWorkflow, WorkflowEvent},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};

/// SnapLabel - label images with AI and search them later
#[derive(Parser)]
#[command(name = "snaplabel")]
#[command(about = "Client for the SnapLabel image labeling service")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long, env = "SNAPLABEL_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Register {
        /// Given name
        #[arg(long)]
        first_name: String,

        /// Family name
        #[arg(long)]
        last_name: String,

        /// Account email
        #[arg(long)]
        email: String,

        /// Account password
        #[arg(long, env = "SNAPLABEL_PASSWORD", hide_env_values = true)]
        password: String,

        /// Password again; defaults to --password
        #[arg(long)]
        confirm_password: Option<String>,
    },

    /// Confirm an account with the emailed six-digit code
    Confirm {
        /// Account email
        #[arg(long)]
        email: String,

        /// Confirmation code
        #[arg(long)]
        code: String,
    },

    /// Forget the stored session token
    Logout,

    /// Upload an image, review its labels and submit them
    Upload {
        /// JPEG or PNG image to label
        file: PathBuf,

        /// Custom label to add (repeatable)
        #[arg(long = "add", value_name = "TEXT")]
        add: Vec<String>,

        /// Id of an AI label to drop (repeatable)
        #[arg(long = "remove-ai", value_name = "ID")]
        remove_ai: Vec<u64>,

        /// Edit labels interactively before submitting
        #[arg(short, long)]
        interactive: bool,

        /// Generate and edit labels without submitting
        #[arg(long)]
        dry_run: bool,
    },

    /// Search labeled images
    Search {
        /// Search query
        query: String,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Set the service base URL
    SetUrl {
        /// Base URL, e.g. https://api.example.com/prod
        url: String,
    },

    /// Set the request timeout in seconds
    SetTimeout {
        /// Timeout in seconds (1-300)
        secs: u64,
    },
}

/// Everything a command needs
struct App {
    config: AppConfig,
    gateway: Arc<HttpGateway>,
    session: Arc<FileSessionStore>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigManager::load().context("Failed to load configuration")?;
    let data_dir = ConfigManager::data_dir();
    let log_dir = config.preferences.file_logging.then_some(data_dir.as_path());
    utils::init_logging(log_dir, cli.verbose).context("Failed to initialize logging system")?;

    info!("Using service at {}", config.api.base_url);

    let gateway = Arc::new(HttpGateway::new(&config.api).map_err(friendly)?);
    let session = Arc::new(
        FileSessionStore::in_dir(&data_dir)
            .map_err(friendly)
            .context("Failed to open session file")?,
    );
    let ctx = App {
        config,
        gateway,
        session,
    };

    let result = run(cli.command, &ctx).await;
    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }
    result
}

async fn run(command: Commands, ctx: &App) -> Result<()> {
    match command {
        Commands::Login { email, password } => {
            let outcome = account_flow(ctx)
                .login(&email, &password)
                .await
                .map_err(friendly)?;
            report_outcome(&outcome);
        }
        Commands::Register {
            first_name,
            last_name,
            email,
            password,
            confirm_password,
        } => {
            let form = RegistrationForm {
                first_name,
                last_name,
                email,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                password,
            };
            let outcome = account_flow(ctx).register(&form).await.map_err(friendly)?;
            report_outcome(&outcome);
        }
        Commands::Confirm { email, code } => {
            let outcome = account_flow(ctx)
                .confirm(&email, &code)
                .await
                .map_err(friendly)?;
            report_outcome(&outcome);
        }
        Commands::Logout => {
            account_flow(ctx).logout().map_err(friendly)?;
            println!("Logged out.");
        }
        Commands::Upload {
            file,
            add,
            remove_ai,
            interactive,
            dry_run,
        } => {
            let options = UploadOptions {
                add,
                remove_ai,
                interactive,
                dry_run,
            };
            upload(ctx, &file, options).await?;
        }
        Commands::Search { query } => {
            let urls = ImageSearch::new(ctx.gateway.clone(), ctx.session.clone())
                .search(&query)
                .await
                .map_err(friendly)?;
            if urls.is_empty() {
                println!("No images found.");
            }
            for url in urls {
                println!("{url}");
            }
        }
        Commands::Config { action } => configure(ctx, action)?,
    }
    Ok(())
}

struct UploadOptions {
    add: Vec<String>,
    remove_ai: Vec<u64>,
    interactive: bool,
    dry_run: bool,
}

async fn upload(ctx: &App, path: &Path, options: UploadOptions) -> Result<()> {
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let workflow = LabelWorkflow::new(ctx.gateway.clone(), ctx.session.clone(), events_tx);

    let file = ImageFile::from_path(path)
        .await
        .map_err(friendly)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    println!("Generating labels for {}...", file.name());
    let generated = workflow.request_labels(file).await;
    handle_events(ctx, &mut events);
    generated.map_err(friendly)?;

    for id in options.remove_ai {
        if workflow.remove_label(LabelId(id), LabelOrigin::Ai).is_none() {
            println!("No AI label with id {id}");
        }
    }
    for text in &options.add {
        workflow.add_custom_label(text).map_err(friendly)?;
    }
    print_labels(ctx, &workflow.labels());

    if options.interactive {
        edit_interactively(ctx, &workflow, &mut events, options.dry_run).await?;
        return Ok(());
    }

    if options.dry_run {
        println!("Dry run: labels not submitted.");
        workflow.reset();
        return Ok(());
    }

    let submitted = workflow.submit().await;
    handle_events(ctx, &mut events);
    submitted.map_err(friendly)
}

const EDITOR_HELP: &str = "Commands:\n  \
    add <text>           add a custom label\n  \
    rm <ai|custom> <id>  remove a label\n  \
    list                 show labels\n  \
    submit               upload the labels\n  \
    quit                 leave without submitting";

async fn edit_interactively(
    ctx: &App,
    workflow: &LabelWorkflow,
    events: &mut mpsc::UnboundedReceiver<WorkflowEvent>,
    dry_run: bool,
) -> Result<()> {
    println!("{EDITOR_HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "" => {}
            "add" => match workflow.add_custom_label(rest) {
                Ok(Some(id)) => println!("Added custom label {id}"),
                Ok(None) => println!("Label text is empty"),
                Err(e) => println!("{}", get_user_friendly_error(&e)),
            },
            "rm" => {
                let parsed = rest.split_once(' ').and_then(|(origin, id)| {
                    Some((
                        origin.parse::<LabelOrigin>().ok()?,
                        id.trim().parse::<u64>().ok()?,
                    ))
                });
                match parsed {
                    Some((origin, id)) => match workflow.remove_label(LabelId(id), origin) {
                        Some(label) => println!("Removed {}", label.text),
                        None => println!("No {origin} label with id {id}"),
                    },
                    None => println!("Usage: rm <ai|custom> <id>"),
                }
            }
            "list" => print_labels(ctx, &workflow.labels()),
            "submit" if dry_run => println!("Dry run: labels not submitted."),
            "submit" => {
                let submitted = workflow.submit().await;
                handle_events(ctx, events);
                match submitted {
                    Ok(()) => return Ok(()),
                    Err(e) if e.kind() == ErrorKind::Auth => return Err(friendly(e)),
                    Err(_) => println!("Type 'submit' to try again."),
                }
            }
            "quit" | "exit" => break,
            _ => println!("{EDITOR_HELP}"),
        }
    }

    workflow.reset();
    println!("Labels not submitted.");
    Ok(())
}

/// Print notices, follow navigation and clear a rejected session
fn handle_events(ctx: &App, events: &mut mpsc::UnboundedReceiver<WorkflowEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            WorkflowEvent::Notice(notice) => match notice.level {
                NoticeLevel::Success => println!("{notice}"),
                NoticeLevel::Error => eprintln!("{notice}"),
            },
            WorkflowEvent::Navigate(View::Search) => {
                println!("Find your images with `snaplabel search <query>`.");
            }
            WorkflowEvent::Navigate(_) | WorkflowEvent::PhaseChanged(_) => {}
            WorkflowEvent::SessionRejected => {
                clear_session(ctx);
                eprintln!("Run `snaplabel login` to sign in again.");
            }
        }
    }
}

fn clear_session(ctx: &App) {
    if let Err(e) = ctx.session.clear_token() {
        error!("Failed to clear session: {}", e);
    }
}

fn print_labels(ctx: &App, labels: &LabelSet) {
    if labels.is_empty() {
        println!("No labels.");
        return;
    }
    println!("Labels:");
    for label in labels.iter() {
        if ctx.config.preferences.show_label_ids {
            println!("  [{} {}] {}", label.origin, label.id, label.text);
        } else {
            println!("  {}", label.text);
        }
    }
}

fn report_outcome(outcome: &AuthOutcome) {
    let notice = outcome.notice();
    match notice.level {
        NoticeLevel::Success => println!("{notice}"),
        NoticeLevel::Error => eprintln!("{notice}"),
    }
    match outcome.next_view() {
        View::EnterConfirmationCode { email } => {
            println!("Run `snaplabel confirm --email {email} --code <CODE>`.");
        }
        View::Login => println!("Run `snaplabel login --email <EMAIL>`."),
        View::Search | View::Register | View::Upload => {}
    }
}

fn configure(ctx: &App, action: ConfigAction) -> Result<()> {
    if let ConfigAction::Show = action {
        println!("Config file: {}", ConfigManager::get_config_path().display());
        println!(
            "{}",
            serde_json::to_string_pretty(&ctx.config).context("Failed to render configuration")?
        );
        let logged_in = if ctx.session.get_token().is_some() {
            "yes"
        } else {
            "no"
        };
        println!("Logged in: {logged_in}");
        return Ok(());
    }

    // Edit the stored settings so an env override is never persisted
    let mut config = ConfigManager::load_stored()
        .map_err(friendly)
        .context("Failed to load configuration")?;
    match action {
        ConfigAction::Show => {}
        ConfigAction::SetUrl { url } => config.api.base_url = url.trim().to_string(),
        ConfigAction::SetTimeout { secs } => config.api.timeout_secs = secs,
    }
    ConfigManager::save(&config)
        .map_err(friendly)
        .context("Failed to save configuration")?;
    println!("Configuration saved.");
    Ok(())
}

fn account_flow(ctx: &App) -> AccountFlow {
    AccountFlow::new(ctx.gateway.clone(), ctx.session.clone())
}

/// Attach the user-facing message to an error while keeping its chain
fn friendly(e: SnapLabelError) -> anyhow::Error {
    let message = get_user_friendly_error(&e);
    anyhow::Error::new(e).context(message)
}
