//! mediumscrape CLI
//!
//! Fetches stories as markdown, lists the items of a reading list and
//! removes items from a list, all through the persisted login session.
//!
//! Usage:
//!   $ mediumscrape fetch https://medium.com/@user/story-1a2b3c4d5e6f
//!   $ mediumscrape harvest --list "Rust"
//!   $ mediumscrape remove --list "Reading list" /p/1a2b3c4d5e6f

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mediumscrape::{
    BrowserSession, BrowsingContext, ScrapeConfig, SessionState, fetch_article, harvest,
    remove_all,
};
use mediumscrape::browser::find_browser_executable;
use mediumscrape::extractor::split_markdown;
use mediumscrape::utils::constants::DEFAULT_LIST_LABEL;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "mediumscrape", version, about = "Medium article and reading-list tooling")]
struct Cli {
    /// Run the browser headless (default unless HEADLESS=false).
    #[arg(long, global = true, conflicts_with = "gui")]
    headless: bool,

    /// Show the browser window.
    #[arg(long, global = true)]
    gui: bool,

    /// Session storage-state file.
    #[arg(long, global = true, env = "MEDIUM_SESSION_PATH")]
    session: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch one story and print it as markdown.
    Fetch(FetchArgs),
    /// Print the item URLs of a list.
    Harvest(ListArgs),
    /// Remove items from a list.
    Remove(RemoveArgs),
    /// Verify the session file and browser installation.
    Check,
}

#[derive(Args)]
struct FetchArgs {
    url: String,

    /// Print the structured nodes as JSON instead of markdown.
    #[arg(long)]
    json: bool,

    /// Split the markdown into chunks of at most this many characters.
    #[arg(long, conflicts_with = "json")]
    max_chars: Option<usize>,
}

#[derive(Args)]
struct ListArgs {
    /// Display name of the list.
    #[arg(long, default_value = DEFAULT_LIST_LABEL)]
    list: String,
}

#[derive(Args)]
struct RemoveArgs {
    #[arg(long)]
    list: String,

    /// Item URLs or paths.
    #[arg(required = true)]
    targets: Vec<String>,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let mut filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    for directive in ["chromiumoxide::handler=off", "chromiumoxide::conn=off"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn build_config(cli: &Cli) -> Result<ScrapeConfig> {
    let mut config = ScrapeConfig::from_env().context("Invalid environment configuration")?;
    if cli.headless {
        config = config.with_headless(true);
    } else if cli.gui {
        config = config.with_headless(false);
    }
    if let Some(path) = &cli.session {
        config = config.with_session_path(path.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    init_tracing(config.log_level());

    if matches!(cli.command, Command::Check) {
        return check(&config);
    }

    let session = SessionState::load(config.session_path())?;
    let browser = BrowserSession::launch(&config).await?;
    let result = run(&cli.command, &config, &browser, session).await;
    if let Err(e) = browser.close().await {
        warn!("Browser shutdown: {e:#}");
    }
    result
}

async fn run(
    command: &Command,
    config: &ScrapeConfig,
    browser: &BrowserSession,
    session: SessionState,
) -> Result<()> {
    let context = BrowsingContext::establish(browser.driver(), session).await?;

    match command {
        Command::Fetch(args) => {
            let article = fetch_article(&context, &args.url, config).await?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&article)?);
            } else {
                println!("# {}\n", article.title);
                if !article.author.is_empty() {
                    println!("*{}*\n", article.author);
                }
                match args.max_chars {
                    Some(max) => {
                        let chunks = split_markdown(&article.to_markdown(), max);
                        println!("{}", chunks.join("\n\n---\n\n"));
                    }
                    None => println!("{}", article.to_markdown()),
                }
                if article.is_preview_only {
                    warn!("Only a preview of this story was available");
                }
            }
        }
        Command::Harvest(args) => {
            let candidates = harvest(&context, &args.list, config).await?;
            for candidate in &candidates {
                println!("{}", candidate.href);
            }
            info!("{} items in '{}'", candidates.len(), args.list);
        }
        Command::Remove(args) => {
            let report = remove_all(&context, &args.list, &args.targets, config).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        // handled before launch
        Command::Check => {}
    }
    Ok(())
}

fn check(config: &ScrapeConfig) -> Result<()> {
    let session = SessionState::load(config.session_path())?;
    session.ensure_fresh()?;
    println!(
        "session: ok ({} cookies in {})",
        session.cookies().len(),
        config.session_path().display()
    );

    match config.chrome_executable() {
        Some(path) => println!("browser: {} (configured)", path.display()),
        None => match find_browser_executable() {
            Ok(path) => println!("browser: {}", path.display()),
            Err(e) => println!("browser: {e}; a managed Chromium will be downloaded on first run"),
        },
    }
    Ok(())
}
