use anyhow::{Context, Result};
use job_alert::config::Config;
use job_alert::engine::KeywordMatcher;
use job_alert::feed::naukri::{NaukriFeed, PageSelectors};
use job_alert::feed::snapshot::SnapshotFeed;
use job_alert::feed::ListingFeed;
use job_alert::notify::log_only::LogNotifier;
use job_alert::notify::telegram::{self, TelegramNotifier};
use job_alert::notify::Notifier;
use job_alert::pipeline::{Pipeline, RunOutcome};
use job_alert::store::SeenStore;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Exit status when the listing source came back empty.
const EXIT_SOURCE_FAILED: u8 = 2;

struct CliArgs {
    config_path: PathBuf,
    dry_run: bool,
    html_snapshot: Option<PathBuf>,
    find_chat_id: bool,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = CliArgs {
            config_path: PathBuf::from("config.toml"),
            dry_run: false,
            html_snapshot: None,
            find_chat_id: false,
        };
        let mut it = std::env::args().skip(1);
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--config" => {
                    args.config_path = it.next().context("--config needs a path")?.into();
                }
                "--html" => {
                    args.html_snapshot = Some(it.next().context("--html needs a path")?.into());
                }
                "--dry-run" => args.dry_run = true,
                "--find-chat-id" => args.find_chat_id = true,
                other => anyhow::bail!(
                    "unknown argument: {} (expected --config <path>, --html <file>, --dry-run, --find-chat-id)",
                    other
                ),
            }
        }
        Ok(args)
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("job_alert=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            builder.with_ansi(false).with_writer(std::sync::Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

async fn run_chat_id_helper(api_base: &str) -> Result<ExitCode> {
    println!("  --- Telegram Chat ID Finder ---");
    let token = Config::telegram_bot_token()?;
    println!("  Send a message (e.g. 'Hello') to your bot on Telegram now...");

    let chat = telegram::find_chat_id(api_base, &token, Duration::from_secs(2)).await?;
    println!();
    println!("  Found message from {}", chat.first_name.as_deref().unwrap_or("unknown"));
    println!("  Your TELEGRAM_CHAT_ID is: {}", chat.chat_id);
    Ok(ExitCode::SUCCESS)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = CliArgs::parse()?;

    // Load saved credentials from .env (real env vars take precedence)
    Config::load_env_file();

    if args.find_chat_id {
        init_logging(None)?;
        // The helper only needs the API base; fall back to the default when no config exists
        let api_base = Config::load(&args.config_path)
            .map(|c| c.telegram.api_base)
            .unwrap_or_else(|_| "https://api.telegram.org".to_string());
        return run_chat_id_helper(&api_base).await;
    }

    let config = Config::load(&args.config_path)?;
    init_logging(config.log_file.as_ref())?;

    println!();
    println!("  Job Alert v{}", env!("CARGO_PKG_VERSION"));
    println!("  ================");
    if args.dry_run {
        println!("  ** DRY RUN ** (alerts are logged, not sent)");
    }
    println!();

    let notifier: Box<dyn Notifier> = if args.dry_run {
        Box::new(LogNotifier)
    } else {
        let credentials = Config::telegram_credentials()?;
        Box::new(TelegramNotifier::new(&config.telegram.api_base, credentials)?)
    };

    let mut feed: Box<dyn ListingFeed> = match &args.html_snapshot {
        Some(path) => Box::new(SnapshotFeed::new(path, PageSelectors::from_config(&config.source)?)),
        None => Box::new(NaukriFeed::new(&config.source, &config.pacing)?),
    };

    if KeywordMatcher::new(&config.search.keywords).is_empty() {
        tracing::warn!("search.keywords is empty; no listing can match");
    }

    let store = SeenStore::new(&config.store.path);
    let mut pipeline = Pipeline::from_config(&config);

    tracing::info!(
        url = %config.search.url,
        recency = config.recency.enabled,
        store = %store.path().display(),
        "job alert run started"
    );

    let outcome = pipeline
        .run(feed.as_mut(), notifier.as_ref(), &store)
        .await
        .context("run aborted: seen-store could not be saved")?;
    tracing::info!(
        new = outcome.new_listings(),
        failed = outcome.is_failure(),
        "job alert run finished"
    );

    match outcome {
        RunOutcome::Completed(summary) => {
            println!(
                "  Job check completed. New jobs sent: {} (fetched {}, already seen {}, off-keyword {}, too old {}, malformed {}, send failures {})",
                summary.new,
                summary.fetched,
                summary.duplicate,
                summary.keyword_mismatch,
                summary.too_old,
                summary.malformed,
                summary.send_failures,
            );
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::SourceFailed { reason } => {
            eprintln!("  No jobs loaded: {}", reason);
            Ok(ExitCode::from(EXIT_SOURCE_FAILED))
        }
    }
}
