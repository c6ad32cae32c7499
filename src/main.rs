use clap::{Parser, Subcommand};
use highlight_session::config::StoreConfig;
use highlight_session::lifecycle::{pending_purges, sweep_expired_records, SessionContext};
use highlight_session::record::{HighlightRecord, TranscriptRecord, VideoRecord};
use highlight_session::register::MemoryRegister;
use highlight_session::session::SessionTag;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and maintain the highlight editor's session store")]
struct Args {
    /// Path to config file (TOML format)
    #[arg(short, long, global = true, default_value = "highlight-session.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the sessions waiting to be purged and how many records are stored
    Status,
    /// Delete records older than the retention window, across all sessions
    Sweep {
        /// Retention in hours (overrides config file)
        #[arg(long)]
        retention_hours: Option<i64>,
    },
    /// Delete every record of one session
    Purge {
        /// Session tag, e.g. session_1700000000000_a1b2c3d4e5f6
        #[arg(long)]
        session: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = StoreConfig::load(&args.config)?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(args.command, config))
}

async fn run(command: Command, config: StoreConfig) -> Result<(), Box<dyn std::error::Error>> {
    let context = SessionContext::open(&config, Arc::new(MemoryRegister::new())).await;
    if !context.store.is_available() {
        return Err(format!(
            "Object store at '{}' is unavailable",
            config.database_path.display()
        )
        .into());
    }

    match command {
        Command::Status => status(&context).await,
        Command::Sweep { retention_hours } => {
            let retention_hours = retention_hours.unwrap_or(config.retention_hours);
            let report = sweep_expired_records(&context.store, retention_hours, None).await;
            println!(
                "Removed {} videos, {} transcripts, {} highlights saved before {}",
                report.videos,
                report.transcripts,
                report.highlights,
                report.cutoff.format("%Y-%m-%d %H:%M:%S UTC")
            );
            Ok(())
        }
        Command::Purge { session } => {
            let tag = SessionTag::parse(&session)?;
            let report = context.cleanup().execute(&tag).await?;
            println!(
                "Purged {}: {} videos, {} transcripts, {} highlights in {:?}",
                report.session_tag,
                report.counts.videos,
                report.counts.transcripts,
                report.counts.highlights,
                report.elapsed
            );
            Ok(())
        }
    }
}

async fn status(context: &SessionContext) -> Result<(), Box<dyn std::error::Error>> {
    // Session tags live in each tab's ephemeral register, so only the shared state is shown
    let pending = pending_purges(context.durable.as_ref());
    if pending.is_empty() {
        println!("Pending purges: none");
    } else {
        println!("Pending purges: {}", pending.len());
        for tag in &pending {
            println!("  {}", tag);
        }
    }

    println!("Videos:      {}", context.store.count::<VideoRecord>().await);
    println!("Transcripts: {}", context.store.count::<TranscriptRecord>().await);
    println!("Highlights:  {}", context.store.count::<HighlightRecord>().await);
    Ok(())
}
