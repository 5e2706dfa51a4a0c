use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledgerchat::chat::{ChatMessage, Role, TranscriptStore};
use ledgerchat::config::{default_config_path, ResolvedConfig};
use ledgerchat::dispatch::Dispatcher;
use ledgerchat::session::{ChatSession, Submitted};
use ledgerchat::snapshot::{load_snapshot, SnapshotStatus};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ledgerchat")]
#[command(about = "Chat with an assistant about your finances")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive chat on stdin
    Chat {
        /// Attach the finance snapshot to each message
        #[arg(long)]
        share: bool,
    },
    /// Send a single message and print the reply
    Send {
        message: String,
        /// Attach the finance snapshot
        #[arg(long)]
        share: bool,
    },
    /// Print the finance snapshot that would be shared
    Snapshot,
    /// Print the stored transcript
    History,
    /// Clear the stored transcript
    Clear,
    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = ResolvedConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    match cli.command.unwrap_or(Command::Chat { share: false }) {
        Command::Chat { share } => run_chat(&config, share || config.share_data).await,
        Command::Send { message, share } => {
            let mut session = open_session(&config, share || config.share_data).await;
            match session.submit(&message).await? {
                Submitted::Reply(reply) => println!("{}", reply.content),
                Submitted::Failed(notice) => {
                    anyhow::bail!("{}", notice.content)
                }
                Submitted::Empty => anyhow::bail!("Message is empty"),
                Submitted::Busy => anyhow::bail!("A message is already being sent"),
            }
            Ok(())
        }
        Command::Snapshot => {
            let snapshot = load_snapshot(&config.finance_file).await;
            println!("{}", SnapshotStatus::of(snapshot.as_ref()));
            if let Some(snapshot) = snapshot {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            }
            Ok(())
        }
        Command::History => {
            let store = TranscriptStore::new(&config.transcript_file);
            for message in store.load().await {
                print_message(&message);
            }
            Ok(())
        }
        Command::Clear => {
            TranscriptStore::new(&config.transcript_file).clear().await?;
            println!("Transcript cleared.");
            Ok(())
        }
        Command::Config => {
            println!("Config file: {}", config_path.display());
            println!("Data directory: {}", config.data_dir.display());
            println!("Endpoint: {}", config.endpoint);
            println!("Share data: {}", config.share_data);
            println!("Finance file: {}", config.finance_file.display());
            println!("Transcript file: {}", config.transcript_file.display());
            Ok(())
        }
    }
}

async fn open_session(config: &ResolvedConfig, share: bool) -> ChatSession {
    ChatSession::open(
        Arc::new(Dispatcher::http(config.endpoint.clone())),
        TranscriptStore::new(&config.transcript_file),
        config.finance_file.clone(),
        share,
    )
    .await
}

async fn run_chat(config: &ResolvedConfig, share: bool) -> Result<()> {
    let mut session = open_session(config, share).await;

    for message in session.messages() {
        print_message(message);
    }
    println!(
        "[{}] sharing {} (/share to toggle, /clear, /quit)",
        session.data_status().await,
        if session.share_data() { "on" } else { "off" }
    );

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear().await?;
                for message in session.messages() {
                    print_message(message);
                }
            }
            "/share" => {
                let share = !session.share_data();
                session.set_share_data(share);
                let status = session.data_status().await;
                println!("[{status}] sharing {}", if share { "on" } else { "off" });
            }
            input => match session.submit(input).await? {
                Submitted::Reply(message) | Submitted::Failed(message) => print_message(&message),
                Submitted::Busy => println!("(still sending, please wait)"),
                Submitted::Empty => {}
            },
        }
    }

    Ok(())
}

fn print_message(message: &ChatMessage) {
    let label = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
        Role::System => "system",
    };
    println!("{label}: {}", message.content);
}
