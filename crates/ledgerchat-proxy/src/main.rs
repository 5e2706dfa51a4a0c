use anyhow::Result;
use clap::Parser;
use ledgerchat_proxy::{run_server, ProxyConfig, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_UPSTREAM_URL};
use secrecy::SecretString;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledgerchat-proxy")]
#[command(about = "Forward ledgerchat requests to a chat-completions API")]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8787)]
    port: u16,

    /// Base URL of the chat-completions API
    #[arg(long, env = "LEDGERCHAT_UPSTREAM_URL", default_value = DEFAULT_UPSTREAM_URL)]
    upstream_url: String,

    /// Model name sent upstream
    #[arg(long, env = "LEDGERCHAT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Sampling temperature sent upstream
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f64,

    /// API credential for the upstream service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("ledgerchat_proxy=info,tower_http=info")
        }))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();

    let cli = Cli::parse();
    let config = ProxyConfig {
        upstream_url: cli.upstream_url,
        model: cli.model,
        temperature: cli.temperature,
        api_key: cli
            .api_key
            .filter(|key| !key.is_empty())
            .map(SecretString::from),
    };

    tokio::select! {
        result = run_server(config, &cli.host, cli.port) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
            Ok(())
        }
    }
}
