use clap::Parser;
use ollama_gateway::gateway_state::{self, GatewayConfig, GatewayState};
use ollama_gateway::server;
use std::io::Write;

#[derive(Parser, Debug)]
#[command(name = "ollama-gateway")]
#[command(about = "HTTP gateway that forwards chat prompts to an Ollama-compatible backend")]
struct CliArgs {
    /// Host address to bind the gateway server
    #[arg(long, env = "GATEWAY_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port number to bind the gateway server
    #[arg(long, env = "GATEWAY_PORT", default_value_t = 8082)]
    port: u16,

    /// Base URL of the Ollama-compatible backend
    #[arg(long, env = "OLLAMA_URL", default_value = "http://ollama:11434")]
    ollama_url: String,

    /// Default model used when a request does not override it
    #[arg(long, env = "OLLAMA_MODEL", default_value = "gpt-oss:20b")]
    model: String,

    /// Comma-separated allow-list of model names; empty disables the check
    #[arg(long, env = "OLLAMA_ALLOWED_MODELS", default_value = "")]
    allowed_models: String,

    /// Request timeout, e.g. "90", "90s" or "2m"
    #[arg(long, env = "OLLAMA_TIMEOUT", default_value = "")]
    timeout: String,
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // default level is info
    env_logger::Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, log::LevelFilter::Info)
        .init();

    let config = GatewayConfig {
        host: args.host,
        port: args.port,
        ollama_url: args.ollama_url,
        model: args.model,
        allowed_models: gateway_state::parse_model_list(&args.allowed_models),
        timeout: gateway_state::parse_timeout(&args.timeout),
    };

    let state = GatewayState::new(&config)?;
    actix_web::rt::System::new().block_on(server::startup(config, state))?;
    Ok(())
}
