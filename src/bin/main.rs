use std::{
    fs,
    io::{self, Read, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use poem::listener::TcpListener;
use qrlabel::core::{handler, params};
use qrlabel::settings::{Config, get_config};
use qrlabel::telemetry::{LogControl, init_tracing};
use qrlabel::{AppState, init_openapi_route};
use serde_json::{Map, Value};

#[derive(Parser, Debug)]
#[command(name = "qrlabel", version)]
#[command(about = "QR code SVG images and printable HTML labels")]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Resolve parameters for a text without rendering, and print them as JSON.
    Resolve(ResolveArgs),
    /// Render a direct-call JSON payload and write the document to stdout.
    Render(RenderArgs),
    /// Handle an API gateway event and write the response envelope to stdout.
    Event(EventArgs),
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// Text to encode.
    #[arg(long)]
    text: String,

    /// Log level name or number.
    #[arg(long)]
    loglevel: Option<String>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Payload JSON file (reads stdin if not provided).
    #[arg(long)]
    payload: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct EventArgs {
    /// Event JSON file (reads stdin if not provided).
    #[arg(long)]
    input: Option<PathBuf>,
}

fn read_json(path: Option<&PathBuf>) -> anyhow::Result<Value> {
    let raw = match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("input is not valid JSON")
}

fn resolve(args: ResolveArgs, config: &Config, log: &LogControl) -> anyhow::Result<()> {
    let mut payload = Map::new();
    payload.insert(params::TEXT.to_string(), Value::String(args.text));
    if let Some(level) = args.loglevel {
        payload.insert(params::LOG_LEVEL.to_string(), Value::String(level));
    }
    let request = params::resolve_direct(&Value::Object(payload), config)?;
    log.apply(request.log_level);
    tracing::debug!("resolved request for {} bytes of text", request.text.len());
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

fn render(args: RenderArgs, config: &Config, log: &LogControl) -> anyhow::Result<()> {
    let payload = read_json(args.payload.as_ref())?;
    let request = params::resolve_direct(&payload, config)?;
    log.apply(request.log_level);
    let document = handler::render_request(&request)?;
    io::stdout().write_all(document.body.as_bytes())?;
    Ok(())
}

fn event(args: EventArgs, config: &Config, log: &LogControl) -> anyhow::Result<()> {
    let event = read_json(args.input.as_ref())?;
    let result = handler::resolve_event(&event, config).and_then(|request| {
        log.apply(request.log_level);
        handler::render_request(&request)
    });
    let response = handler::respond(result);
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let app_state = Arc::new(AppState {
        config: config.clone(),
    });

    let app = init_openapi_route(app_state, &config);
    tracing::info!("run server on {}:{}", config.host, config.port);
    poem::Server::new(TcpListener::bind(format!("{}:{}", config.host, config.port)))
        .run(app)
        .await
        .context("server stopped")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // An unparsable setting must stop the process before anything is served.
    let config = get_config()?;
    let (log, _guard) = init_tracing(&config);
    tracing::info!("load config from {}", config.source());
    tracing::info!("run with config: {:?}", config);

    match cli.cmd.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Resolve(args) => resolve(args, &config, &log),
        Command::Render(args) => render(args, &config, &log),
        Command::Event(args) => event(args, &config, &log),
    }
}
