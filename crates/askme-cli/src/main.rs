//! askme CLI: ask Gemini from the terminal, with a persistent history

use askme_engine::{
    default_export_path, export_transcript, Config, ConversationStore, Exchange, GeminiClient,
    PromptFlow, SettleOutcome, DEFAULT_DATA_DIR,
};
use askme_tui::{App, SharedStorage};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::{fmt, fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Minimal Gemini chat client with a terminal UI
#[derive(Parser)]
#[command(name = "askme")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory holding config, history and transcripts
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Gemini API key
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat TUI (default when no command specified)
    Tui,

    /// Ask a single question and print the answer
    Ask {
        /// The prompt to send
        prompt: String,
    },

    /// Print the conversation history
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the conversation as a markdown transcript
    Export {
        /// Output file (default: <data-dir>/transcripts/<timestamp>.md)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Create the data directory and a default config
    Init,
}

/// Log file used while the TUI owns the terminal.
const LOG_FILE: &str = "askme.log";

type CliResult = Result<(), Box<dyn Error>>;

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult {
    let in_tui = matches!(cli.command, None | Some(Commands::Tui));
    if in_tui {
        fs::create_dir_all(&cli.data_dir)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(cli.data_dir.join(LOG_FILE))?;
        init_logging(&cli, Mutex::new(file), false);
    } else {
        init_logging(&cli, std::io::stderr, true);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "askme starting");

    let rt = tokio::runtime::Runtime::new()?;
    match &cli.command {
        None | Some(Commands::Tui) => rt.block_on(cmd_tui(&cli)),
        Some(Commands::Ask { prompt }) => rt.block_on(cmd_ask(&cli, prompt)),
        Some(Commands::History { json }) => cmd_history(&cli, *json),
        Some(Commands::Export { output }) => cmd_export(&cli, output.as_deref()),
        Some(Commands::Init) => cmd_init(&cli.data_dir),
    }
}

fn init_logging<W>(cli: &Cli, writer: W, ansi: bool)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true).with_writer(writer))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .init();
    }
}

fn load_config(data_dir: &Path) -> Result<Config, Box<dyn Error>> {
    Ok(Config::load_or_default(&Config::path_in(data_dir))?)
}

/// Open the conversation log stored under `data_dir`.
fn open_flow(data_dir: &Path, config: &Config) -> Result<PromptFlow<SharedStorage>, Box<dyn Error>> {
    let storage: SharedStorage =
        Arc::new(askme_engine::FileStorage::new(Config::storage_dir(data_dir))?);
    let store = ConversationStore::open(storage, config.history_key.clone());
    Ok(PromptFlow::new(store))
}

fn build_client(config: &Config, api_key: Option<&str>) -> Result<GeminiClient, Box<dyn Error>> {
    let client = GeminiClient::new(api_key.unwrap_or_default(), &config.model)
        .with_base_url(&config.api_base_url)
        .with_config(config.generation.clone());

    Ok(match config.timeout() {
        Some(timeout) => client.with_timeout(timeout)?,
        None => client,
    })
}

async fn cmd_tui(cli: &Cli) -> CliResult {
    let config = load_config(&cli.data_dir)?;
    let flow = open_flow(&cli.data_dir, &config)?;
    let client = build_client(&config, cli.api_key.as_deref())?;

    let app = App::new(flow, Arc::new(client), cli.data_dir.clone());
    askme_tui::run_tui(app).await
}

async fn cmd_ask(cli: &Cli, prompt: &str) -> CliResult {
    let config = load_config(&cli.data_dir)?;
    let mut flow = open_flow(&cli.data_dir, &config)?;
    let client = build_client(&config, cli.api_key.as_deref())?;

    let settlement = flow.submit(prompt, &client).await?;
    if let Some(error) = &settlement.persist_error {
        eprintln!("Warning: history not saved: {error}");
    }
    match settlement.outcome {
        SettleOutcome::Appended(exchange) => println!("{}", exchange.response),
        SettleOutcome::Skipped => eprintln!("Nothing recorded (empty prompt or response)"),
        SettleOutcome::Failed(message) => return Err(message.into()),
    }
    Ok(())
}

fn cmd_history(cli: &Cli, json: bool) -> CliResult {
    let config = load_config(&cli.data_dir)?;
    let flow = open_flow(&cli.data_dir, &config)?;
    let exchanges = flow.exchanges();

    if json {
        println!("{}", serde_json::to_string_pretty(exchanges)?);
    } else if exchanges.is_empty() {
        println!("No history yet.");
    } else {
        print!("{}", format_history(exchanges));
    }
    Ok(())
}

fn format_history(exchanges: &[Exchange]) -> String {
    let mut out = String::new();
    for (i, exchange) in exchanges.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("Q: {}\n{}\n", exchange.prompt, exchange.response.trim_end()));
    }
    out
}

fn cmd_export(cli: &Cli, output: Option<&Path>) -> CliResult {
    let config = load_config(&cli.data_dir)?;
    let flow = open_flow(&cli.data_dir, &config)?;

    let path = output.map_or_else(
        || default_export_path(&cli.data_dir, Local::now()),
        Path::to_path_buf,
    );
    let written = export_transcript(flow.exchanges(), &config.model, &path)?;
    println!(
        "Exported {} exchanges to {}",
        flow.exchanges().len(),
        written.display()
    );
    Ok(())
}

fn cmd_init(data_dir: &Path) -> CliResult {
    fs::create_dir_all(data_dir)?;

    let config_path = Config::path_in(data_dir);
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
    } else {
        Config::default().save(&config_path)?;
        println!("Created {}", config_path.display());
    }

    println!();
    println!("Set GEMINI_API_KEY (or pass --api-key), then run `askme` to start chatting.");
    Ok(())
}
