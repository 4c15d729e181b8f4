//! jalchat CLI: Command-line interface for the jalchat chat client

use clap::{Parser, Subcommand, ValueEnum};
use jalchat_engine::{
    Config, HttpBackend, Message, RequestController, Selection, SubmitOutcome, SubmitSkip,
    Transcript, CONFIG_DIR,
};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

/// Terminal chat client for the groundwater assistant
#[derive(Parser)]
#[command(name = "jalchat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: .jalchat/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Chat endpoint URL, overriding the config file
    #[arg(long, global = true, env = "JALCHAT_ENDPOINT")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the TUI (default when no command specified)
    Tui,

    /// Send one prompt and print the exchange
    Ask {
        /// The prompt to send
        prompt: String,

        /// Persona to answer as (default from config)
        #[arg(long)]
        persona: Option<String>,

        /// Answer language (default from config)
        #[arg(long)]
        language: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Write a default config file
    Init,

    /// Print the effective configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// "Label: text" lines
    Text,
    /// Escaped HTML fragments, one per message
    Html,
    /// JSON array of messages
    Json,
}

const LOG_FILE: &str = "jalchat.log";

fn main() {
    let cli = Cli::parse();

    init_logging(matches!(cli.command, None | Some(Commands::Tui)));

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| Config::default_path(Path::new("")));

    if let Some(Commands::Init) = cli.command {
        cmd_init(&config_path);
        return;
    }

    let mut config = match Config::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", config_path.display());
            std::process::exit(1);
        }
    };
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }

    match cli.command {
        None | Some(Commands::Tui) => {
            let rt = runtime();
            if let Err(e) = rt.block_on(jalchat_tui::run_tui(&config)) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Ask {
            prompt,
            persona,
            language,
            format,
        }) => {
            let rt = runtime();
            let code = rt.block_on(cmd_ask(&config, prompt, persona, language, format));
            std::process::exit(code);
        }
        Some(Commands::Config { json }) => {
            cmd_config(&config, &config_path, json);
        }
        Some(Commands::Init) => {}
    }
}

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    }
}

/// Install the tracing subscriber, filtered by `RUST_LOG` (default `warn`).
///
/// The TUI owns the terminal, so its logs go to `.jalchat/jalchat.log`;
/// every other command logs to stderr.
fn init_logging(tui: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if tui {
        let dir = Path::new(CONFIG_DIR);
        let file = std::fs::create_dir_all(dir).and_then(|()| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(LOG_FILE))
        });
        if let Ok(file) = file {
            fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        return;
    }

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn cmd_ask(
    config: &Config,
    prompt: String,
    persona: Option<String>,
    language: Option<String>,
    format: OutputFormat,
) -> i32 {
    let backend = match HttpBackend::from_config(config) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let mut controller = RequestController::from_config(backend, config);
    if let Some(persona) = persona {
        choose(controller.persona_mut(), persona);
    }
    if let Some(language) = language {
        choose(controller.language_mut(), language);
    }
    controller.input_mut().set_content(prompt);

    let outcome = controller.submit().await;
    if let SubmitOutcome::Skipped(skip) = &outcome {
        let reason = match skip {
            SubmitSkip::EmptyPrompt => "prompt is empty",
            SubmitSkip::InFlight => "a request is already in flight",
        };
        eprintln!("Nothing sent: {reason}");
        return 1;
    }

    match render_exchange(controller.transcript(), format) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            eprintln!("Failed to serialize transcript: {e}");
            return 1;
        }
    }

    match outcome {
        SubmitOutcome::Answered => 0,
        SubmitOutcome::Failed(_) | SubmitOutcome::Skipped(_) => 1,
    }
}

/// Select `value`, or use it as the only option when it is not configured.
fn choose(selection: &mut Selection, value: String) {
    if !selection.select(&value) {
        warn!(label = selection.label(), %value, "value is not configured; sending as given");
        *selection = Selection::new(selection.label().to_string(), vec![value]);
    }
}

/// Render the transcript in the requested output format.
fn render_exchange(
    transcript: &Transcript,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    Ok(match format {
        OutputFormat::Text => transcript.to_plain_text(),
        OutputFormat::Html => transcript
            .messages()
            .map(Message::html_fragment)
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => {
            let messages: Vec<&Message> = transcript.messages().collect();
            serde_json::to_string_pretty(&messages)?
        }
    })
}

fn cmd_init(path: &Path) {
    match Config::default().save_new(path) {
        Ok(()) => println!("Created {}", path.display()),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn cmd_config(config: &Config, path: &Path, json: bool) {
    if json {
        match serde_json::to_string_pretty(config) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Failed to serialize config: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let source = if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", path.display())
    };
    println!("Config: {source}\n");
    println!("  Endpoint:  {}", config.endpoint);
    match config.timeout_seconds {
        Some(secs) => println!("  Timeout:   {secs}s"),
        None => println!("  Timeout:   none"),
    }
    println!("  Persona:   {}", config.default_persona);
    println!("  Language:  {}", config.default_language);
    println!("  Personas:  {}", config.personas.join(", "));
    println!("  Languages: {}", config.languages.join(", "));
}
