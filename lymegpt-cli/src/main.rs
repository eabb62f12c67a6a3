//! CLI entry point for LymeGPT

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::{Confirm, Input, Password, Select};
use indicatif::{ProgressBar, ProgressStyle};
use lymegpt_agent::{ChatController, Turn, TurnError};
use lymegpt_core::auth::StaticCredentials;
use lymegpt_core::config::validate::validate_config;
use lymegpt_core::config::{Config, ConfigLoader, KnowledgeBaseBackend, LoggingConfig};
use lymegpt_core::logging::init_logging;
use lymegpt_core::session::{ChatSession, SessionManager};
use lymegpt_knowledge::build_knowledge_base;
use lymegpt_manager::{run_server, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser)]
#[command(name = "lymegpt")]
#[command(about = "Chat with the Lyme disease knowledge base")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web front-end
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Chat in the terminal
    Chat,
    /// Show status information
    Status,
    /// Initialize LymeGPT configuration
    Onboard,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config_loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };

    match cli.command {
        Commands::Serve { host, port } => run_serve(&config_loader, host, port).await?,
        Commands::Chat => run_chat(&config_loader).await?,
        Commands::Status => run_status(&config_loader).await?,
        Commands::Onboard => run_onboard(&config_loader).await?,
    }

    Ok(())
}

/// Start logging with a relative log dir resolved against the config dir
fn start_logging(loader: &ConfigLoader, logging: &mut LoggingConfig) -> WorkerGuard {
    let dir = PathBuf::from(&logging.dir);
    if dir.is_relative() {
        logging.dir = loader.config_dir().join(dir).to_string_lossy().into_owned();
    }
    init_logging(logging)
}

/// Run the web front-end until Ctrl+C
async fn run_serve(loader: &ConfigLoader, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = loader.load()?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    validate_config(&config)?;
    let _guard = start_logging(loader, &mut config.logging);

    println!("{}", style("Starting LymeGPT...").bold().cyan());

    let knowledge_base = build_knowledge_base(&config.knowledge_base).await?;
    let state = AppState::new(
        Arc::new(SessionManager::new(Duration::from_secs(
            config.server.session_idle_secs,
        ))),
        Arc::new(ChatController::new(
            knowledge_base,
            Duration::from_secs(config.knowledge_base.timeout_secs),
        )),
        Arc::new(StaticCredentials::from_config(&config.auth)),
        config.ui.clone(),
    );

    let addr = tokio::net::lookup_host((config.server.host.as_str(), config.server.port))
        .await?
        .next()
        .ok_or_else(|| anyhow::anyhow!("Cannot resolve {}", config.server.host))?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let mut server = tokio::spawn(run_server(state, addr, shutdown_rx));

    println!("Serving on {}", style(format!("http://{}", addr)).cyan());
    println!("{}", style("Press Ctrl+C to stop.").green());

    tokio::select! {
        result = &mut server => {
            result??;
            return Ok(());
        }
        signal = tokio::signal::ctrl_c() => signal?,
    }

    println!("\n{}", style("Shutting down...").yellow());
    info!("Shutdown requested");
    let _ = shutdown_tx.send(());
    server.await??;
    println!("{}", style("Server stopped.").green());

    Ok(())
}

/// Ask for credentials until the session is logged in
fn prompt_login(session: &mut ChatSession, verifier: &StaticCredentials) -> Result<()> {
    while !session.is_logged_in() {
        let username: String = Input::new().with_prompt("Username").interact_text()?;
        let password = Password::new().with_prompt("Password").interact()?;
        if let Err(e) = session.login(verifier, &username, &password) {
            println!("{} {}", style("✗").red(), e);
        }
    }
    println!("{}\n", style("Logged in.").green());
    Ok(())
}

fn print_turn(turn: &Turn) {
    println!("\n{}", style("Assistant:").bold().green());
    println!("{}\n", turn.answer);

    println!("{}", style("Sources:").bold());
    for chunk in &turn.sources {
        println!("  {}", style(chunk.title()).cyan());
        for line in chunk.text.lines() {
            println!("    {}", style(line).dim());
        }
    }
    println!();
}

/// Terminal chat over the same controller the web front-end uses
async fn run_chat(loader: &ConfigLoader) -> Result<()> {
    let mut config = loader.load()?;
    // Keep the prompt readable unless asked otherwise
    if std::env::var("RUST_LOG").is_err() {
        config.logging.level = "warn".to_string();
    }
    let _guard = start_logging(loader, &mut config.logging);

    let knowledge_base = build_knowledge_base(&config.knowledge_base).await?;
    let controller = ChatController::new(
        knowledge_base,
        Duration::from_secs(config.knowledge_base.timeout_secs),
    );
    let verifier = StaticCredentials::from_config(&config.auth);

    println!("{}", style(&config.ui.title).bold().cyan());
    println!("Type {} to start over, {} to exit.\n", style("/reset").cyan(), style("/quit").cyan());

    let mut session = ChatSession::new("terminal");
    prompt_login(&mut session, &verifier)?;

    loop {
        let question: String = Input::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()?;

        match question.trim() {
            "/quit" | "/exit" => break,
            "/reset" => {
                session = ChatSession::new("terminal");
                println!("{}", style("Session cleared.").yellow());
                prompt_login(&mut session, &verifier)?;
                continue;
            }
            _ => {}
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg}")?);
        spinner.set_message("Thinking...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let outcome = controller.submit_question(&mut session, &question).await;
        spinner.finish_and_clear();

        match outcome {
            Ok(turn) => print_turn(&turn),
            Err(TurnError::EmptyInput) => {}
            Err(e) => {
                warn!("Turn failed: {}", e);
                println!("{} {}\n", style("✗").red(), e);
            }
        }
    }

    println!("{}", style("Goodbye.").green());
    Ok(())
}

/// Show status information
async fn run_status(loader: &ConfigLoader) -> Result<()> {
    let config = loader.load()?;
    let kb = &config.knowledge_base;

    println!("{}", style("LymeGPT Status").bold().cyan());
    println!("Version: {}\n", env!("CARGO_PKG_VERSION"));

    println!("{}", style("Configuration:").bold());
    println!("  Config directory: {}", loader.config_dir().display());
    let file_status = if loader.config_path().exists() {
        style("present").green()
    } else {
        style("missing, using defaults").yellow()
    };
    println!("  Config file: {}", file_status);
    println!();

    println!("{}", style("Knowledge base:").bold());
    println!("  Backend: {}", kb.backend);
    match kb.backend {
        KnowledgeBaseBackend::Lambda => {
            println!("  Function: {}", kb.function_name);
            println!(
                "  Region: {}",
                kb.region.as_deref().unwrap_or("from AWS environment")
            );
        }
        KnowledgeBaseBackend::Http => println!("  Endpoint: {}", kb.endpoint),
    }
    println!("  Timeout: {}s", kb.timeout_secs);
    println!();

    println!("{}", style("Server:").bold());
    println!(
        "  Address: {}",
        style(format!("http://{}:{}", config.server.host, config.server.port)).cyan()
    );
    println!("  Login user: {}", config.auth.username);

    Ok(())
}

/// Interactive writer of config.json
async fn run_onboard(loader: &ConfigLoader) -> Result<()> {
    println!("{}", style("Welcome to LymeGPT!").bold().cyan());
    println!("Let's set up your configuration.\n");

    let config_path = loader.config_path();
    if config_path.exists() {
        let overwrite = Confirm::new()
            .with_prompt("Configuration already exists. Overwrite?")
            .default(false)
            .interact()?;
        if !overwrite {
            println!("Onboard cancelled.");
            return Ok(());
        }
    }

    let mut config = Config::default();

    let backends = ["lambda", "http"];
    let backend_idx = Select::new()
        .with_prompt("How is the knowledge base reached?")
        .items(&backends)
        .default(0)
        .interact()?;

    if backend_idx == 0 {
        config.knowledge_base.backend = KnowledgeBaseBackend::Lambda;
        config.knowledge_base.function_name = Input::new()
            .with_prompt("Function name")
            .default(config.knowledge_base.function_name.clone())
            .interact_text()?;
        let region: String = Input::new()
            .with_prompt("AWS region (empty to use the AWS environment)")
            .allow_empty(true)
            .interact_text()?;
        if !region.trim().is_empty() {
            config.knowledge_base.region = Some(region.trim().to_string());
        }
    } else {
        config.knowledge_base.backend = KnowledgeBaseBackend::Http;
        config.knowledge_base.endpoint = Input::new()
            .with_prompt("Endpoint URL")
            .interact_text()?;
    }

    config.auth.username = Input::new()
        .with_prompt("Login username")
        .default(config.auth.username.clone())
        .interact_text()?;
    config.auth.password = Password::new()
        .with_prompt("Login password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    config.server.port = Input::new()
        .with_prompt("Web server port")
        .default(config.server.port)
        .interact_text()?;

    validate_config(&config)?;
    loader.save(&config)?;

    println!(
        "\n{}",
        style("Configuration saved successfully!").green().bold()
    );
    println!("Config location: {}", config_path.display());
    println!("\nYou can now run:");
    println!("  {} - Start the web front-end", style("lymegpt serve").cyan());
    println!("  {} - Chat in the terminal", style("lymegpt chat").cyan());

    Ok(())
}
