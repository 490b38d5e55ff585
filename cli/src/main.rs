//! CLI entrypoint for docchat
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use docchat_application::{ConversationController, HistoryError, SendError};
use docchat_domain::{ConversationId, ConversationSession, Role};
use docchat_infrastructure::{
    ConfigLoader, FileConfig, HttpChatGateway, JsonlConversationLogger, SystemClock,
    UuidIdGenerator,
};
use docchat_presentation::{ChatRepl, Cli, ConsoleFormatter, StreamPrinter};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };

    info!("Starting docchat");

    let show_progress = !cli.quiet && !cli.json && config.repl.show_progress;
    let controller = Arc::new(build_controller(&cli, &config, show_progress)?);

    if let Some(id) = cli.conversation.as_deref() {
        let id = ConversationId::from(id);
        match controller.try_load_history(&id).await {
            Ok(_) => {}
            // In chat mode the error is shown and the REPL still starts
            Err(HistoryError::Failed(error)) if cli.chat && !cli.history => {
                eprint!("{}", ConsoleFormatter::format_error(&error));
            }
            Err(e) => bail!("Could not load conversation {}: {}", id, e),
        }
    }

    if cli.history {
        print_session(&controller.state(), cli.json);
        return Ok(());
    }

    // Chat mode
    if cli.chat {
        let repl = ChatRepl::new(Arc::clone(&controller))
            .with_progress(show_progress)
            .with_history_path(config.repl.history_path());

        repl.run().await?;
        return Ok(());
    }

    // Single question mode - question is required
    let Some(question) = cli.question.as_deref() else {
        bail!("Question is required. Use --chat for interactive mode.");
    };

    let result = controller.try_send(question).await;
    let session = controller.state();

    if cli.json {
        println!("{}", ConsoleFormatter::format_json(&session));
    } else if result.is_ok() && !show_progress
        && let Some(answer) = session
            .messages()
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant)
    {
        println!("{}", answer.text);
    }

    match result {
        Ok(id) => {
            if !cli.json && !cli.quiet {
                eprintln!("{}", ConsoleFormatter::format_conversation_id(&session));
            }
            info!("Exchange complete for conversation {}", id);
            Ok(())
        }
        Err(SendError::Failed(error)) => bail!(error),
        Err(e) => Err(e).context("Question was not sent"),
    }
}

/// Wire the HTTP gateway, id/clock providers, observer and logger into a controller
fn build_controller(
    cli: &Cli,
    config: &FileConfig,
    show_progress: bool,
) -> Result<ConversationController> {
    let mut gateway_config = config.server.to_gateway_config();
    if let Some(server) = &cli.server {
        gateway_config.base_url = server.clone();
    }
    let gateway = Arc::new(HttpChatGateway::new(gateway_config)?);

    let mut controller = ConversationController::new(
        gateway.clone(),
        gateway,
        Arc::new(UuidIdGenerator),
        Arc::new(SystemClock),
    )
    .with_config(config.session.to_session_config());

    if show_progress {
        controller = controller.with_observer(Arc::new(StreamPrinter::stdout()));
    }

    let log_path = cli
        .log_file
        .clone()
        .or_else(|| config.logging.conversation_log_path());
    if let Some(path) = log_path
        && let Some(logger) = JsonlConversationLogger::try_open(&path)
    {
        info!("Conversation log: {}", logger.path().display());
        controller = controller.with_logger(Arc::new(logger));
    }

    Ok(controller)
}

fn print_session(session: &ConversationSession, json: bool) {
    if json {
        println!("{}", ConsoleFormatter::format_json(session));
    } else {
        print!("{}", ConsoleFormatter::format_transcript(session));
    }
}
