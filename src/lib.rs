pub mod agent;
pub mod attachments;
pub mod cli;
pub mod config;
pub mod history;
pub mod models;
pub mod normalize;
pub mod webhook;

use agent::ChatAgent;
use cli::Args;
use log::info;
use std::error::Error;
use std::io::Write as _;
use std::path::Path;
use tokio::io::{ AsyncBufReadExt, BufReader };

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Webhook URL: {}", args.webhook_url);
    info!("Models URL: {}", args.models_url.as_deref().unwrap_or("(built-in catalog)"));
    info!("Wire Format: {}", args.wire_format);
    info!("Timeout: {}s", args.timeout_secs);
    info!("Project: {}", args.project);
    info!("History Limit: {}", args.history_limit);
    info!("Basic Auth: {}", if args.basic_user.is_some() { "enabled" } else { "disabled" });
    info!("Debug Panel: {}", args.debug_panel);
    info!("-------------------------");

    let mut agent = ChatAgent::new(&args).await?;

    println!("Connected to {}", args.webhook_url);
    println!("Type a message and press Enter. /help lists commands.");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            prompt()?;
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            if !handle_command(&mut agent, command).await {
                break;
            }
        } else {
            let reply = agent.process_turn(line).await?;
            println!("assistant> {}", reply.content);
            if args.debug_panel {
                if let Some(meta) = &reply.meta {
                    println!("--- debug ---");
                    println!("{}", serde_json::to_string_pretty(meta)?);
                }
            }
        }
        prompt()?;
    }

    Ok(())
}

fn prompt() -> Result<(), std::io::Error> {
    print!("you> ");
    std::io::stdout().flush()
}

/// Returns false when the session should end.
async fn handle_command(agent: &mut ChatAgent, command: &str) -> bool {
    let mut parts = command.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let argument = parts.next().map(str::trim).unwrap_or_default();

    match name {
        "help" => {
            println!("/attach <path>  stage an image or PDF for the next message");
            println!("/models         list the model catalog");
            println!("/model <id>     switch the active model");
            println!("/clear          reset the conversation");
            println!("/quit           end the session");
        }
        "attach" => {
            if argument.is_empty() {
                println!("Usage: /attach <path>");
            } else {
                match agent.stage_attachment(Path::new(argument)) {
                    Ok(attachment) => {
                        println!("Staged {} ({})", attachment.filename, attachment.mime)
                    }
                    Err(e) => println!("{}", e),
                }
            }
        }
        "models" => {
            for model in agent.catalog() {
                let marker = if model.id == agent.selected_model().id { "*" } else { " " };
                println!("{} {}  {} [{}]", marker, model.id, model.display_label(), model.provider);
            }
        }
        "model" => {
            if argument.is_empty() {
                println!("Active model: {}", agent.selected_model().id);
            } else if let Err(e) = agent.select_model(argument) {
                println!("{}", e);
            }
        }
        "clear" => {
            if let Err(e) = agent.clear().await {
                println!("Could not clear the conversation: {}", e);
            } else {
                println!("Conversation cleared.");
            }
        }
        "quit" | "exit" => {
            return false;
        }
        unknown => {
            println!("Unknown command '/{}'. /help lists commands.", unknown);
        }
    }
    true
}
