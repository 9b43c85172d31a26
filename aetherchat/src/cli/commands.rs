//! CLI command execution.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::chat::{render_exchange, render_message, run_repl, Conversation, Submission};
use crate::client::RagClient;
use crate::config::ClientConfig;
use crate::settings::{default_export_path, Settings};
use crate::upload::{self, format_size, Candidate, UploadEvent};

use super::args::{Cli, Commands, SettingsAction};

// === Command Execution ===

pub async fn execute(cli: Cli) -> Result<()> {
    let config = cli.client_config();

    match cli.command {
        Commands::Chat => chat(&config).await,
        Commands::Ask { question } => ask(&config, &question.join(" ")).await,
        Commands::History => history(&config).await,
        Commands::Settings { action } => settings(action),
        Commands::Upload { files } => upload_files(files).await,
    }
}

fn conversation(config: &ClientConfig) -> Result<Conversation<RagClient>> {
    let client = RagClient::new(config).context("Failed to build HTTP client")?;
    Ok(Conversation::new(client, config.session_id.clone()))
}

async fn chat(config: &ClientConfig) -> Result<()> {
    let conversation = conversation(config)?;
    run_repl(&conversation).await
}

async fn ask(config: &ClientConfig, question: &str) -> Result<()> {
    let conversation = conversation(config)?;

    match conversation.submit(question).await {
        Submission::Empty => anyhow::bail!("Question is empty"),
        Submission::Busy => anyhow::bail!("Another question is still pending"),
        Submission::Answered | Submission::Fallback => {}
    }

    if let Some(reply) = conversation.messages().last() {
        println!("{}", render_message(reply));
    }
    Ok(())
}

async fn history(config: &ClientConfig) -> Result<()> {
    let client = RagClient::new(config).context("Failed to build HTTP client")?;
    let exchanges = client
        .history(&config.session_id)
        .await
        .context("Failed to fetch history")?;

    if exchanges.is_empty() {
        println!("No history for session {}.", config.session_id);
        return Ok(());
    }

    println!(
        "Session {}: {} exchanges\n",
        config.session_id,
        exchanges.len()
    );
    for (i, exchange) in exchanges.iter().enumerate() {
        println!("{}", render_exchange(i + 1, exchange));
    }
    Ok(())
}

fn settings(action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show { path } => {
            let settings = match path {
                Some(path) => Settings::load(&path)?,
                None => Settings::default(),
            };
            println!("{}", settings.to_json()?);
        }
        SettingsAction::Export { path, from } => {
            let settings = match from {
                Some(from) => Settings::load(&from)?,
                None => Settings::default(),
            };
            let path = settings_path(path)?;
            settings.export(&path)?;
            println!("Settings exported to {}", path.display());
        }
        SettingsAction::Set { key, value, file } => {
            let path = settings_path(file)?;
            let mut settings = Settings::load_or_default(&path)?;
            settings.set(&key, &value)?;
            settings.export(&path)?;
            println!("{key} updated in {}", path.display());
        }
    }
    Ok(())
}

fn settings_path(path: Option<PathBuf>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => default_export_path().context("Could not find home directory"),
    }
}

async fn upload_files(paths: Vec<PathBuf>) -> Result<()> {
    let mut candidates = Vec::new();
    for path in &paths {
        match Candidate::from_path(path) {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => eprintln!("Skipping: {e}"),
        }
    }

    let mut batch = upload::simulate(candidates);
    for rejected in &batch.rejected {
        eprintln!("Skipping: {rejected}");
    }

    let mut names = std::collections::HashMap::new();
    let mut completed = 0;
    while let Some(event) = batch.events.recv().await {
        match event {
            UploadEvent::Started(file) => {
                println!("{:<10} {} ({})", file.id, file.name, format_size(file.size));
                names.insert(file.id, file.name);
            }
            UploadEvent::Progress { id, progress } => {
                let name = names.get(&id).map_or("-", String::as_str);
                println!("{id:<10} {name:<28} {progress:>5.1}%");
            }
            UploadEvent::Completed(file) => {
                completed += 1;
                println!("{:<10} {:<28} done", file.id, file.name);
            }
        }
    }

    println!("\n{completed} of {} files uploaded.", paths.len());
    Ok(())
}
