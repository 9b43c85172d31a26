//! CLI argument definitions.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::models::{SessionId, DEFAULT_SESSION_ID};

/// AetherChat - terminal client for the ML tutor backend
#[derive(Parser, Debug)]
#[command(name = "aetherchat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the tutor backend
    #[arg(long = "url", env = "AETHERCHAT_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Session identifier sent with every query
    #[arg(long = "session", env = "AETHERCHAT_SESSION", default_value = DEFAULT_SESSION_ID, global = true)]
    pub session_id: String,

    /// Request timeout in seconds
    #[arg(long, env = "AETHERCHAT_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    pub timeout_secs: u64,

    /// Log debug output to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Client settings resolved from flags and environment.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(
            &self.base_url,
            SessionId::new(self.session_id.clone()),
            Duration::from_secs(self.timeout_secs),
        )
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Ask a single question and print the reply
    Ask {
        /// Question to send
        #[arg(trailing_var_arg = true, required = true)]
        question: Vec<String>,
    },

    /// Show the server-side history for the session
    History,

    /// Show, export or change the settings panel values
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Simulate uploading documents (nothing is sent)
    Upload {
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Settings actions
#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Print settings as JSON
    Show {
        /// Read settings from this file instead of using defaults
        path: Option<PathBuf>,
    },

    /// Write settings to a JSON file
    Export {
        /// Destination (defaults to ~/.aetherchat/aetherchat-settings.json)
        path: Option<PathBuf>,

        /// Export these settings instead of the defaults
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Change one setting (e.g. `maxTokens 4096`) and save the file
    Set {
        /// Setting name as it appears in the JSON
        key: String,

        /// New value
        #[arg(allow_hyphen_values = true)]
        value: String,

        /// Settings file to update (defaults to ~/.aetherchat/aetherchat-settings.json)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_joins_trailing_words() {
        let cli = Cli::parse_from(["aetherchat", "ask", "What", "is", "PCA?"]);
        match cli.command {
            Commands::Ask { question } => assert_eq!(question.join(" "), "What is PCA?"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_build_client_config() {
        let cli = Cli::parse_from([
            "aetherchat",
            "history",
            "--url",
            "http://tutor.local:9000/",
            "--session",
            "abc",
            "--timeout-secs",
            "5",
        ]);
        let config = cli.client_config();
        assert_eq!(config.base_url, "http://tutor.local:9000");
        assert_eq!(config.session_id.as_str(), "abc");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn settings_set_takes_key_value_and_file() {
        let cli = Cli::parse_from([
            "aetherchat",
            "settings",
            "set",
            "maxTokens",
            "4096",
            "--file",
            "/tmp/s.json",
        ]);
        match cli.command {
            Commands::Settings {
                action: SettingsAction::Set { key, value, file },
            } => {
                assert_eq!(key, "maxTokens");
                assert_eq!(value, "4096");
                assert_eq!(file, Some(PathBuf::from("/tmp/s.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn upload_requires_files() {
        assert!(Cli::try_parse_from(["aetherchat", "upload"]).is_err());
    }
}
