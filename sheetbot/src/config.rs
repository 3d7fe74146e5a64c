use std::path::PathBuf;

use clap::Parser;

pub const PREDEFINED_BOT_TOKEN_RELEASE: Option<&str> = option_env!("PREDEFINED_BOT_TOKEN_RELEASE");
pub const PREDEFINED_BOT_TOKEN_DEBUG: Option<&str> = option_env!("PREDEFINED_BOT_TOKEN_DEBUG");
pub const PREDEFINED_BOT_TOKEN: Option<&str> = if cfg!(debug_assertions) {
    PREDEFINED_BOT_TOKEN_DEBUG
} else {
    PREDEFINED_BOT_TOKEN_RELEASE
};
pub const BOT_TOKEN_HELP: &str = if PREDEFINED_BOT_TOKEN_RELEASE.is_some() {
    "Environment variable name containing the bot token. If not set, uses precompiled token"
} else {
    "Environment variable name containing the bot token. If not set, TELOXIDE_TOKEN is used"
};

/// Environment variable consulted when neither --bot-token-env nor a
/// precompiled token is available
pub const DEFAULT_TOKEN_ENV: &str = "TELOXIDE_TOKEN";

/// A Telegram bot that keeps your finances in a Google Sheet
#[derive(Parser, Debug)]
#[command(name = "sheetbot")]
#[command(about = "A Telegram bot that keeps expenses, incomes and accounts in a Google Sheet", long_about = None)]
pub struct Args {
    #[arg(long, help = BOT_TOKEN_HELP)]
    pub bot_token_env: Option<String>,

    /// Google service account key used to edit the registered spreadsheets
    #[arg(long, default_value = "google_token.json")]
    pub service_account_key: PathBuf,

    /// Keep chat registrations as YAML files in this directory (default: users)
    #[arg(long, num_args = 0..=1)]
    pub persistent_storage: Option<Option<PathBuf>>,

    /// Use in-memory spreadsheets instead of Google Sheets
    #[arg(long)]
    pub offline: bool,
}

impl Args {
    /// Get the bot token from CLI args, the predefined token or TELOXIDE_TOKEN
    pub fn get_token(&self) -> Result<String, String> {
        if let Some(env_name) = &self.bot_token_env {
            std::env::var(env_name)
                .map_err(|_| format!("Environment variable {} not found", env_name))
        } else if let Some(predefined) = PREDEFINED_BOT_TOKEN {
            Ok(predefined.to_string())
        } else {
            std::env::var(DEFAULT_TOKEN_ENV).map_err(|_| {
                format!(
                    "No bot token provided. Use --bot-token-env or set {}",
                    DEFAULT_TOKEN_ENV
                )
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["sheetbot"]);
        assert_eq!(args.service_account_key, PathBuf::from("google_token.json"));
        assert!(args.persistent_storage.is_none());
        assert!(!args.offline);
    }

    #[test]
    fn test_persistent_storage_optional_value() {
        let args = Args::parse_from(["sheetbot", "--persistent-storage"]);
        assert_eq!(args.persistent_storage, Some(None));

        let args = Args::parse_from(["sheetbot", "--persistent-storage", "data", "--offline"]);
        assert_eq!(args.persistent_storage, Some(Some(PathBuf::from("data"))));
        assert!(args.offline);
    }

    #[test]
    fn test_missing_token_env() {
        let args = Args::parse_from([
            "sheetbot",
            "--bot-token-env",
            "SHEETBOT_TEST_TOKEN_THAT_IS_NOT_SET",
        ]);
        assert_eq!(
            args.get_token(),
            Err("Environment variable SHEETBOT_TEST_TOKEN_THAT_IS_NOT_SET not found".to_string())
        );
    }
}
