mod commands;
mod config;
mod handlers;
mod menus;
mod state;
mod storages;
mod utils;

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use commands::Command;
use config::Args;
use handlers::schema;
use sheetgrid::GoogleSheets;
use state::State;
use storages::{PersistentUserStorage, Storage, StorageTrait};
use teloxide::{dispatching::dialogue::InMemStorage, prelude::*, utils::command::BotCommands};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    pretty_env_logger::init();
    log::info!("Starting sheet bot...");

    let token = match args.get_token() {
        Ok(token) => token,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let bot = Bot::new(token);

    // Chat registrations
    let storage = if let Some(storage_path) = args.persistent_storage {
        let storage_dir = storage_path.unwrap_or_else(|| PathBuf::from("users"));
        log::info!("Using persistent user storage in directory: {:?}", storage_dir);
        Storage::new().users_storage(PersistentUserStorage::new(storage_dir))
    } else {
        log::info!("Using in-memory user storage");
        Storage::new()
    };

    // Spreadsheets
    let storage = if args.offline {
        log::info!("Offline mode: spreadsheets are kept in memory");
        storage
    } else {
        match GoogleSheets::from_service_account(&args.service_account_key).await {
            Ok(sheets) => storage.workbook_provider(sheets),
            Err(e) => {
                log::error!(
                    "Failed to authenticate with service account key {:?}: {}",
                    args.service_account_key,
                    e
                );
                std::process::exit(1);
            }
        }
    };

    let storage: Arc<dyn StorageTrait> = Arc::new(storage);

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![storage, InMemStorage::<State>::new()])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
