mod categorize;
mod config;
mod db;
mod engine;
mod error;
mod import;
mod logging;
mod models;
mod money;
mod run;
mod ui;

use anyhow::Result;

use crate::config::{AppDirs, Config};
use crate::logging::LogTarget;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let dirs = AppDirs::discover()?;
    let config = Config::load_from(&dirs.config_file())?.with_env(|key| std::env::var(key).ok());

    let log_file = dirs.log_file();
    let target = if args.len() > 1 {
        LogTarget::Stderr
    } else {
        LogTarget::File(&log_file)
    };
    logging::init(&config.log_level, target)?;

    let mut db = db::Database::open(&config.database_path(&dirs))?;

    match args.len() {
        1 => run::as_tui(&mut db, &config),
        _ => run::as_cli(&args, &mut db, &config, &dirs),
    }
}
