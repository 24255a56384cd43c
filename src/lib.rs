pub mod cli;
pub mod columns;
pub mod combine;
pub mod data;
pub mod dispatch;
pub mod error;
pub mod ingest;
pub mod io_utils;
pub mod pipeline;
pub mod report;
pub mod schema;
pub mod sink;
pub mod table;
pub mod timing;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::{LevelFilter, debug};

use crate::cli::Cli;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_combine", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    debug!("Arguments: {:?}", cli.run);
    pipeline::execute(&cli.run)
}
