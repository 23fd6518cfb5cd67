mod cli;

use anyhow::Context;
use clap::Parser;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Cli::parse().into_config();
    log::debug!("{config:?}");

    scenefade::run(config).context("scenefade exited with an error")
}
