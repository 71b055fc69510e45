mod cli;
mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::Parser;
use ragdex::EngineCell;

use crate::cli::{Cli, Command};
use crate::commands::{build, chunk, search};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let format = cli.format;
    let index_dir = cli.index_dir;

    match cli.command {
        Command::Chunk(cmd) => chunk::run(cmd),
        Command::Build(cmd) => build::run(cmd, &index_dir, format).await,
        Command::Search(cmd) => search::run(cmd, &index_dir, format),
        Command::Query(cmd) => {
            let service = context::query_service(&index_dir)?;
            let response = service.query(&cmd.q, cmd.top_k).await?;
            output::print_query_response(&response, format)
        }
        Command::Health => {
            let health = ragdex::service::health(&EngineCell::new(&index_dir));
            output::print_health(&health, format)?;
            if !health.ok {
                log::warn!("index at {} is not ready", index_dir.display());
            }
            Ok(())
        }
    }
}
