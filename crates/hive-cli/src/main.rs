//! `hive` -- command-line browser and editor for the row store's blob
//! namespace.

mod cli;
mod commands;
mod context;
mod output;

use clap::Parser;
use row_store::{RowStore, RowStoreConfig};
use store_config::HiveConfig;

use cli::{Cli, Commands};
use context::RuntimeContext;

fn main() {
    let cli = Cli::parse();

    let config = match HiveConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    };
    let ctx = RuntimeContext::new(config, &cli.global);

    if ctx.verbose {
        tracing_subscriber::fmt().with_env_filter("hive=debug").with_writer(std::io::stderr).init();
    }

    let result = run(&ctx, cli.command);

    if let Err(e) = result {
        if ctx.json {
            let err_json = serde_json::json!({ "error": format!("{e:#}") });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{s}");
            }
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}

fn run(ctx: &RuntimeContext, command: Commands) -> anyhow::Result<()> {
    let store = RowStore::open(&ctx.db_path, "hive", RowStoreConfig { pool_size: ctx.pool, rev_storage: ctx.rev_storage })?;

    match command {
        Commands::Ls(args) => commands::hive::run_ls(ctx, &store, &args),
        Commands::Get(args) => commands::hive::run_get(ctx, &store, &args),
        Commands::Rm(args) => commands::hive::run_rm(ctx, &store, &args),
        Commands::Edit(args) => commands::hive::run_edit(ctx, &store, &args),
    }
}
