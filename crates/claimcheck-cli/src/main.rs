//! Claimcheck CLI: the `claimcheck` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .without_time(),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let config = support::load_config_or_exit(cli.config.as_deref());

    match cli.command {
        Commands::DagCheck {
            graph,
            claims,
            strict,
            format,
            json,
        } => commands::dag_check::run(
            commands::dag_check::Args {
                graph,
                claims,
                strict,
                format: format.into(),
                json,
            },
            &config,
        ),

        Commands::ClaimsCheck {
            claims,
            lean,
            json,
        } => commands::claims_check::run(claims, lean, json, &config),

        Commands::ProjectCheck {
            root,
            claims,
            lean,
            json,
        } => commands::project_check::run(root, claims, lean, json, &config),

        Commands::AssetCheck { root, ext, json } => {
            commands::asset_check::run(root, ext, json, &config)
        }

        Commands::LossFormsCheck {
            bridges,
            relax,
            dag,
            json,
        } => commands::loss_forms_check::run(
            commands::loss_forms_check::Args {
                bridges,
                relax,
                dag,
                json,
            },
            &config,
        ),

        Commands::BridgesCheck { csv, claims, json } => {
            commands::bridges_check::run(csv, claims, json, &config)
        }

        Commands::AnchorCheck {
            text,
            profile,
            json,
        } => commands::anchor_check::run(text, profile.into(), json),

        Commands::CsvTable { csv, out, caption } => commands::csv_table::run(csv, out, caption),
    }
}
