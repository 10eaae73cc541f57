use anyhow::{Context, Result};
use log::{info, warn};

use super::{Cli, Commands};
use crate::context::AppContext;
use crate::db::{get_database_path, migrations, Database};
use crate::models::Config;
use crate::server::run_server;
use crate::services::{JournalService, ReconcileReport};

pub async fn handle_command(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Serve { bind } => serve(config, bind).await,

        Commands::Initdb { drop } => init_db(&config, drop),

        Commands::Reconcile => {
            let ctx = AppContext::open(config)?;
            let report = JournalService::reconcile(&ctx).await?;
            print_report(&report);
            Ok(())
        }
    }
}

async fn serve(config: Config, bind: Option<std::net::SocketAddr>) -> Result<()> {
    let bind_addr = bind.unwrap_or(config.bind_addr);
    info!(
        "Projects root: {}, IDE: {}",
        config.projects_root.display(),
        config.ide_url
    );

    let ctx = AppContext::open(config).context("Failed to initialize application")?;

    let report = JournalService::reconcile(&ctx).await?;
    if report.total() > 0 {
        info!(
            "Startup reconcile: {} applied, {} rolled back, {} failed",
            report.applied, report.rolled_back, report.failed
        );
    }
    if report.failed > 0 {
        warn!("Some journal entries could not be reconciled; see errors above");
    }

    run_server(ctx, bind_addr).await
}

fn init_db(config: &Config, drop: bool) -> Result<()> {
    let db_path = get_database_path(config)?;
    let db = Database::new(&db_path)?;

    if drop {
        db.drop_all()?;
        for migration in migrations::run_migrations(&db.connection)? {
            println!(
                "Recreated schema {} ({}): {}",
                migration.version,
                migration.name,
                migration.new_tables.join(", ")
            );
        }
    }

    println!("Initialized database at {}", db_path.display());
    Ok(())
}

fn print_report(report: &ReconcileReport) {
    if report.total() == 0 {
        println!("Nothing to reconcile.");
        return;
    }

    println!("Applied:     {}", report.applied);
    println!("Rolled back: {}", report.rolled_back);
    println!("Failed:      {}", report.failed);
}
