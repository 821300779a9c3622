use clap::{Parser, Subcommand};
use comfy_table::Table;
use database::connection::{connect, run_migrations};
use database::repository::DbRepository;
use rust_decimal::Decimal;
use std::net::{IpAddr, SocketAddr};
use tracing_subscriber::EnvFilter;

/// The main entry point for the DonaTalk application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (DATABASE_URL, secrets).
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => handle_serve(args).await,
        Commands::Audit => handle_audit().await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// The donation-brokering backend connecting pitchers and listeners.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server.
    Serve(ServeArgs),
    /// Check every pitcher's balance against the sum of their fund history.
    Audit,
}

#[derive(Parser)]
struct ServeArgs {
    /// Override the port from config.toml.
    #[arg(long)]
    port: Option<u16>,
}

async fn handle_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = configuration::load_config()?;
    let host: IpAddr = config.server.host.parse()?;
    let port = args.port.unwrap_or(config.server.port);
    let addr = SocketAddr::new(host, port);

    web_server::run_server(addr, config).await
}

/// Prints a balance/ledger consistency report.
///
/// The ledger updater maintains the invariant that a pitcher's stored balance
/// equals the sum of their fund history rows; any drift reported here means
/// the balance was mutated outside the ledger.
async fn handle_audit() -> anyhow::Result<()> {
    let db_pool = connect().await?;
    run_migrations(&db_pool).await?;
    let repo = DbRepository::new(db_pool);

    let rows = repo.audit_balances().await?;

    let mut table = Table::new();
    table.set_header(vec!["Pitcher", "ID", "Balance", "Ledger Total", "Drift"]);

    let mut drifted = 0usize;
    for row in &rows {
        let drift = row.drift();
        if drift != Decimal::ZERO {
            drifted += 1;
        }
        table.add_row(vec![
            row.full_name.clone(),
            row.pitcher_id.to_string(),
            row.credit_balance.to_string(),
            row.ledger_total.to_string(),
            drift.to_string(),
        ]);
    }

    println!("{table}");

    if drifted > 0 {
        tracing::warn!(
            drifted,
            total = rows.len(),
            "Pitcher balances disagree with the fund history ledger."
        );
        anyhow::bail!("{} of {} pitcher balances have drifted", drifted, rows.len());
    }

    println!("All {} pitcher balances match the ledger.", rows.len());
    Ok(())
}
