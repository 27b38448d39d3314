use clap::{Parser, Subcommand};
use sea_orm::Database;
use tracing::info;

use procontent_core::tracing::init_tracing;
use procontent_delivery::config::DeliveryConfig;
use procontent_delivery::infra::migrate::run_migrations;
use procontent_delivery::router::build_router;
use procontent_delivery::state::AppState;
use procontent_delivery::worker::{run_beat, run_worker};

#[derive(Parser)]
#[command(name = "delivery", about = "Delivery outbox service")]
struct Cli {
    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand)]
enum Role {
    /// Serve the HTTP API.
    Web,
    /// Run the site-check worker loop.
    Worker,
    /// Run the periodic retention schedule.
    Beat,
    /// Apply pending migrations and exit.
    Migrate,
    /// Exec an arbitrary command (container entrypoint passthrough).
    Run {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    // Passthrough needs no configuration of its own.
    if let Role::Run { command } = &cli.role {
        let status = std::process::Command::new(&command[0])
            .args(&command[1..])
            .status()
            .expect("failed to exec passthrough command");
        std::process::exit(status.code().unwrap_or(1));
    }

    let config = DeliveryConfig::from_env();

    if matches!(cli.role, Role::Migrate) || config.run_migrations {
        run_migrations(&config.database_url)
            .await
            .expect("migration failed");
    }
    if matches!(cli.role, Role::Migrate) {
        return;
    }

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");
    let port = config.port;
    let state = AppState::new(db, config);

    match cli.role {
        Role::Web => {
            let router = build_router(state);
            let addr = format!("0.0.0.0:{port}");
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .expect("failed to bind");
            info!("delivery service listening on {addr}");
            axum::serve(listener, router).await.expect("server error");
        }
        Role::Worker => {
            info!("delivery worker started");
            run_worker(state).await;
        }
        Role::Beat => {
            info!("delivery beat started");
            run_beat(state).await;
        }
        Role::Migrate | Role::Run { .. } => unreachable!(),
    }
}
