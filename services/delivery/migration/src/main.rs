use sea_orm_migration::prelude::*;

use procontent_delivery_migration::Migrator;

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
