use anyhow::Context as _;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;

use procontent_delivery_migration::Migrator;

/// Application-wide advisory lock id for schema migrations. Fixed constant so
/// every process role agrees on it, and distinct from anything another
/// application sharing the database might pick.
pub const MIGRATION_LOCK_KEY: i64 = 724_553_109;

/// Mutual exclusion around a schema-mutating run. `acquire` blocks until the
/// current holder releases.
#[allow(async_fn_in_trait)]
pub trait SchemaLock {
    async fn acquire(&self) -> anyhow::Result<()>;
    async fn release(&self) -> anyhow::Result<()>;
}

/// Run `apply` while holding the lock. Release is attempted on both the
/// success and failure paths; the apply outcome propagates first so a failed
/// migration is not masked by a failed unlock.
pub async fn run_locked<L, F, Fut>(lock: &L, apply: F) -> anyhow::Result<()>
where
    L: SchemaLock,
    F: FnOnce() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    lock.acquire().await?;
    let outcome = apply().await;
    let released = lock.release().await;
    outcome?;
    released
}

/// Postgres advisory lock, session-scoped: lock and unlock must run on the
/// same connection.
pub struct PgAdvisoryLock {
    db: DatabaseConnection,
}

impl SchemaLock for PgAdvisoryLock {
    async fn acquire(&self) -> anyhow::Result<()> {
        let backend = self.db.get_database_backend();
        self.db
            .execute(Statement::from_sql_and_values(
                backend,
                "SELECT pg_advisory_lock($1)",
                [MIGRATION_LOCK_KEY.into()],
            ))
            .await
            .context("acquire migration advisory lock")?;
        tracing::info!(lock_key = MIGRATION_LOCK_KEY, "migration lock acquired");
        Ok(())
    }

    async fn release(&self) -> anyhow::Result<()> {
        let backend = self.db.get_database_backend();
        self.db
            .execute(Statement::from_sql_and_values(
                backend,
                "SELECT pg_advisory_unlock($1)",
                [MIGRATION_LOCK_KEY.into()],
            ))
            .await
            .context("release migration advisory lock")?;
        tracing::info!(lock_key = MIGRATION_LOCK_KEY, "migration lock released");
        Ok(())
    }
}

/// Run pending schema migrations, serialized across the whole fleet.
///
/// Concurrently starting roles (web, worker, beat) all call this; the
/// advisory lock makes the second acquirer block until the first has
/// released, so at most one migration run is in flight at a time.
///
/// The lock is session-scoped in Postgres, so the connection pool here is
/// pinned to a single connection: lock, migration, and unlock all share one
/// session.
pub async fn run_migrations(database_url: &str) -> anyhow::Result<()> {
    if database_url.trim().is_empty() {
        anyhow::bail!("DATABASE_URL is missing or empty");
    }
    let mut opts = ConnectOptions::new(database_url);
    opts.max_connections(1);
    let db = Database::connect(opts)
        .await
        .context("connect for migrations")?;

    let lock = PgAdvisoryLock { db: db.clone() };
    run_locked(&lock, || async {
        Migrator::up(&db, None).await.context("apply migrations")
    })
    .await
}
