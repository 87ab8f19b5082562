//! Connection handling and schema synchronization.
//!
//! [`DbHandle`] is the scenario's stand-in for an ORM instance: it owns the
//! connection plus the after-bulk-sync hook registry, and knows how to
//! force-synchronize the schema (drop and recreate both tables from the
//! entity definitions).

use parking_lot::Mutex;
use sea_orm::sea_query::Table;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, EntityName, Schema,
    Statement,
};
use tracing::debug;

use crate::config::ReproConfig;
use crate::entity::{child, parent};
use crate::error::ReproError;

type SyncHook = Box<dyn Fn() + Send + Sync>;

/// Options for [`DbHandle::sync`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Drop existing tables before recreating them.
    pub force: bool,
}

pub struct DbHandle {
    conn: DatabaseConnection,
    after_sync: Mutex<Vec<SyncHook>>,
}

impl DbHandle {
    /// Opens a connection according to `cfg`.
    pub async fn connect(cfg: &ReproConfig) -> Result<Self, ReproError> {
        let mut opts = ConnectOptions::new(cfg.dsn.clone());
        opts.sqlx_logging(cfg.log_queries)
            .connect_timeout(cfg.connect_timeout);

        if is_memory_dsn(&cfg.dsn) {
            // Every pooled connection to sqlite::memory: gets its own empty
            // database, so the pool must collapse to a single connection.
            opts.max_connections(1).min_connections(1);
        } else {
            opts.max_connections(cfg.max_connections);
        }

        let conn = Database::connect(opts).await?;

        if conn.get_database_backend() == DbBackend::Sqlite {
            // Cascade requires foreign-key enforcement on SQLite.
            conn.execute(Statement::from_string(
                DbBackend::Sqlite,
                "PRAGMA foreign_keys = ON;",
            ))
            .await?;
        }

        debug!(dsn = %cfg.dsn, "database connection established");

        Ok(Self {
            conn,
            after_sync: Mutex::new(Vec::new()),
        })
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Registers a hook fired after every [`sync`](Self::sync).
    pub fn after_bulk_sync<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.after_sync.lock().push(Box::new(hook));
    }

    /// Synchronizes the schema with the entity definitions, then fires the
    /// registered after-bulk-sync hooks.
    pub async fn sync(&self, opts: SyncOptions) -> Result<(), ReproError> {
        let backend = self.conn.get_database_backend();

        if opts.force {
            // children first, the parent table is referenced
            for stmt in [
                Table::drop()
                    .table(child::Entity.table_ref())
                    .if_exists()
                    .to_owned(),
                Table::drop()
                    .table(parent::Entity.table_ref())
                    .if_exists()
                    .to_owned(),
            ] {
                self.conn.execute(backend.build(&stmt)).await?;
            }
        }

        let schema = Schema::new(backend);
        for mut create in [
            schema.create_table_from_entity(parent::Entity),
            schema.create_table_from_entity(child::Entity),
        ] {
            if !opts.force {
                create.if_not_exists();
            }
            self.conn.execute(backend.build(&create)).await?;
        }

        debug!(force = opts.force, "schema synchronized");

        let hooks = self.after_sync.lock();
        for hook in hooks.iter() {
            hook();
        }

        Ok(())
    }

    pub async fn close(self) -> Result<(), ReproError> {
        self.conn.close().await?;
        Ok(())
    }
}

/// Whether a DSN addresses an in-memory SQLite database.
pub fn is_memory_dsn(dsn: &str) -> bool {
    dsn.contains(":memory:") || dsn.contains("mode=memory")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::spy::CallSpy;

    #[test]
    fn memory_dsn_classification() {
        assert!(is_memory_dsn("sqlite::memory:"));
        assert!(is_memory_dsn("sqlite://:memory:"));
        assert!(is_memory_dsn("sqlite://file:repro?mode=memory&cache=shared"));
        assert!(!is_memory_dsn("sqlite://repro.db?mode=rwc"));
        assert!(!is_memory_dsn("postgres://localhost/repro"));
    }

    #[tokio::test]
    async fn sync_fires_registered_hooks_each_time() {
        let db = DbHandle::connect(&ReproConfig::default()).await.unwrap();

        let spy = CallSpy::new();
        db.after_bulk_sync({
            let spy = spy.clone();
            move || spy.call()
        });

        db.sync(SyncOptions { force: true }).await.unwrap();
        db.sync(SyncOptions { force: true }).await.unwrap();

        assert_eq!(spy.count(), 2);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn sync_without_force_creates_missing_tables() {
        let db = DbHandle::connect(&ReproConfig::default()).await.unwrap();
        db.sync(SyncOptions::default()).await.unwrap();
        // repeatable without force: tables are created with IF NOT EXISTS
        db.sync(SyncOptions::default()).await.unwrap();

        let probe = db
            .conn()
            .execute(Statement::from_string(
                DbBackend::Sqlite,
                "SELECT count(*) FROM child;",
            ))
            .await;
        assert!(probe.is_ok(), "child table missing: {probe:?}");
        db.close().await.unwrap();
    }
}
