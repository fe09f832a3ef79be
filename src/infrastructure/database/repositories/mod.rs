//! Database repository implementations
//!
//! Per-aggregate SeaORM repositories + unified RepositoryProvider.

pub mod booking_repository;
pub mod payment_repository;
pub mod repository_provider;
pub mod room_repository;

pub use repository_provider::SeaOrmRepositoryProvider;

use std::sync::Arc;

use sea_orm::{DatabaseBackend, DbErr, SqlErr};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Serializes write transactions on SQLite.
///
/// SQLite admits one writer at a time, and a deferred transaction that reads
/// before it writes fails with `SQLITE_BUSY` instead of waiting when another
/// connection already holds the write lock. Taking the gate before `begin()`
/// keeps transactions from one pool from ever meeting that way. Other
/// backends get an open gate.
#[derive(Clone)]
pub(crate) struct WriteGate(Option<Arc<Mutex<()>>>);

impl WriteGate {
    pub fn for_backend(backend: DatabaseBackend) -> Self {
        match backend {
            DatabaseBackend::Sqlite => Self(Some(Arc::new(Mutex::new(())))),
            _ => Self(None),
        }
    }

    /// Hold the returned guard until the transaction has committed or
    /// rolled back.
    pub async fn enter(&self) -> Option<OwnedMutexGuard<()>> {
        match &self.0 {
            Some(lock) => Some(lock.clone().lock_owned().await),
            None => None,
        }
    }
}

/// Message of a unique-constraint violation, if `err` is one.
pub(crate) fn unique_violation(err: &DbErr) -> Option<String> {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => Some(message),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    use sea_orm::{ConnectOptions, Database, DatabaseConnection};
    use sea_orm_migration::MigratorTrait;

    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::{init_database, run_migrations, DatabaseConfig};

    /// Fresh in-memory database with every migration applied. A single
    /// connection keeps all callers on the same in-memory database.
    pub async fn memory_db() -> DatabaseConnection {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).sqlx_logging(false);
        let db = Database::connect(opts).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db
    }

    /// SQLite file in the temp directory, opened through [`init_database`]
    /// with the default pool size. Removed again on drop.
    pub struct FileDb {
        pub db: DatabaseConnection,
        path: PathBuf,
    }

    impl FileDb {
        pub async fn open() -> Self {
            let path = std::env::temp_dir().join(format!("booking-{}.db", uuid::Uuid::new_v4()));
            let config = DatabaseConfig {
                url: format!("sqlite://{}?mode=rwc", path.display()),
                ..DatabaseConfig::default()
            };
            let db = init_database(&config).await.unwrap();
            run_migrations(&db).await.unwrap();
            Self { db, path }
        }
    }

    impl Drop for FileDb {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm"] {
                let mut file = self.path.clone().into_os_string();
                file.push(suffix);
                let _ = std::fs::remove_file(file);
            }
        }
    }
}
