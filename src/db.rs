use crate::config::AppConfig;
use crate::errors::ServiceError;
use futures::future::BoxFuture;
use metrics::{counter, gauge, histogram};
use sea_orm::{
    ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Idle timeout duration
    pub idle_timeout: Duration,
    /// Acquire connection timeout
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
        }
    }
}

/// Establishes a connection pool to the database
///
/// # Errors
/// Returns a `ServiceError` if the connection cannot be established
pub async fn establish_connection(database_url: &str) -> Result<DbPool, ServiceError> {
    let config = DbConfig {
        url: database_url.to_string(),
        ..Default::default()
    };

    establish_connection_with_config(&config).await
}

/// Establishes a connection pool to the database with custom configuration
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, ServiceError> {
    debug!("Configuring database connection with: {:?}", config);

    let mut opt = ConnectOptions::new(config.url.clone());

    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(true);

    gauge!("storefront_db.max_connections", config.max_connections as f64);

    info!(
        "Connecting to database with max_connections={}",
        config.max_connections
    );

    let db_pool = Database::connect(opt)
        .await
        .map_err(ServiceError::DatabaseError)?;

    info!("Database connection pool established successfully");

    Ok(db_pool)
}

/// Establish DB pool using AppConfig tuning
pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    let db_cfg: DbConfig = cfg.into();
    establish_connection_with_config(&db_cfg).await
}

/// Runs database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    info!("Running database migrations");
    let start = std::time::Instant::now();

    let result = crate::migrator::Migrator::up(pool, None)
        .await
        .map_err(ServiceError::DatabaseError);

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => info!(
            "Database migrations completed successfully in {:?}",
            elapsed
        ),
        Err(e) => error!("Database migrations failed after {:?}: {}", elapsed, e),
    }

    result
}

/// Checks if the database connection is active
pub async fn check_connection(pool: &DbPool) -> Result<(), ServiceError> {
    pool.ping().await.map_err(ServiceError::DatabaseError)
}

/// Closes the database connection pool
pub async fn close_pool(pool: DbPool) -> Result<(), ServiceError> {
    info!("Closing database connection pool");
    pool.close().await.map_err(ServiceError::DatabaseError)
}

/// Transactional unit of work.
///
/// The sole owner of commit/rollback decisions for the checkout core: steps
/// executed inside [`UnitOfWork::run`] only return errors and never commit
/// or roll back themselves. On a step error the transaction is rolled back
/// and the step error propagated; if the rollback itself fails, both causes
/// are surfaced via [`ServiceError::RollbackFailed`] so operators can detect
/// a stuck transaction.
///
/// Dropping the returned future before completion (caller cancellation or
/// deadline) drops the open `DatabaseTransaction`, which rolls back on drop.
#[derive(Debug, Clone)]
pub struct UnitOfWork {
    pool: Arc<DbPool>,
}

impl UnitOfWork {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &DbPool {
        &self.pool
    }

    /// Executes `f` inside a single database transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns `Err`.
    pub async fn run<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: for<'a> FnOnce(&'a DatabaseTransaction) -> BoxFuture<'a, Result<T, ServiceError>>
            + Send,
        T: Send,
    {
        let transaction_id = Uuid::new_v4();
        let start = std::time::Instant::now();

        debug!(transaction_id = %transaction_id, "Starting database transaction");
        counter!("storefront_db.transaction.started", 1);

        let txn = self
            .pool
            .begin()
            .await
            .map_err(ServiceError::DatabaseError)?;

        let outcome = match f(&txn).await {
            Ok(value) => match txn.commit().await {
                Ok(()) => {
                    counter!("storefront_db.transaction.committed", 1);
                    debug!(transaction_id = %transaction_id, "Transaction committed");
                    Ok(value)
                }
                Err(commit_err) => {
                    counter!("storefront_db.transaction.rolled_back", 1);
                    error!(transaction_id = %transaction_id, error = %commit_err, "Transaction commit failed");
                    Err(ServiceError::DatabaseError(commit_err))
                }
            },
            Err(step_err) => {
                counter!("storefront_db.transaction.rolled_back", 1);
                warn!(transaction_id = %transaction_id, error = %step_err, "Rolling back transaction");
                match txn.rollback().await {
                    Ok(()) => Err(step_err),
                    Err(rollback_err) => {
                        error!(
                            transaction_id = %transaction_id,
                            error = %rollback_err,
                            "Rollback failed; transaction may be stuck"
                        );
                        Err(ServiceError::RollbackFailed {
                            source: Box::new(step_err),
                            rollback: rollback_err,
                        })
                    }
                }
            }
        };

        let elapsed = start.elapsed();
        histogram!("storefront_db.transaction.duration", elapsed);

        outcome
    }
}
