//! PostgreSQL storage implementation with connection pooling

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};

use crate::domain::{
    Application, ApplicationId, ApplicationRepository, DomainError, Key, KeyMaterial, KeyStore,
    KeyTransaction, KeyType,
};

/// PostgreSQL storage configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/application_keys".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }

    /// Open a connection pool
    pub async fn connect(&self) -> Result<PgPool, DomainError> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(Duration::from_secs(self.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(self.idle_timeout_secs))
            .connect(&self.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))
    }
}

/// Key store backed by the `application_key` table
#[derive(Clone)]
pub struct PgKeyStore {
    pool: PgPool,
}

impl Debug for PgKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgKeyStore")
            .field("table_name", &"application_key")
            .finish()
    }
}

impl PgKeyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl KeyStore for PgKeyStore {
    type Transaction = PgKeyTransaction;

    async fn begin(&self) -> Result<Self::Transaction, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        Ok(PgKeyTransaction { tx })
    }
}

/// Database transaction; sqlx rolls it back when dropped uncommitted
pub struct PgKeyTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl KeyTransaction for PgKeyTransaction {
    async fn insert(&mut self, key: &Key) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO application_key
                (application_id, name, key_type, public_key, private_key, key_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(key.owner_id().value())
        .bind(key.name())
        .bind(key.key_type().as_str())
        .bind(key.public())
        .bind(key.private())
        .bind(key.key_id())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                DomainError::constraint_violation(format!(
                    "key {} already exists on application {}",
                    key.name(),
                    key.owner_id()
                ))
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                DomainError::constraint_violation(format!(
                    "application {} does not exist",
                    key.owner_id()
                ))
            }
            other => DomainError::storage(format!("Failed to insert key: {}", other)),
        })?;

        Ok(())
    }

    async fn delete_by_name(
        &mut self,
        owner_id: ApplicationId,
        name: &str,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM application_key
            WHERE id = (
                SELECT id FROM application_key
                WHERE application_id = $1 AND name = $2
                LIMIT 1
            )
            "#,
        )
        .bind(owner_id.value())
        .bind(name)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to delete key: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_application(
        &mut self,
        owner_id: ApplicationId,
    ) -> Result<Vec<Key>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT name, key_type, public_key, private_key, key_id
            FROM application_key
            WHERE application_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id.value())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list keys: {}", e)))?;

        rows.iter().map(|row| key_from_row(owner_id, row)).collect()
    }

    async fn commit(self) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit transaction: {}", e)))
    }

    async fn rollback(self) -> Result<(), DomainError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to roll back transaction: {}", e)))
    }
}

fn key_from_row(owner_id: ApplicationId, row: &PgRow) -> Result<Key, DomainError> {
    let column = |e: sqlx::Error| DomainError::storage(format!("Failed to read key row: {}", e));

    let name: String = row.try_get("name").map_err(column)?;
    let raw_type: String = row.try_get("key_type").map_err(column)?;
    let public: String = row.try_get("public_key").map_err(column)?;
    let private: String = row.try_get("private_key").map_err(column)?;
    let key_id: Option<String> = row.try_get("key_id").map_err(column)?;

    let key_type: KeyType = raw_type.parse().map_err(|_| {
        DomainError::storage(format!("key {} has unknown stored type {}", name, raw_type))
    })?;

    let material = KeyMaterial::from_stored(key_type, public, private, key_id)
        .map_err(|e| e.context(format!("key {}", name)))?;

    Ok(Key::new(owner_id, name, material))
}

/// Application lookup against the `application` table
#[derive(Clone)]
pub struct PgApplicationRepository {
    pool: PgPool,
}

impl Debug for PgApplicationRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgApplicationRepository")
            .field("table_name", &"application")
            .finish()
    }
}

impl PgApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationRepository for PgApplicationRepository {
    async fn load_by_project_and_name(
        &self,
        project_key: &str,
        app_name: &str,
    ) -> Result<Option<Application>, DomainError> {
        let row = sqlx::query(
            "SELECT id, project_key, name, from_repository FROM application \
             WHERE project_key = $1 AND name = $2",
        )
        .bind(project_key)
        .bind(app_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to load application: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let column =
            |e: sqlx::Error| DomainError::storage(format!("Failed to read application row: {}", e));

        let id: i64 = row.try_get("id").map_err(column)?;
        let project_key: String = row.try_get("project_key").map_err(column)?;
        let name: String = row.try_get("name").map_err(column)?;
        let from_repository: String = row.try_get("from_repository").map_err(column)?;

        Ok(Some(
            Application::new(ApplicationId::new(id), project_key, name)
                .with_repository(from_repository),
        ))
    }
}
