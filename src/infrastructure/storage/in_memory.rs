//! In-memory storage implementation
//!
//! Useful for testing and development. Data is lost when the process
//! terminates. A key transaction holds the whole store lock until it ends,
//! so transactions are serializable.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{
    Application, ApplicationId, ApplicationRepository, DomainError, Key, KeyStore, KeyTransaction,
};

/// Store operation that can be forced to misbehave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFault {
    Begin,
    Insert,
    Delete,
    List,
    Commit,
    /// Deletes find no row, as if another transaction removed it first
    LostRow,
}

#[derive(Debug, Default)]
struct State {
    rows: Vec<Key>,
    fault: Option<StoreFault>,
}

impl State {
    fn check(&self, operation: StoreFault) -> Result<(), DomainError> {
        match self.fault {
            Some(fault) if fault == operation => Err(DomainError::storage(format!(
                "injected {:?} failure",
                operation
            ))),
            _ => Ok(()),
        }
    }
}

/// Thread-safe in-memory key store
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryKeyStore {
    /// Creates a new empty key store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the given operation fail until the fault is cleared
    pub async fn set_fault(&self, fault: Option<StoreFault>) {
        self.state.lock().await.fault = fault;
    }

    /// Committed keys of every application, in insertion order
    pub async fn committed(&self) -> Vec<Key> {
        self.state.lock().await.rows.clone()
    }
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    type Transaction = InMemoryKeyTransaction;

    async fn begin(&self) -> Result<Self::Transaction, DomainError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        guard.check(StoreFault::Begin)?;

        let staged = guard.rows.clone();
        Ok(InMemoryKeyTransaction { guard, staged })
    }
}

/// Open transaction over the in-memory store
///
/// Changes are applied to a staged copy and published on commit; dropping
/// the transaction discards them and releases the store.
#[derive(Debug)]
pub struct InMemoryKeyTransaction {
    guard: OwnedMutexGuard<State>,
    staged: Vec<Key>,
}

#[async_trait]
impl KeyTransaction for InMemoryKeyTransaction {
    async fn insert(&mut self, key: &Key) -> Result<(), DomainError> {
        self.guard.check(StoreFault::Insert)?;

        let exists = self
            .staged
            .iter()
            .any(|k| k.owner_id() == key.owner_id() && k.name() == key.name());

        if exists {
            return Err(DomainError::constraint_violation(format!(
                "key {} already exists on application {}",
                key.name(),
                key.owner_id()
            )));
        }

        self.staged.push(key.clone());
        Ok(())
    }

    async fn delete_by_name(
        &mut self,
        owner_id: ApplicationId,
        name: &str,
    ) -> Result<bool, DomainError> {
        self.guard.check(StoreFault::Delete)?;

        if self.guard.fault == Some(StoreFault::LostRow) {
            return Ok(false);
        }

        match self
            .staged
            .iter()
            .position(|k| k.owner_id() == owner_id && k.name() == name)
        {
            Some(index) => {
                self.staged.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_by_application(
        &mut self,
        owner_id: ApplicationId,
    ) -> Result<Vec<Key>, DomainError> {
        self.guard.check(StoreFault::List)?;

        Ok(self
            .staged
            .iter()
            .filter(|k| k.owner_id() == owner_id)
            .cloned()
            .collect())
    }

    async fn commit(mut self) -> Result<(), DomainError> {
        self.guard.check(StoreFault::Commit)?;

        self.guard.rows = std::mem::take(&mut self.staged);
        Ok(())
    }

    async fn rollback(self) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Thread-safe in-memory application catalog
#[derive(Debug, Default)]
pub struct InMemoryApplicationRepository {
    applications: RwLock<Vec<Application>>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an application, assigning the next id
    pub fn add_application(
        &self,
        project_key: &str,
        name: &str,
        from_repository: Option<&str>,
    ) -> Result<Application, DomainError> {
        let mut applications = self.applications.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        if applications
            .iter()
            .any(|a| a.project_key() == project_key && a.name() == name)
        {
            return Err(DomainError::constraint_violation(format!(
                "application {}/{} already exists",
                project_key, name
            )));
        }

        let id = ApplicationId::new(applications.len() as i64 + 1);
        let mut application = Application::new(id, project_key, name);
        if let Some(repository) = from_repository {
            application = application.with_repository(repository);
        }

        applications.push(application.clone());
        Ok(application)
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn load_by_project_and_name(
        &self,
        project_key: &str,
        app_name: &str,
    ) -> Result<Option<Application>, DomainError> {
        let applications = self.applications.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(applications
            .iter()
            .find(|a| a.project_key() == project_key && a.name() == app_name)
            .cloned())
    }
}
