//! Key store traits

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::Key;
use crate::domain::application::ApplicationId;
use crate::domain::DomainError;

/// Transactional persistence for application keys
#[async_trait]
pub trait KeyStore: Send + Sync + Debug {
    type Transaction: KeyTransaction;

    /// Open a transaction; dropping it without [`KeyTransaction::commit`]
    /// rolls it back
    async fn begin(&self) -> Result<Self::Transaction, DomainError>;
}

/// Key operations scoped to one open transaction
#[async_trait]
pub trait KeyTransaction: Send {
    /// Persist a new key; fails with a constraint violation if the owning
    /// application already has a key with the same name
    async fn insert(&mut self, key: &Key) -> Result<(), DomainError>;

    /// Remove at most one key, reporting whether a row was removed
    async fn delete_by_name(
        &mut self,
        owner_id: ApplicationId,
        name: &str,
    ) -> Result<bool, DomainError>;

    /// Keys of an application in insertion order, private material included
    async fn list_by_application(&mut self, owner_id: ApplicationId)
        -> Result<Vec<Key>, DomainError>;

    /// Make every change of this transaction visible
    async fn commit(self) -> Result<(), DomainError>;

    /// Discard every change of this transaction
    async fn rollback(self) -> Result<(), DomainError>;
}
