//! Application lookup trait

use async_trait::async_trait;

use super::entity::Application;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Read access to the applications owned by the surrounding platform
///
/// Implementations return the application without its key collection; keys
/// are loaded through the key store.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Find an application by project key and application name
    async fn load_by_project_and_name(
        &self,
        project_key: &str,
        app_name: &str,
    ) -> Result<Option<Application>, DomainError>;
}
