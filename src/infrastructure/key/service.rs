//! Application key service
//!
//! Provides the key lifecycle operations: list, add and delete keys of an
//! application. Mutations run in a single store transaction and emit a
//! lifecycle event once committed.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::key::{normalize_key_name, validate_key_name};
use crate::domain::{
    Application, ApplicationRepository, DomainError, Key, KeyEvent, KeyEventPublisher,
    KeyGenerator, KeyMaterial, KeyStore, KeyTransaction, LoadOptions, RequestContext,
};

use super::registry::KeyGeneratorRegistry;

/// Caller input for creating a key
///
/// Missing fields read as empty and fail the naming or key type checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddKeyRequest {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub key_type: String,
}

impl AddKeyRequest {
    pub fn new(name: impl Into<String>, key_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_type: key_type.into(),
        }
    }
}

/// Key lifecycle operations over one key store
pub struct ApplicationKeyService<S>
where
    S: KeyStore,
{
    applications: Arc<dyn ApplicationRepository>,
    store: Arc<S>,
    generators: Arc<KeyGeneratorRegistry>,
    events: Arc<dyn KeyEventPublisher>,
}

impl<S: KeyStore> fmt::Debug for ApplicationKeyService<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationKeyService")
            .field("store", &self.store)
            .field("generators", &self.generators)
            .finish()
    }
}

impl<S: KeyStore> ApplicationKeyService<S> {
    pub fn new(
        applications: Arc<dyn ApplicationRepository>,
        store: Arc<S>,
        generators: Arc<KeyGeneratorRegistry>,
        events: Arc<dyn KeyEventPublisher>,
    ) -> Self {
        Self {
            applications,
            store,
            generators,
            events,
        }
    }

    /// Load an application, with its keys when requested
    pub async fn load_application(
        &self,
        ctx: &RequestContext,
        project_key: &str,
        app_name: &str,
        options: LoadOptions,
    ) -> Result<Application, DomainError> {
        ctx.bounded("load application", async {
            let application = self
                .applications
                .load_by_project_and_name(project_key, app_name)
                .await
                .map_err(|e| e.context(format!("cannot load application {}", app_name)))?
                .ok_or_else(|| {
                    DomainError::not_found(format!(
                        "application {} in project {}",
                        app_name, project_key
                    ))
                })?;

            if !options.with_keys {
                return Ok(application);
            }

            let mut tx = self
                .store
                .begin()
                .await
                .map_err(|e| e.context("cannot start transaction"))?;
            let keys = tx
                .list_by_application(application.id())
                .await
                .map_err(|e| e.context(format!("cannot load keys of {}", app_name)))?;
            tx.rollback().await?;

            Ok(application.with_keys(keys))
        })
        .await
    }

    /// Keys of an application, private material included
    pub async fn list_keys(
        &self,
        ctx: &RequestContext,
        project_key: &str,
        app_name: &str,
    ) -> Result<Vec<Key>, DomainError> {
        debug!(project_key, application = app_name, "Listing keys");

        let application = self
            .load_application(ctx, project_key, app_name, LoadOptions::WITH_KEYS)
            .await?;

        Ok(application.into_keys())
    }

    /// Delete the key named `key_name` from an application
    pub async fn delete_key(
        &self,
        ctx: &RequestContext,
        project_key: &str,
        app_name: &str,
        key_name: &str,
    ) -> Result<(), DomainError> {
        let application = self
            .load_application(ctx, project_key, app_name, LoadOptions::WITH_KEYS)
            .await?;

        ensure_mutable(&application)?;

        let deleted = ctx
            .bounded("delete key", async {
                let mut tx = self
                    .store
                    .begin()
                    .await
                    .map_err(|e| e.context("cannot start transaction"))?;

                let Some(key) = application.keys().iter().find(|k| k.name() == key_name) else {
                    return Err(DomainError::key_not_found(key_name, app_name));
                };

                let removed = tx
                    .delete_by_name(application.id(), key.name())
                    .await
                    .map_err(|e| e.context(format!("cannot delete key {}", key_name)))?;

                // Someone else removed it since the application was loaded
                if !removed {
                    return Err(DomainError::key_not_found(key_name, app_name));
                }

                tx.commit().await?;
                Ok(key.clone())
            })
            .await?;

        info!(
            project_key,
            application = app_name,
            key_name,
            key_type = %deleted.key_type(),
            actor = %ctx.actor(),
            "Key deleted"
        );

        self.publish(KeyEvent::key_deleted(
            project_key,
            &application,
            deleted,
            ctx.actor().clone(),
        ))
        .await;

        Ok(())
    }

    /// Generate a key pair and attach it to an application
    pub async fn add_key(
        &self,
        ctx: &RequestContext,
        project_key: &str,
        app_name: &str,
        request: AddKeyRequest,
    ) -> Result<Key, DomainError> {
        validate_key_name(&request.name)?;

        let application = self
            .load_application(ctx, project_key, app_name, LoadOptions::DEFAULT)
            .await?;
        let owner_id = application.id();

        ensure_mutable(&application)?;

        let name = normalize_key_name(&request.name);
        let generator = self.generators.resolve(&request.key_type)?;
        let material = generate(generator, name.clone()).await?;
        let key = Key::new(owner_id, name, material);

        ctx.bounded("add key", async {
            let mut tx = self
                .store
                .begin()
                .await
                .map_err(|e| e.context("cannot start transaction"))?;
            tx.insert(&key)
                .await
                .map_err(|e| e.context(format!("cannot insert key {}", key.name())))?;
            tx.commit().await
        })
        .await?;

        info!(
            project_key,
            application = app_name,
            key_name = key.name(),
            key_type = %key.key_type(),
            actor = %ctx.actor(),
            "Key added"
        );

        self.publish(KeyEvent::key_added(
            project_key,
            &application,
            key.clone(),
            ctx.actor().clone(),
        ))
        .await;

        Ok(key)
    }

    /// Parse a JSON request body, then add the key it describes
    pub async fn add_key_from_json(
        &self,
        ctx: &RequestContext,
        project_key: &str,
        app_name: &str,
        body: &str,
    ) -> Result<Key, DomainError> {
        let request: AddKeyRequest = serde_json::from_str(body)
            .map_err(|e| DomainError::bad_request(format!("invalid key request: {}", e)))?;

        self.add_key(ctx, project_key, app_name, request).await
    }

    async fn publish(&self, event: KeyEvent) {
        let kind = event.kind();
        let event_id = event.id();

        if let Err(e) = self.events.publish(event).await {
            warn!(%kind, %event_id, error = %e, "Failed to publish key event");
        }
    }
}

fn ensure_mutable(application: &Application) -> Result<(), DomainError> {
    if application.is_repository_linked() {
        return Err(DomainError::forbidden(format!(
            "keys of application {} are managed by repository {}",
            application.name(),
            application.from_repository()
        )));
    }
    Ok(())
}

/// Run a generator on the blocking pool
async fn generate(
    generator: Arc<dyn KeyGenerator>,
    name: String,
) -> Result<KeyMaterial, DomainError> {
    tokio::task::spawn_blocking(move || generator.generate(&name))
        .await
        .map_err(|e| DomainError::generation(format!("key generation task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::domain::{
        Actor, ApplicationId, KeyEventKind, KeyType, MockApplicationRepository,
        MockKeyEventPublisher,
    };
    use crate::infrastructure::event::{BroadcastEventPublisher, LoggingEventPublisher};
    use crate::infrastructure::storage::{InMemoryApplicationRepository, InMemoryKeyStore, StoreFault};

    const REPOSITORY: &str = "git@example.com:myproj/linked.git";

    #[derive(Debug)]
    struct FakeGenerator {
        key_type: KeyType,
    }

    impl KeyGenerator for FakeGenerator {
        fn key_type(&self) -> KeyType {
            self.key_type
        }

        fn generate(&self, name: &str) -> Result<KeyMaterial, DomainError> {
            Ok(match self.key_type {
                KeyType::Ssh => KeyMaterial::ssh(format!("ssh-rsa AAAA {}", name), "ssh-private"),
                KeyType::Pgp => KeyMaterial::pgp("pgp-public", "pgp-private", "0123456789ABCDEF"),
            })
        }
    }

    #[derive(Debug)]
    struct FailingGenerator;

    impl KeyGenerator for FailingGenerator {
        fn key_type(&self) -> KeyType {
            KeyType::Ssh
        }

        fn generate(&self, _name: &str) -> Result<KeyMaterial, DomainError> {
            Err(DomainError::generation("entropy source unavailable"))
        }
    }

    fn fake_generators() -> Arc<KeyGeneratorRegistry> {
        Arc::new(
            KeyGeneratorRegistry::new()
                .register(Arc::new(FakeGenerator { key_type: KeyType::Ssh }))
                .register(Arc::new(FakeGenerator { key_type: KeyType::Pgp })),
        )
    }

    fn ctx() -> RequestContext {
        RequestContext::new(Actor::new("alice"))
    }

    struct Fixture {
        service: ApplicationKeyService<InMemoryKeyStore>,
        store: Arc<InMemoryKeyStore>,
    }

    fn fixture_with(
        generators: Arc<KeyGeneratorRegistry>,
        events: Arc<dyn KeyEventPublisher>,
    ) -> Fixture {
        let applications = InMemoryApplicationRepository::new();
        applications.add_application("myproj", "myapp", None).unwrap();
        applications
            .add_application("myproj", "linked", Some(REPOSITORY))
            .unwrap();

        let store = Arc::new(InMemoryKeyStore::new());
        let service =
            ApplicationKeyService::new(Arc::new(applications), store.clone(), generators, events);

        Fixture { service, store }
    }

    fn fixture() -> Fixture {
        fixture_with(fake_generators(), Arc::new(LoggingEventPublisher::new()))
    }

    fn silent_events() -> MockKeyEventPublisher {
        let mut events = MockKeyEventPublisher::new();
        events.expect_publish().never();
        events
    }

    #[tokio::test]
    async fn test_add_list_delete_scenario() {
        let generators = Arc::new(KeyGeneratorRegistry::with_rsa_bits(1024, 1024));
        let Fixture { service, .. } =
            fixture_with(generators, Arc::new(LoggingEventPublisher::new()));
        let ctx = ctx();

        let key = service
            .add_key(&ctx, "myproj", "myapp", AddKeyRequest::new("deploy", "ssh"))
            .await
            .unwrap();
        assert_eq!(key.name(), "app-deploy");
        assert_eq!(key.key_type(), KeyType::Ssh);
        assert!(key.public().starts_with("ssh-rsa "));
        assert!(key.key_id().is_none());

        let keys = service.list_keys(&ctx, "myproj", "myapp").await.unwrap();
        assert_eq!(keys, vec![key]);

        service
            .delete_key(&ctx, "myproj", "myapp", "app-deploy")
            .await
            .unwrap();
        assert!(service
            .list_keys(&ctx, "myproj", "myapp")
            .await
            .unwrap()
            .is_empty());

        let err = service
            .delete_key(&ctx, "myproj", "myapp", "app-deploy")
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::key_not_found("app-deploy", "myapp"));
    }

    #[tokio::test]
    async fn test_add_pgp_key() {
        let generators = Arc::new(KeyGeneratorRegistry::with_rsa_bits(1024, 1024));
        let Fixture { service, .. } =
            fixture_with(generators, Arc::new(LoggingEventPublisher::new()));

        let key = service
            .add_key_from_json(&ctx(), "myproj", "myapp", r#"{"name":"signing","type":"pgp"}"#)
            .await
            .unwrap();

        assert_eq!(key.name(), "app-signing");
        assert_eq!(key.key_type(), KeyType::Pgp);
        assert_eq!(key.key_id().map(str::len), Some(16));
        assert!(key.public().contains("PGP PUBLIC KEY BLOCK"));
        assert!(key.private().contains("PGP PRIVATE KEY BLOCK"));
    }

    #[tokio::test]
    async fn test_add_keeps_existing_prefix() {
        let Fixture { service, .. } = fixture();

        let key = service
            .add_key(&ctx(), "myproj", "myapp", AddKeyRequest::new("app-foo", "ssh"))
            .await
            .unwrap();
        assert_eq!(key.name(), "app-foo");
    }

    #[tokio::test]
    async fn test_add_duplicate_name_fails() {
        let Fixture { service, store } = fixture();
        let ctx = ctx();

        let first = service
            .add_key(&ctx, "myproj", "myapp", AddKeyRequest::new("deploy", "ssh"))
            .await
            .unwrap();

        // "app-deploy" normalizes to the same name
        let err = service
            .add_key(&ctx, "myproj", "myapp", AddKeyRequest::new("app-deploy", "pgp"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ConstraintViolation { .. }));

        assert_eq!(store.committed().await, vec![first]);
    }

    #[tokio::test]
    async fn test_concurrent_adds_of_same_name() {
        let Fixture { service, store } = fixture();
        let ctx = ctx();

        let (first, second) = tokio::join!(
            service.add_key(&ctx, "myproj", "myapp", AddKeyRequest::new("deploy", "ssh")),
            service.add_key(&ctx, "myproj", "myapp", AddKeyRequest::new("deploy", "ssh")),
        );

        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(DomainError::ConstraintViolation { .. }))));
        assert_eq!(store.committed().await.len(), 1);
    }

    #[tokio::test]
    async fn test_repository_linked_application_is_immutable() {
        let Fixture { service, store } = fixture_with(fake_generators(), Arc::new(silent_events()));
        let ctx = ctx();

        for key_type in ["ssh", "pgp", "rsa-unsupported"] {
            let err = service
                .add_key(&ctx, "myproj", "linked", AddKeyRequest::new("deploy", key_type))
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Forbidden { .. }), "{key_type}");
        }

        let err = service
            .delete_key(&ctx, "myproj", "linked", "app-missing")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));

        assert!(store.committed().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_existing_key_on_linked_application_is_forbidden() {
        let store = Arc::new(InMemoryKeyStore::new());
        let linked = Application::new(ApplicationId::new(9), "myproj", "linked")
            .with_repository(REPOSITORY);

        let existing = Key::new(linked.id(), "app-deploy", KeyMaterial::ssh("pub", "priv"));
        let mut tx = store.begin().await.unwrap();
        tx.insert(&existing).await.unwrap();
        tx.commit().await.unwrap();

        let mut applications = MockApplicationRepository::new();
        applications
            .expect_load_by_project_and_name()
            .returning(move |_, _| Ok(Some(linked.clone())));

        let service = ApplicationKeyService::new(
            Arc::new(applications),
            store.clone(),
            fake_generators(),
            Arc::new(silent_events()),
        );

        let err = service
            .delete_key(&ctx(), "myproj", "linked", "app-deploy")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));
        assert_eq!(store.committed().await, vec![existing]);
    }

    #[tokio::test]
    async fn test_unknown_key_type_inserts_nothing() {
        let Fixture { service, store } = fixture_with(fake_generators(), Arc::new(silent_events()));

        let err = service
            .add_key(&ctx(), "myproj", "myapp", AddKeyRequest::new("deploy", "rsa-unsupported"))
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::unknown_key_type("rsa-unsupported"));
        assert!(store.committed().await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_fails_before_lookup() {
        let mut applications = MockApplicationRepository::new();
        applications.expect_load_by_project_and_name().never();

        let service = ApplicationKeyService::new(
            Arc::new(applications),
            Arc::new(InMemoryKeyStore::new()),
            fake_generators(),
            Arc::new(silent_events()),
        );
        let ctx = ctx();

        for body in ["not json", r#"{"name":5,"type":"ssh"}"#, r#"{"name":"deploy""#] {
            let err = service
                .add_key_from_json(&ctx, "myproj", "myapp", body)
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::BadRequest { .. }), "{body}");
        }

        let err = service
            .add_key_from_json(&ctx, "myproj", "myapp", r#"{"type":"ssh"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidKeyPattern { .. }));

        let err = service
            .add_key(&ctx, "myproj", "myapp", AddKeyRequest::new("bad name!", "ssh"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidKeyPattern { .. }));
    }

    #[tokio::test]
    async fn test_missing_type_is_unknown() {
        let Fixture { service, store } = fixture_with(fake_generators(), Arc::new(silent_events()));
        let ctx = ctx();

        for body in [r#"{"name":"deploy"}"#, r#"{"name":"deploy","type":""}"#] {
            let err = service
                .add_key_from_json(&ctx, "myproj", "myapp", body)
                .await
                .unwrap_err();
            assert_eq!(err, DomainError::unknown_key_type(""), "{body}");
        }

        assert!(store.committed().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_type_on_linked_application_is_forbidden() {
        let Fixture { service, store } = fixture_with(fake_generators(), Arc::new(silent_events()));
        let ctx = ctx();

        for body in [r#"{"name":"deploy"}"#, r#"{"name":"deploy","type":""}"#] {
            let err = service
                .add_key_from_json(&ctx, "myproj", "linked", body)
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Forbidden { .. }), "{body}");
        }

        assert!(store.committed().await.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_application() {
        let Fixture { service, .. } = fixture();
        let ctx = ctx();

        let err = service.list_keys(&ctx, "myproj", "ghost").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let err = service
            .add_key(&ctx, "myproj", "ghost", AddKeyRequest::new("deploy", "ssh"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let err = service
            .delete_key(&ctx, "other", "myapp", "app-deploy")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_events_are_published() {
        let mut events = MockKeyEventPublisher::new();
        events
            .expect_publish()
            .withf(|event: &KeyEvent| {
                event.kind() == KeyEventKind::KeyAdded
                    && event.key().name() == "app-deploy"
                    && event.key().private() == "ssh-private"
                    && event.actor().username() == "alice"
                    && event.project_key() == "myproj"
                    && event.application().keys().is_empty()
            })
            .times(1)
            .returning(|_| Ok(()));
        events
            .expect_publish()
            .withf(|event: &KeyEvent| {
                event.kind() == KeyEventKind::KeyDeleted
                    && event.key().name() == "app-deploy"
                    && event.application().name() == "myapp"
                    && event.application().keys().is_empty()
            })
            .times(1)
            .returning(|_| Ok(()));

        let Fixture { service, .. } = fixture_with(fake_generators(), Arc::new(events));
        let ctx = ctx();

        service
            .add_key(&ctx, "myproj", "myapp", AddKeyRequest::new("deploy", "ssh"))
            .await
            .unwrap();
        service
            .delete_key(&ctx, "myproj", "myapp", "app-deploy")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_publish_failure_is_ignored() {
        let mut events = MockKeyEventPublisher::new();
        events
            .expect_publish()
            .times(1)
            .returning(|_| Err(DomainError::storage("broker unavailable")));

        let Fixture { service, store } = fixture_with(fake_generators(), Arc::new(events));

        let key = service
            .add_key(&ctx(), "myproj", "myapp", AddKeyRequest::new("deploy", "ssh"))
            .await
            .unwrap();
        assert_eq!(store.committed().await, vec![key]);
    }

    #[tokio::test]
    async fn test_delete_storage_failure() {
        let Fixture { service, store } = fixture();
        let ctx = ctx();

        let key = service
            .add_key(&ctx, "myproj", "myapp", AddKeyRequest::new("deploy", "ssh"))
            .await
            .unwrap();

        store.set_fault(Some(StoreFault::Delete)).await;
        let err = service
            .delete_key(&ctx, "myproj", "myapp", "app-deploy")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Storage { .. }));
        assert!(err.to_string().contains("cannot delete key app-deploy"));
        assert!(err.is_retryable());

        store.set_fault(None).await;
        assert_eq!(store.committed().await, vec![key]);
    }

    #[tokio::test]
    async fn test_concurrent_delete_reports_key_not_found() {
        let Fixture { service, store } = fixture_with(fake_generators(), Arc::new(silent_events()));

        let existing = Key::new(ApplicationId::new(1), "app-deploy", KeyMaterial::ssh("pub", "priv"));
        let mut tx = store.begin().await.unwrap();
        tx.insert(&existing).await.unwrap();
        tx.commit().await.unwrap();

        // The key is listed, but gone by the time the delete runs
        store.set_fault(Some(StoreFault::LostRow)).await;
        let err = service
            .delete_key(&ctx(), "myproj", "myapp", "app-deploy")
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::key_not_found("app-deploy", "myapp"));

        store.set_fault(None).await;
        assert_eq!(store.committed().await, vec![existing]);
    }

    #[tokio::test]
    async fn test_begin_failure_has_context() {
        let Fixture { service, store } = fixture_with(fake_generators(), Arc::new(silent_events()));
        let ctx = ctx();

        store.set_fault(Some(StoreFault::Begin)).await;

        let err = service.list_keys(&ctx, "myproj", "myapp").await.unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
        assert!(err.to_string().contains("cannot start transaction"));

        let err = service
            .add_key(&ctx, "myproj", "myapp", AddKeyRequest::new("deploy", "ssh"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));
        assert!(err.to_string().contains("cannot start transaction"));

        store.set_fault(None).await;
        assert!(store.committed().await.is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_subscriber_receives_events() {
        let publisher = BroadcastEventPublisher::default();
        let mut events = publisher.subscribe();
        let Fixture { service, .. } = fixture_with(fake_generators(), Arc::new(publisher));
        let ctx = ctx();

        let key = service
            .add_key(&ctx, "myproj", "myapp", AddKeyRequest::new("deploy", "pgp"))
            .await
            .unwrap();
        service
            .delete_key(&ctx, "myproj", "myapp", "app-deploy")
            .await
            .unwrap();

        let added = events.recv().await.unwrap();
        assert_eq!(added.kind(), KeyEventKind::KeyAdded);
        assert_eq!(added.key(), &key);

        let deleted = events.recv().await.unwrap();
        assert_eq!(deleted.kind(), KeyEventKind::KeyDeleted);
        assert_eq!(deleted.key().name(), "app-deploy");
    }

    #[tokio::test]
    async fn test_commit_failure_leaves_no_key() {
        let Fixture { service, store } = fixture_with(fake_generators(), Arc::new(silent_events()));

        store.set_fault(Some(StoreFault::Commit)).await;
        let err = service
            .add_key(&ctx(), "myproj", "myapp", AddKeyRequest::new("deploy", "ssh"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage { .. }));

        store.set_fault(None).await;
        assert!(store.committed().await.is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_persists_nothing() {
        let generators = Arc::new(KeyGeneratorRegistry::new().register(Arc::new(FailingGenerator)));
        let Fixture { service, store } = fixture_with(generators, Arc::new(silent_events()));

        let err = service
            .add_key(&ctx(), "myproj", "myapp", AddKeyRequest::new("deploy", "ssh"))
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::generation("entropy source unavailable"));
        assert!(store.committed().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires_while_store_is_busy() {
        let Fixture { service, store } = fixture_with(fake_generators(), Arc::new(silent_events()));

        // Hold the store so every transaction has to wait
        let held = store.begin().await.unwrap();

        let ctx = ctx().with_timeout(Duration::from_millis(50));
        let err = service.list_keys(&ctx, "myproj", "myapp").await.unwrap_err();
        assert_eq!(err, DomainError::deadline_exceeded("load application"));

        let ctx = RequestContext::new(Actor::new("alice")).with_timeout(Duration::from_millis(50));
        let err = service
            .add_key(&ctx, "myproj", "myapp", AddKeyRequest::new("deploy", "ssh"))
            .await
            .unwrap_err();
        assert_eq!(err, DomainError::deadline_exceeded("add key"));

        drop(held);
        assert!(store.committed().await.is_empty());
    }
}
