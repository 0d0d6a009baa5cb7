use crate::config::AppConfig;
use crate::error::ApiError;
use crate::storage::DocumentStorage;
use anyhow::{Context, Result};
use auth_identity::{
    AuthService, CredentialGate, IdentityBridge, IdentityStore, InMemoryIdentityStore,
    JwtExternalVerifier, PasswordManager, PostgresIdentityStore, TokenService,
};
use credential_registry::{
    CredentialRegistry, InMemoryCredentialRegistry, PostgresCredentialRegistry, RegistrySeed,
    VerificationEngine,
};
use database_layer::DatabasePool;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Shared request state
#[derive(Clone)]
pub struct MedGateServer {
    pub auth: AuthService,
    /// Absent when no external provider key is configured
    pub bridge: Option<IdentityBridge>,
    pub verification: VerificationEngine,
    pub documents: DocumentStorage,
    pub request_timeout: Duration,
    pub database: Option<DatabasePool>,
    started_at: Instant,
}

impl MedGateServer {
    /// Wire stores and services from configuration. Without a database URL
    /// both stores are in-memory.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let database = DatabasePool::from_config(&config.database)
            .await
            .context("failed to connect to database")?;

        let (store, registry): (Arc<dyn IdentityStore>, Arc<dyn CredentialRegistry>) = match &database {
            Some(pool) => (
                Arc::new(PostgresIdentityStore::new(pool.pool().clone())),
                Arc::new(PostgresCredentialRegistry::new(pool.pool().clone())),
            ),
            None => {
                warn!("No database configured; using in-memory identity store and registry");
                (
                    Arc::new(InMemoryIdentityStore::new()),
                    Arc::new(InMemoryCredentialRegistry::new()),
                )
            }
        };

        if let Some(seed_file) = &config.registry.seed_file {
            let seed = RegistrySeed::from_path(seed_file)
                .await
                .with_context(|| format!("failed to load registry seed {}", seed_file.display()))?;
            let summary = seed
                .apply(registry.as_ref())
                .await
                .context("failed to apply registry seed")?;
            info!(
                doctors = summary.doctors,
                organizations = summary.organizations,
                employees = summary.employees,
                "Credential registry seeded"
            );
        }

        let external = if config.external_enabled() {
            Some(Arc::new(
                JwtExternalVerifier::from_config(&config.external)
                    .context("invalid external identity provider configuration")?,
            ) as Arc<dyn auth_identity::ExternalTokenVerifier>)
        } else {
            info!("External identity provider not configured; bridge endpoints disabled");
            None
        };

        let server = Self::with_components(store, registry, external, config)?.with_database(database);

        if let Some(admin) = &config.admin {
            let view = server
                .auth
                .provision_admin(&admin.email, &admin.password, &admin.full_name)
                .await
                .context("failed to provision administrator")?;
            info!(account_id = %view.id, "Administrator available");
        }

        server
            .documents
            .initialize()
            .await
            .context("failed to create upload directory")?;

        Ok(server)
    }

    /// Build the state from explicit store handles
    pub fn with_components(
        store: Arc<dyn IdentityStore>,
        registry: Arc<dyn CredentialRegistry>,
        external: Option<Arc<dyn auth_identity::ExternalTokenVerifier>>,
        config: &AppConfig,
    ) -> Result<Self> {
        let verification = VerificationEngine::new(registry);
        let gate = CredentialGate::new(verification.clone(), &config.verification);
        let passwords = PasswordManager::new(&config.password).context("invalid password settings")?;
        let tokens = TokenService::new(config.tokens.clone()).context("invalid token settings")?;

        let bridge = external.map(|verifier| IdentityBridge::new(store.clone(), gate.clone(), verifier));
        let auth = AuthService::new(store, gate, passwords, tokens);

        Ok(Self {
            auth,
            bridge,
            verification,
            documents: DocumentStorage::new(&config.uploads.directory, config.uploads.max_bytes),
            request_timeout: Duration::from_secs(config.server.request_timeout_secs),
            database: None,
            started_at: Instant::now(),
        })
    }

    fn with_database(mut self, database: Option<DatabasePool>) -> Self {
        self.database = database;
        self
    }

    /// The bridge, or 503 when no external provider is configured
    pub fn external_bridge(&self) -> Result<&IdentityBridge, ApiError> {
        self.bridge.as_ref().ok_or_else(|| {
            ApiError::unavailable(
                "External sign-in is not enabled",
                "no external identity provider key configured",
            )
        })
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
