use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::{Config, Result};
use crate::directory::RoleDirectory;
use crate::issues::IssueService;
use crate::payments::PaymentService;
use crate::storage::Storage;

/// Server state - shared handles to every service
///
/// Cloning is cheap: every field is either `Arc`-backed or small.
///
/// | Field | Type | Meaning |
/// |-------|------|---------|
/// | config | Config | Configuration (immutable) |
/// | storage | Storage | Embedded redb database |
/// | jwt_service | Arc<JwtService> | Token validation |
/// | directory | RoleDirectory | Identity to role |
/// | issues | IssueService | Issue workflow |
/// | payments | PaymentService | Payment webhook |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub storage: Storage,
    pub jwt_service: Arc<JwtService>,
    pub directory: RoleDirectory,
    pub issues: IssueService,
    pub payments: PaymentService,
}

impl ServerState {
    /// Open the database under `WORK_DIR` and wire the services
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        let storage = Storage::open(config.database_path())?;
        tracing::info!(path = %config.database_path().display(), "Database opened");
        Self::with_storage(config.clone(), storage)
    }

    /// Wire the services over an already opened storage and seed the
    /// configured admins
    pub fn with_storage(config: Config, storage: Storage) -> Result<Self> {
        let directory = RoleDirectory::new(storage.clone());
        let issues = IssueService::new(storage.clone(), config.free_issue_limit);
        let payments = PaymentService::new(storage.clone(), config.payment_webhook_secret.clone());
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        if config.admin_subjects.is_empty() {
            tracing::warn!("ADMIN_SUBJECTS is empty; no admin will be seeded");
        } else {
            let seeded = directory.seed_admins(&config.admin_subjects)?;
            tracing::info!(
                configured = config.admin_subjects.len(),
                seeded = seeded.len(),
                "Admin subjects applied"
            );
        }

        Ok(Self {
            config,
            storage,
            jwt_service,
            directory,
            issues,
            payments,
        })
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
