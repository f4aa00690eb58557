//! CityFix Server - municipal issue reporting backend
//!
//! # Architecture
//!
//! - **Role directory** (`directory`): identity to role, admin role changes
//! - **Auth** (`auth`): identity-provider token validation, role gates
//! - **Issues** (`issues`): status machine and assignment ledger, executed
//!   atomically against storage
//! - **Payments** (`payments`): idempotent boost / premium webhook
//! - **Storage** (`storage`): embedded redb
//! - **HTTP API** (`api`): axum routers
//!
//! ```text
//! cityfix-server/src/
//! ├── core/          # config, state, server, errors
//! ├── auth/          # JWT, extractors, middleware
//! ├── directory/     # role directory
//! ├── issues/        # issue service and actions
//! ├── payments/      # payment webhook
//! ├── storage/       # redb tables
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod directory;
pub mod issues;
pub mod payments;
pub mod storage;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use directory::RoleDirectory;
pub use issues::IssueService;
pub use storage::Storage;

pub use shared::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::init_logger_with_file;

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Prepare the work directory and install the logger
pub fn setup_environment(config: &Config) -> std::io::Result<()> {
    std::fs::create_dir_all(&config.work_dir)?;
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    );
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   _____ _ _         ______ _
  / ____(_) |       |  ____(_)
 | |     _| |_ _   _| |__   ___  __
 | |    | | __| | | |  __| | \ \/ /
 | |____| | |_| |_| | |    | |>  <
  \_____|_|\__|\__, |_|    |_/_/\_\
                __/ |
               |___/
    "#
    );
}
