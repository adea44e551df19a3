use async_trait::async_trait;
use std::time::Duration;

use crate::database::models::User;
use crate::database::Tx;
use crate::observer::error::ObserverError;

/// Lifecycle events observers can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
}

/// Base trait for all observers with metadata and applicability checks
pub trait Observer: Send + Sync {
    /// Observer name for logging and debugging
    fn name(&self) -> &'static str;

    fn applies_to_operation(&self, op: Operation) -> bool;

    /// Execution timeout (default 5 seconds)
    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    /// Lower numbers execute first
    fn priority(&self) -> u8 {
        50
    }
}

/// Runs inside the transaction that changed the user row
#[async_trait]
pub trait UserObserver: Observer {
    async fn execute(&self, tx: &mut Tx, user: &User) -> Result<(), ObserverError>;
}
