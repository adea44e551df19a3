use std::time::Instant;
use tokio::time::timeout;

use crate::config::MediaConfig;
use crate::database::models::User;
use crate::database::Tx;
use crate::observer::error::ObserverError;
use crate::observer::implementations::ProfileProvisioner;
use crate::observer::traits::{Operation, UserObserver};

/// Ordered set of user lifecycle observers
pub struct ObserverPipeline {
    observers: Vec<Box<dyn UserObserver>>,
}

impl ObserverPipeline {
    pub fn new() -> Self {
        Self { observers: Vec::new() }
    }

    /// Pipeline with the observers every deployment runs
    pub fn with_defaults(media: &MediaConfig) -> Self {
        let mut pipeline = Self::new();
        pipeline.register_observer(Box::new(ProfileProvisioner::new(media.default_profile_image.clone())));
        pipeline
    }

    pub fn register_observer(&mut self, observer: Box<dyn UserObserver>) {
        tracing::debug!("Registered observer '{}'", observer.name());
        self.observers.push(observer);
        self.observers.sort_by_key(|o| o.priority());
    }

    /// Run every applicable observer in priority order. The first failure
    /// stops the pipeline; the caller then drops the transaction.
    pub async fn execute(&self, operation: Operation, tx: &mut Tx, user: &User) -> Result<(), ObserverError> {
        for observer in &self.observers {
            if !observer.applies_to_operation(operation) {
                tracing::trace!("Observer {} skipped - doesn't apply to {:?}", observer.name(), operation);
                continue;
            }

            let observer_start = Instant::now();
            match timeout(observer.timeout(), observer.execute(tx, user)).await {
                Ok(Ok(())) => {
                    tracing::debug!("Observer: {} completed in {:?}", observer.name(), observer_start.elapsed());
                }
                Ok(Err(error)) => {
                    tracing::warn!("Observer: {} failed: {}", observer.name(), error);
                    return Err(error);
                }
                Err(_elapsed) => {
                    tracing::error!("Observer: {} timed out after {:?}", observer.name(), observer.timeout());
                    return Err(ObserverError::TimeoutError(format!(
                        "Observer {} timed out after {:?}",
                        observer.name(),
                        observer.timeout()
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for ObserverPipeline {
    fn default() -> Self {
        Self::new()
    }
}
