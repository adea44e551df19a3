use async_trait::async_trait;

use crate::database::models::{NewProfile, Profile, User};
use crate::database::Tx;
use crate::observer::error::ObserverError;
use crate::observer::traits::{Observer, Operation, UserObserver};

/// Creates the one profile every user owns, in the same transaction as the user
pub struct ProfileProvisioner {
    default_image: String,
}

impl ProfileProvisioner {
    pub fn new(default_image: String) -> Self {
        Self { default_image }
    }
}

impl Observer for ProfileProvisioner {
    fn name(&self) -> &'static str {
        "ProfileProvisioner"
    }

    fn applies_to_operation(&self, op: Operation) -> bool {
        op == Operation::Create
    }

    fn priority(&self) -> u8 {
        10
    }
}

#[async_trait]
impl UserObserver for ProfileProvisioner {
    async fn execute(&self, tx: &mut Tx, user: &User) -> Result<(), ObserverError> {
        let profile: Profile = tx
            .insert(&NewProfile {
                owner_id: user.id,
                name: String::new(),
                content: String::new(),
                image: self.default_image.clone(),
            })
            .await?;
        tracing::info!("Provisioned profile {} for user {}", profile.id, user.username);
        Ok(())
    }
}
