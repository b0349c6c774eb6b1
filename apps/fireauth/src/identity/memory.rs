//! In-process identity provider for development and tests.
//!
//! Not a credential store: passwords are kept in memory as given.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{Identity, IdentityProvider, ProviderError};

struct Account {
    uid: String,
    password: String,
}

#[derive(Default)]
pub struct InMemoryIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an account with a known uid.
    pub fn with_account(self, uid: &str, email: &str, password: &str) -> Self {
        self.accounts.write().insert(
            email.to_string(),
            Account {
                uid: uid.to_string(),
                password: password.to_string(),
            },
        );
        self
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, ProviderError> {
        let mut accounts = self.accounts.write();
        if accounts.contains_key(email) {
            return Err(ProviderError::new(
                "auth/email-already-in-use",
                "The email address is already in use by another account.",
            ));
        }
        let uid = Uuid::new_v4().to_string();
        accounts.insert(
            email.to_string(),
            Account {
                uid: uid.clone(),
                password: password.to_string(),
            },
        );
        Ok(Identity::new(uid, email))
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let accounts = self.accounts.read();
        match accounts.get(email) {
            None => Err(ProviderError::new(
                "auth/user-not-found",
                "There is no user record corresponding to this identifier.",
            )),
            Some(account) if account.password != password => Err(ProviderError::new(
                "auth/wrong-password",
                "The password is invalid or the user does not have a password.",
            )),
            Some(account) => Ok(Identity::new(account.uid.clone(), email)),
        }
    }
}
