//! # Account Service
//!
//! Resolves and caches the identity of the signed-in user.

use super::http::{ApiRequest, HttpError, HttpTransport};
use crate::client::models::Account;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Endpoint returning the current account
pub const ACCOUNT_PATH: &str = "api/account";

#[derive(Default)]
struct IdentityCache {
    resolved: bool,
    account: Option<Account>,
}

/// Typed accessor for the current account
pub struct AccountService<T> {
    transport: Arc<T>,
    cache: Arc<Mutex<IdentityCache>>,
}

impl<T> Clone for AccountService<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<T: HttpTransport> AccountService<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            cache: Arc::new(Mutex::new(IdentityCache::default())),
        }
    }

    fn cache(&self) -> MutexGuard<'_, IdentityCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current account, fetched once and cached unless `force` is set.
    ///
    /// An unauthenticated session (401) resolves to `None`; other failures
    /// propagate.
    pub async fn identity(&self, force: bool) -> Result<Option<Account>, HttpError> {
        {
            let cache = self.cache();
            if cache.resolved && !force {
                return Ok(cache.account.clone());
            }
        }

        let account = match self.transport.send(ApiRequest::get(ACCOUNT_PATH)).await {
            Ok(response) => match response.body {
                Some(body) => Some(serde_json::from_value::<Account>(body).map_err(|e| {
                    HttpError::Decode {
                        url: ACCOUNT_PATH.to_string(),
                        message: e.to_string(),
                    }
                })?),
                None => None,
            },
            Err(HttpError::Status { status: 401, .. }) => {
                tracing::debug!("No authenticated account");
                None
            }
            Err(e) => return Err(e),
        };

        if let Some(account) = &account {
            tracing::info!("Authenticated as {}", account.login);
        }
        self.authenticate(account.clone());
        Ok(account)
    }

    /// Replace the cached identity
    pub fn authenticate(&self, account: Option<Account>) {
        let mut cache = self.cache();
        cache.resolved = true;
        cache.account = account;
    }

    /// True once an account has been resolved
    pub fn is_authenticated(&self) -> bool {
        self.cache().account.is_some()
    }

    pub fn has_any_authority(&self, authorities: &[&str]) -> bool {
        self.cache()
            .account
            .as_ref()
            .is_some_and(|account| account.has_any_authority(authorities))
    }
}
