//! Access/refresh token slots on top of a storage area

use crate::error::Result;
use crate::storage::StorageArea;
use crate::types::LoginTokens;

/// Storage key of the access token
pub const ACCESS_KEY: &str = "access";
/// Storage key of the refresh token
pub const REFRESH_KEY: &str = "refresh";
/// Storage key of the token checked when a view is loaded
pub const TOKEN_KEY: &str = "token";

/// The two token slots of a signed-in session
///
/// The slots are independent: nothing here uses the refresh token to renew
/// the access token.
#[derive(Clone)]
pub struct Session<S> {
    storage: S,
}

impl<S: StorageArea> Session<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn set_access_token(&self, token: &str) -> Result<()> {
        self.storage.set(ACCESS_KEY, token)
    }

    /// Get the access token; an empty value counts as absent
    pub fn access_token(&self) -> Option<String> {
        non_empty(self.storage.get(ACCESS_KEY))
    }

    pub fn set_refresh_token(&self, token: &str) -> Result<()> {
        self.storage.set(REFRESH_KEY, token)
    }

    /// Get the refresh token; an empty value counts as absent
    pub fn refresh_token(&self) -> Option<String> {
        non_empty(self.storage.get(REFRESH_KEY))
    }

    /// Store both tokens from a login response
    pub fn store_tokens(&self, tokens: &LoginTokens) -> Result<()> {
        self.set_access_token(&tokens.access_token)?;
        if let Some(refresh) = &tokens.refresh_token {
            self.set_refresh_token(refresh)?;
        }
        Ok(())
    }

    /// Remove both tokens and the page-load token
    pub fn clear(&self) -> Result<()> {
        self.storage.remove(ACCESS_KEY)?;
        self.storage.remove(REFRESH_KEY)?;
        self.storage.remove(TOKEN_KEY)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
