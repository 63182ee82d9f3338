// Storefront API client: typed endpoints on top of the request gateway

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::gateway::{RequestGateway, RequestOptions};
use crate::session::{Session, TOKEN_KEY};
use crate::storage::StorageArea;
use crate::types::*;
use crate::view::{select_view, View};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{info, warn};

/// Turn a non-2xx response into [`ClientError::Status`]
fn ensure_success(response: NormalizedResponse) -> Result<NormalizedResponse> {
    if response.succeeded {
        Ok(response)
    } else {
        Err(ClientError::Status {
            status: response.status_code,
            detail: response.detail(),
        })
    }
}

/// Check the status and deserialize the JSON body
fn parse_response<T: DeserializeOwned>(response: NormalizedResponse) -> Result<T> {
    let status = response.status_code;
    let body = ensure_success(response)?
        .body
        .ok_or_else(|| ClientError::InvalidResponse(format!("status {status} with no JSON body")))?;

    Ok(serde_json::from_value(body)?)
}

/// Client for the storefront API
///
/// Tokens live in one storage area chosen by [`ClientConfig::persistence`]:
/// `access` and `refresh` for requests, and `token` for view selection.
#[derive(Clone)]
pub struct StorefrontClient {
    gateway: RequestGateway<Arc<dyn StorageArea>>,
}

impl StorefrontClient {
    /// Create a client, opening the configured storage area
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let storage = config.open_storage()?;
        Self::with_storage(config, storage)
    }

    /// Create a client on top of an existing storage area
    pub fn with_storage(config: &ClientConfig, storage: Arc<dyn StorageArea>) -> Result<Self> {
        let base_url = config.parsed_base_url()?;

        Ok(Self {
            gateway: RequestGateway::new(base_url, Session::new(storage)),
        })
    }

    pub fn gateway(&self) -> &RequestGateway<Arc<dyn StorageArea>> {
        &self.gateway
    }

    pub fn session(&self) -> &Session<Arc<dyn StorageArea>> {
        self.gateway.session()
    }

    /// Select the view for the currently stored token
    pub fn current_view(&self) -> View {
        select_view(self.session().storage(), TOKEN_KEY)
    }

    pub async fn register(&self, registration: &Registration) -> Result<RegisteredUser> {
        parse_response(self.gateway.post("/v1/auth/register", registration).await?)
    }

    /// Log in and keep the returned tokens in the session
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginTokens> {
        let tokens: LoginTokens =
            parse_response(self.gateway.post("/v1/auth/login", credentials).await?)?;

        self.session().store_tokens(&tokens)?;
        self.session().storage().set(TOKEN_KEY, &tokens.access_token)?;

        info!(email = %credentials.email, expires_in = tokens.expires_in, "Logged in");
        Ok(tokens)
    }

    /// Revoke the refresh token on the server and clear the session.
    ///
    /// The session is cleared even when the server rejects the request.
    pub async fn logout(&self) -> Result<()> {
        let Some(refresh_token) = self.session().refresh_token() else {
            self.session().clear()?;
            info!("Logged out without a refresh token");
            return Ok(());
        };

        let mut url = self.gateway.resolve("/v1/auth/logout")?;
        url.query_pairs_mut().append_pair("refresh_token", &refresh_token);

        let result = self
            .gateway
            .request(Method::POST, url.as_str(), RequestOptions::new())
            .await;
        self.session().clear()?;

        match result.and_then(ensure_success) {
            Ok(_) => {
                info!("Logged out");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Server rejected logout, session cleared locally");
                Err(e)
            }
        }
    }

    pub async fn list_products(&self, skip: u32, limit: u32) -> Result<Vec<Product>> {
        let mut url = self.gateway.resolve("/v1/products/")?;
        url.query_pairs_mut()
            .append_pair("skip", &skip.to_string())
            .append_pair("limit", &limit.to_string());

        parse_response(self.gateway.get(url.as_str()).await?)
    }

    /// URL of one product, with `id` encoded as a single path segment
    fn product_url(&self, id: &str) -> Result<Url> {
        if matches!(id, "" | "." | "..") {
            return Err(ClientError::InvalidId(id.to_string()));
        }

        let mut url = self.gateway.resolve("/v1/products/")?;
        url.path_segments_mut()
            .map_err(|()| ClientError::Configuration("Base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }

    pub async fn get_product(&self, id: &str) -> Result<Product> {
        parse_response(self.gateway.get(self.product_url(id)?.as_str()).await?)
    }

    pub async fn create_product(&self, product: &ProductInput) -> Result<Product> {
        parse_response(self.gateway.post("/v1/products/", product).await?)
    }

    pub async fn replace_product(&self, id: &str, product: &ProductInput) -> Result<Product> {
        parse_response(self.gateway.put(self.product_url(id)?.as_str(), product).await?)
    }

    pub async fn patch_product(&self, id: &str, product: &ProductInput) -> Result<Product> {
        parse_response(self.gateway.patch(self.product_url(id)?.as_str(), product).await?)
    }

    pub async fn delete_product(&self, id: &str) -> Result<()> {
        ensure_success(self.gateway.delete(self.product_url(id)?.as_str()).await?)?;
        Ok(())
    }

    /// Create a role if it does not exist yet (admin only)
    pub async fn ensure_role(&self, role_name: &str) -> Result<Role> {
        let mut url = self.gateway.resolve("/v1/admin/roles/ensure")?;
        url.query_pairs_mut().append_pair("role_name", role_name);

        let response = self
            .gateway
            .request(Method::POST, url.as_str(), RequestOptions::new())
            .await?;
        parse_response(response)
    }

    /// Grant a role to a user (admin only)
    pub async fn assign_role(&self, user_id: &str, role_name: &str) -> Result<RoleAssignment> {
        let request = RoleAssignmentRequest {
            user_id: user_id.to_string(),
            role_name: role_name.to_string(),
        };
        parse_response(self.gateway.post("/v1/admin/assign-role", &request).await?)
    }
}
