//! # Admin Session
//!
//! The administrative login and the product management calls it unlocks.
//!
//! Runs next to [`crate::session::SessionStore`] but shares nothing with it:
//! its own token slot, its own storage, and requests that carry the admin
//! token explicitly. A customer login never authorizes an admin call.
//!
//! ```text
//! AdminSession::login ──► POST /admin/login ──► admin slot ──► logged_in = true
//!
//! create_product ──► validate ──► POST   /admin/products      (Bearer admin)
//! update_product ──► validate ──► PUT    /admin/products/:id  (Bearer admin)
//! delete_product ───────────────► DELETE /admin/products/:id  (Bearer admin)
//! ```

use serde::Deserialize;
use serde_json::json;
use storefront_core::validation::{validate_admin_login, validate_new_product, validate_product_patch};
use storefront_core::{NewProduct, Product, ProductPatch};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::{AdminError, StorageError};
use crate::storage::TokenSlot;
use crate::transport::{ApiRequest, Auth};

#[derive(Debug, Deserialize)]
struct AdminLoginResponse {
    access_token: String,
}

/// Administrative session. No server verification happens at startup; a
/// stale token surfaces as [`AdminError::Unauthorized`] on first use.
pub struct AdminSession {
    api: ApiClient,
    token: TokenSlot,
    logged_in: watch::Sender<bool>,
}

impl AdminSession {
    /// Reads the admin slot once to decide the initial state.
    pub fn new(api: ApiClient, token: TokenSlot) -> Self {
        let present = match token.load() {
            Ok(stored) => stored.is_some(),
            Err(err) => {
                warn!(%err, "Could not read admin token");
                false
            }
        };
        let (logged_in, _) = watch::channel(present);
        AdminSession { api, token, logged_in }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), AdminError> {
        validate_admin_login(username, password)?;

        let request = ApiRequest::post(
            "/admin/login",
            json!({ "username": username.trim(), "password": password }),
        );
        let response: AdminLoginResponse = self.api.send_json(request).await?;

        self.token.save(&response.access_token)?;
        self.logged_in.send_replace(true);

        info!(username = %username.trim(), "Administrator logged in");
        Ok(())
    }

    /// Always ends logged out; a failed token delete is still reported.
    pub fn logout(&self) -> Result<(), StorageError> {
        let cleared = self.token.clear();
        self.logged_in.send_replace(false);
        info!("Administrator logged out");
        cleared
    }

    pub fn is_logged_in(&self) -> bool {
        *self.logged_in.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.logged_in.subscribe()
    }

    // =========================================================================
    // Product Management
    // =========================================================================

    /// Creates a product and returns the stored record.
    ///
    /// Pair with [`crate::catalog::prepend_product`] to show it in an
    /// already-loaded list without refetching.
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, AdminError> {
        validate_new_product(product)?;
        let bearer = self.bearer()?;

        let request = ApiRequest::post_json("/admin/products", product)?.with_auth(bearer);
        let created: Product = self.api.send_json(request).await?;

        info!(product_id = created.id, name = %created.name, "Product created");
        Ok(created)
    }

    pub async fn update_product(&self, id: i64, patch: &ProductPatch) -> Result<Product, AdminError> {
        validate_product_patch(patch)?;
        let bearer = self.bearer()?;

        let request = ApiRequest::put_json(format!("/admin/products/{}", id), patch)?.with_auth(bearer);
        let updated: Product = self.api.send_json(request).await?;

        info!(product_id = id, "Product updated");
        Ok(updated)
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), AdminError> {
        let bearer = self.bearer()?;

        self.api
            .send(ApiRequest::delete(format!("/admin/products/{}", id)).with_auth(bearer))
            .await?;

        info!(product_id = id, "Product deleted");
        Ok(())
    }

    /// The admin token, never the customer one.
    fn bearer(&self) -> Result<Auth, AdminError> {
        self.token
            .load()?
            .map(Auth::Bearer)
            .ok_or(AdminError::NotLoggedIn)
    }
}
