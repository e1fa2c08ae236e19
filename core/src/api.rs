//! Asynchronous proxy over the store API.
//!
//! `StoreApi` composes the three steps of every call: build the request with
//! `StoreClient`, hand it to the injected `ApiClient`, parse the response.
//! The proxy itself is stateless; the only thing it shares between calls is
//! the `Arc` to its client.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::client::StoreClient;
use crate::config::Configuration;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::types::{Inventory, Order};

/// A capability that sends one HTTP request and yields its response.
///
/// Any status code is a successful round-trip; implementations return `Err`
/// only when no response was received. Status interpretation belongs to the
/// caller.
pub trait ApiClient: Send + Sync {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

/// Typed, asynchronous access to the four store operations.
///
/// Each method returns a future that does nothing until awaited. Calls are
/// independent; run them concurrently or sequentially as needed.
#[derive(Debug)]
pub struct StoreApi<C> {
    api_client: Arc<C>,
    store: StoreClient,
}

impl<C> Clone for StoreApi<C> {
    fn clone(&self) -> Self {
        Self {
            api_client: Arc::clone(&self.api_client),
            store: self.store.clone(),
        }
    }
}

impl<C: ApiClient> StoreApi<C> {
    pub fn new(api_client: Arc<C>, config: &Configuration) -> Self {
        Self {
            api_client,
            store: StoreClient::with_config(config),
        }
    }

    pub fn api_client(&self) -> &Arc<C> {
        &self.api_client
    }

    /// Delete purchase order by ID.
    ///
    /// The remote service rejects IDs of 1000 and above and non-integer IDs;
    /// nothing is checked locally.
    pub async fn delete_order(&self, order_id: &str) -> Result<(), ApiError> {
        let response = self.execute(self.store.build_delete_order(order_id)).await?;
        self.store.parse_delete_order(response)
    }

    /// Returns pet inventories by status.
    pub async fn get_inventory(&self) -> Result<Inventory, ApiError> {
        let response = self.execute(self.store.build_get_inventory()).await?;
        self.store.parse_get_inventory(response)
    }

    /// Find purchase order by ID.
    ///
    /// The remote service answers IDs in `(5, 10]`; other values come back as
    /// errors from the server.
    pub async fn get_order_by_id(&self, order_id: i64) -> Result<Order, ApiError> {
        let response = self.execute(self.store.build_get_order_by_id(order_id)).await?;
        self.store.parse_get_order_by_id(response)
    }

    /// Place an order for a pet. Every call is a separate POST.
    pub async fn place_order(&self, body: &Order) -> Result<Order, ApiError> {
        let request = self.store.build_place_order(body)?;
        let response = self.execute(request).await?;
        self.store.parse_place_order(response)
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.path, "sending store request");
        let response = self.api_client.send(request).await?;
        debug!(status = response.status, "received store response");
        Ok(response)
    }
}
