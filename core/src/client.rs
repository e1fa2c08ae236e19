//! Stateless HTTP request builder and response parser for the store API.
//!
//! # Design
//! `StoreClient` holds only what every request needs (base URL, user agent,
//! optional API key) and carries no mutable state between calls. Each store
//! operation is split into a `build_*` method that produces an `HttpRequest`
//! and a `parse_*` method that consumes an `HttpResponse`. Whoever sits
//! between the two owns the round-trip: `StoreApi` hands the request to an
//! `ApiClient`, a C host goes through `store-ffi`.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::config::Configuration;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Inventory, Order};

const APPLICATION_JSON: &str = "application/json";

/// Header carrying the Petstore `api_key` security scheme.
pub const API_KEY_HEADER: &str = "api_key";

/// Synchronous, stateless client for the store API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Debug, Clone)]
pub struct StoreClient {
    base_url: String,
    api_key: Option<String>,
    user_agent: String,
}

impl StoreClient {
    /// Client for `base_url` with default settings and no API key.
    pub fn new(base_url: &str) -> Self {
        Self::with_config(&Configuration::new(base_url))
    }

    pub fn with_config(config: &Configuration) -> Self {
        Self {
            base_url: config.base_path.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self) -> Vec<(String, String)> {
        vec![
            ("accept".to_string(), APPLICATION_JSON.to_string()),
            ("user-agent".to_string(), self.user_agent.clone()),
        ]
    }

    /// `DELETE /store/order/{orderId}`. The id is sent verbatim
    /// (percent-encoded); the server decides whether it is valid.
    pub fn build_delete_order(&self, order_id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/store/order/{}", self.base_url, path_segment(order_id)),
            headers: self.headers(),
            body: None,
        }
    }

    /// `GET /store/inventory`, authenticated with `api_key` when configured.
    pub fn build_get_inventory(&self) -> HttpRequest {
        let mut headers = self.headers();
        if let Some(key) = &self.api_key {
            headers.push((API_KEY_HEADER.to_string(), key.clone()));
        }
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/store/inventory", self.base_url),
            headers,
            body: None,
        }
    }

    /// `GET /store/order/{orderId}`.
    pub fn build_get_order_by_id(&self, order_id: i64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/store/order/{order_id}", self.base_url),
            headers: self.headers(),
            body: None,
        }
    }

    /// `POST /store/order` with the order as a JSON body.
    pub fn build_place_order(&self, order: &Order) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(order).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut headers = self.headers();
        headers.push(("content-type".to_string(), APPLICATION_JSON.to_string()));
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/store/order", self.base_url),
            headers,
            body: Some(body),
        })
    }

    /// Any 2xx counts as deleted; the body is ignored.
    pub fn parse_delete_order(&self, response: HttpResponse) -> Result<(), ApiError> {
        if response.is_success() {
            return Ok(());
        }
        Err(status_error(response))
    }

    pub fn parse_get_inventory(&self, response: HttpResponse) -> Result<Inventory, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }

    pub fn parse_get_order_by_id(&self, response: HttpResponse) -> Result<Order, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }

    pub fn parse_place_order(&self, response: HttpResponse) -> Result<Order, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }
}

fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    Err(status_error(response.clone()))
}

/// Map a non-success response to the matching `ApiError` variant.
fn status_error(response: HttpResponse) -> ApiError {
    warn!(status = response.status, "store API returned an error status");
    if response.status == 404 {
        return ApiError::NotFound;
    }
    ApiError::Http {
        status: response.status,
        body: response.body,
    }
}

/// Percent-encode one path segment. `.` is escaped too so that `.` and `..`
/// cannot be normalised into a different path.
fn path_segment(raw: &str) -> String {
    urlencoding::encode(raw).replace('.', "%2E")
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| {
        let content_type = response.header("content-type");
        warn!(
            status = response.status,
            content_type = content_type.unwrap_or(""),
            "store API response body is not the expected JSON"
        );
        match content_type {
            Some(content_type) if !content_type.starts_with(APPLICATION_JSON) => {
                ApiError::Deserialization(format!("{e} (content-type: {content_type})"))
            }
            _ => ApiError::Deserialization(e.to_string()),
        }
    })
}
