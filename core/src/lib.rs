//! Client core for the store section of the Petstore API.
//!
//! # Overview
//! Two layers over the same four operations (`delete_order`,
//! `get_inventory`, `get_order_by_id`, `place_order`):
//!
//! - `StoreClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO). This is the layer
//!   `store-ffi` exposes to C.
//! - `StoreApi` is an async proxy that runs build, send and parse through an
//!   injected `ApiClient`. `UreqClient` is the bundled transport; tests swap
//!   in doubles.
//!
//! # Design
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.
//! - All failures surface as `ApiError`. Nothing is retried or cached here.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
#[cfg(feature = "ureq")]
pub mod transport;
pub mod types;

pub use api::{ApiClient, StoreApi};
pub use client::StoreClient;
pub use config::Configuration;
pub use error::{ApiError, ConfigError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
#[cfg(feature = "ureq")]
pub use transport::UreqClient;
pub use types::{Inventory, Order, OrderStatus};
