//! Domain DTOs for the store API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined
//! independently; integration tests catch any drift between the two crates.
//! Every `Order` field except `complete` is optional on the wire, so callers
//! can send partial orders and let the server fill in the rest.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pet inventory: status name to quantity.
pub type Inventory = HashMap<String, i32>;

/// Lifecycle state of a purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Placed,
    Approved,
    Delivered,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Approved => "approved",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A purchase order for a pet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub complete: bool,
}

impl Order {
    /// A new order for `quantity` units of the pet `pet_id`.
    pub fn new(pet_id: i64, quantity: i32) -> Self {
        Self {
            pet_id: Some(pet_id),
            quantity: Some(quantity),
            ..Self::default()
        }
    }
}
