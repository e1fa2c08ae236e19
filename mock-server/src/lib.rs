//! In-memory implementation of the Petstore store endpoints.
//!
//! Serves the same contract the real service documents: order lookups only
//! answer IDs in `(5, 10]`, deletes reject IDs of 1000 and above, and the
//! inventory is keyed by status name. Starts seeded with orders 6 through
//! 10 so every valid lookup ID resolves.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::debug;

pub const INVALID_ID: &str = "Invalid ID supplied";
pub const INVALID_ORDER: &str = "Invalid Order";
pub const ORDER_NOT_FOUND: &str = "Order not found";

/// IDs `GET /store/order/{id}` answers.
const LOOKUP_RANGE: std::ops::RangeInclusive<i64> = 6..=10;

/// `DELETE /store/order/{id}` rejects IDs at or above this.
const DELETE_LIMIT: i64 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
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

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
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

#[derive(Debug)]
pub struct Store {
    orders: HashMap<i64, Order>,
    stock: HashMap<String, i32>,
}

impl Store {
    /// Orders 6 to 10 plus a small pet stock.
    pub fn seeded() -> Self {
        let orders = LOOKUP_RANGE
            .map(|id| {
                let status = if id % 2 == 0 {
                    OrderStatus::Placed
                } else {
                    OrderStatus::Approved
                };
                let order = Order {
                    id: Some(id),
                    pet_id: Some(id),
                    quantity: Some(1),
                    ship_date: None,
                    status: Some(status),
                    complete: false,
                };
                (id, order)
            })
            .collect();
        let stock = [("available", 7), ("pending", 2), ("sold", 3)]
            .into_iter()
            .map(|(status, count)| (status.to_string(), count))
            .collect();
        Self { orders, stock }
    }

    /// Pet stock plus each order's quantity under its status name.
    pub fn inventory(&self) -> HashMap<String, i32> {
        let mut inventory = self.stock.clone();
        for order in self.orders.values() {
            let status = order.status.unwrap_or(OrderStatus::Placed);
            let count = inventory.entry(status.as_str().to_string()).or_insert(0);
            *count = count.saturating_add(order.quantity.unwrap_or(0));
        }
        inventory
    }

    /// Whether storing `order` under `id` keeps its status bucket within `i32`.
    fn bucket_fits(&self, id: i64, order: &Order) -> bool {
        let status = order.status.unwrap_or(OrderStatus::Placed);
        let stock = self.stock.get(status.as_str()).copied().unwrap_or(0);
        self.orders
            .iter()
            .filter(|(key, existing)| {
                **key != id && existing.status.unwrap_or(OrderStatus::Placed) == status
            })
            .filter_map(|(_, existing)| existing.quantity)
            .chain(order.quantity)
            .try_fold(stock, i32::checked_add)
            .is_some()
    }

    /// `None` once the highest id is `i64::MAX`.
    fn next_id(&self) -> Option<i64> {
        match self.orders.keys().max() {
            Some(max) => max.checked_add(1),
            None => Some(1),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<Store>>,
    api_key: Option<Arc<str>>,
}

type ApiResult<T> = Result<T, (StatusCode, &'static str)>;

/// Router with a freshly seeded store and no API key requirement.
pub fn app() -> Router {
    router(None)
}

/// Router whose inventory endpoint requires the `api_key` header.
pub fn app_with_api_key(api_key: &str) -> Router {
    router(Some(Arc::from(api_key)))
}

fn router(api_key: Option<Arc<str>>) -> Router {
    let state = AppState {
        store: Arc::new(RwLock::new(Store::seeded())),
        api_key,
    };
    Router::new()
        .route("/store/inventory", get(get_inventory))
        .route("/store/order", post(place_order))
        .route("/store/order/{order_id}", get(get_order).delete(delete_order))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

async fn get_inventory(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<HashMap<String, i32>>> {
    if let Some(expected) = &state.api_key {
        let supplied = headers.get("api_key").and_then(|v| v.to_str().ok());
        if supplied != Some(expected.as_ref()) {
            return Err((StatusCode::UNAUTHORIZED, "missing or invalid api_key"));
        }
    }
    let store = state.store.read().await;
    Ok(Json(store.inventory()))
}

async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<i64>,
) -> ApiResult<Json<Order>> {
    if !LOOKUP_RANGE.contains(&order_id) {
        return Err((StatusCode::BAD_REQUEST, INVALID_ID));
    }
    let store = state.store.read().await;
    store
        .orders
        .get(&order_id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, ORDER_NOT_FOUND))
}

async fn place_order(
    State(state): State<AppState>,
    Json(mut order): Json<Order>,
) -> ApiResult<Json<Order>> {
    if order.quantity.is_some_and(|q| q < 0) {
        return Err((StatusCode::BAD_REQUEST, INVALID_ORDER));
    }
    let mut store = state.store.write().await;
    let id = match order.id {
        Some(id) => id,
        None => store.next_id().ok_or((StatusCode::BAD_REQUEST, INVALID_ORDER))?,
    };
    order.id = Some(id);
    order.status.get_or_insert(OrderStatus::Placed);
    if !store.bucket_fits(id, &order) {
        return Err((StatusCode::BAD_REQUEST, INVALID_ORDER));
    }
    debug!(id, "order placed");
    store.orders.insert(id, order.clone());
    Ok(Json(order))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id: i64 = order_id
        .parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, INVALID_ID))?;
    if id >= DELETE_LIMIT {
        return Err((StatusCode::BAD_REQUEST, INVALID_ID));
    }
    let mut store = state.store.write().await;
    store
        .orders
        .remove(&id)
        .map(|_| StatusCode::OK)
        .ok_or((StatusCode::NOT_FOUND, ORDER_NOT_FOUND))
}
