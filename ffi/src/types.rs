//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec` or
//! `HashMap`, presence flags instead of `Option`, and tagged enums with
//! explicit discriminants. Conversion functions live here to keep `lib.rs`
//! focused on the `extern "C"` surface.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;

use chrono::{DateTime, SecondsFormat, Utc};
use store_core::{ApiError, HttpMethod, Inventory, Order, OrderStatus};

/// Opaque handle to a `StoreClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiStoreClient {
    pub(crate) inner: store_core::StoreClient,
}

/// Move a Rust string onto the C heap. Interior NULs yield an empty string.
pub(crate) fn to_c_string(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Borrow a caller-owned C string. Invalid UTF-8 yields `None`.
///
/// # Safety
/// `ptr` must be non-null and point to a NUL-terminated string.
pub(crate) unsafe fn from_c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Delete = 2,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `store_build_*` functions. The C caller executes the request
/// and passes the response back through `store_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: store_core::HttpRequest) -> *mut Self {
        let path = to_c_string(req.path);
        let body = req.body.map_or(std::ptr::null_mut(), to_c_string);

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to a `store_parse_*` function. The FFI layer reads
/// but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Order types
// ---------------------------------------------------------------------------

/// Order status, with `Unset` standing in for an absent field.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiOrderStatus {
    Unset = 0,
    Placed = 1,
    Approved = 2,
    Delivered = 3,
}

impl From<Option<OrderStatus>> for FfiOrderStatus {
    fn from(status: Option<OrderStatus>) -> Self {
        match status {
            None => FfiOrderStatus::Unset,
            Some(OrderStatus::Placed) => FfiOrderStatus::Placed,
            Some(OrderStatus::Approved) => FfiOrderStatus::Approved,
            Some(OrderStatus::Delivered) => FfiOrderStatus::Delivered,
        }
    }
}

impl From<FfiOrderStatus> for Option<OrderStatus> {
    fn from(status: FfiOrderStatus) -> Self {
        match status {
            FfiOrderStatus::Unset => None,
            FfiOrderStatus::Placed => Some(OrderStatus::Placed),
            FfiOrderStatus::Approved => Some(OrderStatus::Approved),
            FfiOrderStatus::Delivered => Some(OrderStatus::Delivered),
        }
    }
}

impl TryFrom<u32> for FfiOrderStatus {
    type Error = u32;

    fn try_from(raw: u32) -> Result<Self, u32> {
        match raw {
            0 => Ok(FfiOrderStatus::Unset),
            1 => Ok(FfiOrderStatus::Placed),
            2 => Ok(FfiOrderStatus::Approved),
            3 => Ok(FfiOrderStatus::Delivered),
            other => Err(other),
        }
    }
}

/// Caller-owned order passed to `store_build_place_order`.
///
/// Numeric fields are only sent when their `has_*` flag is set. `ship_date`
/// is an RFC 3339 string or null. `status` holds an `FfiOrderStatus`
/// discriminant; it is read as a plain integer because C may store any value
/// there.
#[repr(C)]
pub struct FfiOrderInput {
    pub id: i64,
    pub has_id: bool,
    pub pet_id: i64,
    pub has_pet_id: bool,
    pub quantity: i32,
    pub has_quantity: bool,
    pub ship_date: *const c_char,
    pub status: u32,
    pub complete: bool,
}

impl FfiOrderInput {
    /// Convert to a core `Order`. Returns `None` when `ship_date` is not
    /// valid UTF-8 or not RFC 3339, or when `status` is not a known
    /// `FfiOrderStatus`.
    ///
    /// # Safety
    /// `ship_date` must be null or point to a NUL-terminated string.
    pub(crate) unsafe fn to_core(&self) -> Option<Order> {
        let status = FfiOrderStatus::try_from(self.status).ok()?;
        let ship_date = if self.ship_date.is_null() {
            None
        } else {
            let raw = unsafe { from_c_str(self.ship_date) }?;
            let parsed = DateTime::parse_from_rfc3339(raw).ok()?;
            Some(parsed.with_timezone(&Utc))
        };
        Some(Order {
            id: self.has_id.then_some(self.id),
            pet_id: self.has_pet_id.then_some(self.pet_id),
            quantity: self.has_quantity.then_some(self.quantity),
            ship_date,
            status: status.into(),
            complete: self.complete,
        })
    }
}

/// An order returned to C. Free through `store_free_result`.
#[repr(C)]
pub struct FfiOrder {
    pub id: i64,
    pub has_id: bool,
    pub pet_id: i64,
    pub has_pet_id: bool,
    pub quantity: i32,
    pub has_quantity: bool,
    /// RFC 3339, or null when absent.
    pub ship_date: *mut c_char,
    pub status: FfiOrderStatus,
    pub complete: bool,
}

impl From<Order> for FfiOrder {
    fn from(order: Order) -> Self {
        FfiOrder {
            id: order.id.unwrap_or_default(),
            has_id: order.id.is_some(),
            pet_id: order.pet_id.unwrap_or_default(),
            has_pet_id: order.pet_id.is_some(),
            quantity: order.quantity.unwrap_or_default(),
            has_quantity: order.quantity.is_some(),
            ship_date: order.ship_date.map_or(std::ptr::null_mut(), |d| {
                to_c_string(d.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }),
            status: order.status.into(),
            complete: order.complete,
        }
    }
}

// ---------------------------------------------------------------------------
// Inventory types
// ---------------------------------------------------------------------------

/// One status/quantity pair of the inventory.
#[repr(C)]
pub struct FfiInventoryEntry {
    pub status: *mut c_char,
    pub quantity: i32,
}

/// Inventory exposed to C, entries sorted by status name.
#[repr(C)]
pub struct FfiInventory {
    pub entries: *mut FfiInventoryEntry,
    pub len: u32,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiStoreResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Deserialization = 3,
    Serialization = 4,
    Transport = 5,
    Panic = 6,
    NullArg = 7,
}

/// Tag that tells `store_free_result` what `FfiStoreResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    Order = 1,
    Inventory = 2,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiStoreResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiStoreResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data_tag: FfiDataTag,
        data: *mut c_void,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiStoreResult {
            error_code,
            error_message,
            http_status,
            data_tag,
            data,
        }))
    }

    /// Build a success result carrying a single `FfiOrder`.
    pub(crate) fn ok_order(order: Order) -> *mut Self {
        let ffi_order = Box::new(FfiOrder::from(order));
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            0,
            FfiDataTag::Order,
            Box::into_raw(ffi_order) as *mut c_void,
        )
    }

    /// Build a success result carrying an `FfiInventory`.
    pub(crate) fn ok_inventory(inventory: Inventory) -> *mut Self {
        let mut pairs: Vec<(String, i32)> = inventory.into_iter().collect();
        pairs.sort();
        let len = pairs.len() as u32;
        let entries = if pairs.is_empty() {
            std::ptr::null_mut()
        } else {
            let entries: Box<[FfiInventoryEntry]> = pairs
                .into_iter()
                .map(|(status, quantity)| FfiInventoryEntry {
                    status: to_c_string(status),
                    quantity,
                })
                .collect();
            Box::into_raw(entries) as *mut FfiInventoryEntry
        };

        let ffi_inventory = Box::new(FfiInventory { entries, len });
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            0,
            FfiDataTag::Inventory,
            Box::into_raw(ffi_inventory) as *mut c_void,
        )
    }

    /// Build a success result with no data payload (e.g. delete).
    pub(crate) fn ok_empty() -> *mut Self {
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let error_code = match &err {
            ApiError::NotFound => FfiErrorCode::NotFound,
            ApiError::Http { .. } => FfiErrorCode::Http,
            ApiError::Deserialization(_) => FfiErrorCode::Deserialization,
            ApiError::Serialization(_) => FfiErrorCode::Serialization,
            ApiError::Transport(_) => FfiErrorCode::Transport,
        };
        let http_status = err.status().unwrap_or(0);
        Self::boxed(
            error_code,
            to_c_string(err.to_string()),
            http_status,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            to_c_string(format!("null argument: {name}")),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            to_c_string(msg.to_string()),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_round_trips_through_ffi_input() {
        let ship_date = CString::new("2024-05-01T10:00:00Z").unwrap();
        let input = FfiOrderInput {
            id: 0,
            has_id: false,
            pet_id: 3,
            has_pet_id: true,
            quantity: 2,
            has_quantity: true,
            ship_date: ship_date.as_ptr(),
            status: FfiOrderStatus::Approved as u32,
            complete: true,
        };
        let order = unsafe { input.to_core() }.unwrap();
        assert_eq!(order.id, None);
        assert_eq!(order.pet_id, Some(3));
        assert_eq!(order.status, Some(OrderStatus::Approved));
        assert!(order.complete);

        let ffi = FfiOrder::from(order);
        assert!(!ffi.has_id);
        assert_eq!(ffi.pet_id, 3);
        let date = unsafe { CStr::from_ptr(ffi.ship_date) }.to_str().unwrap();
        assert_eq!(date, "2024-05-01T10:00:00Z");
        drop(unsafe { CString::from_raw(ffi.ship_date) });
    }

    #[test]
    fn bad_ship_date_is_rejected() {
        let ship_date = CString::new("tomorrow").unwrap();
        let input = FfiOrderInput {
            id: 0,
            has_id: false,
            pet_id: 0,
            has_pet_id: false,
            quantity: 0,
            has_quantity: false,
            ship_date: ship_date.as_ptr(),
            status: FfiOrderStatus::Unset as u32,
            complete: false,
        };
        assert!(unsafe { input.to_core() }.is_none());
    }

    #[test]
    fn status_discriminants_are_validated() {
        assert_eq!(FfiOrderStatus::try_from(0), Ok(FfiOrderStatus::Unset));
        assert_eq!(FfiOrderStatus::try_from(3), Ok(FfiOrderStatus::Delivered));
        assert_eq!(FfiOrderStatus::try_from(4), Err(4));
        assert_eq!(FfiOrderStatus::try_from(u32::MAX), Err(u32::MAX));

        let input = FfiOrderInput {
            id: 0,
            has_id: false,
            pet_id: 0,
            has_pet_id: false,
            quantity: 0,
            has_quantity: false,
            ship_date: std::ptr::null(),
            status: 9,
            complete: false,
        };
        assert!(unsafe { input.to_core() }.is_none());
    }

    #[test]
    fn interior_nul_becomes_empty_string() {
        let ptr = to_c_string("a\0b".to_string());
        let s = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap();
        assert_eq!(s, "");
        drop(unsafe { CString::from_raw(ptr) });
    }
}
