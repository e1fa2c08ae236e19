//! C-ABI wrapper around `store-core`.
//!
//! # Overview
//! Exposes the four store operations through `extern "C"` functions so any
//! language with a C FFI can build and parse HTTP requests/responses without
//! linking to Rust's async runtime or serde directly. The host performs the
//! network round-trip between `store_build_*` and `store_parse_*`.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors `StoreClient` 1:1.
//! - A single `FfiStoreResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `store_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use store_core::{Configuration, HttpResponse};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `StoreClient` bound to `base_url`.
///
/// `api_key` may be null; when set it is sent with inventory requests.
/// Returns null if `base_url` is null, either string is not valid UTF-8, or
/// an internal panic occurs. Free with `store_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn store_client_new(
    base_url: *const c_char,
    api_key: *const c_char,
) -> *mut FfiStoreClient {
    catch_unwind(|| {
        if base_url.is_null() {
            return std::ptr::null_mut();
        }
        let Some(url) = (unsafe { from_c_str(base_url) }) else {
            return std::ptr::null_mut();
        };
        let mut config = Configuration::new(url);
        if !api_key.is_null() {
            let Some(key) = (unsafe { from_c_str(api_key) }) else {
                return std::ptr::null_mut();
            };
            config = config.with_api_key(key);
        }
        let client = store_core::StoreClient::with_config(&config);
        Box::into_raw(Box::new(FfiStoreClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `store_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn store_client_free(client: *mut FfiStoreClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build a request deleting the order `order_id`.
///
/// The id is passed through as text; the server validates it.
/// Returns null if `client` or `order_id` is null or not valid UTF-8.
/// Free with `store_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn store_build_delete_order(
    client: *const FfiStoreClient,
    order_id: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || order_id.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(id) = (unsafe { from_c_str(order_id) }) else {
            return std::ptr::null_mut();
        };
        FfiHttpRequest::from_core(client.inner.build_delete_order(id))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request for the pet inventory.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn store_build_get_inventory(client: *const FfiStoreClient) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_get_inventory())
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request fetching the order `order_id`.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn store_build_get_order_by_id(
    client: *const FfiStoreClient,
    order_id: i64,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        FfiHttpRequest::from_core(client.inner.build_get_order_by_id(order_id))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request placing `order`.
///
/// Returns null if `client` or `order` is null, if `order->ship_date` is not
/// an RFC 3339 timestamp, if `order->status` is not an `FfiOrderStatus`
/// value, or if serialization fails.
#[unsafe(no_mangle)]
pub extern "C" fn store_build_place_order(
    client: *const FfiStoreClient,
    order: *const FfiOrderInput,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || order.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(order) = (unsafe { (*order).to_core() }) else {
            return std::ptr::null_mut();
        };
        match client.inner.build_place_order(&order) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is
/// read as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }
            .to_string_lossy()
            .into_owned()
    };
    HttpResponse::new(resp.status, body)
}

/// Shared null checks and conversion for every `store_parse_*` function.
fn parse_with<T>(
    client: *const FfiStoreClient,
    response: *const FfiHttpResponse,
    parse: impl FnOnce(&store_core::StoreClient, HttpResponse) -> Result<T, store_core::ApiError>,
    ok: impl FnOnce(T) -> *mut FfiStoreResult,
) -> *mut FfiStoreResult {
    if client.is_null() {
        return FfiStoreResult::null_arg("client");
    }
    if response.is_null() {
        return FfiStoreResult::null_arg("response");
    }
    let client = unsafe { &*client };
    let resp = unsafe { &*response };
    match parse(&client.inner, ffi_response_to_core(resp)) {
        Ok(value) => ok(value),
        Err(e) => FfiStoreResult::from_error(e),
    }
}

/// Parse the response to a delete-order request.
///
/// Returns a result with `data_tag = None` on any 2xx.
#[unsafe(no_mangle)]
pub extern "C" fn store_parse_delete_order(
    client: *const FfiStoreClient,
    response: *const FfiHttpResponse,
) -> *mut FfiStoreResult {
    catch_unwind(|| {
        parse_with(
            client,
            response,
            |c, r| c.parse_delete_order(r),
            |()| FfiStoreResult::ok_empty(),
        )
    })
    .unwrap_or_else(|_| FfiStoreResult::panic("panic in store_parse_delete_order"))
}

/// Parse the response to an inventory request.
///
/// Returns a result with `data_tag = Inventory` on success.
#[unsafe(no_mangle)]
pub extern "C" fn store_parse_get_inventory(
    client: *const FfiStoreClient,
    response: *const FfiHttpResponse,
) -> *mut FfiStoreResult {
    catch_unwind(|| {
        parse_with(
            client,
            response,
            |c, r| c.parse_get_inventory(r),
            FfiStoreResult::ok_inventory,
        )
    })
    .unwrap_or_else(|_| FfiStoreResult::panic("panic in store_parse_get_inventory"))
}

/// Parse the response to a get-order request.
///
/// Returns a result with `data_tag = Order` on success.
#[unsafe(no_mangle)]
pub extern "C" fn store_parse_get_order_by_id(
    client: *const FfiStoreClient,
    response: *const FfiHttpResponse,
) -> *mut FfiStoreResult {
    catch_unwind(|| {
        parse_with(
            client,
            response,
            |c, r| c.parse_get_order_by_id(r),
            FfiStoreResult::ok_order,
        )
    })
    .unwrap_or_else(|_| FfiStoreResult::panic("panic in store_parse_get_order_by_id"))
}

/// Parse the response to a place-order request.
///
/// Returns a result with `data_tag = Order` on success.
#[unsafe(no_mangle)]
pub extern "C" fn store_parse_place_order(
    client: *const FfiStoreClient,
    response: *const FfiHttpResponse,
) -> *mut FfiStoreResult {
    catch_unwind(|| {
        parse_with(
            client,
            response,
            |c, r| c.parse_place_order(r),
            FfiStoreResult::ok_order,
        )
    })
    .unwrap_or_else(|_| FfiStoreResult::panic("panic in store_parse_place_order"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free an `FfiHttpRequest` returned by any `store_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn store_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiStoreResult` returned by any `store_parse_*` function.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn store_free_result(result: *mut FfiStoreResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::Order => {
                let order = unsafe { Box::from_raw(result.data as *mut FfiOrder) };
                free_c_string(order.ship_date);
            }
            FfiDataTag::Inventory => {
                let inventory = unsafe { Box::from_raw(result.data as *mut FfiInventory) };
                if !inventory.entries.is_null() && inventory.len > 0 {
                    let entries = unsafe {
                        Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                            inventory.entries,
                            inventory.len as usize,
                        ))
                    };
                    for entry in entries.iter() {
                        free_c_string(entry.status);
                    }
                }
            }
            FfiDataTag::None => {}
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn store_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn new_client() -> *mut FfiStoreClient {
        let url = CString::new("http://localhost:3000").unwrap();
        store_client_new(url.as_ptr(), std::ptr::null())
    }

    fn c_str<'a>(ptr: *const c_char) -> &'a str {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
    }

    fn headers(req: &FfiHttpRequest) -> Vec<(String, String)> {
        let slice = unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) };
        slice
            .iter()
            .map(|h| (c_str(h.key).to_string(), c_str(h.value).to_string()))
            .collect()
    }

    fn empty_order_input() -> FfiOrderInput {
        FfiOrderInput {
            id: 0,
            has_id: false,
            pet_id: 0,
            has_pet_id: false,
            quantity: 0,
            has_quantity: false,
            ship_date: std::ptr::null(),
            status: FfiOrderStatus::Unset as u32,
            complete: false,
        }
    }

    #[test]
    fn client_new_and_free() {
        let client = new_client();
        assert!(!client.is_null());
        store_client_free(client);
    }

    #[test]
    fn client_new_null_returns_null() {
        let client = store_client_new(std::ptr::null(), std::ptr::null());
        assert!(client.is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        store_client_free(std::ptr::null_mut());
    }

    #[test]
    fn build_get_inventory_returns_correct_request() {
        let client = new_client();
        let req = store_build_get_inventory(client);
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Get));
        assert_eq!(c_str(req_ref.path), "http://localhost:3000/store/inventory");
        assert!(req_ref.body.is_null());
        assert!(!headers(req_ref).iter().any(|(k, _)| k == "api_key"));

        store_free_request(req);
        store_client_free(client);
    }

    #[test]
    fn build_get_inventory_carries_api_key() {
        let url = CString::new("http://localhost:3000").unwrap();
        let key = CString::new("special-key").unwrap();
        let client = store_client_new(url.as_ptr(), key.as_ptr());
        let req = store_build_get_inventory(client);

        let req_ref = unsafe { &*req };
        assert!(headers(req_ref).contains(&("api_key".to_string(), "special-key".to_string())));

        store_free_request(req);
        store_client_free(client);
    }

    #[test]
    fn build_get_inventory_null_client_returns_null() {
        let req = store_build_get_inventory(std::ptr::null());
        assert!(req.is_null());
    }

    #[test]
    fn build_get_order_by_id_returns_correct_request() {
        let client = new_client();
        let req = store_build_get_order_by_id(client, 7);
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Get));
        assert_eq!(c_str(req_ref.path), "http://localhost:3000/store/order/7");

        store_free_request(req);
        store_client_free(client);
    }

    #[test]
    fn build_delete_order_returns_correct_request() {
        let client = new_client();
        let id = CString::new("8").unwrap();
        let req = store_build_delete_order(client, id.as_ptr());
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Delete));
        assert_eq!(c_str(req_ref.path), "http://localhost:3000/store/order/8");
        assert!(req_ref.body.is_null());

        store_free_request(req);
        store_client_free(client);
    }

    #[test]
    fn build_delete_order_null_id_returns_null() {
        let client = new_client();
        let req = store_build_delete_order(client, std::ptr::null());
        assert!(req.is_null());
        store_client_free(client);
    }

    #[test]
    fn build_place_order_produces_post_with_json_body() {
        let client = new_client();
        let order = FfiOrderInput {
            pet_id: 3,
            has_pet_id: true,
            quantity: 2,
            has_quantity: true,
            status: FfiOrderStatus::Placed as u32,
            ..empty_order_input()
        };
        let req = store_build_place_order(client, &order);
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Post));
        assert!(headers(req_ref)
            .contains(&("content-type".to_string(), "application/json".to_string())));

        let body: serde_json::Value = serde_json::from_str(c_str(req_ref.body)).unwrap();
        assert_eq!(body["petId"], 3);
        assert_eq!(body["quantity"], 2);
        assert_eq!(body["status"], "placed");
        assert!(body.get("id").is_none());
        assert!(body.get("shipDate").is_none());

        store_free_request(req);
        store_client_free(client);
    }

    #[test]
    fn build_place_order_bad_ship_date_returns_null() {
        let client = new_client();
        let date = CString::new("next tuesday").unwrap();
        let order = FfiOrderInput {
            ship_date: date.as_ptr(),
            ..empty_order_input()
        };
        let req = store_build_place_order(client, &order);
        assert!(req.is_null());
        store_client_free(client);
    }

    #[test]
    fn build_place_order_unknown_status_returns_null() {
        let client = new_client();
        let order = FfiOrderInput {
            status: 9,
            ..empty_order_input()
        };
        assert!(store_build_place_order(client, &order).is_null());

        let order = FfiOrderInput {
            status: FfiOrderStatus::Delivered as u32,
            ..empty_order_input()
        };
        let req = store_build_place_order(client, &order);
        assert!(!req.is_null());
        store_free_request(req);
        store_client_free(client);
    }

    #[test]
    fn parse_get_inventory_sorted_entries() {
        let client = new_client();
        let body = CString::new(r#"{"sold":3,"available":7,"pending":2}"#).unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = store_parse_get_inventory(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::Inventory);

        let inventory = unsafe { &*(r.data as *const FfiInventory) };
        assert_eq!(inventory.len, 3);
        let entries =
            unsafe { std::slice::from_raw_parts(inventory.entries, inventory.len as usize) };
        assert_eq!(c_str(entries[0].status), "available");
        assert_eq!(entries[0].quantity, 7);
        assert_eq!(c_str(entries[2].status), "sold");
        assert_eq!(entries[2].quantity, 3);

        store_free_result(result);
        store_client_free(client);
    }

    #[test]
    fn parse_get_inventory_empty() {
        let client = new_client();
        let body = CString::new("{}").unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = store_parse_get_inventory(client, &resp);
        let r = unsafe { &*result };
        let inventory = unsafe { &*(r.data as *const FfiInventory) };
        assert_eq!(inventory.len, 0);
        assert!(inventory.entries.is_null());

        store_free_result(result);
        store_client_free(client);
    }

    #[test]
    fn parse_get_order_by_id_success() {
        let client = new_client();
        let body = CString::new(
            r#"{"id":7,"petId":2,"quantity":1,"shipDate":"2024-05-01T10:00:00Z","status":"approved","complete":true}"#,
        )
        .unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = store_parse_get_order_by_id(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::Order);

        let order = unsafe { &*(r.data as *const FfiOrder) };
        assert!(order.has_id);
        assert_eq!(order.id, 7);
        assert_eq!(order.pet_id, 2);
        assert_eq!(order.status, FfiOrderStatus::Approved);
        assert_eq!(c_str(order.ship_date), "2024-05-01T10:00:00Z");
        assert!(order.complete);

        store_free_result(result);
        store_client_free(client);
    }

    #[test]
    fn parse_get_order_by_id_invalid_id() {
        let client = new_client();
        let body = CString::new("Invalid ID supplied").unwrap();
        let resp = FfiHttpResponse {
            status: 400,
            body: body.as_ptr(),
        };
        let result = store_parse_get_order_by_id(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Http);
        assert_eq!(r.http_status, 400);
        assert_eq!(c_str(r.error_message), "HTTP 400: Invalid ID supplied");
        assert!(r.data.is_null());

        store_free_result(result);
        store_client_free(client);
    }

    #[test]
    fn parse_place_order_success() {
        let client = new_client();
        let body = CString::new(r#"{"id":11,"petId":3,"quantity":2,"complete":false}"#).unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = store_parse_place_order(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);

        let order = unsafe { &*(r.data as *const FfiOrder) };
        assert_eq!(order.id, 11);
        assert!(order.ship_date.is_null());
        assert_eq!(order.status, FfiOrderStatus::Unset);

        store_free_result(result);
        store_client_free(client);
    }

    #[test]
    fn parse_place_order_bad_json() {
        let client = new_client();
        let body = CString::new("not json").unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = store_parse_place_order(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Deserialization);

        store_free_result(result);
        store_client_free(client);
    }

    #[test]
    fn parse_delete_order_success_with_null_body() {
        let client = new_client();
        let resp = FfiHttpResponse {
            status: 200,
            body: std::ptr::null(),
        };
        let result = store_parse_delete_order(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert_eq!(r.data_tag, FfiDataTag::None);
        assert!(r.data.is_null());

        store_free_result(result);
        store_client_free(client);
    }

    #[test]
    fn parse_delete_order_not_found() {
        let client = new_client();
        let body = CString::new("").unwrap();
        let resp = FfiHttpResponse {
            status: 404,
            body: body.as_ptr(),
        };
        let result = store_parse_delete_order(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NotFound);
        assert_eq!(r.http_status, 404);
        assert!(!r.error_message.is_null());

        store_free_result(result);
        store_client_free(client);
    }

    #[test]
    fn parse_null_client_returns_null_arg() {
        let body = CString::new("{}").unwrap();
        let resp = FfiHttpResponse {
            status: 200,
            body: body.as_ptr(),
        };
        let result = store_parse_get_inventory(std::ptr::null(), &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);

        store_free_result(result);
    }

    #[test]
    fn parse_null_response_returns_null_arg() {
        let client = new_client();
        let result = store_parse_get_order_by_id(client, std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);

        store_free_result(result);
        store_client_free(client);
    }

    #[test]
    fn free_request_null_is_safe() {
        store_free_request(std::ptr::null_mut());
    }

    #[test]
    fn free_result_null_is_safe() {
        store_free_result(std::ptr::null_mut());
    }

    #[test]
    fn free_string_null_is_safe() {
        store_free_string(std::ptr::null_mut());
    }
}
