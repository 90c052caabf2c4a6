//! FFI bindings for the Powerlog engine
//!
//! C-compatible functions for calling the engine from the mobile app. Every
//! call takes and returns JSON as null-terminated C strings. Returned strings
//! are allocated here and must be freed with `powerlog_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::api::evaluate_json;
use crate::config::RulesConfig;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Convert a C string to a Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Convert a Rust string to a C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn evaluate_to_cstr(request: &str, config: &RulesConfig) -> *mut c_char {
    match evaluate_json(request, config) {
        Ok(response) => string_to_cstr(&response),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Evaluation
// ============================================================================

/// Evaluate a JSON request with the default rule thresholds.
///
/// # Safety
/// - `request_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `powerlog_free_string`.
/// - Returns NULL on error; call `powerlog_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn powerlog_evaluate(request_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let request = match cstr_to_string(request_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid request string pointer");
            return ptr::null_mut();
        }
    };

    evaluate_to_cstr(&request, &RulesConfig::default())
}

/// Evaluate a JSON request with thresholds from a JSON `RulesConfig`.
///
/// # Safety
/// - `request_json` and `config_json` must be valid null-terminated C strings.
/// - Returns a newly allocated string that must be freed with `powerlog_free_string`.
/// - Returns NULL on error; call `powerlog_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn powerlog_evaluate_with_config(
    request_json: *const c_char,
    config_json: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let request = match cstr_to_string(request_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid request string pointer");
            return ptr::null_mut();
        }
    };

    let config_str = match cstr_to_string(config_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid config string pointer");
            return ptr::null_mut();
        }
    };

    let config = match RulesConfig::from_json(&config_str) {
        Ok(config) => config,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    evaluate_to_cstr(&request, &config)
}

/// Validate a JSON `RulesConfig`.
///
/// # Safety
/// - `config_json` must be a valid null-terminated C string.
/// - Returns 0 if valid, -1 otherwise; call `powerlog_last_error` for details.
#[no_mangle]
pub unsafe extern "C" fn powerlog_validate_config(config_json: *const c_char) -> i32 {
    clear_last_error();

    let config_str = match cstr_to_string(config_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid config string pointer");
            return -1;
        }
    };

    match RulesConfig::from_json(&config_str) {
        Ok(_) => 0,
        Err(e) => {
            set_last_error(&e.to_string());
            -1
        }
    }
}

/// Free a string returned by Powerlog functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a Powerlog function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn powerlog_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next Powerlog call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn powerlog_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

/// Get the engine version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn powerlog_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
