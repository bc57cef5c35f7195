//! C-compatible FFI API for cross-language bindings.
//!
//! # ABI Contract
//!
//! All exported functions use `extern "C"` calling convention and `#[no_mangle]`
//! to ensure stable symbol names.
//!
//! ## Memory management
//! - Buffers returned by `docpress_*` functions are allocated on the Rust heap.
//! - Callers **must** free them with `docpress_free_buffer` / `docpress_free_string`.
//! - Passing a null pointer to a free function is a no-op.
//!
//! ## Error handling
//! - Functions that can fail return a `c_int` (0 = success, non-zero = error):
//!   1 null argument, 2 invalid UTF-8, 3 other failure, 4 empty document,
//!   5 invalid configuration.
//! - Error details can be retrieved via `docpress_last_error`.
//!
//! ## Thread safety
//! - `docpress_last_error` uses a thread-local, so it is safe to call from
//!   multiple threads. Renders share no state.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::slice;

use crate::error::Error;
use crate::layout_config::LayoutConfig;
use crate::pipeline::{compute_layout_config, generate_pdf, PageOrientation, PipelineConfig};
use crate::render::render_pdf;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn fail(err: &Error) -> c_int {
    set_last_error(&err.to_string());
    match err {
        Error::EmptyDocument => 4,
        Error::Config(_) => 5,
        _ => 3,
    }
}

// ---------------------------------------------------------------------------
// C-compatible configuration types
// ---------------------------------------------------------------------------

/// Page orientation for use in [`DocpressPipelineConfig`].
#[repr(C)]
pub enum DocpressPageOrientation {
    /// Portrait mode: height > width (default).
    Portrait = 0,
    /// Landscape mode: width > height.
    Landscape = 1,
}

/// Optional configuration passed to the generation functions.
///
/// Numeric fields set to `0` and string fields set to `NULL` fall back to
/// their defaults (A4, 20 mm margin, empty names).
#[repr(C)]
pub struct DocpressPipelineConfig {
    /// Page width in points. Pass `0.0` to use the default (A4 = 595.28).
    pub page_width: f32,
    /// Page height in points. Pass `0.0` to use the default (A4 = 841.89).
    pub page_height: f32,
    /// Page margin in points. Pass `0.0` to use the default (56.69 pt).
    pub page_margin: f32,
    /// Page orientation (portrait = 0, landscape = 1).
    pub orientation: DocpressPageOrientation,
    /// Null-terminated UTF-8 site name for the header and copyright caption.
    pub site_name: *const c_char,
    /// Null-terminated UTF-8 company name for the "Generated by" caption.
    pub company_name: *const c_char,
}

/// Read an optional C string. `Ok(None)` for null.
///
/// # Safety
/// `s`, if non-null, must point to a valid null-terminated string.
unsafe fn opt_cstr(s: *const c_char) -> Result<Option<String>, c_int> {
    if s.is_null() {
        return Ok(None);
    }
    match CStr::from_ptr(s).to_str() {
        Ok(v) => Ok(Some(v.to_string())),
        Err(e) => {
            set_last_error(&format!("Invalid UTF-8: {e}"));
            Err(2)
        }
    }
}

/// Convert a `DocpressPipelineConfig` (FFI) to a `PipelineConfig` (Rust).
///
/// # Safety
/// The string fields, if non-null, must point to valid null-terminated strings.
unsafe fn pipeline_config_from_c(cfg: *const DocpressPipelineConfig) -> Result<PipelineConfig, c_int> {
    let defaults = PipelineConfig::default();
    if cfg.is_null() {
        return Ok(defaults);
    }
    let cfg = &*cfg;

    let pick = |v: f32, d: f32| if v == 0.0 { d } else { v };
    Ok(PipelineConfig {
        page_width: pick(cfg.page_width, defaults.page_width),
        page_height: pick(cfg.page_height, defaults.page_height),
        page_margin: pick(cfg.page_margin, defaults.page_margin),
        orientation: match cfg.orientation {
            DocpressPageOrientation::Portrait => PageOrientation::Portrait,
            DocpressPageOrientation::Landscape => PageOrientation::Landscape,
        },
        site_name: opt_cstr(cfg.site_name)?.unwrap_or_default(),
        company_name: opt_cstr(cfg.company_name)?.unwrap_or_default(),
        ..defaults
    })
}

/// Decode the common `(title, body, cfg)` inputs.
///
/// # Safety
/// See [`docpress_generate_pdf`].
unsafe fn read_inputs<'a>(
    title: *const c_char,
    body_ptr: *const u8,
    body_len: u32,
    cfg: *const DocpressPipelineConfig,
) -> Result<(String, &'a str, PipelineConfig), c_int> {
    let title = opt_cstr(title)?.unwrap_or_default();
    let body_bytes: &'a [u8] = slice::from_raw_parts(body_ptr, body_len as usize);
    let body = std::str::from_utf8(body_bytes).map_err(|e| {
        set_last_error(&format!("Invalid UTF-8: {e}"));
        2
    })?;
    let config = pipeline_config_from_c(cfg)?;
    Ok((title, body, config))
}

unsafe fn hand_out_buffer(bytes: Vec<u8>, out_buf: *mut *mut u8, out_len: *mut u32) {
    let len = bytes.len() as u32;
    let buf = bytes.into_boxed_slice();
    *out_buf = Box::into_raw(buf) as *mut u8;
    *out_len = len;
}

// ---------------------------------------------------------------------------
// Core API
// ---------------------------------------------------------------------------

/// Generate a PDF from a title and a markup body.
///
/// # Parameters
/// - `title`: null-terminated UTF-8 title, or `NULL` for none
/// - `body_ptr`, `body_len`: UTF-8 markup bytes (not necessarily null-terminated)
/// - `cfg`: optional pointer to a [`DocpressPipelineConfig`]; pass `NULL` for defaults
/// - `out_buf`, `out_len`: on success, receive the heap-allocated PDF bytes
///
/// # Returns
/// `0` on success, non-zero on error. On error, call `docpress_last_error`.
///
/// # Safety
/// - `body_ptr` must point to `body_len` valid bytes.
/// - `title` and `cfg` string fields, if non-null, must be valid C strings.
/// - `out_buf` and `out_len` must be valid pointers.
/// - The caller must free `*out_buf` by calling `docpress_free_buffer`.
#[no_mangle]
pub unsafe extern "C" fn docpress_generate_pdf(
    title: *const c_char,
    body_ptr: *const u8,
    body_len: u32,
    cfg: *const DocpressPipelineConfig,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if body_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }
    let (title, body, config) = match read_inputs(title, body_ptr, body_len, cfg) {
        Ok(inputs) => inputs,
        Err(code) => return code,
    };

    match generate_pdf(&title, body, &config) {
        Ok((pdf_bytes, _)) => {
            hand_out_buffer(pdf_bytes, out_buf, out_len);
            0
        }
        Err(e) => fail(&e),
    }
}

/// Compute only the layout (no PDF rendering). Returns JSON.
///
/// # Safety
/// Same as `docpress_generate_pdf`; `*out_json_ptr` must be freed with
/// `docpress_free_string`.
#[no_mangle]
pub unsafe extern "C" fn docpress_compute_layout(
    title: *const c_char,
    body_ptr: *const u8,
    body_len: u32,
    cfg: *const DocpressPipelineConfig,
    out_json_ptr: *mut *mut c_char,
) -> c_int {
    if body_ptr.is_null() || out_json_ptr.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }
    let (title, body, config) = match read_inputs(title, body_ptr, body_len, cfg) {
        Ok(inputs) => inputs,
        Err(code) => return code,
    };

    let layout = match compute_layout_config(&title, body, &config) {
        Ok(layout) => layout,
        Err(e) => return fail(&e),
    };

    match CString::new(layout.to_json()) {
        Ok(cs) => {
            *out_json_ptr = cs.into_raw();
            0
        }
        Err(_) => {
            set_last_error("JSON contained null byte");
            3
        }
    }
}

/// Render a PDF from a layout JSON string.
///
/// This allows pre-computing the layout and rendering separately.
///
/// # Safety
/// `json_ptr` must be a valid null-terminated string; `out_buf` and
/// `out_len` must be valid pointers.
#[no_mangle]
pub unsafe extern "C" fn docpress_render_from_layout(
    json_ptr: *const c_char,
    out_buf: *mut *mut u8,
    out_len: *mut u32,
) -> c_int {
    if json_ptr.is_null() || out_buf.is_null() || out_len.is_null() {
        set_last_error("Null pointer argument");
        return 1;
    }

    let json = match opt_cstr(json_ptr) {
        Ok(Some(s)) => s,
        Ok(None) => return 1,
        Err(code) => return code,
    };

    let result = LayoutConfig::from_json(&json).and_then(|layout| render_pdf(&layout));
    match result {
        Ok(pdf_bytes) => {
            hand_out_buffer(pdf_bytes, out_buf, out_len);
            0
        }
        Err(e) => fail(&e),
    }
}

// ---------------------------------------------------------------------------
// Memory management
// ---------------------------------------------------------------------------

/// Free a PDF buffer returned by `docpress_generate_pdf`.
///
/// # Safety
/// `buf` must have been returned by a previous `docpress_*` call, and `len`
/// must be the corresponding length.
#[no_mangle]
pub unsafe extern "C" fn docpress_free_buffer(buf: *mut u8, len: u32) {
    if !buf.is_null() {
        let _ = Box::from_raw(slice::from_raw_parts_mut(buf, len as usize));
    }
}

/// Free a layout JSON string.
///
/// # Safety
/// `s` must have been returned by Rust's `CString::into_raw`.
#[no_mangle]
pub unsafe extern "C" fn docpress_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}

/// Retrieve the last error message. Returns a null-terminated string.
///
/// The returned pointer is valid until the next `docpress_*` call on the
/// same thread. The caller should **not** free this pointer.
///
/// Returns null if no error has occurred.
#[no_mangle]
pub extern "C" fn docpress_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        let borrow = e.borrow();
        match borrow.as_ref() {
            Some(cs) => cs.as_ptr(),
            None => ptr::null(),
        }
    })
}

/// Return the library version as a null-terminated string.
/// The caller must **not** free this pointer.
#[no_mangle]
pub extern "C" fn docpress_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
