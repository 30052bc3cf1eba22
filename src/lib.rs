//! Stress-majorization graph layout engine: embeds an edge-weighted graph
//! into 2D or 3D so Euclidean distances track graph-theoretic ones, with
//! pinned nodes, disjoint-component separation and an optional dihedral
//! Jacobian constraint. See [`run_layout`] for the core entry point; the
//! C-ABI and WASM surfaces below just marshal strings across the FFI
//! boundary around it.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use wasm_bindgen::prelude::*;

pub mod apsp;
pub mod config;
pub mod error;
pub mod graph;
pub mod output;
pub mod parser;
pub mod physics;
pub mod separate;
pub mod solver;

pub use config::LayoutConfig;
pub use error::{LayoutError, ParseError};
pub use graph::Graph;

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen]
pub fn set_panic_hook() {
    // `console_error_panic_hook` is an unconditional dependency (not feature-gated),
    // so a WASM panic surfaces as a readable `console.error` instead of an opaque trap.
    console_error_panic_hook::set_once();
}

/// Parses `input`, runs the full pipeline (APSP, component separation,
/// stress solver, physics relaxer) and returns the serialized layout.
///
/// This is the one place that wires stages P through F together; every
/// FFI surface below is a thin wrapper around it.
pub fn run_layout(input: &str) -> Result<String, LayoutError> {
    let (mut graph, config, ndim) = parser::parse(input)?;

    apsp::compute(&mut graph);
    separate::separate_components(&mut graph, config.separate);

    let mut positions = solver::run(&graph, &config, ndim);

    if config.viscous_iterations > 0 {
        physics::rescale(&graph, ndim, &mut positions);
        physics::relax(
            &graph,
            ndim,
            config.viscous_iterations,
            config.viscous_timestep,
            config.viscous_damping,
            &mut positions,
        );
    }

    Ok(output::serialize(&graph, ndim, &positions))
}

/// WASM entry point (mirrors the layout call the browser-hosted renderer
/// drives). Memory is managed automatically by `wasm-bindgen`.
#[wasm_bindgen]
pub fn perform_layout(input: String) -> Result<String, JsValue> {
    run_layout(&input).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Native C-ABI entry point. Takes ownership of nothing: `input` must be a
/// valid NUL-terminated UTF-8 string owned by the caller. Returns a newly
/// allocated NUL-terminated string that the caller must release via
/// [`free_layout_result`]; returns a null pointer on any parse or encoding
/// failure (the error itself is logged rather than propagated across the
/// ABI, since there is no `Result` type for C callers to inspect).
///
/// # Safety
/// `input` must be a valid pointer to a NUL-terminated C string that
/// remains valid for the duration of this call.
#[allow(non_snake_case)]
#[no_mangle]
pub unsafe extern "C" fn performLayout(input: *const c_char) -> *mut c_char {
    if input.is_null() {
        log::error!("performLayout called with a null pointer");
        return std::ptr::null_mut();
    }

    let input_str = match CStr::from_ptr(input).to_str() {
        Ok(s) => s,
        Err(_) => {
            log::error!("{}", LayoutError::InvalidUtf8);
            return std::ptr::null_mut();
        }
    };

    match run_layout(input_str) {
        Ok(output) => match CString::new(output) {
            Ok(c_string) => c_string.into_raw(),
            Err(e) => {
                log::error!("layout output contained an interior NUL byte: {e}");
                std::ptr::null_mut()
            }
        },
        Err(e) => {
            log::error!("{e}");
            std::ptr::null_mut()
        }
    }
}

/// Releases a string previously returned by [`performLayout`]. Required
/// because an arbitrary C caller has no way to drive Rust's allocator
/// directly; passing a pointer not obtained from `performLayout`, or
/// calling this twice on the same pointer, is undefined behavior.
///
/// # Safety
/// `ptr` must either be null or a pointer previously returned by
/// [`performLayout`], not yet freed.
#[no_mangle]
pub unsafe extern "C" fn free_layout_result(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    drop(CString::from_raw(ptr));
}
