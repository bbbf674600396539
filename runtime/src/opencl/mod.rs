//! OpenCL backend
//!
//! Wraps the `ocl` crate. One [`OpenClRuntime`] owns the platform, device,
//! context, built program and a profiling-enabled command queue for the
//! whole run; buffers, kernels and events are per-iteration.

mod session;

pub use session::{list_devices, OpenClRuntime};

use crate::RuntimeError;

/// Wrap an `ocl` error from runtime call `op`, keeping the API status code
pub(crate) fn call_error(op: &'static str) -> impl FnOnce(ocl::Error) -> RuntimeError {
    move |err| RuntimeError::Call {
        op,
        status: err.api_status().map(|status| status as i32),
        message: err.to_string(),
    }
}
