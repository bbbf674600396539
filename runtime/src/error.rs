//! Compute-runtime errors

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Failure reported by a compute runtime.
///
/// Every variant is fatal to a benchmark run; callers attach the stage that
/// was executing and propagate it.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("couldn't identify a platform")]
    NoPlatform,

    #[error("couldn't access any devices on platform {platform}")]
    NoDevice { platform: String },

    #[error("couldn't find the program file {}", .path.display())]
    SourceNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't build the program:\n{log}")]
    Build { log: String },

    #[error("kernel `{0}` is not defined by the program")]
    KernelNotFound(String),

    #[error("{}{}: {}", .op, status_suffix(.status), .message)]
    Call {
        op: &'static str,
        status: Option<i32>,
        message: String,
    },

    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl RuntimeError {
    /// A failed runtime call without a numeric status
    pub fn call(op: &'static str, message: impl Into<String>) -> Self {
        RuntimeError::Call {
            op,
            status: None,
            message: message.into(),
        }
    }

    /// Numeric status code reported by the driver, if any
    pub fn status(&self) -> Option<i32> {
        match self {
            RuntimeError::Call { status, .. } => *status,
            _ => None,
        }
    }
}

fn status_suffix(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!(" (err # {})", code),
        None => String::new(),
    }
}
