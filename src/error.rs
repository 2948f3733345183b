// src/error.rs

//! The error contract shared by every resource type in the crate.
//!
//! The backend's own failure reasons are implementation-defined, so they
//! are not re-encoded into fine-grained variants: construction failures
//! become [`Error::CreationFailed`], per-call draw failures pass through as
//! [`Error::BackendStatus`] with the code and `SDL_GetError` text captured
//! at the failure site.

use std::ffi::CStr;
use std::path::PathBuf;

use sdl2_sys as sys;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the resource wrappers.
#[derive(Debug, Error)]
pub enum Error {
    /// The backend refused to allocate a handle (surface, context, image,
    /// or the library itself). Construction is atomic: when this is
    /// returned, no partially initialized resource exists.
    #[error("could not create {what}: {message}")]
    CreationFailed {
        /// Which resource failed to come up ("surface", "context", ...).
        what: &'static str,
        /// Diagnostic text from `SDL_GetError` at the failure site.
        message: String,
    },

    /// `lock` was refused: the image is already locked, its access mode
    /// does not support locking, or a bulk update was attempted while a
    /// lock is active.
    #[error("could not lock image: {0}")]
    LockFailed(String),

    /// `unlock` (or a locked-only accessor) was called without a matching
    /// successful `lock`.
    #[error("image is not locked")]
    NotLocked,

    /// The font file is missing, unreadable, or not a recognized format.
    #[error("could not open font {path}: {message}")]
    FontLoadFailed {
        /// The path handed to `Typeface::load`.
        path: PathBuf,
        /// Diagnostic text from the font engine.
        message: String,
    },

    /// A per-call draw/update operation failed. The code is the backend's
    /// return value, passed through uninterpreted; retrying is caller
    /// policy, not something this layer decides.
    #[error("backend call failed (status {code}): {message}")]
    BackendStatus {
        /// Raw nonzero return value from the backend call.
        code: i32,
        /// Diagnostic text from `SDL_GetError` at the failure site.
        message: String,
    },
}

/// Snapshots the backend's thread-local diagnostic string.
///
/// Must be called immediately after the failing call, before any other
/// backend call can overwrite it.
pub(crate) fn backend_message() -> String {
    // SAFETY: SDL_GetError always returns a valid NUL-terminated string
    // owned by SDL (possibly empty), never null.
    unsafe {
        CStr::from_ptr(sys::SDL_GetError())
            .to_string_lossy()
            .into_owned()
    }
}

/// Maps a backend status code to `Ok(())` or a `BackendStatus` error.
pub(crate) fn backend_status(code: libc::c_int) -> Result<()> {
    if code == 0 {
        Ok(())
    } else {
        Err(Error::BackendStatus {
            code,
            message: backend_message(),
        })
    }
}
