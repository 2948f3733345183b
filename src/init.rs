// src/init.rs

//! Process-wide backend initialization guard.
//!
//! `SDL_Init`/`SDL_Quit` and `TTF_Init`/`TTF_Quit` are process-global and
//! not reference counted, so the pairing is owned by a single RAII value
//! rather than left to caller discipline. [`Surface::create`] and
//! [`Typeface::load`] take `&Sdl`, which encodes "the backend is up" as a
//! borrow the compiler checks.
//!
//! [`Surface::create`]: crate::surface::Surface::create
//! [`Typeface::load`]: crate::typeface::Typeface::load

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use sdl2_sys as sys;

use crate::error::{backend_message, Error, Result};

/// True while an `Sdl` guard is live. `SDL_Init` is not reentrant, so a
/// second guard is refused instead of trampling the first.
static SDL_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Owns the video subsystem and the font engine for its whole lifetime.
///
/// At most one `Sdl` may be live per process. Dropping it shuts the
/// backend down; every `Surface` and `Typeface` must have been dropped
/// first, which the borrow they hold guarantees.
#[derive(Debug)]
pub struct Sdl {
    // Raw-pointer marker keeps this (and everything borrowing it) off
    // other threads; SDL's drawing path is single-threaded.
    _not_send: PhantomData<*mut ()>,
}

impl Sdl {
    /// Initializes the SDL video subsystem and the TTF engine.
    ///
    /// Fails atomically: if the font engine refuses to come up after the
    /// video subsystem succeeded, the video subsystem is shut down before
    /// the error is returned.
    ///
    /// # Errors
    ///
    /// [`Error::CreationFailed`] if either subsystem cannot initialize
    /// (headless environment without a usable video driver, missing
    /// libraries) or if another `Sdl` guard is already live.
    pub fn init() -> Result<Self> {
        if SDL_ACTIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::CreationFailed {
                what: "backend",
                message: "SDL is already initialized in this process".to_string(),
            });
        }

        info!("Initializing SDL video subsystem.");
        // SAFETY: plain FFI call; the atomic above serializes init/quit.
        let status = unsafe { sys::SDL_Init(sys::SDL_INIT_VIDEO) };
        if status != 0 {
            let message = backend_message();
            SDL_ACTIVE.store(false, Ordering::SeqCst);
            return Err(Error::CreationFailed {
                what: "backend",
                message,
            });
        }

        debug!("Initializing TTF engine.");
        // SAFETY: as above; on failure the video subsystem is torn down
        // again so no partially initialized guard escapes.
        let status = unsafe { sys::ttf::TTF_Init() };
        if status != 0 {
            let message = backend_message();
            unsafe { sys::SDL_Quit() };
            SDL_ACTIVE.store(false, Ordering::SeqCst);
            return Err(Error::CreationFailed {
                what: "font engine",
                message,
            });
        }

        info!("SDL backend initialized.");
        Ok(Self {
            _not_send: PhantomData,
        })
    }
}

impl Drop for Sdl {
    fn drop(&mut self) {
        info!("Shutting down SDL backend.");
        // SAFETY: this guard initialized both subsystems and nothing that
        // borrows it can still be alive.
        unsafe {
            sys::ttf::TTF_Quit();
            sys::SDL_Quit();
        }
        SDL_ACTIVE.store(false, Ordering::SeqCst);
    }
}
