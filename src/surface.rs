// src/surface.rs

//! The display target: a thin owner of one `SDL_Window`.

use std::ffi::CString;
use std::marker::PhantomData;
use std::ptr::NonNull;

use bitflags::bitflags;
use libc::c_int;
use log::{debug, info};
use sdl2_sys as sys;

use crate::error::{backend_message, Error, Result};
use crate::init::Sdl;

/// Let the windowing system pick the position on the relevant axis.
pub const POS_UNDEFINED: i32 = 0x1FFF_0000;
/// Center the window on the relevant axis.
pub const POS_CENTERED: i32 = 0x2FFF_0000;

bitflags! {
    /// Creation flags for a [`Surface`], mirroring `SDL_WindowFlags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SurfaceFlags: u32 {
        const FULLSCREEN = sys::SDL_WindowFlags::SDL_WINDOW_FULLSCREEN as u32;
        const OPENGL = sys::SDL_WindowFlags::SDL_WINDOW_OPENGL as u32;
        const SHOWN = sys::SDL_WindowFlags::SDL_WINDOW_SHOWN as u32;
        const HIDDEN = sys::SDL_WindowFlags::SDL_WINDOW_HIDDEN as u32;
        const BORDERLESS = sys::SDL_WindowFlags::SDL_WINDOW_BORDERLESS as u32;
        const RESIZABLE = sys::SDL_WindowFlags::SDL_WINDOW_RESIZABLE as u32;
        const MINIMIZED = sys::SDL_WindowFlags::SDL_WINDOW_MINIMIZED as u32;
        const MAXIMIZED = sys::SDL_WindowFlags::SDL_WINDOW_MAXIMIZED as u32;
        const ALLOW_HIGHDPI = sys::SDL_WindowFlags::SDL_WINDOW_ALLOW_HIGHDPI as u32;
    }
}

/// An owned display/drawing target.
///
/// The handle is non-null for the object's entire lifetime: construction
/// either yields a fully valid `Surface` or an error, never something in
/// between. The native window is destroyed exactly once, when the
/// `Surface` is dropped. Move-only; there is no way to clone the handle
/// into a second owner.
#[derive(Debug)]
pub struct Surface<'sdl> {
    raw: NonNull<sys::SDL_Window>,
    _sdl: PhantomData<&'sdl Sdl>,
}

impl<'sdl> Surface<'sdl> {
    /// Allocates a native display target.
    ///
    /// `x`/`y` take pixel coordinates or the [`POS_CENTERED`] /
    /// [`POS_UNDEFINED`] sentinels.
    ///
    /// # Errors
    ///
    /// [`Error::CreationFailed`] when the platform refuses the allocation
    /// (out of resources, invalid flag combination, headless environment
    /// without a usable video driver).
    pub fn create(
        _sdl: &'sdl Sdl,
        title: &str,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        flags: SurfaceFlags,
    ) -> Result<Self> {
        info!(
            "Creating surface '{}' at ({}, {}), {}x{}px, flags {:?}.",
            title, x, y, width, height, flags
        );
        let title_cstr = CString::new(title).map_err(|_| Error::CreationFailed {
            what: "surface",
            message: "title contains an interior NUL byte".to_string(),
        })?;

        // SAFETY: the Sdl borrow proves the video subsystem is up; the
        // title pointer is valid for the duration of the call.
        let raw = unsafe {
            sys::SDL_CreateWindow(
                title_cstr.as_ptr(),
                x as c_int,
                y as c_int,
                width as c_int,
                height as c_int,
                flags.bits(),
            )
        };

        match NonNull::new(raw) {
            Some(raw) => {
                debug!("Surface created: {:p}.", raw);
                Ok(Self {
                    raw,
                    _sdl: PhantomData,
                })
            }
            None => Err(Error::CreationFailed {
                what: "surface",
                message: backend_message(),
            }),
        }
    }

    /// Current pixel dimensions.
    ///
    /// Re-queried from the backend on every call: the window manager may
    /// resize the surface at any time, so callers must not cache this.
    pub fn size(&self) -> (u32, u32) {
        let mut width: c_int = 0;
        let mut height: c_int = 0;
        // SAFETY: the handle is valid for the lifetime of self.
        unsafe { sys::SDL_GetWindowSize(self.raw.as_ptr(), &mut width, &mut height) };
        (width as u32, height as u32)
    }

    #[inline]
    pub(crate) fn raw(&self) -> *mut sys::SDL_Window {
        self.raw.as_ptr()
    }
}

impl Drop for Surface<'_> {
    fn drop(&mut self) {
        debug!("Destroying surface {:p}.", self.raw);
        // SAFETY: the handle was acquired by create and is released here
        // exactly once; move-only semantics rule out a second owner.
        unsafe { sys::SDL_DestroyWindow(self.raw.as_ptr()) };
    }
}
