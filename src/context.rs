// src/context.rs

//! The drawing context: a renderer bound to exactly one [`Surface`].

use std::marker::PhantomData;
use std::ptr::NonNull;

use bitflags::bitflags;
use libc::c_int;
use log::{debug, info, trace};
use sdl2_sys as sys;

use crate::color::Color;
use crate::error::{backend_message, backend_status, Error, Result};
use crate::geometry::Rect;
use crate::surface::Surface;

/// Driver index asking the backend for the first driver compatible with
/// the requested flags.
pub const FIRST_COMPATIBLE_DRIVER: i32 = -1;

bitflags! {
    /// Creation flags for a [`Context`], mirroring `SDL_RendererFlags`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ContextFlags: u32 {
        const SOFTWARE = sys::SDL_RendererFlags::SDL_RENDERER_SOFTWARE as u32;
        const ACCELERATED = sys::SDL_RendererFlags::SDL_RENDERER_ACCELERATED as u32;
        const PRESENT_VSYNC = sys::SDL_RendererFlags::SDL_RENDERER_PRESENTVSYNC as u32;
        const TARGET_TEXTURE = sys::SDL_RendererFlags::SDL_RENDERER_TARGETTEXTURE as u32;
    }
}

/// An owned drawing context bound to one [`Surface`].
///
/// The borrow of the surface is non-owning: the context must not outlive
/// the surface it was built from (the compiler enforces this) and does not
/// extend the surface's lifetime. Each draw operation maps 1:1 onto a
/// backend call; a nonzero status is passed through as
/// [`Error::BackendStatus`] without interpretation.
///
/// Per frame, call [`clear`](Context::clear), issue draw calls, then
/// [`present`](Context::present). After `present` the backbuffer is
/// undefined on some backends until the next `clear`, so drawing before
/// clearing may be clipped to stale regions.
#[derive(Debug)]
pub struct Context<'s> {
    raw: NonNull<sys::SDL_Renderer>,
    _surface: PhantomData<&'s Surface<'s>>,
}

impl<'s> Context<'s> {
    /// Binds a drawing context to a surface.
    ///
    /// `driver_index` selects a backend driver;
    /// [`FIRST_COMPATIBLE_DRIVER`] lets the backend pick.
    ///
    /// # Errors
    ///
    /// [`Error::CreationFailed`] when no driver is compatible with the
    /// requested flags.
    pub fn create(surface: &'s Surface<'s>, driver_index: i32, flags: ContextFlags) -> Result<Self> {
        info!(
            "Creating context (driver {}, flags {:?}).",
            driver_index, flags
        );
        // SAFETY: the surface borrow keeps its handle valid for at least
        // as long as the new context.
        let raw =
            unsafe { sys::SDL_CreateRenderer(surface.raw(), driver_index as c_int, flags.bits()) };

        match NonNull::new(raw) {
            Some(raw) => {
                debug!("Context created: {:p}.", raw);
                Ok(Self {
                    raw,
                    _surface: PhantomData,
                })
            }
            None => Err(Error::CreationFailed {
                what: "context",
                message: backend_message(),
            }),
        }
    }

    /// Sets the color used by [`clear`](Context::clear),
    /// [`draw_line`](Context::draw_line), and
    /// [`fill_rect`](Context::fill_rect).
    pub fn set_draw_color(&self, color: Color) -> Result<()> {
        trace!("set_draw_color({:?})", color);
        // SAFETY: handle valid for the lifetime of self.
        let status = unsafe {
            sys::SDL_SetRenderDrawColor(self.raw.as_ptr(), color.r, color.g, color.b, color.a)
        };
        backend_status(status)
    }

    /// Fills the whole target with the current draw color.
    pub fn clear(&self) -> Result<()> {
        trace!("clear()");
        // SAFETY: handle valid for the lifetime of self.
        let status = unsafe { sys::SDL_RenderClear(self.raw.as_ptr()) };
        backend_status(status)
    }

    /// Draws a line between two points with subpixel endpoints.
    pub fn draw_line(&self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<()> {
        trace!("draw_line(({}, {}) -> ({}, {}))", x1, y1, x2, y2);
        // SAFETY: handle valid for the lifetime of self.
        let status = unsafe { sys::SDL_RenderDrawLineF(self.raw.as_ptr(), x1, y1, x2, y2) };
        backend_status(status)
    }

    /// Fills `rect` with the current draw color.
    pub fn fill_rect(&self, rect: Rect) -> Result<()> {
        trace!("fill_rect({:?})", rect);
        let raw_rect = rect.to_raw();
        // SAFETY: handle valid for the lifetime of self; raw_rect lives
        // across the call.
        let status = unsafe { sys::SDL_RenderFillRect(self.raw.as_ptr(), &raw_rect) };
        backend_status(status)
    }

    /// Publishes the accumulated draw commands to the surface.
    ///
    /// May block briefly on vertical sync depending on the flags the
    /// context was created with; that is backend policy, not controlled
    /// here.
    pub fn present(&self) {
        trace!("present()");
        // SAFETY: handle valid for the lifetime of self.
        unsafe { sys::SDL_RenderPresent(self.raw.as_ptr()) };
    }

    #[inline]
    pub(crate) fn raw(&self) -> *mut sys::SDL_Renderer {
        self.raw.as_ptr()
    }
}

impl Drop for Context<'_> {
    fn drop(&mut self) {
        debug!("Destroying context {:p}.", self.raw);
        // SAFETY: released exactly once; images bound to this context
        // cannot outlive it, so no draw source goes dangling.
        unsafe { sys::SDL_DestroyRenderer(self.raw.as_ptr()) };
    }
}
