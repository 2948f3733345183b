// src/image.rs

//! GPU-resident pixel buffers and their transient locked-region sub-state.

use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use libc::{c_int, c_void};
use log::{debug, info, trace};
use sdl2_sys as sys;
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::error::{backend_message, backend_status, Error, Result};
use crate::geometry::Rect;

/// Pixel layout of an [`Image`], fixed at creation.
///
/// The locked-row accessor derives its addressing stride from this, so a
/// 4-byte format indexes correctly rather than inheriting a hard-coded
/// 3-byte assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Packed RGB, 3 bytes per pixel, no alpha.
    Rgb24,
    /// Packed BGR, 3 bytes per pixel, no alpha.
    Bgr24,
    /// 32-bit XRGB; the high byte is unused padding.
    Rgb888,
    Argb8888,
    Rgba8888,
    Abgr8888,
}

impl PixelFormat {
    /// Bytes occupied by one pixel in a locked region of this format.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb24 | PixelFormat::Bgr24 => 3,
            PixelFormat::Rgb888
            | PixelFormat::Argb8888
            | PixelFormat::Rgba8888
            | PixelFormat::Abgr8888 => 4,
        }
    }

    fn to_raw(self) -> u32 {
        use sys::SDL_PixelFormatEnum::*;
        let raw = match self {
            PixelFormat::Rgb24 => SDL_PIXELFORMAT_RGB24,
            PixelFormat::Bgr24 => SDL_PIXELFORMAT_BGR24,
            PixelFormat::Rgb888 => sys::SDL_PixelFormatEnum::SDL_PIXELFORMAT_RGB888,
            PixelFormat::Argb8888 => SDL_PIXELFORMAT_ARGB8888,
            PixelFormat::Rgba8888 => SDL_PIXELFORMAT_RGBA8888,
            PixelFormat::Abgr8888 => SDL_PIXELFORMAT_ABGR8888,
        };
        raw as u32
    }
}

/// Backend capability mode for an [`Image`].
///
/// Only `Streaming` images may be locked; `Static` images take bulk
/// updates only; `Target` images can serve as render targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessMode {
    Static,
    Streaming,
    Target,
}

impl AccessMode {
    fn to_raw(self) -> c_int {
        let raw = match self {
            AccessMode::Static => sys::SDL_TextureAccess::SDL_TEXTUREACCESS_STATIC,
            AccessMode::Streaming => sys::SDL_TextureAccess::SDL_TEXTUREACCESS_STREAMING,
            AccessMode::Target => sys::SDL_TextureAccess::SDL_TEXTUREACCESS_TARGET,
        };
        raw as c_int
    }
}

/// Direct-pixel-access window, alive only between `lock` and `unlock`.
///
/// Kept as a tagged sub-state (`Option<LockedRegion>`) rather than
/// always-present fields, so the base address cannot be read while the
/// image is unlocked.
#[derive(Debug)]
struct LockedRegion {
    base: NonNull<u8>,
    /// Row stride in bytes, as reported by the backend. May exceed
    /// `width * bytes_per_pixel`.
    pitch: usize,
    width: u32,
    height: u32,
}

/// An owned GPU-resident pixel buffer bound to one [`Context`].
///
/// Created blank with a format and access mode, or produced by
/// [`Typeface::render_text`](crate::typeface::Typeface::render_text).
/// Either way this wrapper is the sole owner of the native handle and
/// releases it exactly once on drop.
#[derive(Debug)]
pub struct Image<'r> {
    raw: NonNull<sys::SDL_Texture>,
    bytes_per_pixel: usize,
    lock: Option<LockedRegion>,
    _context: PhantomData<&'r Context<'r>>,
}

impl<'r> Image<'r> {
    /// Allocates a blank pixel buffer on the backend associated with
    /// `context`.
    ///
    /// # Errors
    ///
    /// [`Error::CreationFailed`] when the backend refuses the allocation
    /// (unsupported format/access combination, zero dimensions, out of
    /// texture memory).
    pub fn create(
        context: &'r Context<'r>,
        format: PixelFormat,
        access: AccessMode,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        info!(
            "Creating {}x{} image ({:?}, {:?}).",
            width, height, format, access
        );
        // SAFETY: the context borrow keeps the renderer alive for at
        // least as long as the new image.
        let raw = unsafe {
            sys::SDL_CreateTexture(
                context.raw(),
                format.to_raw(),
                access.to_raw(),
                width as c_int,
                height as c_int,
            )
        };

        match NonNull::new(raw) {
            Some(raw) => {
                debug!("Image created: {:p}.", raw);
                Ok(Self {
                    raw,
                    bytes_per_pixel: format.bytes_per_pixel(),
                    lock: None,
                    _context: PhantomData,
                })
            }
            None => Err(Error::CreationFailed {
                what: "image",
                message: backend_message(),
            }),
        }
    }

    /// Adopts a texture handle produced by another backend call.
    ///
    /// The new `Image` becomes the sole owner and releases the handle on
    /// drop like any other.
    pub(crate) fn from_raw(raw: NonNull<sys::SDL_Texture>, bytes_per_pixel: usize) -> Self {
        debug!("Adopting foreign image handle {:p}.", raw);
        Self {
            raw,
            bytes_per_pixel,
            lock: None,
            _context: PhantomData,
        }
    }

    /// Begins direct pixel access over `region`, or the whole image when
    /// `None`.
    ///
    /// Fails closed: on error the image stays unlocked. While locked the
    /// buffer is suspended from the rendering path, so
    /// [`render_onto`](Image::render_onto) must not be called until
    /// [`unlock`](Image::unlock).
    ///
    /// # Errors
    ///
    /// [`Error::LockFailed`] if the image is already locked, its access
    /// mode does not support locking, or `region` has non-positive
    /// extents or reaches outside the image bounds. The backend does not
    /// bounds-check the lock rect itself, so an out-of-range region is
    /// refused here rather than handed to it.
    pub fn lock(&mut self, region: Option<Rect>) -> Result<()> {
        if self.lock.is_some() {
            return Err(Error::LockFailed("image is already locked".to_string()));
        }

        let bounds = self
            .bounding_rect()
            .map_err(|err| Error::LockFailed(err.to_string()))?;
        let (width, height) = match region {
            Some(rect) => {
                if rect.w <= 0 || rect.h <= 0 {
                    return Err(Error::LockFailed(format!(
                        "lock region {:?} has a non-positive extent",
                        rect
                    )));
                }
                // Widened arithmetic; x + w on two large i32s must not wrap.
                if rect.x < 0
                    || rect.y < 0
                    || rect.x as i64 + rect.w as i64 > bounds.w as i64
                    || rect.y as i64 + rect.h as i64 > bounds.h as i64
                {
                    return Err(Error::LockFailed(format!(
                        "lock region {:?} lies outside the {}x{} image",
                        rect, bounds.w, bounds.h
                    )));
                }
                (rect.w as u32, rect.h as u32)
            }
            None => (bounds.w as u32, bounds.h as u32),
        };

        let raw_region = region.map(Rect::to_raw);
        let region_ptr = raw_region
            .as_ref()
            .map_or(ptr::null(), |rect| rect as *const sys::SDL_Rect);

        let mut pixels: *mut c_void = ptr::null_mut();
        let mut pitch: c_int = 0;
        // SAFETY: handle valid for the lifetime of self; out-pointers are
        // local and live across the call.
        let status =
            unsafe { sys::SDL_LockTexture(self.raw.as_ptr(), region_ptr, &mut pixels, &mut pitch) };
        if status != 0 {
            return Err(Error::LockFailed(backend_message()));
        }

        let base = match NonNull::new(pixels as *mut u8) {
            Some(base) => base,
            None => {
                // SAFETY: the backend reported a successful lock just above.
                unsafe { sys::SDL_UnlockTexture(self.raw.as_ptr()) };
                return Err(Error::LockFailed(
                    "backend returned a null pixel base".to_string(),
                ));
            }
        };
        trace!(
            "Image {:p} locked: {}x{}, pitch {}.",
            self.raw,
            width,
            height,
            pitch
        );
        self.lock = Some(LockedRegion {
            base,
            pitch: pitch as usize,
            width,
            height,
        });
        Ok(())
    }

    /// Ends direct pixel access, pushing writes back to texture memory.
    ///
    /// # Errors
    ///
    /// [`Error::NotLocked`] without a prior successful
    /// [`lock`](Image::lock).
    pub fn unlock(&mut self) -> Result<()> {
        if self.lock.take().is_none() {
            return Err(Error::NotLocked);
        }
        trace!("Image {:p} unlocked.", self.raw);
        // SAFETY: a lock was active, so the backend expects this call.
        unsafe { sys::SDL_UnlockTexture(self.raw.as_ptr()) };
        Ok(())
    }

    /// One row of the locked region, `locked_width * bytes_per_pixel`
    /// bytes, in the image's creation format.
    ///
    /// The backend's row stride is applied internally; the slice never
    /// covers stride padding.
    ///
    /// # Errors
    ///
    /// [`Error::NotLocked`] while the image is unlocked.
    ///
    /// # Panics
    ///
    /// If `row` is outside the locked region's height.
    pub fn pixel_row(&mut self, row: u32) -> Result<&mut [u8]> {
        let bytes_per_pixel = self.bytes_per_pixel;
        let region = self.lock.as_ref().ok_or(Error::NotLocked)?;
        assert!(
            row < region.height,
            "row {} outside locked region of height {}",
            row,
            region.height
        );

        let row_len = region.width as usize * bytes_per_pixel;
        // SAFETY: the lock is active and its region was validated against
        // the image bounds at lock time, so base points at pitch*height
        // readable/writable bytes; row is bounded above and row_len never
        // reaches into the next row because pitch >= width * bpp.
        unsafe {
            let start = region.base.as_ptr().add(row as usize * region.pitch);
            Ok(std::slice::from_raw_parts_mut(start, row_len))
        }
    }

    /// Bulk-replaces pixel data without a lock/unlock bracket.
    ///
    /// `pitch` is the row stride of `data` in bytes. `None` replaces the
    /// whole image.
    ///
    /// # Errors
    ///
    /// [`Error::LockFailed`] if a lock is active (the two update paths
    /// must not interleave), or [`Error::BackendStatus`] from the upload.
    ///
    /// # Panics
    ///
    /// If `data` is too short for the region implied by `pitch`.
    pub fn update_pixels(&self, region: Option<Rect>, data: &[u8], pitch: usize) -> Result<()> {
        if self.lock.is_some() {
            return Err(Error::LockFailed(
                "bulk update attempted while the image is locked".to_string(),
            ));
        }

        let bounds = match region {
            Some(rect) => rect,
            None => self.bounding_rect()?,
        };
        if bounds.h > 0 {
            let required = pitch * (bounds.h as usize - 1) + bounds.w as usize * self.bytes_per_pixel;
            assert!(
                data.len() >= required,
                "pixel data holds {} bytes but the region needs {}",
                data.len(),
                required
            );
        }

        let raw_region = region.map(Rect::to_raw);
        let region_ptr = raw_region
            .as_ref()
            .map_or(ptr::null(), |rect| rect as *const sys::SDL_Rect);
        trace!("Image {:p} bulk update, region {:?}.", self.raw, region);
        // SAFETY: data covers the region (checked above) and the handle
        // is valid for the lifetime of self.
        let status = unsafe {
            sys::SDL_UpdateTexture(
                self.raw.as_ptr(),
                region_ptr,
                data.as_ptr() as *const c_void,
                pitch as c_int,
            )
        };
        backend_status(status)
    }

    /// The image's full extent as `{0, 0, width, height}`, queried from
    /// the backend.
    pub fn bounding_rect(&self) -> Result<Rect> {
        let mut width: c_int = 0;
        let mut height: c_int = 0;
        // SAFETY: handle valid for the lifetime of self; format/access
        // out-params are not needed and may be null.
        let status = unsafe {
            sys::SDL_QueryTexture(
                self.raw.as_ptr(),
                ptr::null_mut(),
                ptr::null_mut(),
                &mut width,
                &mut height,
            )
        };
        backend_status(status)?;
        Ok(Rect::new(0, 0, width, height))
    }

    /// Composites this image onto the drawing surface bound to `context`.
    ///
    /// `src`/`dst` default to the full image and the full target when
    /// `None`. Precondition (documented, not enforced by the backend): the
    /// image must be unlocked, since locking suspends its readability by
    /// the rendering path.
    pub fn render_onto(
        &self,
        context: &Context<'_>,
        src: Option<Rect>,
        dst: Option<Rect>,
    ) -> Result<()> {
        let raw_src = src.map(Rect::to_raw);
        let raw_dst = dst.map(Rect::to_raw);
        let src_ptr = raw_src
            .as_ref()
            .map_or(ptr::null(), |rect| rect as *const sys::SDL_Rect);
        let dst_ptr = raw_dst
            .as_ref()
            .map_or(ptr::null(), |rect| rect as *const sys::SDL_Rect);
        trace!("render_onto(src {:?}, dst {:?})", src, dst);
        // SAFETY: both handles are valid; the rect pointers are either
        // null or point at locals that live across the call.
        let status =
            unsafe { sys::SDL_RenderCopy(context.raw(), self.raw.as_ptr(), src_ptr, dst_ptr) };
        backend_status(status)
    }
}

impl Drop for Image<'_> {
    fn drop(&mut self) {
        if self.lock.is_some() {
            // Dropping mid-lock is legal; release the backend-side lock
            // before the handle goes away.
            trace!("Image {:p} dropped while locked; unlocking.", self.raw);
            // SAFETY: a lock is active on this valid handle.
            unsafe { sys::SDL_UnlockTexture(self.raw.as_ptr()) };
        }
        debug!("Destroying image {:p}.", self.raw);
        // SAFETY: sole owner; released exactly once.
        unsafe { sys::SDL_DestroyTexture(self.raw.as_ptr()) };
    }
}
