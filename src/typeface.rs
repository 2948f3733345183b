// src/typeface.rs

//! Rasterized fonts and glyph-run rendering into [`Image`]s.

use std::ffi::CString;
use std::marker::PhantomData;
use std::path::Path;
use std::ptr::NonNull;

use libc::c_int;
use log::{debug, info, trace};
use sdl2_sys as sys;

use crate::color::Color;
use crate::context::Context;
use crate::error::{backend_message, Error, Result};
use crate::image::Image;
use crate::init::Sdl;

/// Blended text comes out of the font engine as 32-bit ARGB.
const BLENDED_BYTES_PER_PIXEL: usize = 4;

/// Frees the intermediate software pixel surface on every exit path,
/// including early error returns from texture creation.
struct BlendedSurface {
    ptr: NonNull<sys::SDL_Surface>,
}

impl Drop for BlendedSurface {
    fn drop(&mut self) {
        // SAFETY: sole owner of a surface the font engine handed us.
        unsafe { sys::SDL_FreeSurface(self.ptr.as_ptr()) };
    }
}

/// An owned rasterized font, loaded from a file at a fixed point size.
///
/// The path and size are baked into the native handle at load time; to
/// render at a different size, load a new `Typeface`.
#[derive(Debug)]
pub struct Typeface<'sdl> {
    raw: NonNull<sys::ttf::TTF_Font>,
    _sdl: PhantomData<&'sdl Sdl>,
}

impl<'sdl> Typeface<'sdl> {
    /// Opens a font file and rasterizes its metrics at `point_size`.
    ///
    /// # Errors
    ///
    /// [`Error::FontLoadFailed`] if the file is absent, unreadable, or
    /// not a recognized font format. The error carries the offending
    /// path.
    pub fn load(_sdl: &'sdl Sdl, path: &Path, point_size: u16) -> Result<Self> {
        info!("Loading typeface {} at {}pt.", path.display(), point_size);
        let path_cstr = path
            .to_str()
            .and_then(|text| CString::new(text).ok())
            .ok_or_else(|| Error::FontLoadFailed {
                path: path.to_path_buf(),
                message: "path is not representable as a C string".to_string(),
            })?;

        // SAFETY: the Sdl borrow proves the font engine is up; the path
        // pointer is valid for the duration of the call.
        let raw = unsafe { sys::ttf::TTF_OpenFont(path_cstr.as_ptr(), point_size as c_int) };

        match NonNull::new(raw) {
            Some(raw) => {
                debug!("Typeface loaded: {:p}.", raw);
                Ok(Self {
                    raw,
                    _sdl: PhantomData,
                })
            }
            None => Err(Error::FontLoadFailed {
                path: path.to_path_buf(),
                message: backend_message(),
            }),
        }
    }

    /// Shapes and blends `text` into a new [`Image`] bound to `context`.
    ///
    /// The intermediate software surface produced by the font engine is
    /// freed before this returns, on success and failure alike. The
    /// backend refuses zero-width blends, so empty text yields a minimal
    /// 1x1 transparent image instead of an error.
    ///
    /// # Errors
    ///
    /// [`Error::CreationFailed`] if blending or texture upload fails.
    pub fn render_text<'r>(
        &self,
        context: &'r Context<'r>,
        text: &str,
        color: Color,
    ) -> Result<Image<'r>> {
        trace!("render_text({:?})", text);
        if text.is_empty() {
            return blank_text_image(context);
        }

        let text_cstr = CString::new(text).map_err(|_| Error::CreationFailed {
            what: "text image",
            message: "text contains an interior NUL byte".to_string(),
        })?;
        let fg = sys::SDL_Color {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        };

        // SAFETY: font handle valid for the lifetime of self; the text
        // pointer is valid for the duration of the call.
        let blended =
            unsafe { sys::ttf::TTF_RenderUTF8_Blended(self.raw.as_ptr(), text_cstr.as_ptr(), fg) };
        // The ttf bindings carry their own surface type; it is the same
        // C struct as the core one.
        let blended = NonNull::new(blended.cast::<sys::SDL_Surface>()).ok_or_else(|| {
            Error::CreationFailed {
                what: "text image",
                message: backend_message(),
            }
        })?;
        let blended = BlendedSurface { ptr: blended };

        // SAFETY: both handles are valid; ownership of the new texture
        // transfers to the returned Image, while the surface stays ours
        // and is freed by the guard.
        let texture =
            unsafe { sys::SDL_CreateTextureFromSurface(context.raw(), blended.ptr.as_ptr()) };
        let texture = NonNull::new(texture).ok_or_else(|| Error::CreationFailed {
            what: "text image",
            message: backend_message(),
        })?;

        Ok(Image::from_raw(texture, BLENDED_BYTES_PER_PIXEL))
    }
}

impl Drop for Typeface<'_> {
    fn drop(&mut self) {
        debug!("Closing typeface {:p}.", self.raw);
        // SAFETY: sole owner; closed exactly once.
        unsafe { sys::ttf::TTF_CloseFont(self.raw.as_ptr()) };
    }
}

/// Minimal stand-in image for an empty glyph run.
fn blank_text_image<'r>(context: &'r Context<'r>) -> Result<Image<'r>> {
    // SAFETY: the context borrow keeps the renderer alive.
    let texture = unsafe {
        sys::SDL_CreateTexture(
            context.raw(),
            sys::SDL_PixelFormatEnum::SDL_PIXELFORMAT_ARGB8888 as u32,
            sys::SDL_TextureAccess::SDL_TEXTUREACCESS_STATIC as c_int,
            1,
            1,
        )
    };
    let texture = NonNull::new(texture).ok_or_else(|| Error::CreationFailed {
        what: "text image",
        message: backend_message(),
    })?;
    Ok(Image::from_raw(texture, BLENDED_BYTES_PER_PIXEL))
}
