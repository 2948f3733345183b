// src/lib.rs

//! Scoped ownership for SDL2 rendering and font-rasterization handles.
//!
//! Each resource type owns exactly one native handle and releases it
//! exactly once when it goes out of scope:
//!
//! * [`Sdl`]: the library guard pairing `SDL_Init`/`TTF_Init` with their
//!   shutdown calls.
//! * [`Surface`]: a display target (`SDL_Window`).
//! * [`Context`]: a renderer bound to one Surface (`SDL_Renderer`).
//! * [`Image`]: a GPU-resident pixel buffer (`SDL_Texture`) with a
//!   transient locked-region sub-state for direct pixel access.
//! * [`Typeface`]: a rasterized font (`TTF_Font`) that renders glyph runs
//!   into new [`Image`]s.
//!
//! Dependent resources hold plain borrows of what they were built from
//! (a `Context` cannot outlive its `Surface`, an `Image` cannot outlive
//! its `Context`), so lifetime errors are compile errors rather than
//! use-after-free. None of the types are `Send` or `Sync`: SDL's drawing
//! path is single-threaded and this layer documents that instead of
//! papering over it with locks.
//!
//! The per-frame discipline mirrors the backend's: `clear`, draw, then
//! `present`. After `present` returns, the backbuffer contents are
//! undefined until the next `clear`.
//!
//! ```no_run
//! use drawkit::{Color, Context, ContextFlags, Sdl, Surface, SurfaceFlags};
//!
//! # fn main() -> drawkit::Result<()> {
//! let sdl = Sdl::init()?;
//! let surface = Surface::create(&sdl, "demo", 100, 100, 800, 600, SurfaceFlags::SHOWN)?;
//! let context = Context::create(&surface, drawkit::FIRST_COMPATIBLE_DRIVER,
//!     ContextFlags::ACCELERATED)?;
//! context.set_draw_color(Color::BLACK)?;
//! context.clear()?;
//! context.draw_line(0.0, 0.0, 799.0, 599.0)?;
//! context.present();
//! # Ok(())
//! # }
//! ```

pub mod color;
pub mod context;
pub mod error;
pub mod geometry;
pub mod image;
pub mod init;
pub mod surface;
pub mod typeface;

#[cfg(test)]
mod tests;

pub use color::Color;
pub use context::{Context, ContextFlags, FIRST_COMPATIBLE_DRIVER};
pub use error::{Error, Result};
pub use geometry::Rect;
pub use image::{AccessMode, Image, PixelFormat};
pub use init::Sdl;
pub use surface::{Surface, SurfaceFlags, POS_CENTERED, POS_UNDEFINED};
pub use typeface::Typeface;
