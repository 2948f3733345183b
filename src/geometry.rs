// src/geometry.rs

//! Integer rectangle type shared by fill, lock, update, and copy calls.

use libc::c_int;
use sdl2_sys as sys;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in pixel coordinates.
///
/// Converts losslessly to and from the backend's `SDL_Rect`; a negative or
/// zero extent is passed through uninterpreted, matching the backend's own
/// handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub(crate) fn to_raw(self) -> sys::SDL_Rect {
        sys::SDL_Rect {
            x: self.x as c_int,
            y: self.y as c_int,
            w: self.w as c_int,
            h: self.h as c_int,
        }
    }
}

impl From<sys::SDL_Rect> for Rect {
    fn from(raw: sys::SDL_Rect) -> Self {
        Self {
            x: raw.x,
            y: raw.y,
            w: raw.w,
            h: raw.h,
        }
    }
}
