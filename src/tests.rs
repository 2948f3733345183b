// src/tests.rs

//! Backend integration tests.
//!
//! These run against SDL's `dummy` video driver plus the software
//! renderer, so they pass headless. The backend is process-global and its
//! init/quit pairing is not reentrant, so every test that touches it
//! serializes on one mutex. Tests skip (rather than fail) when the
//! backend cannot come up at all, e.g. when the SDL libraries are not
//! installed in a stripped-down environment.

mod backend_tests {
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::{Mutex, MutexGuard};

    use once_cell::sync::Lazy;
    use sdl2_sys as sys;
    use test_log::test;

    use crate::{
        AccessMode, Color, Context, ContextFlags, Error, Image, PixelFormat, Rect, Sdl, Surface,
        SurfaceFlags, Typeface, FIRST_COMPATIBLE_DRIVER, POS_UNDEFINED,
    };

    static BACKEND_GUARD: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    /// Serializes backend use across the test binary and forces the
    /// headless video driver unless the caller chose one explicitly.
    fn backend() -> (MutexGuard<'static, ()>, Option<Sdl>) {
        let guard = BACKEND_GUARD
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if std::env::var_os("SDL_VIDEODRIVER").is_none() {
            std::env::set_var("SDL_VIDEODRIVER", "dummy");
        }
        let sdl = match Sdl::init() {
            Ok(sdl) => Some(sdl),
            Err(err) => {
                eprintln!("skipping: backend unavailable: {}", err);
                None
            }
        };
        (guard, sdl)
    }

    fn test_surface<'sdl>(sdl: &'sdl Sdl, width: u32, height: u32) -> Surface<'sdl> {
        Surface::create(
            sdl,
            "drawkit test",
            POS_UNDEFINED,
            POS_UNDEFINED,
            width,
            height,
            SurfaceFlags::HIDDEN,
        )
        .expect("surface creation on the dummy driver must succeed")
    }

    fn test_context<'s>(surface: &'s Surface<'s>) -> Context<'s> {
        // The dummy driver has no GPU path; the software renderer always
        // works on it.
        Context::create(surface, FIRST_COMPATIBLE_DRIVER, ContextFlags::SOFTWARE)
            .expect("software context on the dummy driver must succeed")
    }

    #[test]
    fn second_init_is_refused_until_the_guard_drops() {
        let (_lock, sdl) = backend();
        let Some(sdl) = sdl else { return };

        match Sdl::init() {
            Err(Error::CreationFailed { what, .. }) => assert_eq!(what, "backend"),
            other => panic!("second init must fail, got {:?}", other.map(|_| ())),
        }

        drop(sdl);
        let reinit = Sdl::init().expect("init after dropping the previous guard must succeed");
        drop(reinit);
    }

    #[test]
    fn surface_reports_requested_size() {
        let (_lock, sdl) = backend();
        let Some(sdl) = sdl else { return };

        let surface = test_surface(&sdl, 800, 600);
        assert_eq!(surface.size(), (800, 600));
    }

    #[test]
    fn bounding_rect_is_exact_for_a_fresh_image() {
        let (_lock, sdl) = backend();
        let Some(sdl) = sdl else { return };

        let surface = test_surface(&sdl, 320, 240);
        let context = test_context(&surface);
        let image = Image::create(&context, PixelFormat::Rgb24, AccessMode::Streaming, 64, 64)
            .expect("image creation");
        assert_eq!(
            image.bounding_rect().expect("query"),
            Rect::new(0, 0, 64, 64)
        );
    }

    #[test]
    fn double_lock_fails_and_leaves_the_first_lock_intact() {
        let (_lock, sdl) = backend();
        let Some(sdl) = sdl else { return };

        let surface = test_surface(&sdl, 320, 240);
        let context = test_context(&surface);
        let mut image = Image::create(&context, PixelFormat::Rgb24, AccessMode::Streaming, 16, 16)
            .expect("image creation");

        image.lock(None).expect("first lock");
        match image.lock(None) {
            Err(Error::LockFailed(_)) => {}
            other => panic!("second lock must fail with LockFailed, got {:?}", other),
        }
        // The first lock is still active and must unwind normally.
        image.pixel_row(0).expect("row access under first lock")[0] = 0xAB;
        image.unlock().expect("unlock");
    }

    #[test]
    fn unlock_without_lock_is_a_caller_error() {
        let (_lock, sdl) = backend();
        let Some(sdl) = sdl else { return };

        let surface = test_surface(&sdl, 320, 240);
        let context = test_context(&surface);
        let mut image = Image::create(&context, PixelFormat::Rgb24, AccessMode::Streaming, 16, 16)
            .expect("image creation");

        match image.unlock() {
            Err(Error::NotLocked) => {}
            other => panic!("expected NotLocked, got {:?}", other),
        }
        match image.pixel_row(0) {
            Err(Error::NotLocked) => {}
            other => panic!("row access while unlocked must fail, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn static_access_mode_refuses_locking() {
        let (_lock, sdl) = backend();
        let Some(sdl) = sdl else { return };

        let surface = test_surface(&sdl, 320, 240);
        let context = test_context(&surface);
        let mut image = Image::create(&context, PixelFormat::Rgb24, AccessMode::Static, 16, 16)
            .expect("image creation");

        match image.lock(None) {
            Err(Error::LockFailed(_)) => {}
            other => panic!("locking a static image must fail, got {:?}", other),
        }
        // Failed closed: still unlocked, so unlock reports NotLocked.
        assert!(matches!(image.unlock(), Err(Error::NotLocked)));
    }

    #[test]
    fn locked_rows_round_trip_through_the_accessor() {
        let (_lock, sdl) = backend();
        let Some(sdl) = sdl else { return };

        let surface = test_surface(&sdl, 320, 240);
        let context = test_context(&surface);
        let mut image = Image::create(&context, PixelFormat::Rgb24, AccessMode::Streaming, 16, 16)
            .expect("image creation");

        image.lock(None).expect("lock whole image");
        for row in [3u32, 7, 15] {
            let bytes = image.pixel_row(row).expect("locked row");
            assert_eq!(bytes.len(), 16 * 3, "row covers locked_width * 3 bytes");
            for (index, byte) in bytes.iter_mut().enumerate() {
                *byte = (index as u8) ^ (row as u8);
            }
        }
        // Read back through the same addressing arithmetic before the
        // lock ends; a pitch/stride mistake would smear rows together.
        for row in [3u32, 7, 15] {
            let bytes = image.pixel_row(row).expect("locked row");
            for (index, byte) in bytes.iter().enumerate() {
                assert_eq!(*byte, (index as u8) ^ (row as u8), "row {} byte {}", row, index);
            }
        }
        image.unlock().expect("unlock");
    }

    #[test]
    fn unlocked_writes_read_back_through_the_render_path() {
        let (_lock, sdl) = backend();
        let Some(sdl) = sdl else { return };

        let surface = test_surface(&sdl, 64, 64);
        let context = test_context(&surface);
        let mut image = Image::create(&context, PixelFormat::Rgb24, AccessMode::Streaming, 8, 8)
            .expect("image creation");

        let pattern = |row: u32, index: usize| (row as usize * 37 + index * 5) as u8;

        image.lock(None).expect("lock");
        for row in 0..8u32 {
            let bytes = image.pixel_row(row).expect("locked row");
            for (index, byte) in bytes.iter_mut().enumerate() {
                *byte = pattern(row, index);
            }
        }
        image.unlock().expect("unlock pushes writes back");

        context.set_draw_color(Color::BLACK).expect("set_draw_color");
        context.clear().expect("clear");
        image
            .render_onto(&context, None, Some(Rect::new(0, 0, 8, 8)))
            .expect("composite after unlock");

        // Read the composited region back out of the software backbuffer;
        // this only matches if unlock actually pushed the writes through
        // to texture memory.
        let mut readback = vec![0u8; 8 * 8 * 3];
        let region = Rect::new(0, 0, 8, 8).to_raw();
        // SAFETY: renderer handle and out-buffer are valid; the pitch
        // matches the requested 8-pixel RGB24 rows.
        let status = unsafe {
            sys::SDL_RenderReadPixels(
                context.raw(),
                &region,
                sys::SDL_PixelFormatEnum::SDL_PIXELFORMAT_RGB24 as u32,
                readback.as_mut_ptr() as *mut libc::c_void,
                (8 * 3) as libc::c_int,
            )
        };
        assert_eq!(status, 0, "backbuffer read-back must succeed");

        for row in 0..8u32 {
            for index in 0..8 * 3 {
                assert_eq!(
                    readback[row as usize * 8 * 3 + index],
                    pattern(row, index),
                    "row {} byte {}",
                    row,
                    index
                );
            }
        }
    }

    #[test]
    fn out_of_bounds_lock_regions_are_refused() {
        let (_lock, sdl) = backend();
        let Some(sdl) = sdl else { return };

        let surface = test_surface(&sdl, 320, 240);
        let context = test_context(&surface);
        let mut image = Image::create(&context, PixelFormat::Rgb24, AccessMode::Streaming, 16, 16)
            .expect("image creation");

        // The backend does not clamp the lock rect, so a region larger
        // than the image must never reach it: trusting it would let
        // pixel_row hand out a slice past the pixel allocation.
        for bad in [
            Rect::new(0, 0, 64, 64),   // larger than the image
            Rect::new(12, 12, 8, 8),   // overhangs the right/bottom edge
            Rect::new(-1, 0, 8, 8),    // negative origin
            Rect::new(0, 0, -5, 8),    // negative extent (would wrap as u32)
            Rect::new(0, 0, 8, 0),     // empty extent
            Rect::new(1, 1, i32::MAX, 1), // x + w would overflow i32
        ] {
            match image.lock(Some(bad)) {
                Err(Error::LockFailed(_)) => {}
                other => panic!("region {:?} must be refused, got {:?}", bad, other),
            }
        }
        // Every refusal failed closed: the image is still unlocked.
        assert!(matches!(image.unlock(), Err(Error::NotLocked)));

        // A region that just fits still locks.
        image
            .lock(Some(Rect::new(8, 8, 8, 8)))
            .expect("in-bounds region locks");
        image.unlock().expect("unlock");
    }

    #[test]
    fn sub_region_lock_uses_the_region_width() {
        let (_lock, sdl) = backend();
        let Some(sdl) = sdl else { return };

        let surface = test_surface(&sdl, 320, 240);
        let context = test_context(&surface);
        let mut image = Image::create(&context, PixelFormat::Rgb24, AccessMode::Streaming, 32, 32)
            .expect("image creation");

        image
            .lock(Some(Rect::new(4, 4, 8, 8)))
            .expect("sub-region lock");
        let bytes = image.pixel_row(0).expect("locked row");
        assert_eq!(bytes.len(), 8 * 3, "row length follows the locked width");
        image.unlock().expect("unlock");
    }

    #[test]
    fn bulk_update_is_rejected_while_locked() {
        let (_lock, sdl) = backend();
        let Some(sdl) = sdl else { return };

        let surface = test_surface(&sdl, 320, 240);
        let context = test_context(&surface);
        let mut image = Image::create(&context, PixelFormat::Rgb24, AccessMode::Streaming, 8, 8)
            .expect("image creation");
        let data = vec![0x40u8; 8 * 8 * 3];

        image.lock(None).expect("lock");
        match image.update_pixels(None, &data, 8 * 3) {
            Err(Error::LockFailed(_)) => {}
            other => panic!("bulk update while locked must fail, got {:?}", other),
        }
        image.unlock().expect("unlock");

        image
            .update_pixels(None, &data, 8 * 3)
            .expect("bulk update after unlock");
    }

    #[test]
    fn full_frame_scenario_returns_success_at_every_step() {
        let (_lock, sdl) = backend();
        let Some(sdl) = sdl else { return };

        let surface = test_surface(&sdl, 800, 600);
        let context = test_context(&surface);

        context.set_draw_color(Color::BLACK).expect("set_draw_color");
        context.clear().expect("clear");
        context.draw_line(0.0, 0.0, 799.0, 599.0).expect("draw_line");
        context
            .fill_rect(Rect::new(10, 10, 100, 50))
            .expect("fill_rect");

        let mut image = Image::create(&context, PixelFormat::Rgb24, AccessMode::Streaming, 64, 64)
            .expect("image creation");
        image.lock(None).expect("lock");
        let row = image.pixel_row(0).expect("row 0");
        row[0] = 255; // one red pixel at (0, 0)
        row[1] = 0;
        row[2] = 0;
        image.unlock().expect("unlock");

        image
            .render_onto(&context, None, None)
            .expect("render_onto");
        context.present();
    }

    #[test]
    fn missing_font_reports_the_offending_path() {
        let (_lock, sdl) = backend();
        let Some(sdl) = sdl else { return };

        let path = Path::new("/no/such/directory/missing-font.ttf");
        match Typeface::load(&sdl, path, 14) {
            Err(Error::FontLoadFailed {
                path: reported, ..
            }) => assert_eq!(reported, path),
            other => panic!(
                "expected FontLoadFailed, got {:?}",
                other.map(|_| "a typeface")
            ),
        };
    }

    /// Recursively finds a TrueType file under the usual system font
    /// roots, so the text-rendering tests can run on whatever the host
    /// has installed and skip cleanly when it has none.
    fn find_system_font() -> Option<PathBuf> {
        fn walk(dir: &Path, depth: usize) -> Option<PathBuf> {
            if depth == 0 {
                return None;
            }
            let entries = fs::read_dir(dir).ok()?;
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    if let Some(found) = walk(&path, depth - 1) {
                        return Some(found);
                    }
                } else if path
                    .extension()
                    .map_or(false, |ext| ext.eq_ignore_ascii_case("ttf"))
                {
                    return Some(path);
                }
            }
            None
        }
        ["/usr/share/fonts", "/usr/local/share/fonts"]
            .iter()
            .find_map(|root| walk(Path::new(root), 6))
    }

    #[test]
    fn text_renders_into_a_positive_sized_image() {
        let (_lock, sdl) = backend();
        let Some(sdl) = sdl else { return };
        let Some(font_path) = find_system_font() else {
            eprintln!("skipping: no TrueType font installed");
            return;
        };

        let surface = test_surface(&sdl, 320, 240);
        let context = test_context(&surface);
        let typeface = Typeface::load(&sdl, &font_path, 16).expect("system font loads");

        let image = typeface
            .render_text(&context, "hello", Color::WHITE)
            .expect("text rendering");
        let bounds = image.bounding_rect().expect("query");
        assert!(bounds.w > 0 && bounds.h > 0, "got {:?}", bounds);

        image
            .render_onto(&context, None, None)
            .expect("text image composites like any other");
    }

    #[test]
    fn empty_text_yields_a_minimal_image() {
        let (_lock, sdl) = backend();
        let Some(sdl) = sdl else { return };
        let Some(font_path) = find_system_font() else {
            eprintln!("skipping: no TrueType font installed");
            return;
        };

        let surface = test_surface(&sdl, 320, 240);
        let context = test_context(&surface);
        let typeface = Typeface::load(&sdl, &font_path, 16).expect("system font loads");

        // The backend refuses zero-width blends, so the crate substitutes
        // a 1x1 transparent image; the point is that this neither errors
        // nor aborts.
        let image = typeface
            .render_text(&context, "", Color::WHITE)
            .expect("empty text must not fail");
        let bounds = image.bounding_rect().expect("query");
        assert!(bounds.w >= 0 && bounds.h >= 0, "got {:?}", bounds);
    }
}
