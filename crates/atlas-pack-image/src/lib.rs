//! Reference [`ImageBackend`] built on the `image` crate.
//!
//! Copies each source image into the atlas canvas at its assigned
//! position without rotation, padding, or extrusion. Dimension reads
//! avoid a full pixel decode where the format allows it.

use std::path::Path;
use std::sync::Mutex;

use atlas_pack_core::{ImageBackend, ImageDescriptor, Pos, Size};
use image::{GenericImage, GenericImageView, ImageReader, Rgba, RgbaImage};

const SUPPORTED_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg"];

/// Fills newly created canvases with opaque white.
const CANVAS_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// An [`ImageBackend`] backed by the `image` crate. `Canvas` is a
/// `Mutex<RgbaImage>`: the `image` crate gives no safe way to hand out
/// disjoint mutable sub-views of a single buffer across threads, so
/// concurrent blits serialize on the mutex rather than racing on raw
/// pointers.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateBackend;

impl ImageBackend for ImageCrateBackend {
    type Canvas = Mutex<RgbaImage>;

    fn supports(&self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        SUPPORTED_EXTENSIONS.contains(&ext.as_str())
    }

    fn read_info(&self, path: &Path) -> ImageDescriptor {
        let reader = match ImageReader::open(path).and_then(|r| r.with_guessed_format()) {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(?path, %err, "could not open image");
                return ImageDescriptor::invalid();
            }
        };
        match reader.into_dimensions() {
            Ok((w, h)) => ImageDescriptor::new(path.to_string_lossy().into_owned(), w, h),
            Err(err) => {
                tracing::warn!(?path, %err, "could not read image dimensions");
                ImageDescriptor::invalid()
            }
        }
    }

    fn create_canvas(&self, size: Size) -> Self::Canvas {
        Mutex::new(RgbaImage::from_pixel(size.w, size.h, CANVAS_FILL))
    }

    fn paint(&self, canvas: &Self::Canvas, top_left: Pos, path: &Path) -> bool {
        let src = match image::open(path) {
            Ok(img) => img.to_rgba8(),
            Err(err) => {
                tracing::error!(?path, %err, "failed to decode image for painting");
                return false;
            }
        };

        let mut canvas = canvas.lock().unwrap();
        let (cw, ch) = canvas.dimensions();
        if top_left.x + src.width() > cw || top_left.y + src.height() > ch {
            tracing::error!(?path, "image does not fit at its assigned position");
            return false;
        }
        match canvas.copy_from(&src, top_left.x, top_left.y) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(?path, %err, "failed to blit image onto canvas");
                false
            }
        }
    }

    fn export(&self, canvas: &Self::Canvas, path: &Path) -> bool {
        let canvas = canvas.lock().unwrap();
        match canvas.save(path) {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(?path, %err, "failed to export atlas image");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supports_is_case_insensitive() {
        let backend = ImageCrateBackend;
        assert!(backend.supports(".PNG"));
        assert!(backend.supports(".jpg"));
        assert!(!backend.supports(".bmp"));
    }

    #[test]
    fn create_canvas_is_filled_white() {
        let backend = ImageCrateBackend;
        let canvas = backend.create_canvas(Size::new(4, 4));
        let img = canvas.lock().unwrap();
        for px in img.pixels() {
            assert_eq!(*px, CANVAS_FILL);
        }
    }

    #[test]
    fn read_info_on_missing_path_is_invalid() {
        let backend = ImageCrateBackend;
        let info = backend.read_info(Path::new("/nonexistent/does-not-exist.png"));
        assert!(!info.valid);
    }
}
