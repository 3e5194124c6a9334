//! Image backend contract: the capability set any concrete image
//! library can implement so the core never depends on one directly.

use std::path::Path;

use crate::geometry::{Pos, Size};
use crate::image::ImageDescriptor;

/// Five operations any image library can provide. All must be safe to
/// call concurrently on *distinct* canvases; [`ImageBackend::paint`] must
/// additionally be safe to call concurrently on *the same* canvas when
/// the target rectangles are disjoint.
///
/// `Canvas` is an associated type (rather than this trait being made
/// `dyn`-safe) so `compile` can be generic over the concrete backend
/// instead of boxing a trait object.
pub trait ImageBackend {
    type Canvas;

    /// `ext` includes the leading dot and is matched case-insensitively.
    fn supports(&self, ext: &str) -> bool;

    /// Reads true pixel dimensions for `path`, avoiding a full pixel
    /// decode when the format permits header-only inspection. Returns
    /// [`ImageDescriptor::invalid`] on failure.
    fn read_info(&self, path: &Path) -> ImageDescriptor;

    /// Allocates a canvas of `size`, initialized to a neutral fill.
    fn create_canvas(&self, size: Size) -> Self::Canvas;

    /// Blits the image at `path` into `canvas` at `top_left`. Returns
    /// `false` (and writes a message to stderr) on failure.
    fn paint(&self, canvas: &Self::Canvas, top_left: Pos, path: &Path) -> bool;

    /// Encodes `canvas` to `path`. Returns `false` (and writes a message
    /// to stderr) on failure.
    fn export(&self, canvas: &Self::Canvas, path: &Path) -> bool;
}
