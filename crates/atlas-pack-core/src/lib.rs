//! Core rectangle-packing and atlas-compilation library.
//!
//! This crate has no dependency on any concrete image-decoding library;
//! callers supply an [`ImageBackend`] (see `atlas-pack-image` for a
//! reference implementation built on the `image` crate) that performs
//! all pixel I/O. The crate owns three independent pieces of machinery:
//!
//! - a binary-space-partition [`pack_tree`] that places rectangles
//!   without rotation, padding, or trimming;
//! - a parallel [`sizing`] search for the smallest square atlas that
//!   holds a fixed input sequence;
//! - a small [`jobqueue`] worker pool used by both the sizing search
//!   and the final [`compiler`] pass to parallelize independent work.

pub mod atlas;
pub mod backend;
pub mod compiler;
pub mod error;
pub mod geometry;
pub mod image;
pub mod jobqueue;
pub mod pack_tree;
pub mod sizing;

use std::path::Path;
use std::sync::Arc;

pub use atlas::{CompiledAtlas, Placement};
pub use backend::ImageBackend;
pub use error::{AtlasError, Result};
pub use geometry::{Pos, Rect, Size};
pub use image::ImageDescriptor;
pub use jobqueue::JobQueue;
pub use pack_tree::PackTree;
pub use sizing::{find_atlas_size, SizingConfig, SizingOutcome};

/// Commonly used types, re-exported for a single `use atlas_pack_core::prelude::*;`.
pub mod prelude {
    pub use crate::atlas::{CompiledAtlas, Placement};
    pub use crate::backend::ImageBackend;
    pub use crate::error::{AtlasError, Result};
    pub use crate::geometry::{Pos, Rect, Size};
    pub use crate::image::ImageDescriptor;
    pub use crate::jobqueue::JobQueue;
    pub use crate::pack_tree::PackTree;
    pub use crate::sizing::{SizingConfig, SizingOutcome};
}

/// Runs the full pipeline: reads every image's true dimensions through
/// `backend`, searches for the smallest square atlas that fits them
/// all, and compiles the winning layout to `<base>.png` / `<base>.atlas`.
///
/// Images for which `backend.read_info` returns an invalid descriptor
/// are skipped with a warning, matching the original compiler's
/// tolerance for unreadable files in a source directory.
#[tracing::instrument(skip_all, fields(n = paths.len()))]
pub fn pack<B>(
    paths: &[std::path::PathBuf],
    base_out: &Path,
    backend: &Arc<B>,
    cfg: &SizingConfig,
) -> Result<CompiledAtlas>
where
    B: ImageBackend + Send + Sync + 'static,
    B::Canvas: Send + Sync + 'static,
{
    let descriptors: Vec<ImageDescriptor> = paths
        .iter()
        .filter_map(|p| {
            let path_str = p.to_string_lossy().into_owned();
            let info = backend.read_info(p);
            if info.valid {
                Some(ImageDescriptor::new(path_str, info.width, info.height))
            } else {
                tracing::warn!(path = %p.display(), "skipping unreadable image");
                None
            }
        })
        .collect();

    let queue = JobQueue::new(cfg.workers);
    let outcome = find_atlas_size(&descriptors, cfg, &queue);

    compiler::compile(&outcome.tree, base_out, backend, &queue)
}

/// Bypasses the sizing search and packs `paths` into a fixed `size`
/// square atlas, failing with [`AtlasError::PackingInfeasible`] if any
/// image does not fit. Provided for callers that already know a good
/// atlas size (e.g. re-compiling after a single asset changed).
#[tracing::instrument(skip_all, fields(n = paths.len(), size))]
pub fn pack_at_size<B>(
    paths: &[std::path::PathBuf],
    size: Size,
    base_out: &Path,
    backend: &Arc<B>,
    workers: usize,
) -> Result<CompiledAtlas>
where
    B: ImageBackend + Send + Sync + 'static,
    B::Canvas: Send + Sync + 'static,
{
    let mut tree = PackTree::new(size);
    for p in paths {
        let info = backend.read_info(p);
        if !info.valid {
            tracing::warn!(path = %p.display(), "skipping unreadable image");
            continue;
        }
        let descriptor = ImageDescriptor::new(p.to_string_lossy().into_owned(), info.width, info.height);
        if tree.insert(&descriptor).is_none() {
            return Err(AtlasError::PackingInfeasible { size: size.w.max(size.h) });
        }
    }

    let queue = JobQueue::new(workers);
    compiler::compile(&tree, base_out, backend, &queue)
}
