//! Atlas compiler: walks a populated pack tree, writes the CSV sidecar
//! index, dispatches blit jobs, and finalizes the composite image.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::atlas::{CompiledAtlas, Placement};
use crate::backend::ImageBackend;
use crate::error::{AtlasError, Result};
use crate::jobqueue::JobQueue;
use crate::pack_tree::PackTree;

/// Compiles `tree` into `<base>.png` + `<base>.atlas`, using `backend` for
/// all pixel work and `queue` to run blits concurrently.
///
/// `backend` is an `Arc` (rather than a borrow) because each blit runs on
/// a worker thread that may outlive this call's stack frame; `B::Canvas`
/// must be `Send + Sync` for the same reason — it is shared across those
/// threads for the whole traversal.
#[tracing::instrument(skip_all)]
pub fn compile<B>(tree: &PackTree, base: &Path, backend: &Arc<B>, queue: &JobQueue) -> Result<CompiledAtlas>
where
    B: ImageBackend + Send + Sync + 'static,
    B::Canvas: Send + Sync + 'static,
{
    let index_path: PathBuf = with_suffix(base, ".atlas");
    let image_path: PathBuf = with_suffix(base, ".png");

    let parent = base.parent().filter(|p| !p.as_os_str().is_empty());
    let dir_ok = match parent {
        Some(p) => p.is_dir(),
        None => true,
    };
    if !dir_ok {
        return Err(AtlasError::BadOutputLocation);
    }

    let mut index_file = File::create(&index_path).map_err(|_| AtlasError::CannotOpenIndex)?;

    let canvas = Arc::new(backend.create_canvas(tree.root_rect().size));

    let mut placements: HashMap<String, Placement> = HashMap::new();
    let mut blit_handles = Vec::new();

    let mut write_err: Option<AtlasError> = None;
    tree.walk_preorder(|rect, occupant| {
        if write_err.is_some() {
            return;
        }
        let Some(occupant) = occupant else { return };

        if occupant.path.contains(',') || occupant.path.contains('\n') {
            write_err = Some(AtlasError::InvalidPath(occupant.path.clone()));
            return;
        }

        placements.insert(
            occupant.path.clone(),
            Placement {
                pos: rect.pos,
                image: occupant.clone(),
            },
        );

        if let Err(e) = writeln!(
            index_file,
            "{},{},{},{},{}",
            occupant.path, rect.pos.x, rect.pos.y, occupant.width, occupant.height
        ) {
            write_err = Some(AtlasError::Io(e));
            return;
        }

        let canvas = Arc::clone(&canvas);
        let backend = Arc::clone(backend);
        let path = PathBuf::from(&occupant.path);
        let pos = rect.pos;
        blit_handles.push(queue.submit(move || backend.paint(&canvas, pos, &path)));
    });

    if let Some(e) = write_err {
        return Err(e);
    }

    let mut any_failed = false;
    for handle in blit_handles {
        let ok = handle.get().unwrap_or(false);
        if !ok {
            any_failed = true;
        }
    }
    if any_failed {
        return Err(AtlasError::PaintFailed);
    }

    if !backend.export(&canvas, &image_path) {
        return Err(AtlasError::ExportFailed);
    }

    index_file.flush().map_err(AtlasError::Io)?;
    drop(index_file);

    tracing::info!(?index_path, ?image_path, count = placements.len(), "atlas compiled");
    Ok(CompiledAtlas::new(placements))
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut s = base.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}
