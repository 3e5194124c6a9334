//! The parallel grow-then-shrink search for the smallest square atlas side
//! length that holds a fixed input sequence under greedy insertion order.

use std::sync::Arc;

use crate::geometry::Size;
use crate::image::ImageDescriptor;
use crate::jobqueue::JobQueue;
use crate::pack_tree::PackTree;

/// Tunables for [`find_atlas_size`]. Defaults: `start_size = 1000`,
/// `grow_step = 100`, `shrink_step = 1`, and `workers = 0` (resolved to
/// `JobQueue`'s own default, clamped to ≥2).
#[derive(Debug, Clone, Copy)]
pub struct SizingConfig {
    pub workers: usize,
    pub start_size: u32,
    pub grow_step: u32,
    pub shrink_step: u32,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            start_size: 1000,
            grow_step: 100,
            shrink_step: 1,
        }
    }
}

/// The winning side length, its pack tree, and a diagnostic trial count
/// (not load-bearing for correctness — logged only).
pub struct SizingOutcome {
    pub side: u32,
    pub tree: PackTree,
    pub trials_run: u32,
}

fn try_pack(size: u32, images: &Arc<[ImageDescriptor]>) -> Option<PackTree> {
    let mut tree = PackTree::new(Size::new(size, size));
    for img in images.iter() {
        if tree.insert(img).is_none() {
            return None;
        }
    }
    Some(tree)
}

/// Runs the grow-then-shrink search and returns the smallest square side
/// length found, along with the tree produced by the winning trial.
#[tracing::instrument(skip_all, fields(n = images.len()))]
pub fn find_atlas_size(
    images: &[ImageDescriptor],
    cfg: &SizingConfig,
    queue: &JobQueue,
) -> SizingOutcome {
    let images: Arc<[ImageDescriptor]> = images.to_vec().into();
    let workers = if cfg.workers == 0 {
        JobQueue::default_worker_count()
    } else {
        cfg.workers
    };
    let mut trials_run = 0u32;

    let (mut side, mut tree) = {
        let mut s = cfg.start_size;
        loop {
            let handles: Vec<_> = (0..workers)
                .map(|i| {
                    let size = s + i as u32 * cfg.grow_step;
                    let images = Arc::clone(&images);
                    queue.submit(move || try_pack(size, &images))
                })
                .collect();
            let results: Vec<Option<PackTree>> =
                handles.into_iter().map(|h| h.get().unwrap_or(None)).collect();
            trials_run += results.len() as u32;

            if let Some(idx) = results.iter().position(Option::is_some) {
                let size = s + idx as u32 * cfg.grow_step;
                tracing::info!(size, "grow phase converged");
                break (size, results.into_iter().nth(idx).unwrap().unwrap());
            }
            s += workers as u32 * cfg.grow_step;
        }
    };

    // Shrink phase: every leading success in a batch replaces the best
    // known side length; the first failure in the batch ends the search.
    loop {
        let mut candidates = Vec::with_capacity(workers);
        for i in 1..=workers as u32 {
            let delta = cfg.shrink_step.saturating_mul(i);
            if delta >= side {
                break;
            }
            candidates.push(side - delta);
        }
        if candidates.is_empty() {
            break;
        }

        let handles: Vec<_> = candidates
            .iter()
            .map(|&size| {
                let images = Arc::clone(&images);
                queue.submit(move || try_pack(size, &images))
            })
            .collect();
        let results: Vec<Option<PackTree>> =
            handles.into_iter().map(|h| h.get().unwrap_or(None)).collect();
        trials_run += results.len() as u32;

        let mut batch_fully_succeeded = true;
        for (candidate_size, result) in candidates.into_iter().zip(results) {
            match result {
                Some(candidate_tree) => {
                    side = candidate_size;
                    tree = candidate_tree;
                }
                None => {
                    batch_fully_succeeded = false;
                    break;
                }
            }
        }
        if !batch_fully_succeeded {
            break;
        }
    }

    tracing::info!(side, trials_run, "sizing search finished");
    SizingOutcome {
        side,
        tree,
        trials_run,
    }
}
