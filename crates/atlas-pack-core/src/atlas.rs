//! Compiled atlas: the immutable result of a successful compilation.

use std::collections::HashMap;

use crate::geometry::Pos;
use crate::image::ImageDescriptor;

/// Where one source image landed in the compiled atlas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub pos: Pos,
    pub image: ImageDescriptor,
}

/// The immutable result of [`crate::compiler::compile`]: a `path ->
/// placement` index with unique keys. Iteration order is not
/// meaningful; only the CSV index file on disk has a defined order.
#[derive(Debug, Clone, Default)]
pub struct CompiledAtlas {
    placements: HashMap<String, Placement>,
}

impl CompiledAtlas {
    pub(crate) fn new(placements: HashMap<String, Placement>) -> Self {
        Self { placements }
    }

    pub fn lookup(&self, path: &str) -> Option<&Placement> {
        self.placements.get(path)
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Placement)> {
        self.placements.iter()
    }
}
