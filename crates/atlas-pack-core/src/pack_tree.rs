//! A lightmap-style binary-space-partition pack tree.
//!
//! Each leaf is either free or holds exactly one occupant. Inserting a
//! rectangle into a free leaf that is larger than the rectangle splits
//! it into two children along whichever axis leaves the larger
//! contiguous remainder, the classic approach described at
//! <http://blackpawn.com/texts/lightmaps>. Nodes live in a flat arena
//! (`Vec<Node>`, children referenced by index) rather than behind
//! shared pointers, which keeps the tree trivially `Clone`-able for
//! parallel trial packings and avoids recursion-depth concerns on large
//! atlases.

use crate::geometry::{Pos, Rect, Size};
use crate::image::ImageDescriptor;

#[derive(Debug, Clone)]
struct Node {
    rect: Rect,
    left: Option<usize>,
    right: Option<usize>,
    occupant: Option<ImageDescriptor>,
}

impl Node {
    fn leaf(rect: Rect) -> Self {
        Self {
            rect,
            left: None,
            right: None,
            occupant: None,
        }
    }

    fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// A binary tree of free/occupied rectangles within a single root
/// rectangle, populated by repeated [`PackTree::insert`] calls.
#[derive(Debug, Clone)]
pub struct PackTree {
    nodes: Vec<Node>,
}

const ROOT: usize = 0;

impl PackTree {
    /// Creates a tree with a single free leaf spanning `(0,0) .. size`.
    pub fn new(size: Size) -> Self {
        Self {
            nodes: vec![Node::leaf(Rect::new(Pos::new(0, 0), size))],
        }
    }

    pub fn root_rect(&self) -> Rect {
        self.nodes[ROOT].rect
    }

    /// Attempts to place `img`. Returns the top-left position on success;
    /// leaves the tree unchanged on failure. Pure, never blocks, no
    /// retries: a failed insert is final for this tree.
    pub fn insert(&mut self, img: &ImageDescriptor) -> Option<Pos> {
        debug_assert!(img.valid, "invalid image descriptors must never be inserted");
        self.insert_at(ROOT, img)
    }

    fn insert_at(&mut self, idx: usize, img: &ImageDescriptor) -> Option<Pos> {
        if !self.nodes[idx].is_leaf() {
            let left = self.nodes[idx].left.unwrap();
            if let Some(pos) = self.insert_at(left, img) {
                return Some(pos);
            }
            let right = self.nodes[idx].right.unwrap();
            return self.insert_at(right, img);
        }

        let rect = self.nodes[idx].rect;
        if self.nodes[idx].occupant.is_some() {
            return None;
        }
        if rect.size.w < img.width || rect.size.h < img.height {
            return None;
        }
        if rect.size.w == img.width && rect.size.h == img.height {
            self.nodes[idx].occupant = Some(img.clone());
            return Some(rect.pos);
        }

        // Split so the larger remaining dimension becomes the wider half,
        // preserving the biggest contiguous free rectangle.
        let dw = rect.size.w - img.width;
        let dh = rect.size.h - img.height;
        let (left_rect, right_rect) = if dw > dh {
            (
                Rect::new(rect.pos, Size::new(img.width, rect.size.h)),
                Rect::new(
                    Pos::new(rect.pos.x + img.width, rect.pos.y),
                    Size::new(dw, rect.size.h),
                ),
            )
        } else {
            (
                Rect::new(rect.pos, Size::new(rect.size.w, img.height)),
                Rect::new(
                    Pos::new(rect.pos.x, rect.pos.y + img.height),
                    Size::new(rect.size.w, dh),
                ),
            )
        };

        let left_idx = self.nodes.len();
        self.nodes.push(Node::leaf(left_rect));
        let right_idx = self.nodes.len();
        self.nodes.push(Node::leaf(right_rect));
        self.nodes[idx].left = Some(left_idx);
        self.nodes[idx].right = Some(right_idx);

        self.insert_at(left_idx, img)
    }

    /// Visits every leaf in pre-order (left-before-right, parents
    /// implicit), calling `visit(rect, occupant)` for each.
    pub fn walk_preorder<F: FnMut(Rect, Option<&ImageDescriptor>)>(&self, mut visit: F) {
        self.walk_at(ROOT, &mut visit);
    }

    fn walk_at<F: FnMut(Rect, Option<&ImageDescriptor>)>(&self, idx: usize, visit: &mut F) {
        let node = &self.nodes[idx];
        if node.is_leaf() {
            visit(node.rect, node.occupant.as_ref());
            return;
        }
        if node.occupant.is_some() {
            // Structurally unreachable given how insert_at builds nodes,
            // but kept as a defensive check.
            tracing::warn!("pack tree node has both children and an occupant");
        }
        let left = node.left.unwrap();
        let right = node.right.unwrap();
        self.walk_at(left, visit);
        self.walk_at(right, visit);
    }

    /// All leaf rectangles, in pre-order, regardless of occupancy.
    pub fn leaves(&self) -> Vec<Rect> {
        let mut out = Vec::new();
        self.walk_preorder(|rect, _| out.push(rect));
        out
    }
}
