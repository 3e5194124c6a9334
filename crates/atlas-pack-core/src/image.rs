//! Image descriptor: an immutable record of a source path and its pixel
//! dimensions, as read (header-only where possible) by a backend.

/// A source image's path and true pixel dimensions.
///
/// A default-constructed descriptor is `invalid` and must never be
/// inserted into a [`crate::pack_tree::PackTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub path: String,
    pub width: u32,
    pub height: u32,
    pub valid: bool,
}

impl ImageDescriptor {
    pub fn new(path: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            width,
            height,
            valid: true,
        }
    }

    /// The sentinel returned by a backend whose `read_info` could not
    /// determine dimensions for a path.
    pub fn invalid() -> Self {
        Self {
            path: String::new(),
            width: 0,
            height: 0,
            valid: false,
        }
    }
}

impl Default for ImageDescriptor {
    fn default() -> Self {
        Self::invalid()
    }
}
