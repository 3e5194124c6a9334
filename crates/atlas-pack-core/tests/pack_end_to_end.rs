//! Exercises the top-level `pack` entry point: sizing search followed by
//! compilation, against a fake backend with fixed dimensions per path.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use atlas_pack_core::{pack, ImageBackend, ImageDescriptor, SizingConfig, Size, Pos};

struct FixedSizeBackend;

impl ImageBackend for FixedSizeBackend {
    type Canvas = Mutex<usize>;

    fn supports(&self, ext: &str) -> bool {
        ext.eq_ignore_ascii_case(".png")
    }

    fn read_info(&self, path: &Path) -> ImageDescriptor {
        ImageDescriptor::new(path.to_string_lossy().into_owned(), 32, 32)
    }

    fn create_canvas(&self, _size: Size) -> Self::Canvas {
        Mutex::new(0)
    }

    fn paint(&self, canvas: &Self::Canvas, _top_left: Pos, _path: &Path) -> bool {
        *canvas.lock().unwrap() += 1;
        true
    }

    fn export(&self, canvas: &Self::Canvas, path: &Path) -> bool {
        fs::write(path, canvas.lock().unwrap().to_string()).is_ok()
    }
}

#[test]
fn pack_runs_sizing_then_compiles() {
    let backend = Arc::new(FixedSizeBackend);
    let paths: Vec<PathBuf> = (0..16).map(|i| PathBuf::from(format!("sprite{i}.png"))).collect();

    let cfg = SizingConfig {
        workers: 4,
        start_size: 50,
        grow_step: 25,
        shrink_step: 2,
    };

    let dir = std::env::temp_dir().join(format!("atlas-pack-e2e-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let base = dir.join("atlas");

    let atlas = pack(&paths, &base, &backend, &cfg).expect("packing 16 32x32 sprites should succeed");
    assert_eq!(atlas.len(), 16);

    let index = fs::read_to_string(base.with_extension("atlas")).unwrap();
    assert_eq!(index.lines().count(), 16);
    assert!(base.with_extension("png").exists());
}

#[test]
fn pack_skips_unreadable_images() {
    struct SometimesInvalid;
    impl ImageBackend for SometimesInvalid {
        type Canvas = Mutex<usize>;
        fn supports(&self, _ext: &str) -> bool {
            true
        }
        fn read_info(&self, path: &Path) -> ImageDescriptor {
            if path.to_string_lossy().contains("bad") {
                ImageDescriptor::invalid()
            } else {
                ImageDescriptor::new(path.to_string_lossy().into_owned(), 10, 10)
            }
        }
        fn create_canvas(&self, _size: Size) -> Self::Canvas {
            Mutex::new(0)
        }
        fn paint(&self, canvas: &Self::Canvas, _top_left: Pos, _path: &Path) -> bool {
            *canvas.lock().unwrap() += 1;
            true
        }
        fn export(&self, canvas: &Self::Canvas, path: &Path) -> bool {
            fs::write(path, canvas.lock().unwrap().to_string()).is_ok()
        }
    }

    let backend = Arc::new(SometimesInvalid);
    let paths = vec![PathBuf::from("good1.png"), PathBuf::from("bad.png"), PathBuf::from("good2.png")];
    let cfg = SizingConfig {
        workers: 2,
        start_size: 20,
        grow_step: 10,
        shrink_step: 2,
    };

    let dir = std::env::temp_dir().join(format!("atlas-pack-e2e-skip-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let base = dir.join("atlas");

    let atlas = pack(&paths, &base, &backend, &cfg).unwrap();
    assert_eq!(atlas.len(), 2);
}
