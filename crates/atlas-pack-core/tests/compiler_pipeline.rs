//! End-to-end tests for the atlas compiler, driven by a fake
//! [`ImageBackend`] that never touches real pixel files so the whole
//! pipeline can be exercised without `atlas-pack-image`.

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use atlas_pack_core::{compiler, ImageBackend, ImageDescriptor, JobQueue, PackTree, Pos, Size};

/// A backend whose `paint` always succeeds and whose canvas is just a
/// counter of how many blits landed on it; good enough to exercise the
/// compiler without decoding any real image bytes.
struct CountingBackend {
    known: Vec<(&'static str, u32, u32)>,
}

impl ImageBackend for CountingBackend {
    type Canvas = Mutex<usize>;

    fn supports(&self, ext: &str) -> bool {
        ext.eq_ignore_ascii_case(".png")
    }

    fn read_info(&self, path: &Path) -> ImageDescriptor {
        let name = path.to_string_lossy();
        match self.known.iter().find(|(p, _, _)| *p == name) {
            Some((p, w, h)) => ImageDescriptor::new(*p, *w, *h),
            None => ImageDescriptor::invalid(),
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

/// A backend that fails `paint` on its n-th call across the whole
/// process.
struct FlakyBackend {
    calls: AtomicUsize,
    fail_on_call: usize,
}

impl ImageBackend for FlakyBackend {
    type Canvas = Mutex<()>;

    fn supports(&self, _ext: &str) -> bool {
        true
    }

    fn read_info(&self, path: &Path) -> ImageDescriptor {
        ImageDescriptor::new(path.to_string_lossy().into_owned(), 10, 10)
    }

    fn create_canvas(&self, _size: Size) -> Self::Canvas {
        Mutex::new(())
    }

    fn paint(&self, _canvas: &Self::Canvas, _top_left: Pos, _path: &Path) -> bool {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        n != self.fail_on_call
    }

    fn export(&self, _canvas: &Self::Canvas, path: &Path) -> bool {
        fs::write(path, b"ok").is_ok()
    }
}

fn temp_base(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("atlas-pack-core-tests-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join("atlas")
}

#[test]
fn compile_writes_index_and_image_for_s1() {
    let backend = Arc::new(CountingBackend {
        known: vec![("A", 100, 100)],
    });
    let mut tree = PackTree::new(Size::new(100, 100));
    tree.insert(&ImageDescriptor::new("A", 100, 100)).unwrap();

    let base = temp_base("s1");
    let queue = JobQueue::new(2);
    let atlas = compiler::compile(&tree, &base, &backend, &queue).expect("compile should succeed");

    assert_eq!(atlas.len(), 1);
    let placement = atlas.lookup("A").unwrap();
    assert_eq!(placement.pos, Pos::new(0, 0));

    let index_contents = fs::read_to_string(base.with_extension("atlas")).unwrap();
    assert_eq!(index_contents, "A,0,0,100,100\n");
    assert!(base.with_extension("png").exists());
}

#[test]
fn compile_reports_bad_output_location() {
    let backend = Arc::new(CountingBackend { known: vec![] });
    let tree = PackTree::new(Size::new(10, 10));
    let queue = JobQueue::new(2);

    let bogus = Path::new("/this/path/definitely/does/not/exist/atlas").to_path_buf();
    let result = compiler::compile(&tree, &bogus, &backend, &queue);
    assert!(matches!(result, Err(atlas_pack_core::AtlasError::BadOutputLocation)));
}

#[test]
fn one_failed_blit_fails_the_whole_compile() {
    let backend = Arc::new(FlakyBackend {
        calls: AtomicUsize::new(0),
        fail_on_call: 3,
    });

    let mut tree = PackTree::new(Size::new(1000, 1000));
    for i in 0..5 {
        let img = ImageDescriptor::new(format!("img{i}"), 50, 50);
        tree.insert(&img).unwrap();
    }

    let base = temp_base("s6");
    let queue = JobQueue::new(1);
    let result = compiler::compile(&tree, &base, &backend, &queue);

    let err = result.expect_err("a flaky paint must fail the whole compile");
    assert!(err.to_string().contains("Some images failed to paint"));
}

#[test]
fn rejects_paths_with_embedded_comma() {
    let backend = Arc::new(CountingBackend {
        known: vec![("bad,name", 10, 10)],
    });
    let mut tree = PackTree::new(Size::new(10, 10));
    tree.insert(&ImageDescriptor::new("bad,name", 10, 10)).unwrap();

    let base = temp_base("invalid-path");
    let queue = JobQueue::new(2);
    let result = compiler::compile(&tree, &base, &backend, &queue);
    assert!(matches!(result, Err(atlas_pack_core::AtlasError::InvalidPath(_))));
}
