//! Photo library access.
//!
//! The library is a directory tree. Every directory that directly holds at
//! least one image file is an album, titled by its path relative to the root
//! with `/` separators. The root counts too, titled after its own directory
//! name. Hidden entries (leading `.`) are skipped.
//!
//! ```text
//! photos/                 → album "photos" (only if it holds images)
//! ├── Camera/             → album "Camera"
//! ├── Trips/
//! │   ├── Camera/         → album "Trips/Camera"
//! │   └── Lisbon/         → album "Trips/Lisbon"
//! └── notes/              → not an album (no images)
//! ```
//!
//! ## Album order
//!
//! Albums whose title is in the camera set (case-insensitive) come first, in
//! the order of that set. Only top-level directories can match, since nested
//! titles carry their parent path. Everything else follows in walk order,
//! where siblings are visited by file name so the listing is stable.

use crate::types::{Album, ImageRef};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Library walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Library root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Image not found: {0}")]
    NotFound(PathBuf),
    #[error("Album not found: {0}")]
    UnknownAlbum(String),
}

/// Extensions recognized as photos when browsing. Wider than what the PDF
/// assembler accepts: unsupported picks are reported at create time.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "heic", "tif", "tiff"];

pub fn is_image(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Image files directly inside `dir`, sorted by path.
fn images_in(dir: &Path) -> Result<Vec<PathBuf>, LibraryError> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            !p.file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with('.'))
        })
        .filter(|p| is_image(p))
        .collect();
    images.sort();
    Ok(images)
}

/// Position of `title` in the camera set, if it is a camera album.
fn camera_rank(title: &str, camera_names: &[String]) -> Option<usize> {
    camera_names
        .iter()
        .position(|name| name.eq_ignore_ascii_case(title))
}

fn root_title(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(root)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}

fn relative_title(root: &Path, dir: &Path) -> String {
    let relative = dir.strip_prefix(root).unwrap_or(dir);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// List the albums of the library under `root`, in display order.
pub fn list_albums(root: &Path, camera_names: &[String]) -> Result<Vec<Album>, LibraryError> {
    if !root.is_dir() {
        return Err(LibraryError::NotADirectory(root.to_path_buf()));
    }

    let mut albums = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let count = images_in(entry.path())?.len();
        if count == 0 {
            continue;
        }
        let title = if entry.depth() == 0 {
            root_title(root)
        } else {
            relative_title(root, entry.path())
        };
        albums.push(Album {
            title,
            path: entry.path().to_path_buf(),
            asset_count: count,
        });
    }

    // Stable: non-camera albums keep their walk order.
    albums.sort_by_key(|album| camera_rank(&album.title, camera_names).unwrap_or(usize::MAX));
    Ok(albums)
}

/// Position of the album titled `title`.
///
/// An exact match wins; otherwise the first case-insensitive match is used.
pub fn album_index(albums: &[Album], title: &str) -> Result<usize, LibraryError> {
    albums
        .iter()
        .position(|a| a.title == title)
        .or_else(|| albums.iter().position(|a| a.title.eq_ignore_ascii_case(title)))
        .ok_or_else(|| LibraryError::UnknownAlbum(title.to_string()))
}

/// The photos of one album, sorted by filename.
pub fn album_assets(album: &Album) -> Result<Vec<ImageRef>, LibraryError> {
    Ok(images_in(&album.path)?
        .into_iter()
        .map(ImageRef::new)
        .collect())
}

/// Resolve picker results into image references.
///
/// Every path must name an existing file; the first missing one fails the
/// whole pick.
pub fn resolve_picked(paths: &[PathBuf]) -> Result<Vec<ImageRef>, LibraryError> {
    paths
        .iter()
        .map(|path| {
            if path.is_file() {
                Ok(ImageRef::new(path))
            } else {
                Err(LibraryError::NotFound(path.clone()))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_jpeg, setup_library};

    fn camera() -> Vec<String> {
        vec!["Camera".into(), "Camera Roll".into(), "DCIM".into()]
    }

    fn titles(albums: &[Album]) -> Vec<&str> {
        albums.iter().map(|a| a.title.as_str()).collect()
    }

    #[test]
    fn camera_album_first_then_walk_order() {
        let (_tmp, root) = setup_library();
        let albums = list_albums(&root, &camera()).unwrap();
        assert_eq!(titles(&albums), vec!["Camera", "Holidays", "Screenshots"]);
    }

    #[test]
    fn asset_counts() {
        let (_tmp, root) = setup_library();
        let albums = list_albums(&root, &camera()).unwrap();
        let counts: Vec<usize> = albums.iter().map(|a| a.asset_count).collect();
        assert_eq!(counts, vec![3, 2, 1]);
    }

    #[test]
    fn camera_set_order_wins_and_match_ignores_case() {
        let (_tmp, root) = setup_library();
        let dcim = root.join("dcim");
        std::fs::create_dir_all(&dcim).unwrap();
        create_test_jpeg(&dcim.join("a.jpg"), 4, 4);

        let albums = list_albums(&root, &["DCIM".into(), "Camera".into()]).unwrap();
        assert_eq!(
            titles(&albums),
            vec!["dcim", "Camera", "Holidays", "Screenshots"]
        );
    }

    #[test]
    fn root_with_images_is_an_album() {
        let (_tmp, root) = setup_library();
        create_test_jpeg(&root.join("loose.jpg"), 4, 4);
        let albums = list_albums(&root, &[]).unwrap();
        assert_eq!(albums[0].title, "library");
        assert_eq!(albums[0].asset_count, 1);
    }

    #[test]
    fn nested_albums_and_hidden_dirs() {
        let (_tmp, root) = setup_library();
        let nested = root.join("Trips").join("Lisbon");
        std::fs::create_dir_all(&nested).unwrap();
        create_test_jpeg(&nested.join("tram.jpg"), 4, 4);
        let hidden = root.join(".thumbs");
        std::fs::create_dir_all(&hidden).unwrap();
        create_test_jpeg(&hidden.join("t.jpg"), 4, 4);

        let albums = list_albums(&root, &[]).unwrap();
        assert_eq!(
            titles(&albums),
            vec!["Camera", "Holidays", "Screenshots", "Trips/Lisbon"]
        );
    }

    #[test]
    fn nested_camera_dir_is_distinct_from_top_level_one() {
        let (_tmp, root) = setup_library();
        let nested = root.join("Trips").join("Camera");
        std::fs::create_dir_all(&nested).unwrap();
        create_test_jpeg(&nested.join("x.jpg"), 4, 4);

        let albums = list_albums(&root, &camera()).unwrap();
        assert_eq!(
            titles(&albums),
            vec!["Camera", "Holidays", "Screenshots", "Trips/Camera"]
        );

        let top = album_index(&albums, "Camera").unwrap();
        let trip = album_index(&albums, "Trips/Camera").unwrap();
        assert_eq!(albums[top].path, root.join("Camera"));
        assert_eq!(albums[trip].path, nested);
        assert_eq!(albums[trip].asset_count, 1);
    }

    #[test]
    fn exact_title_preferred_over_case_insensitive_match() {
        let albums: Vec<Album> = ["camera", "Camera"]
            .iter()
            .map(|t| Album {
                title: t.to_string(),
                path: PathBuf::from(t),
                asset_count: 1,
            })
            .collect();
        assert_eq!(album_index(&albums, "Camera").unwrap(), 1);
        assert_eq!(album_index(&albums, "CAMERA").unwrap(), 0);
    }

    #[test]
    fn missing_root_is_error() {
        let result = list_albums(Path::new("/nonexistent/library"), &[]);
        assert!(matches!(result, Err(LibraryError::NotADirectory(_))));
    }

    #[test]
    fn album_assets_sorted_and_images_only() {
        let (_tmp, root) = setup_library();
        std::fs::write(root.join("Holidays").join("readme.txt"), "x").unwrap();
        let albums = list_albums(&root, &camera()).unwrap();
        let holidays = album_index(&albums, "holidays").unwrap();

        let assets = album_assets(&albums[holidays]).unwrap();
        let names: Vec<String> = assets.iter().map(|a| a.display_name()).collect();
        assert_eq!(names, vec!["beach.jpg", "dunes.jpg"]);
    }

    #[test]
    fn find_unknown_album() {
        let (_tmp, root) = setup_library();
        let albums = list_albums(&root, &camera()).unwrap();
        assert!(matches!(
            album_index(&albums, "Nope"),
            Err(LibraryError::UnknownAlbum(_))
        ));
    }

    #[test]
    fn is_image_matches_extensions_case_insensitively() {
        let tmp = tempfile::TempDir::new().unwrap();
        for name in ["a.JPG", "b.heic", "c.Tiff", "d.txt"] {
            std::fs::write(tmp.path().join(name), "x").unwrap();
        }
        assert!(is_image(&tmp.path().join("a.JPG")));
        assert!(is_image(&tmp.path().join("b.heic")));
        assert!(is_image(&tmp.path().join("c.Tiff")));
        assert!(!is_image(&tmp.path().join("d.txt")));
        assert!(!is_image(&tmp.path().join("missing.jpg")));
    }

    #[test]
    fn resolve_picked_requires_existing_files() {
        let (_tmp, root) = setup_library();
        let beach = root.join("Holidays/beach.jpg");
        let refs = resolve_picked(std::slice::from_ref(&beach)).unwrap();
        assert_eq!(refs[0].path, beach);

        let missing = root.join("Holidays/ghost.jpg");
        assert!(matches!(
            resolve_picked(&[beach, missing]),
            Err(LibraryError::NotFound(_))
        ));
    }
}
