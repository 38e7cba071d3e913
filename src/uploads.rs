//! Gathering upload files from the command line.
//!
//! Each argument is a file or a directory. Directories are walked
//! recursively in file-name order; hidden entries are skipped. Files are not
//! filtered by extension here: the reconciler sniffs every file and reports
//! the ones the store would reject.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use crate::store::UploadFile;

#[derive(Error, Debug)]
pub enum UploadInputError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{} captions given for {} files", captions, files)]
    CaptionCount { captions: usize, files: usize },
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

/// Expand `inputs` into the list of files to upload, in upload order.
pub fn collect_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, UploadInputError> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        let walker = WalkDir::new(input)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    }
    Ok(files)
}

impl UploadFile {
    /// Read `path` into memory, named after its file name.
    pub fn from_path(path: &Path) -> Result<Self, UploadInputError> {
        let bytes = fs::read(path).map_err(|source| UploadInputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(UploadFile::new(name, bytes))
    }
}

/// Read every file under `inputs`. Captions pair with files by position;
/// fewer captions than files leaves the rest uncaptioned.
pub fn read_uploads(
    inputs: &[PathBuf],
    captions: &[String],
) -> Result<Vec<UploadFile>, UploadInputError> {
    let paths = collect_paths(inputs)?;
    if captions.len() > paths.len() {
        return Err(UploadInputError::CaptionCount {
            captions: captions.len(),
            files: paths.len(),
        });
    }
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            let file = UploadFile::from_path(path)?;
            Ok(match captions.get(i) {
                Some(caption) => file.with_caption(caption.clone()),
                None => file,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{JPEG_BYTES, PNG_BYTES};
    use tempfile::TempDir;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn directories_are_walked_in_name_order() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.png"), PNG_BYTES).unwrap();
        fs::write(tmp.path().join("a.jpg"), JPEG_BYTES).unwrap();
        fs::create_dir(tmp.path().join("c-more")).unwrap();
        fs::write(tmp.path().join("c-more/d.jpg"), JPEG_BYTES).unwrap();

        let paths = collect_paths(&[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(names(&paths), ["a.jpg", "b.png", "d.jpg"]);
    }

    #[test]
    fn hidden_entries_are_skipped() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".DS_Store"), b"junk").unwrap();
        fs::create_dir(tmp.path().join(".cache")).unwrap();
        fs::write(tmp.path().join(".cache/x.jpg"), JPEG_BYTES).unwrap();
        fs::write(tmp.path().join("cover.jpg"), JPEG_BYTES).unwrap();

        let paths = collect_paths(&[tmp.path().to_path_buf()]).unwrap();
        assert_eq!(names(&paths), ["cover.jpg"]);
    }

    #[test]
    fn files_keep_argument_order() {
        let tmp = TempDir::new().unwrap();
        let z = tmp.path().join("z.jpg");
        let a = tmp.path().join("a.jpg");
        fs::write(&z, JPEG_BYTES).unwrap();
        fs::write(&a, JPEG_BYTES).unwrap();

        let paths = collect_paths(&[z, a]).unwrap();
        assert_eq!(names(&paths), ["z.jpg", "a.jpg"]);
    }

    #[test]
    fn captions_pair_by_position() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.jpg");
        let b = tmp.path().join("b.jpg");
        fs::write(&a, JPEG_BYTES).unwrap();
        fs::write(&b, JPEG_BYTES).unwrap();

        let files = read_uploads(&[a, b], &["Front board".to_string()]).unwrap();
        assert_eq!(files[0].caption.as_deref(), Some("Front board"));
        assert_eq!(files[1].caption, None);
        assert_eq!(files[0].bytes, JPEG_BYTES);
    }

    #[test]
    fn too_many_captions_is_error() {
        let tmp = TempDir::new().unwrap();
        let a = tmp.path().join("a.jpg");
        fs::write(&a, JPEG_BYTES).unwrap();

        let err = read_uploads(&[a], &["one".into(), "two".into()]).unwrap_err();
        assert!(matches!(
            err,
            UploadInputError::CaptionCount {
                captions: 2,
                files: 1
            }
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = read_uploads(&[tmp.path().join("nope.jpg")], &[]).unwrap_err();
        assert!(matches!(err, UploadInputError::Io { .. }));
    }
}
