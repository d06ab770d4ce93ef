use crate::volume_loader::VolumeLoaderError;

use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Ordered, deduplicated, non-empty list of slice files.
///
/// The position of a path in the list is the z-coordinate of its plane in
/// the assembled volume.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceList(Vec<PathBuf>);

impl SliceList {
    /// Sort and deduplicate `paths`. Returns `None` when nothing is left.
    pub fn new(mut paths: Vec<PathBuf>) -> Option<Self> {
        paths.sort();
        paths.dedup();
        if paths.is_empty() {
            None
        } else {
            Some(Self(paths))
        }
    }

    pub fn first(&self) -> &Path {
        &self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.0
    }
}

pub struct SliceSetResolver {
    extension: String,
}

impl SliceSetResolver {
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    /// List the slice files of `dir` in z order.
    ///
    /// Files carrying the configured extension win; if there are none, every
    /// regular file in the directory is taken instead.
    ///
    /// # Errors
    ///
    /// [`VolumeLoaderError::PathNotFound`] if the directory cannot be read,
    /// [`VolumeLoaderError::EmptyDirectory`] if it holds no files at all.
    pub fn resolve(&self, dir: impl AsRef<Path>) -> Result<SliceList, VolumeLoaderError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|source| VolumeLoaderError::PathNotFound {
            path: dir.to_path_buf(),
            source,
        })?;

        let files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();

        let matching: Vec<PathBuf> = files
            .iter()
            .filter(|path| self.has_slice_extension(path))
            .cloned()
            .collect();

        let candidates = if matching.is_empty() {
            debug!(
                dir = %dir.display(),
                extension = %self.extension,
                files = files.len(),
                "no file carries the slice extension, using every file"
            );
            files
        } else {
            matching
        };

        SliceList::new(candidates).ok_or_else(|| VolumeLoaderError::EmptyDirectory(dir.to_path_buf()))
    }

    fn has_slice_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}
