//! Build artifact sets and scoped extraction.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tempfile::TempDir;

use crate::error::{BuildError, ProgramError};

/// The files one build produced, keyed by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildArtifacts {
    name: String,
    files: IndexMap<String, Vec<u8>>,
}

impl BuildArtifacts {
    /// Creates an empty artifact set for the build `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: IndexMap::new(),
        }
    }

    /// Adds (or replaces) a file.
    pub fn insert(&mut self, file: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.files.insert(file.into(), bytes.into());
    }

    /// Returns the build name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the contents of a file.
    pub fn get(&self, file: &str) -> Option<&[u8]> {
        self.files.get(file).map(Vec::as_slice)
    }

    /// Returns `true` if the set holds `file`.
    pub fn contains(&self, file: &str) -> bool {
        self.files.contains_key(file)
    }

    /// Iterates over file names in order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if the set holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Writes the named files into a fresh temporary directory.
    ///
    /// The directory and everything in it is removed when the returned
    /// [`ExtractedFiles`] is dropped.
    pub fn extract(&self, files: &[String]) -> Result<ExtractedFiles, ProgramError> {
        for file in files {
            if !self.contains(file) {
                return Err(ProgramError::MissingArtifact { name: file.clone() });
            }
        }
        let dir = tempfile::Builder::new()
            .prefix("boardkit-program-")
            .tempdir()
            .map_err(|source| ProgramError::Io {
                path: std::env::temp_dir(),
                source,
            })?;
        let mut paths = Vec::with_capacity(files.len());
        for file in files {
            let path = dir.path().join(file);
            std::fs::write(&path, &self.files[file.as_str()])
                .map_err(|source| ProgramError::Io {
                    path: path.clone(),
                    source,
                })?;
            paths.push(path);
        }
        Ok(ExtractedFiles { dir, paths })
    }

    /// Saves every file into `dir`, creating it if needed.
    pub fn save_to(&self, dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
        std::fs::create_dir_all(dir).map_err(|source| BuildError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut saved = Vec::with_capacity(self.files.len());
        for (file, bytes) in &self.files {
            let path = dir.join(file);
            std::fs::write(&path, bytes).map_err(|source| BuildError::Io {
                path: path.clone(),
                source,
            })?;
            saved.push(path);
        }
        Ok(saved)
    }

    /// Loads the files of build `name` from a directory written by
    /// [`save_to`](Self::save_to).
    ///
    /// A file belongs to the build if its name is `name` followed by `.` or `-`.
    pub fn load_from(dir: &Path, name: &str) -> Result<Self, BuildError> {
        let dot = format!("{name}.");
        let dash = format!("{name}-");
        read_files(dir, name, |file| file.starts_with(&dot) || file.starts_with(&dash))
    }

    /// Collects every regular file in a build directory.
    pub(crate) fn collect(dir: &Path, name: &str) -> Result<Self, BuildError> {
        read_files(dir, name, |_| true)
    }
}

fn read_files(
    dir: &Path,
    name: &str,
    keep: impl Fn(&str) -> bool,
) -> Result<BuildArtifacts, BuildError> {
    let io = |path: &Path| {
        let path = path.to_path_buf();
        move |source| BuildError::Io { path, source }
    };
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io(dir))? {
        let entry = entry.map_err(io(dir))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file) = path.file_name().and_then(|f| f.to_str()) else {
            continue;
        };
        if keep(file) {
            entries.push((file.to_string(), path));
        }
    }
    entries.sort();

    let mut artifacts = BuildArtifacts::new(name);
    for (file, path) in entries {
        let bytes = std::fs::read(&path).map_err(io(&path))?;
        artifacts.insert(file, bytes);
    }
    Ok(artifacts)
}

/// Artifacts materialized on disk for the duration of one tool call.
#[derive(Debug)]
pub struct ExtractedFiles {
    dir: TempDir,
    paths: Vec<PathBuf>,
}

impl ExtractedFiles {
    /// Paths of the extracted files, in request order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// The directory holding them.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifacts() -> BuildArtifacts {
        let mut a = BuildArtifacts::new("top");
        a.insert("top.bit", b"BIT".to_vec());
        a.insert("top.svf", b"SVF".to_vec());
        a.insert("top-openocd.cfg", b"CFG".to_vec());
        a.insert("blinky.v", b"module".to_vec());
        a
    }

    #[test]
    fn extraction_is_scoped() {
        let a = artifacts();
        let dir;
        {
            let extracted = a
                .extract(&["top-openocd.cfg".to_string(), "top.svf".to_string()])
                .unwrap();
            dir = extracted.dir().to_path_buf();
            assert_eq!(extracted.paths().len(), 2);
            assert!(extracted.paths()[0].ends_with("top-openocd.cfg"));
            assert_eq!(std::fs::read(&extracted.paths()[1]).unwrap(), b"SVF");
        }
        assert!(!dir.exists());
    }

    #[test]
    fn missing_artifact() {
        let err = artifacts().extract(&["top.bin".to_string()]).unwrap_err();
        assert!(matches!(err, ProgramError::MissingArtifact { name } if name == "top.bin"));
    }

    #[test]
    fn save_and_load_round_trip_filters_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let a = artifacts();
        assert_eq!(a.save_to(dir.path()).unwrap().len(), 4);
        std::fs::write(dir.path().join("other.bit"), b"X").unwrap();

        let loaded = BuildArtifacts::load_from(dir.path(), "top").unwrap();
        assert_eq!(loaded.name(), "top");
        let names: Vec<_> = loaded.file_names().collect();
        assert_eq!(names, vec!["top-openocd.cfg", "top.bit", "top.svf"]);
        assert_eq!(loaded.get("top.bit"), Some(&b"BIT"[..]));
    }

    #[test]
    fn load_from_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BuildArtifacts::load_from(&dir.path().join("nope"), "top").unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }
}
