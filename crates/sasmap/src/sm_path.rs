//! Validated input/output configuration for an extraction run.

use colored::Colorize;
use log::debug;
use path_abs::{PathAbs, PathInfo};
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::err::SasMapError;

/// Which artifact kind a run consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// SAS program scripts (`*.sas`).
    Script,
    /// SAS execution logs (`*.log`).
    Log,
}

impl Mode {
    /// The file extension scanned for in this mode.
    pub fn extension(&self) -> &'static str {
        match self {
            Mode::Script => "sas",
            Mode::Log => "log",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Script => write!(f, "script"),
            Mode::Log => write!(f, "log"),
        }
    }
}

/// Validated paths and options for one extraction run.
///
/// The input path must exist (file or directory); the output directory is
/// created when missing. Input files are read with lossy UTF-8 conversion,
/// so the host encoding only matters for identifiers outside ASCII.
#[derive(Debug, Clone)]
pub struct SasMapPath {
    /// Absolute path to the input file or directory.
    pub path: PathBuf,
    /// Absolute path to the output directory.
    pub out_dir: PathBuf,
    /// Script or log mode.
    pub mode: Mode,
    /// Whether existing output files may be replaced.
    pub overwrite: bool,
}

impl SasMapPath {
    /// Creates a new `SasMapPath` after validating the input path and
    /// preparing the output directory.
    pub fn new(
        path: PathBuf,
        out_dir: PathBuf,
        mode: Mode,
        overwrite: bool,
    ) -> Result<Self, SasMapError> {
        let path = Self::validate_path(path)?;
        let out_dir = Self::validate_out_dir(out_dir)?;
        Ok(Self {
            path,
            out_dir,
            mode,
            overwrite,
        })
    }

    fn validate_path(path: PathBuf) -> Result<PathBuf, SasMapError> {
        let abs_path = PathAbs::new(path)?;
        if abs_path.exists() {
            Ok(abs_path.as_path().to_path_buf())
        } else {
            Err(SasMapError::Other(format!(
                "Input path {} does not exist!",
                abs_path.to_string_lossy().bright_yellow()
            )))
        }
    }

    fn validate_out_dir(out_dir: PathBuf) -> Result<PathBuf, SasMapError> {
        let abs_dir = PathAbs::new(out_dir)?;
        let dir = abs_dir.as_path().to_path_buf();
        if dir.exists() {
            if !dir.is_dir() {
                return Err(SasMapError::Other(format!(
                    "Output path {} exists and is not a directory!",
                    dir.to_string_lossy().bright_yellow()
                )));
            }
        } else {
            debug!("Creating output directory {}", dir.to_string_lossy());
            std::fs::create_dir_all(&dir)?;
        }
        Ok(dir)
    }

    fn has_mode_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(self.mode.extension()))
    }

    /// Resolves the list of input files for this run.
    ///
    /// A single-file input must carry the mode's extension. A directory is
    /// scanned recursively; the list is sorted for deterministic processing
    /// order. An unreadable directory is a fatal error.
    pub fn input_files(&self) -> Result<Vec<PathBuf>, SasMapError> {
        if self.path.is_file() {
            if self.has_mode_extension(&self.path) {
                return Ok(vec![self.path.clone()]);
            }
            return Err(SasMapError::Other(format!(
                "Expecting extension {} in {} mode.\nFile {} does not have the expected extension!",
                self.mode.extension().bright_green(),
                self.mode,
                self.path.to_string_lossy().bright_yellow()
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.path) {
            let entry = entry.map_err(|e| {
                SasMapError::Other(format!(
                    "Failed to read input directory {}: {e}",
                    self.path.to_string_lossy().bright_yellow()
                ))
            })?;
            if entry.file_type().is_file() && self.has_mode_extension(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
        files.sort();
        Ok(files)
    }

    /// The output path `<out_dir>/<prefix>_<stem>.<ext>`.
    pub fn output_file(&self, prefix: &str, stem: &str, ext: &str) -> PathBuf {
        self.out_dir.join(format!("{prefix}_{stem}.{ext}"))
    }
}
