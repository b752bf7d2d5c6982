//! Shared utility functions used across the crate.

use std::path::Path;

/// Derives the output-file stem for an input path.
///
/// Takes the file stem of `path` and replaces spaces with underscores so the
/// stem can be embedded in output file names such as `mapping_<stem>.csv`.
///
/// # Example
///
/// ```
/// # use sasmap::sanitize_stem;
/// # use std::path::Path;
/// assert_eq!(sanitize_stem(Path::new("/jobs/monthly report.sas")), "monthly_report");
/// ```
pub fn sanitize_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
        .replace(' ', "_")
}
