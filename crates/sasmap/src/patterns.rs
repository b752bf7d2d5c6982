//! Centralized lexical patterns shared by the script and log extractors.
//!
//! Every sub-extractor builds its regexes from the constants below so the
//! notion of "a SAS name" cannot drift between extraction phases. SAS
//! keywords are matched case-insensitively (the extractors embed `(?i)`);
//! captured identifiers keep the casing they were written with.

use lazy_static::lazy_static;
use regex::Regex;

/// One part of a dataset name (libref or member). Macro-variable characters
/// (`&`) are allowed since names are commonly assembled via substitution.
pub const NAME_PART: &str = r"[A-Za-z_&][A-Za-z0-9_&.]{0,31}";

/// A bare SAS identifier (libref, fileref) as it appears in log NOTEs.
pub const IDENT: &str = r"[A-Za-z_&][A-Za-z0-9_&]{0,31}";

/// A macro-variable reference: `&name`.
pub const MACRO_VAR: &str = r"&[A-Za-z_][A-Za-z0-9_]{0,31}";

/// A quoted or bare filesystem path as written in `datafile=`/`outfile=`
/// options. Quote characters are kept as part of the match. Paths with
/// embedded spaces are truncated at the first space.
pub const FILE_PATH: &str = r#"['"A-Za-z_&][A-Za-z0-9_&'".:\\/\-]*"#;

/// A parenthesized dataset-option group, e.g. `(keep=a b)` or
/// `(where=(x > 1))`. Handles one level of nesting.
pub const DATASET_OPTS: &str = r"\(.*?(?:\(.*?\).*?)*\)";

lazy_static! {
    /// A possibly-qualified dataset name: optional `libref.` prefix
    /// (capture 1) followed by the member name (capture 2).
    pub static ref DATA_NAME: String =
        format!(r"(?:({np})\.)?({np})", np = NAME_PART);

    /// A mandatory `libref.member` name (capture 1) as written in log NOTEs;
    /// the parts may not themselves contain dots.
    pub static ref QUALIFIED_NAME: String =
        format!(r"({id}\.{id})", id = IDENT);

    /// Compiled form of [`struct@DATA_NAME`].
    pub static ref RE_DATA_NAME: Regex = Regex::new(&DATA_NAME).unwrap();

    /// Compiled form of [`MACRO_VAR`], with the reference in capture 1.
    pub static ref RE_MACRO_VAR: Regex =
        Regex::new(&format!("({MACRO_VAR})")).unwrap();

    /// A line that opens a new PROC; used to re-scan terminator lines.
    pub static ref RE_PROC_LINE: Regex = Regex::new(r"(?i)^[ ]*proc\s*").unwrap();
}
