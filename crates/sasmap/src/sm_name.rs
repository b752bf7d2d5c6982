//! Qualified dataset names.

use regex::Captures;
use serde::Serialize;
use std::fmt;

/// The libref given to a dataset name written without qualification.
pub const DEFAULT_LIBREF: &str = "work";

/// The pseudo-libref marking a filesystem path rather than a SAS dataset
/// (`proc import datafile=` sources, `proc export outfile=` targets).
pub const PATH_LIBREF: &str = "none";

/// A qualified `libref.member` dataset name.
///
/// Identifiers keep the casing they were written with; only the libref
/// defaulting is normalized (a bare member belongs to the session-scoped
/// `work` library).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DataName {
    /// Library reference, defaulted to `work` when unqualified.
    pub libref: String,
    /// Member (dataset) name, or a filesystem path when `libref` is `none`.
    pub member: String,
}

impl DataName {
    /// Creates a name from explicit parts.
    pub fn new(libref: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            libref: libref.into(),
            member: member.into(),
        }
    }

    /// Creates a name from an optional libref, defaulting to `work`.
    pub fn qualified(libref: Option<&str>, member: &str) -> Self {
        let libref = match libref {
            Some(l) if !l.is_empty() => l,
            _ => DEFAULT_LIBREF,
        };
        Self::new(libref, member)
    }

    /// Creates a name for a filesystem path (libref `none`).
    pub fn path(path: &str) -> Self {
        Self::new(PATH_LIBREF, path)
    }

    /// Builds a name from [`patterns::DATA_NAME`](crate::patterns::DATA_NAME)
    /// captures: optional libref in capture `base`, member in `base + 1`.
    pub fn from_captures(caps: &Captures<'_>, base: usize) -> Self {
        Self::qualified(
            caps.get(base).map(|m| m.as_str()),
            caps.get(base + 1).map(|m| m.as_str()).unwrap_or_default(),
        )
    }
}

impl fmt::Display for DataName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.libref, self.member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::RE_DATA_NAME;

    #[test]
    fn unqualified_defaults_to_work() {
        let n = DataName::qualified(None, "tbl");
        assert_eq!(n.to_string(), "work.tbl");
    }

    #[test]
    fn qualified_keeps_libref_case() {
        let n = DataName::qualified(Some("MyLib"), "Tbl");
        assert_eq!(n.to_string(), "MyLib.Tbl");
    }

    #[test]
    fn empty_libref_defaults_to_work() {
        let n = DataName::qualified(Some(""), "tbl");
        assert_eq!(n.libref, "work");
    }

    #[test]
    fn from_captures_round_trip() {
        let caps = RE_DATA_NAME.captures("sales.q1_2019").unwrap();
        let n = DataName::from_captures(&caps, 1);
        assert_eq!(n.to_string(), "sales.q1_2019");

        let caps = RE_DATA_NAME.captures("q1_2019").unwrap();
        let n = DataName::from_captures(&caps, 1);
        assert_eq!(n.to_string(), "work.q1_2019");
    }

    #[test]
    fn path_name_uses_none_libref() {
        let n = DataName::path("'C:\\in\\flights.csv'");
        assert_eq!(n.libref, "none");
    }
}
