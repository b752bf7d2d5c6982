//! Typed components extracted from a SAS program.

use crate::sm_name::DataName;

/// A half-open range of 0-based line indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// First line of the component.
    pub start: usize,
    /// One past the last line of the component.
    pub end: usize,
}

impl Span {
    /// Number of lines covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span covers no lines.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether two spans share any line.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A single `&name` reference together with the line it appeared on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroRef {
    /// The reference, ampersand included.
    pub name: String,
    /// The enclosing line text.
    pub line: String,
}

/// The kind-specific payload of an extracted component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentKind {
    /// `/* ... */`, possibly spanning lines.
    CommentBlock,
    /// `* ... ;` statement comment.
    CommentInline,
    /// A `DATA ... RUN;` step.
    ///
    /// `data_in` holds at most one name: the first table of the first `SET`
    /// statement. Further `SET` tables are not recorded.
    DataStep {
        /// Tables read (first `SET` table only).
        data_in: Vec<DataName>,
        /// Tables written by the `DATA` statement.
        data_out: Vec<DataName>,
    },
    /// A `PROC SQL ... QUIT;` block.
    ProcSql {
        /// Every `FROM` and `JOIN` target.
        data_in: Vec<DataName>,
        /// Every `CREATE TABLE/VIEW`, `INSERT INTO`, and `UPDATE` target.
        data_out: Vec<DataName>,
    },
    /// A `PROC SORT ... RUN;` step; exactly one input and one output.
    ProcSort {
        /// The `data=` table.
        data_in: Vec<DataName>,
        /// The `out=` table, defaulting to `work.<input member>`.
        data_out: Vec<DataName>,
    },
    /// A `PROC IMPORT ... RUN;` step; the input is a filesystem path.
    ProcImport {
        /// The `datafile=` path (libref `none`).
        data_in: Vec<DataName>,
        /// The `out=` dataset.
        data_out: Vec<DataName>,
    },
    /// A `PROC EXPORT ... RUN;` step; the output is a filesystem path.
    ProcExport {
        /// The `data=` dataset.
        data_in: Vec<DataName>,
        /// The `outfile=` path (libref `none`).
        data_out: Vec<DataName>,
    },
    /// A call of a recognized user-defined macro, e.g. `%libname(...)`.
    MacroCallUserDef {
        /// Lower-cased macro name.
        name: String,
    },
    /// A `%let name = value;` assignment.
    MacroLet {
        /// Macro-variable name.
        name: String,
        /// Raw value expression.
        value: String,
    },
    /// A `call symput('name', expr);` assignment.
    MacroSymput {
        /// Macro-variable name.
        name: String,
        /// Raw value expression.
        value: String,
    },
    /// All `&name` references found on one line. Non-consuming: the line
    /// remains visible to later extraction phases.
    MacroVarRef {
        /// References with their enclosing line text.
        refs: Vec<MacroRef>,
    },
}

/// An extracted span of the program with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Location in the script.
    pub span: Span,
    /// The matched text.
    pub content: String,
    /// Kind-specific payload.
    pub kind: ComponentKind,
}

impl Component {
    /// The upper-cased label used in mapping CSVs and graph edges, for
    /// data-flow step kinds. `None` for comments and macro components.
    pub fn step_label(&self) -> Option<&'static str> {
        match self.kind {
            ComponentKind::DataStep { .. } => Some("DATASTEP"),
            ComponentKind::ProcSql { .. } => Some("PROCSQL"),
            ComponentKind::ProcSort { .. } => Some("SORT"),
            ComponentKind::ProcImport { .. } => Some("IMPORT"),
            ComponentKind::ProcExport { .. } => Some("EXPORT"),
            _ => None,
        }
    }

    /// Tables consumed, for data-flow step kinds.
    pub fn data_in(&self) -> Option<&[DataName]> {
        match &self.kind {
            ComponentKind::DataStep { data_in, .. }
            | ComponentKind::ProcSql { data_in, .. }
            | ComponentKind::ProcSort { data_in, .. }
            | ComponentKind::ProcImport { data_in, .. }
            | ComponentKind::ProcExport { data_in, .. } => Some(data_in),
            _ => None,
        }
    }

    /// Tables produced, for data-flow step kinds.
    pub fn data_out(&self) -> Option<&[DataName]> {
        match &self.kind {
            ComponentKind::DataStep { data_out, .. }
            | ComponentKind::ProcSql { data_out, .. }
            | ComponentKind::ProcSort { data_out, .. }
            | ComponentKind::ProcImport { data_out, .. }
            | ComponentKind::ProcExport { data_out, .. } => Some(data_out),
            _ => None,
        }
    }

    /// Whether this component is a comment.
    pub fn is_comment(&self) -> bool {
        matches!(
            self.kind,
            ComponentKind::CommentBlock | ComponentKind::CommentInline
        )
    }
}
