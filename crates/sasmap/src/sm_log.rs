//! Log-side extraction: segmentation, NOTE classification, and grouping of
//! notes into procedure invocations.
//!
//! A SAS job log interleaves echoed script lines with runtime messages. The
//! extractor first cuts the log into components keyed by their first-line
//! prefix (`NOTE:`, `WARNING:`, `MACROGEN(EXTRACT):`, or an echoed script
//! line number), then classifies each NOTE body, and finally groups
//! consecutive notes into procedures bounded by end-of-procedure notes
//! (`... used (Total process time):`, libref assignment, `%INCLUDE`).

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::patterns::{IDENT, QUALIFIED_NAME};

lazy_static! {
    // Component-opening prefixes.
    static ref RE_LOG_NOTE: Regex = Regex::new(r"^NOTE: ").unwrap();
    static ref RE_LOG_MACROGEN: Regex = Regex::new(r"^MACROGEN\(EXTRACT\):").unwrap();
    static ref RE_LOG_WARNING: Regex = Regex::new(r"^WARNING: ").unwrap();
    static ref RE_LOG_SCRIPT_LINE: Regex = Regex::new(r"^(\d+)\s+").unwrap();

    // NOTE body classification. `\s+` crosses line breaks, so names wrapped
    // onto a continuation line are still captured.
    static ref RE_NOTE_READ: Regex = Regex::new(&format!(
        r"(?i)^NOTE:.*observations\s+read\s+from\s+the\s+data\s+set\s+{qn}",
        qn = QUALIFIED_NAME.as_str()
    ))
    .unwrap();
    static ref RE_NOTE_NO_OBS: Regex = Regex::new(&format!(
        r"(?i)^NOTE:\s+No\s+observations\s+in\s+data\s+set\s+{qn}",
        qn = QUALIFIED_NAME.as_str()
    ))
    .unwrap();
    static ref RE_NOTE_OUTPUT: Regex = Regex::new(&format!(
        r"(?i)^NOTE:\s+The\s+data\s+set\s+{qn}\s+has",
        qn = QUALIFIED_NAME.as_str()
    ))
    .unwrap();
    static ref RE_NOTE_DATA_STMT: Regex =
        Regex::new(r"(?i)^NOTE:\s+DATA\s+statement\s+used\s+").unwrap();
    static ref RE_NOTE_PROC: Regex =
        Regex::new(r"(?i)^NOTE:\s+PROCEDURE\s+([A-Za-z]+)\s+used\s+").unwrap();
    static ref RE_NOTE_INFILE: Regex = Regex::new(&format!(
        r"(?i)^NOTE:.*\s+read\s+from\s+the\s+infile\s+({id})",
        id = IDENT
    ))
    .unwrap();
    static ref RE_NOTE_DEASSIGN: Regex = Regex::new(&format!(
        r"(?i)^NOTE:.*\s+Libref\s+({id})\s+has\s+been\s+deassigned",
        id = IDENT
    ))
    .unwrap();
    static ref RE_NOTE_ASSIGN: Regex = Regex::new(&format!(
        r"(?i)^NOTE:.*\s+Libref\s+({id})\s+was\s+successfully\s+assigned\s+as\s+follows:",
        id = IDENT
    ))
    .unwrap();
    static ref RE_NOTE_INCLUDE: Regex =
        Regex::new(r"(?i)^NOTE:.*%INCLUDE\s+").unwrap();
}

/// What a classified NOTE means for lineage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteKind {
    /// A dataset or infile was read.
    Input,
    /// A dataset was written.
    Output,
    /// `DATA statement used ...` terminator.
    DataStep,
    /// `PROCEDURE <name> used ...` terminator.
    Proc(String),
    /// A libref was assigned.
    LibrefAssign,
    /// A libref was deassigned.
    LibrefDeassign,
    /// Anything else.
    Other,
}

impl NoteKind {
    /// The upper-cased label used for procedure kinds in tabular output and
    /// graph edges. [`NoteKind::Other`] has an empty label.
    pub fn label(&self) -> String {
        match self {
            NoteKind::Input => "INPUT".to_string(),
            NoteKind::Output => "OUTPUT".to_string(),
            NoteKind::DataStep => "DATASTEP".to_string(),
            NoteKind::Proc(name) => format!("PROC {}", name.to_uppercase()),
            NoteKind::LibrefAssign => "LIBREFASSIGN".to_string(),
            NoteKind::LibrefDeassign => "LIBREFDEASSIGN".to_string(),
            NoteKind::Other => String::new(),
        }
    }
}

/// Classification of one NOTE component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFields {
    /// Meaning of the note.
    pub kind: NoteKind,
    /// The dataset, fileref, or libref named by the note, when applicable.
    pub data_name: String,
    /// Whether the note marks the end of a procedure invocation.
    pub ends_procedure: bool,
}

/// Classification of one log component by its first-line prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogComponentKind {
    /// A runtime `NOTE:` message with its classification.
    Note(NoteFields),
    /// A `WARNING:` message.
    Warning,
    /// A `MACROGEN(EXTRACT):` trace line.
    MacroGen,
    /// An echoed script line (leading line number).
    ScriptLine,
    /// Anything else (banner lines, error dumps, continuations at top).
    Misc,
}

impl LogComponentKind {
    /// Short name for summary counts.
    pub fn name(&self) -> &'static str {
        match self {
            LogComponentKind::Note(_) => "note",
            LogComponentKind::Warning => "warning",
            LogComponentKind::MacroGen => "macrogen",
            LogComponentKind::ScriptLine => "script_line",
            LogComponentKind::Misc => "misc",
        }
    }
}

/// One segmented span of the log. Lines are 1-based; `end_line` is the line
/// before the next component opens (the last component ends at EOF).
#[derive(Debug, Clone)]
pub struct LogComponent {
    /// First line of the component (1-based).
    pub start_line: usize,
    /// Last line of the component (1-based, inclusive).
    pub end_line: usize,
    /// Raw text of the component, lines joined with `\n`.
    pub contents: String,
    /// Classification by first-line prefix.
    pub kind: LogComponentKind,
}

/// A procedure invocation reconstructed from a run of notes.
#[derive(Debug, Clone)]
pub struct Procedure {
    /// First line of the first note in the group.
    pub start_line: usize,
    /// Last line of the terminating note.
    pub end_line: usize,
    /// Label of the terminating note, e.g. `DATASTEP` or `PROC SORT`.
    pub kind: String,
    /// Data names of the group's `Input` notes.
    pub inputs: Vec<String>,
    /// Data names of the group's `Output` notes.
    pub outputs: Vec<String>,
}

/// Everything the log pass produced for one file.
#[derive(Debug)]
pub struct LogExtract {
    /// Segmented components in line order.
    pub components: Vec<LogComponent>,
    /// Grouped procedure invocations in appearance order.
    pub procedures: Vec<Procedure>,
    /// Number of lines in the log.
    pub log_len: usize,
    /// Notes left without a terminator at EOF (job aborted or log truncated).
    pub dropped_notes: usize,
}

/// Segments, classifies, and groups the log text.
pub fn extract_log(text: &str) -> LogExtract {
    let mut lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();
    if text.ends_with('\n') {
        lines.pop();
    }
    let log_len = lines.len();

    // First pass: find the 1-based line numbers where components open. An
    // echoed script line opens a component only when its leading number is
    // strictly greater than the last one seen, so wrapped continuations that
    // happen to start with a smaller number are absorbed.
    let mut starts: Vec<usize> = Vec::new();
    let mut current_script_line = 0u64;
    for (idx, line) in lines.iter().enumerate() {
        if RE_LOG_NOTE.is_match(line)
            || RE_LOG_MACROGEN.is_match(line)
            || RE_LOG_WARNING.is_match(line)
        {
            starts.push(idx + 1);
        } else if let Some(caps) = RE_LOG_SCRIPT_LINE.captures(line) {
            if let Ok(n) = caps[1].parse::<u64>() {
                if n > current_script_line {
                    starts.push(idx + 1);
                    current_script_line = n;
                }
            }
        }
    }

    // Second pass: materialize components between consecutive opening lines.
    let mut components: Vec<LogComponent> = Vec::new();
    for (i, &start) in starts.iter().enumerate() {
        let (end_line, slice_end) = match starts.get(i + 1) {
            Some(&next) => (next - 1, next - 1),
            None => (log_len, log_len),
        };
        let contents = lines[start - 1..slice_end].join("\n");
        let kind = classify_component(&contents);
        components.push(LogComponent {
            start_line: start,
            end_line,
            contents,
            kind,
        });
    }

    let (procedures, dropped_notes) = group_procedures(&components);
    if dropped_notes > 0 {
        debug!("{dropped_notes} trailing notes without a terminator were dropped");
    }

    LogExtract {
        components,
        procedures,
        log_len,
        dropped_notes,
    }
}

fn classify_component(contents: &str) -> LogComponentKind {
    if RE_LOG_NOTE.is_match(contents) {
        LogComponentKind::Note(classify_note(contents))
    } else if RE_LOG_MACROGEN.is_match(contents) {
        LogComponentKind::MacroGen
    } else if RE_LOG_WARNING.is_match(contents) {
        LogComponentKind::Warning
    } else if RE_LOG_SCRIPT_LINE.is_match(contents) {
        LogComponentKind::ScriptLine
    } else {
        LogComponentKind::Misc
    }
}

/// Classifies a NOTE body.
///
/// Every pattern is applied in a fixed order and each match overwrites the
/// fields it sets, so when several phrasings appear in one note the last one
/// wins. The `%INCLUDE` pattern only flips the terminator flag and leaves an
/// earlier classification in place.
pub fn classify_note(contents: &str) -> NoteFields {
    let mut fields = NoteFields {
        kind: NoteKind::Other,
        data_name: String::new(),
        ends_procedure: false,
    };

    if let Some(caps) = RE_NOTE_READ.captures(contents) {
        fields.kind = NoteKind::Input;
        fields.data_name = caps[1].to_string();
    }
    if let Some(caps) = RE_NOTE_NO_OBS.captures(contents) {
        fields.kind = NoteKind::Input;
        fields.data_name = caps[1].to_string();
    }
    if let Some(caps) = RE_NOTE_OUTPUT.captures(contents) {
        fields.kind = NoteKind::Output;
        fields.data_name = caps[1].to_string();
    }
    if RE_NOTE_DATA_STMT.is_match(contents) {
        fields.kind = NoteKind::DataStep;
        fields.data_name = String::new();
        fields.ends_procedure = true;
    }
    if let Some(caps) = RE_NOTE_PROC.captures(contents) {
        fields.kind = NoteKind::Proc(caps[1].to_string());
        fields.data_name = String::new();
        fields.ends_procedure = true;
    }
    if let Some(caps) = RE_NOTE_INFILE.captures(contents) {
        fields.kind = NoteKind::Input;
        fields.data_name = caps[1].to_string();
    }
    if let Some(caps) = RE_NOTE_DEASSIGN.captures(contents) {
        fields.kind = NoteKind::LibrefDeassign;
        fields.data_name = caps[1].to_string();
        fields.ends_procedure = true;
    }
    if let Some(caps) = RE_NOTE_ASSIGN.captures(contents) {
        fields.kind = NoteKind::LibrefAssign;
        fields.data_name = caps[1].to_string();
        fields.ends_procedure = true;
    }
    if RE_NOTE_INCLUDE.is_match(contents) {
        fields.ends_procedure = true;
    }

    fields
}

/// Groups consecutive notes into [`Procedure`]s bounded by terminator notes.
/// Returns the procedures and the count of trailing notes discarded at EOF.
fn group_procedures(components: &[LogComponent]) -> (Vec<Procedure>, usize) {
    let mut procedures = Vec::new();
    let mut pending: Vec<(&LogComponent, &NoteFields)> = Vec::new();

    for comp in components {
        let LogComponentKind::Note(fields) = &comp.kind else {
            continue;
        };
        pending.push((comp, fields));
        if fields.ends_procedure {
            let inputs = pending
                .iter()
                .filter(|(_, f)| f.kind == NoteKind::Input)
                .map(|(_, f)| f.data_name.clone())
                .collect();
            let outputs = pending
                .iter()
                .filter(|(_, f)| f.kind == NoteKind::Output)
                .map(|(_, f)| f.data_name.clone())
                .collect();
            procedures.push(Procedure {
                start_line: pending[0].0.start_line,
                end_line: comp.end_line,
                kind: fields.kind.label(),
                inputs,
                outputs,
            });
            pending.clear();
        }
    }

    let dropped = pending.len();
    (procedures, dropped)
}
