//! Tabular record schemas for the mapping and macro-variable CSV outputs.
//!
//! Sequence numbers enumerate the full component list in textual order;
//! rows that do not apply (comments, macro calls, libref bookkeeping) are
//! skipped but keep their position, so sequences have gaps by design.

use serde::Serialize;

use crate::sm_component::{Component, ComponentKind};
use crate::sm_log::Procedure;
use crate::sm_name::DataName;

/// One row of `mapping_<stem>.csv`. Scripts and logs share this schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingRecord {
    /// Position in the sorted component/procedure list.
    #[serde(rename = "Sequence")]
    pub sequence: usize,
    /// First line of the step.
    #[serde(rename = "Start Line Number")]
    pub start_line: usize,
    /// Last line of the step.
    #[serde(rename = "End Line Number")]
    pub end_line: usize,
    /// Upper-cased step kind.
    #[serde(rename = "Procedure Type")]
    pub procedure_type: String,
    /// Qualified input names joined with `|`.
    #[serde(rename = "Inputs")]
    pub inputs: String,
    /// Qualified output names joined with `|`.
    #[serde(rename = "Outputs")]
    pub outputs: String,
}

/// Column headers of [`MappingRecord`], for writers that must emit a header
/// even when no rows exist.
pub const MAPPING_HEADERS: &[&str] = &[
    "Sequence",
    "Start Line Number",
    "End Line Number",
    "Procedure Type",
    "Inputs",
    "Outputs",
];

/// One row of `macros_<stem>.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroRecord {
    /// Position in the sorted macro-component list.
    #[serde(rename = "Sequence")]
    pub sequence: usize,
    /// First line of the component.
    #[serde(rename = "Start Line Number")]
    pub start_line: usize,
    /// Last line of the component.
    #[serde(rename = "End Line Number")]
    pub end_line: usize,
    /// `LET`, `SYMPUT`, or `MACRO VARIABLES`.
    #[serde(rename = "Procedure Type")]
    pub procedure_type: String,
    /// The referenced `&name` for reference rows.
    #[serde(rename = "Inputs")]
    pub inputs: String,
    /// The assigned macro-variable name for assignment rows.
    #[serde(rename = "Outputs")]
    pub outputs: String,
    /// The assigned value expression, or the referencing line text.
    #[serde(rename = "Values")]
    pub values: String,
}

/// Column headers of [`MacroRecord`].
pub const MACRO_HEADERS: &[&str] = &[
    "Sequence",
    "Start Line Number",
    "End Line Number",
    "Procedure Type",
    "Inputs",
    "Outputs",
    "Values",
];

fn join_names(names: &[DataName]) -> String {
    names
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join("|")
}

/// Builds the mapping rows for a script's components.
pub fn script_mapping_records(components: &[Component]) -> Vec<MappingRecord> {
    let mut sorted: Vec<&Component> = components.iter().collect();
    sorted.sort_by_key(|c| c.span.start);

    let mut records = Vec::new();
    for (i, comp) in sorted.iter().enumerate() {
        let Some(label) = comp.step_label() else {
            continue;
        };
        let inputs = comp.data_in().map(join_names).unwrap_or_default();
        let outputs = comp.data_out().map(join_names).unwrap_or_default();
        records.push(MappingRecord {
            sequence: i,
            start_line: comp.span.start,
            end_line: comp.span.end,
            procedure_type: label.to_string(),
            inputs,
            outputs,
        });
    }
    records
}

/// Builds the mapping rows for a log's grouped procedures. Libref
/// bookkeeping groups and unclassified groups are omitted.
pub fn log_mapping_records(procedures: &[Procedure]) -> Vec<MappingRecord> {
    let mut records = Vec::new();
    for (i, proc) in procedures.iter().enumerate() {
        let kind = proc.kind.to_uppercase();
        if kind.is_empty() || kind == "LIBREFASSIGN" || kind == "LIBREFDEASSIGN" {
            continue;
        }
        records.push(MappingRecord {
            sequence: i,
            start_line: proc.start_line,
            end_line: proc.end_line,
            procedure_type: kind,
            inputs: proc.inputs.join("|"),
            outputs: proc.outputs.join("|"),
        });
    }
    records
}

/// Builds the macro-variable rows: `%let` and `call symput` assignments plus
/// one row per `&name` reference.
pub fn macro_records(components: &[Component]) -> Vec<MacroRecord> {
    let mut sorted: Vec<&Component> = components
        .iter()
        .filter(|c| {
            matches!(
                c.kind,
                ComponentKind::MacroLet { .. }
                    | ComponentKind::MacroSymput { .. }
                    | ComponentKind::MacroVarRef { .. }
            )
        })
        .collect();
    sorted.sort_by_key(|c| c.span.start);

    let mut records = Vec::new();
    for (i, comp) in sorted.iter().enumerate() {
        match &comp.kind {
            ComponentKind::MacroLet { name, value } => records.push(MacroRecord {
                sequence: i,
                start_line: comp.span.start,
                end_line: comp.span.end,
                procedure_type: "LET".to_string(),
                inputs: String::new(),
                outputs: name.clone(),
                values: value.clone(),
            }),
            ComponentKind::MacroSymput { name, value } => records.push(MacroRecord {
                sequence: i,
                start_line: comp.span.start,
                end_line: comp.span.end,
                procedure_type: "SYMPUT".to_string(),
                inputs: String::new(),
                outputs: name.clone(),
                values: value.clone(),
            }),
            ComponentKind::MacroVarRef { refs } => {
                for r in refs {
                    records.push(MacroRecord {
                        sequence: i,
                        start_line: comp.span.start,
                        end_line: comp.span.end,
                        procedure_type: "MACRO VARIABLES".to_string(),
                        inputs: r.name.clone(),
                        outputs: String::new(),
                        values: r.line.clone(),
                    });
                }
            }
            _ => {}
        }
    }
    records
}
