use sasmap::{extract_log, log_mapping_records, LineageGraph};

use crate::common::LOG_FIXTURE;

#[test]
fn input_output_pairing_in_one_data_step() {
    let text = "NOTE: 10 observations read from the data set WORK.IN1.\n\
                NOTE: The data set WORK.OUT1 has 10 observations and 3 variables.\n\
                NOTE: DATA statement used (Total process time):\n";
    let extract = extract_log(text);
    assert_eq!(extract.procedures.len(), 1);
    let proc = &extract.procedures[0];
    assert_eq!(proc.kind, "DATASTEP");
    assert_eq!(proc.inputs, vec!["WORK.IN1"]);
    assert_eq!(proc.outputs, vec!["WORK.OUT1"]);
}

#[test]
fn libref_assignment_is_grouped_but_ignorable() {
    let text = "NOTE: Libref FOO was successfully assigned as follows:\n";
    let extract = extract_log(text);

    // The assignment forms a procedure of its own ...
    assert_eq!(extract.procedures.len(), 1);
    assert_eq!(extract.procedures[0].kind, "LIBREFASSIGN");

    // ... but contributes neither graph edges nor mapping rows.
    let graph = LineageGraph::from_procedures(&extract.procedures);
    assert_eq!(graph.edge_count(), 0);
    assert!(log_mapping_records(&extract.procedures).is_empty());
}

#[test]
fn fixture_log_yields_three_procedures() {
    let extract = extract_log(LOG_FIXTURE);
    let kinds: Vec<&str> = extract
        .procedures
        .iter()
        .map(|p| p.kind.as_str())
        .collect();
    assert_eq!(kinds, vec!["LIBREFASSIGN", "DATASTEP", "PROC SORT"]);
    assert_eq!(extract.dropped_notes, 0);
}

#[test]
fn fixture_log_mapping_keeps_gapped_sequences() {
    let extract = extract_log(LOG_FIXTURE);
    let records = log_mapping_records(&extract.procedures);
    assert_eq!(records.len(), 2);
    // Sequence 0 belongs to the skipped libref assignment.
    assert_eq!(records[0].sequence, 1);
    assert_eq!(records[0].procedure_type, "DATASTEP");
    assert_eq!(records[0].inputs, "RAW.BILLING");
    assert_eq!(records[0].outputs, "WORK.CLEAN");
    assert_eq!(records[1].sequence, 2);
    assert_eq!(records[1].procedure_type, "PROC SORT");
    assert_eq!(records[1].inputs, "WORK.CLEAN");
    assert_eq!(records[1].outputs, "WORK.SORTED");
}

#[test]
fn fixture_log_graph_chains_tables() {
    let extract = extract_log(LOG_FIXTURE);
    let graph = LineageGraph::from_procedures(&extract.procedures);
    let edges = graph.edges();
    assert_eq!(edges.len(), 2);
    assert!(edges.contains(&(
        "RAW.BILLING".to_string(),
        "WORK.CLEAN".to_string(),
        "DATASTEP".to_string()
    )));
    assert!(edges.contains(&(
        "WORK.CLEAN".to_string(),
        "WORK.SORTED".to_string(),
        "PROC SORT".to_string()
    )));
}

#[test]
fn echoed_script_lines_never_become_procedures() {
    let text = "1    proc sort data=work.a; run;\n\
                2    data b; set a; run;\n";
    let extract = extract_log(text);
    assert!(extract.procedures.is_empty());
}
