use assert_fs::prelude::*;
use predicates::prelude::*;
use sasmap::{extract_log, extract_script, LineageGraph, Mode, SasMapPath, SasMapWriter};

use crate::common::LOG_FIXTURE;

fn script_setup(
    tmp: &assert_fs::TempDir,
    text: &str,
    overwrite: bool,
) -> (SasMapPath, sasmap::ScriptExtract, LineageGraph) {
    let input = tmp.child("job.sas");
    input.write_str(text).unwrap();
    let out_dir = tmp.path().join("out");
    let smp = SasMapPath::new(
        input.path().to_path_buf(),
        out_dir,
        Mode::Script,
        overwrite,
    )
    .unwrap();
    let extract = extract_script(text);
    let graph = LineageGraph::from_components(&extract.components);
    (smp, extract, graph)
}

#[test]
fn script_outputs_are_all_written() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let (smp, extract, graph) = script_setup(&tmp, "data out1; set in1; run;", false);

    let written = SasMapWriter::new(false)
        .write_script_outputs(&smp, "job", &extract, &graph)
        .unwrap();
    assert_eq!(written.len(), 5);

    for name in [
        "mapping_job.csv",
        "macros_job.csv",
        "residuals_job.txt",
        "summary_job.txt",
        "flow_job.dot",
    ] {
        tmp.child("out").child(name).assert(predicate::path::exists());
    }

    let mapping = std::fs::read_to_string(smp.out_dir.join("mapping_job.csv")).unwrap();
    let mut lines = mapping.lines();
    assert_eq!(
        lines.next().unwrap(),
        "Sequence,Start Line Number,End Line Number,Procedure Type,Inputs,Outputs"
    );
    assert_eq!(lines.next().unwrap(), "0,0,1,DATASTEP,work.in1,work.out1");

    // No macro components: header-only CSV.
    let macros = std::fs::read_to_string(smp.out_dir.join("macros_job.csv")).unwrap();
    assert_eq!(macros.lines().count(), 1);

    // The whole script was recognized, so the residual is a blank line.
    let residuals = std::fs::read_to_string(smp.out_dir.join("residuals_job.txt")).unwrap();
    assert_eq!(residuals, "\n");

    let summary = std::fs::read_to_string(smp.out_dir.join("summary_job.txt")).unwrap();
    assert!(summary.contains("Proportion of the script correctly extracted:"));
    assert!(summary.contains("1.000"));

    let dot = std::fs::read_to_string(smp.out_dir.join("flow_job.dot")).unwrap();
    assert!(dot.contains("rankdir=LR"));
    assert!(dot.contains("work.in1"));
}

#[test]
fn existing_outputs_require_overwrite() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let (smp, extract, graph) = script_setup(&tmp, "data a; set b; run;", false);
    let wtr = SasMapWriter::new(false);

    wtr.write_script_outputs(&smp, "job", &extract, &graph)
        .unwrap();
    let err = wtr
        .write_script_outputs(&smp, "job", &extract, &graph)
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));

    // Same run configuration with --overwrite succeeds.
    let smp = SasMapPath::new(
        smp.path.clone(),
        smp.out_dir.clone(),
        Mode::Script,
        true,
    )
    .unwrap();
    wtr.write_script_outputs(&smp, "job", &extract, &graph)
        .unwrap();
}

#[test]
fn log_outputs_are_written_with_json_summary() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let input = tmp.child("nightly.log");
    input.write_str(LOG_FIXTURE).unwrap();
    let smp = SasMapPath::new(
        input.path().to_path_buf(),
        tmp.path().join("out"),
        Mode::Log,
        false,
    )
    .unwrap();

    let extract = extract_log(LOG_FIXTURE);
    let graph = LineageGraph::from_procedures(&extract.procedures);
    let written = SasMapWriter::new(true)
        .write_log_outputs(&smp, "nightly", &extract, &graph)
        .unwrap();
    assert_eq!(written.len(), 3);

    tmp.child("out")
        .child("summary_nightly.json")
        .assert(predicate::path::exists());
    let summary = std::fs::read_to_string(smp.out_dir.join("summary_nightly.json")).unwrap();
    assert!(summary.contains("\"log_lines\""));
    assert!(summary.contains("\"procedures\": 3"));

    let mapping = std::fs::read_to_string(smp.out_dir.join("mapping_nightly.csv")).unwrap();
    assert!(mapping.contains("DATASTEP,RAW.BILLING,WORK.CLEAN"));
    assert!(mapping.contains("PROC SORT,WORK.CLEAN,WORK.SORTED"));
}

#[test]
fn output_directory_is_created_when_missing() {
    let tmp = assert_fs::TempDir::new().unwrap();
    let nested = tmp.path().join("a").join("b").join("out");
    let input = tmp.child("x.sas");
    input.write_str("data a; set b; run;").unwrap();
    let smp = SasMapPath::new(input.path().to_path_buf(), nested.clone(), Mode::Script, false)
        .unwrap();
    assert!(nested.is_dir());
    assert_eq!(smp.input_files().unwrap(), vec![input.path().to_path_buf()]);
}

#[test]
fn directory_scan_finds_only_mode_extension() {
    let tmp = assert_fs::TempDir::new().unwrap();
    tmp.child("a.sas").write_str("data a; run;").unwrap();
    tmp.child("sub/b.SAS").write_str("data b; run;").unwrap();
    tmp.child("sub/c.log").write_str("NOTE: x\n").unwrap();
    let smp = SasMapPath::new(
        tmp.path().to_path_buf(),
        tmp.path().join("out"),
        Mode::Script,
        false,
    )
    .unwrap();
    let files = smp.input_files().unwrap();
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| {
        f.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("sas"))
    }));
}
