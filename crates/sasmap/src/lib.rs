//! Extract table-level data lineage from legacy SAS programs and logs.
//!
//! This crate provides both a CLI tool and a library for reverse-engineering
//! the data flow of SAS analytics jobs from two independent artifacts: the
//! program text (`.sas`) and the execution log (`.log`). Neither artifact is
//! executed or fully parsed; a regex-driven extraction engine recognizes the
//! constructs that move data and reports whatever it could not recognize as
//! a residual.
//!
//! # Data Pipeline
//!
//! ```text
//! .sas script                                .log execution log
//!     → ordered stripping pipeline               → prefix segmentation
//!         (comments, %let/symput, DATA steps,        (NOTE / WARNING / MACROGEN /
//!          PROC SQL/SORT/IMPORT/EXPORT,               echoed script lines)
//!          macro calls, macro-variable refs)      → NOTE classification
//!     → typed components                         → procedure grouping
//!         → lineage multigraph + tabular records + summary
//!             → mapping CSV / macros CSV / residuals / summary / DOT graph
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use sasmap::{extract_script, LineageGraph, SasMapPath, SasMapWriter, Mode};
//!
//! # fn main() -> Result<(), sasmap::SasMapError> {
//! let smp = SasMapPath::new(
//!     "jobs/monthly.sas".into(),
//!     "output".into(),
//!     Mode::Script,
//!     false,
//! )?;
//!
//! let wtr = SasMapWriter::new(false);
//! for file in smp.input_files()? {
//!     let text = String::from_utf8_lossy(&std::fs::read(&file)?).into_owned();
//!     let extract = extract_script(&text);
//!     let graph = LineageGraph::from_components(&extract.components);
//!     let stem = sasmap::sanitize_stem(&file);
//!     wtr.write_script_outputs(&smp, &stem, &extract, &graph)?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Key Types
//!
//! - [`SasMapPath`] — Validated input/output paths and run mode
//! - [`ScriptExtract`] — Components, residual buffer, and coverage of one script
//! - [`LogExtract`] — Segmented components and grouped procedures of one log
//! - [`LineageGraph`] — The `table --(step)--> table` multigraph
//! - [`SasMapWriter`] — Writes the per-file CSV/text/DOT outputs
//!
//! # Concurrency
//!
//! Extraction is single-threaded per file with no shared mutable state, so a
//! driver may process many files in parallel by giving each its own buffer
//! and graph; the CLI does exactly that with a Rayon pool feeding a bounded
//! channel.

#![warn(missing_docs)]

use indicatif::{ProgressBar, ProgressStyle};

pub use common::sanitize_stem;
pub use err::SasMapError;
pub use sm_buffer::LineBuffer;
pub use sm_component::{Component, ComponentKind, MacroRef, Span};
pub use sm_graph::LineageGraph;
pub use sm_log::{
    classify_note, extract_log, LogComponent, LogComponentKind, LogExtract, NoteFields,
    NoteKind, Procedure,
};
pub use sm_name::DataName;
pub use sm_path::{Mode, SasMapPath};
pub use sm_records::{
    log_mapping_records, macro_records, script_mapping_records, MacroRecord, MappingRecord,
};
pub use sm_report::{ExtractionReport, KindCount, LogReport};
pub use sm_script::{extract_script, ScriptExtract};
pub use sm_write::SasMapWriter;

mod common;
mod err;
pub mod patterns;
mod sm_buffer;
mod sm_component;
mod sm_graph;
mod sm_log;
mod sm_name;
mod sm_path;
mod sm_records;
mod sm_report;
mod sm_script;
mod sm_write;

/// Create a progress bar over `total` input files, unless disabled.
pub fn create_progress_bar(
    no_progress: bool,
    total: u64,
) -> Result<Option<ProgressBar>, SasMapError> {
    if no_progress {
        return Ok(None);
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} files {msg}")?
            .progress_chars("##-"),
    );
    Ok(Some(pb))
}
