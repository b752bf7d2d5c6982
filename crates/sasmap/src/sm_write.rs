//! Writers for the per-file outputs: mapping and macro CSVs, the residual
//! text, the summary, and the DOT serialization of the lineage graph.

use colored::Colorize;
use csv::WriterBuilder;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::err::SasMapError;
use crate::sm_graph::LineageGraph;
use crate::sm_log::LogExtract;
use crate::sm_path::SasMapPath;
use crate::sm_records::{
    log_mapping_records, macro_records, script_mapping_records, MacroRecord, MappingRecord,
    MACRO_HEADERS, MAPPING_HEADERS,
};
use crate::sm_report::{ExtractionReport, LogReport};
use crate::sm_script::ScriptExtract;

/// Writes the output files for processed scripts and logs.
#[derive(Debug, Default)]
pub struct SasMapWriter {
    /// Emit the summary as JSON instead of text.
    pub as_json: bool,
}

impl SasMapWriter {
    /// Creates a writer.
    pub fn new(as_json: bool) -> Self {
        Self { as_json }
    }

    fn create(&self, smp: &SasMapPath, path: &Path) -> Result<BufWriter<File>, SasMapError> {
        if path.exists() && !smp.overwrite {
            return Err(SasMapError::Other(format!(
                "The output file - {} - already exists!  To overwrite the file, utilize the {} parameter",
                path.to_string_lossy().bright_yellow(),
                "--overwrite".bright_cyan()
            )));
        }
        Ok(BufWriter::new(File::create(path)?))
    }

    fn write_mapping_csv(
        &self,
        smp: &SasMapPath,
        path: &Path,
        records: &[MappingRecord],
    ) -> Result<(), SasMapError> {
        let mut wtr = WriterBuilder::new()
            .has_headers(false)
            .from_writer(self.create(smp, path)?);
        wtr.write_record(MAPPING_HEADERS)?;
        for record in records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_macro_csv(
        &self,
        smp: &SasMapPath,
        path: &Path,
        records: &[MacroRecord],
    ) -> Result<(), SasMapError> {
        let mut wtr = WriterBuilder::new()
            .has_headers(false)
            .from_writer(self.create(smp, path)?);
        wtr.write_record(MACRO_HEADERS)?;
        for record in records {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_text(
        &self,
        smp: &SasMapPath,
        path: &Path,
        text: &str,
    ) -> Result<(), SasMapError> {
        let mut wtr = self.create(smp, path)?;
        wtr.write_all(text.as_bytes())?;
        wtr.flush()?;
        Ok(())
    }

    /// Writes every script-mode output for one file and returns the paths
    /// written: mapping CSV, macros CSV, residuals, summary, and DOT graph.
    pub fn write_script_outputs(
        &self,
        smp: &SasMapPath,
        stem: &str,
        extract: &ScriptExtract,
        graph: &LineageGraph,
    ) -> Result<Vec<PathBuf>, SasMapError> {
        let mut written = Vec::new();

        let mapping = smp.output_file("mapping", stem, "csv");
        self.write_mapping_csv(smp, &mapping, &script_mapping_records(&extract.components))?;
        written.push(mapping);

        let macros = smp.output_file("macros", stem, "csv");
        self.write_macro_csv(smp, &macros, &macro_records(&extract.components))?;
        written.push(macros);

        let residuals = smp.output_file("residuals", stem, "txt");
        self.write_text(smp, &residuals, &extract.buffer.to_text())?;
        written.push(residuals);

        let report = ExtractionReport::from_script(extract);
        let summary = if self.as_json {
            let path = smp.output_file("summary", stem, "json");
            self.write_text(smp, &path, &serde_json::to_string_pretty(&report)?)?;
            path
        } else {
            let path = smp.output_file("summary", stem, "txt");
            self.write_text(smp, &path, &report.render_text(stem))?;
            path
        };
        written.push(summary);

        let dot = smp.output_file("flow", stem, "dot");
        self.write_text(smp, &dot, &graph.to_dot())?;
        written.push(dot);

        Ok(written)
    }

    /// Writes every log-mode output for one file and returns the paths
    /// written: mapping CSV, summary, and DOT graph.
    pub fn write_log_outputs(
        &self,
        smp: &SasMapPath,
        stem: &str,
        extract: &LogExtract,
        graph: &LineageGraph,
    ) -> Result<Vec<PathBuf>, SasMapError> {
        let mut written = Vec::new();

        let mapping = smp.output_file("mapping", stem, "csv");
        self.write_mapping_csv(smp, &mapping, &log_mapping_records(&extract.procedures))?;
        written.push(mapping);

        let report = LogReport::from_log(extract);
        let summary = if self.as_json {
            let path = smp.output_file("summary", stem, "json");
            self.write_text(smp, &path, &serde_json::to_string_pretty(&report)?)?;
            path
        } else {
            let path = smp.output_file("summary", stem, "txt");
            self.write_text(smp, &path, &report.render_text(stem))?;
            path
        };
        written.push(summary);

        let dot = smp.output_file("flow", stem, "dot");
        self.write_text(smp, &dot, &graph.to_dot())?;
        written.push(dot);

        Ok(written)
    }
}
