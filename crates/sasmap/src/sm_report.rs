//! Extraction summaries: counts by kind and coverage ratios.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::sm_component::ComponentKind;
use crate::sm_log::LogExtract;
use crate::sm_script::ScriptExtract;

/// One `kind: count` entry of a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindCount {
    /// Component kind name.
    pub kind: String,
    /// Number of components of that kind.
    pub count: usize,
}

/// Summary of a script extraction pass.
#[derive(Debug, Serialize)]
pub struct ExtractionReport {
    /// Number of lines in the script.
    pub script_lines: usize,
    /// Fraction of originally non-blank lines blanked by the pipeline.
    pub proportion_extracted: f64,
    /// Fraction of lines covered by comment components.
    pub proportion_comments: f64,
    /// Blocks that opened but were discarded unfinished.
    pub discarded_blocks: usize,
    /// Component counts, largest first.
    pub counts: Vec<KindCount>,
}

fn sorted_counts(map: BTreeMap<String, usize>) -> Vec<KindCount> {
    let mut counts: Vec<KindCount> = map
        .into_iter()
        .map(|(kind, count)| KindCount { kind, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.kind.cmp(&b.kind)));
    counts
}

impl ExtractionReport {
    /// Tallies an extraction pass.
    pub fn from_script(extract: &ScriptExtract) -> Self {
        let mut map: BTreeMap<String, usize> = BTreeMap::new();
        for key in [
            "comment_block",
            "comment_inline",
            "data_step",
            "proc_sql",
            "proc_sort",
            "proc_import",
            "proc_export",
            "let",
            "symput",
            "macro_variables",
        ] {
            map.insert(key.to_string(), 0);
        }
        for comp in &extract.components {
            let key = match &comp.kind {
                ComponentKind::CommentBlock => "comment_block".to_string(),
                ComponentKind::CommentInline => "comment_inline".to_string(),
                ComponentKind::DataStep { .. } => "data_step".to_string(),
                ComponentKind::ProcSql { .. } => "proc_sql".to_string(),
                ComponentKind::ProcSort { .. } => "proc_sort".to_string(),
                ComponentKind::ProcImport { .. } => "proc_import".to_string(),
                ComponentKind::ProcExport { .. } => "proc_export".to_string(),
                ComponentKind::MacroLet { .. } => "let".to_string(),
                ComponentKind::MacroSymput { .. } => "symput".to_string(),
                ComponentKind::MacroVarRef { .. } => "macro_variables".to_string(),
                ComponentKind::MacroCallUserDef { name } => name.clone(),
            };
            *map.entry(key).or_insert(0) += 1;
        }

        let script_lines = extract.buffer.len();
        let proportion_comments = if script_lines == 0 {
            0.0
        } else {
            extract.comment_line_count() as f64 / script_lines as f64
        };

        Self {
            script_lines,
            proportion_extracted: extract.buffer.extraction_ratio(),
            proportion_comments,
            discarded_blocks: extract.discarded_blocks,
            counts: sorted_counts(map),
        }
    }

    /// Renders the human-readable summary text.
    pub fn render_text(&self, stem: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Number of lines of code in the script:");
        let _ = writeln!(out, "\t {}", self.script_lines);
        let _ = writeln!(out, "Proportion of the script correctly extracted:");
        let _ = writeln!(out, "\t {:.3}", self.proportion_extracted);
        let _ = writeln!(out, "Code Diagnostic:");
        let _ = writeln!(out, "\tProportion of the comments:");
        let _ = writeln!(out, "\t\t {:.3}", self.proportion_comments);
        if self.discarded_blocks > 0 {
            let _ = writeln!(
                out,
                "Warning: {} unterminated or unrecognized blocks were discarded.",
                self.discarded_blocks
            );
        }
        let _ = writeln!(out, "The extraction can be resumed as follow:");
        for kc in &self.counts {
            let _ = writeln!(out, "\t{}: {}", kc.kind, kc.count);
        }
        let _ = writeln!(
            out,
            "See the following file for more details on the ignored content:"
        );
        let _ = writeln!(out, " residuals_{stem}.txt");
        out
    }
}

/// Summary of a log extraction pass.
#[derive(Debug, Serialize)]
pub struct LogReport {
    /// Number of lines in the log.
    pub log_lines: usize,
    /// Grouped procedure invocations.
    pub procedures: usize,
    /// Trailing notes dropped for want of a terminator.
    pub dropped_notes: usize,
    /// Component counts, largest first.
    pub counts: Vec<KindCount>,
}

impl LogReport {
    /// Tallies a log pass.
    pub fn from_log(extract: &LogExtract) -> Self {
        let mut map: BTreeMap<String, usize> = BTreeMap::new();
        for key in ["note", "warning", "macrogen", "script_line", "misc"] {
            map.insert(key.to_string(), 0);
        }
        for comp in &extract.components {
            *map.entry(comp.kind.name().to_string()).or_insert(0) += 1;
        }
        Self {
            log_lines: extract.log_len,
            procedures: extract.procedures.len(),
            dropped_notes: extract.dropped_notes,
            counts: sorted_counts(map),
        }
    }

    /// Renders the human-readable summary text.
    pub fn render_text(&self, stem: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Number of lines in the log:");
        let _ = writeln!(out, "\t {}", self.log_lines);
        let _ = writeln!(out, "Procedure invocations detected:");
        let _ = writeln!(out, "\t {}", self.procedures);
        if self.dropped_notes > 0 {
            let _ = writeln!(
                out,
                "Warning: {} trailing notes had no end-of-procedure marker and were dropped.",
                self.dropped_notes
            );
        }
        let _ = writeln!(out, "The extraction can be resumed as follow:");
        for kc in &self.counts {
            let _ = writeln!(out, "\t{}: {}", kc.kind, kc.count);
        }
        let _ = writeln!(out, "See mapping_{stem}.csv for the detected procedures.");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sm_log::extract_log;
    use crate::sm_script::extract_script;

    #[test]
    fn fully_recognized_script_reports_ratio_one() {
        let report = ExtractionReport::from_script(&extract_script("data a; set b; run;"));
        assert!((report.proportion_extracted - 1.0).abs() < f64::EPSILON);
        assert_eq!(report.script_lines, 1);
    }

    #[test]
    fn counts_are_sorted_descending() {
        let text = "/* one */\n/* two */\ndata a; set b; run;\n";
        let report = ExtractionReport::from_script(&extract_script(text));
        assert_eq!(report.counts[0].kind, "comment_block");
        assert_eq!(report.counts[0].count, 2);
        let ds = report
            .counts
            .iter()
            .find(|kc| kc.kind == "data_step")
            .unwrap();
        assert_eq!(ds.count, 1);
    }

    #[test]
    fn comment_proportion_counts_comment_lines() {
        let text = "/* a\nb */\ndata a; set b; run;\nx = 1;\n";
        let report = ExtractionReport::from_script(&extract_script(text));
        assert!((report.proportion_comments - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn render_mentions_residual_file() {
        let report = ExtractionReport::from_script(&extract_script("data a; set b; run;"));
        let text = report.render_text("job1");
        assert!(text.contains("residuals_job1.txt"));
        assert!(text.contains("data_step: 1"));
    }

    #[test]
    fn log_report_counts_components() {
        let text = "NOTE: The data set WORK.A has 1 observations and 1 variables.\n\
                    NOTE: DATA statement used (Total process time):\n\
                    WARNING: something odd.\n";
        let report = LogReport::from_log(&extract_log(text));
        assert_eq!(report.procedures, 1);
        let notes = report.counts.iter().find(|kc| kc.kind == "note").unwrap();
        assert_eq!(notes.count, 2);
        let warnings = report.counts.iter().find(|kc| kc.kind == "warning").unwrap();
        assert_eq!(warnings.count, 1);
    }
}
