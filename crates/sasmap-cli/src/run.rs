//! Command dispatch: walk the input, extract each file, write its outputs.
//!
//! Files are parsed on a reader thread (optionally over a Rayon pool) and
//! handed to the writer over a bounded channel, so a large directory cannot
//! pile unbounded parse results into memory while the writer catches up.

use colored::Colorize;
use crossbeam::channel::bounded;
use log::{debug, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::thread;

use sasmap::{
    create_progress_bar, extract_log, extract_script, sanitize_stem, LineageGraph, LogExtract,
    Mode, SasMapError, SasMapPath, SasMapWriter, ScriptExtract,
};

use crate::cli::{SasMapCli, SasMapCommands};

/// Capacity of the bounded channel between the reader and writer.
/// Unbounded channels can balloon memory when parsing outpaces writing.
const CHANNEL_CAPACITY: usize = 10;

enum ParsedFile {
    Script {
        path: PathBuf,
        stem: String,
        extract: Box<ScriptExtract>,
        graph: LineageGraph,
    },
    Log {
        path: PathBuf,
        stem: String,
        extract: Box<LogExtract>,
        graph: LineageGraph,
    },
    Failed {
        path: PathBuf,
        error: String,
    },
}

fn parse_file(path: &Path, mode: Mode) -> ParsedFile {
    let stem = sanitize_stem(path);
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            return ParsedFile::Failed {
                path: path.to_path_buf(),
                error: e.to_string(),
            }
        }
    };
    // Lossy conversion: lineage identifiers are ASCII in practice, and a
    // stray replacement character must not fail the whole run.
    let text = String::from_utf8_lossy(&bytes).into_owned();

    match mode {
        Mode::Script => {
            let extract = extract_script(&text);
            let graph = LineageGraph::from_components(&extract.components);
            ParsedFile::Script {
                path: path.to_path_buf(),
                stem,
                extract: Box::new(extract),
                graph,
            }
        }
        Mode::Log => {
            let extract = extract_log(&text);
            let graph = LineageGraph::from_procedures(&extract.procedures);
            ParsedFile::Log {
                path: path.to_path_buf(),
                stem,
                extract: Box::new(extract),
                graph,
            }
        }
    }
}

/// Executes the CLI command specified by the parsed [`SasMapCli`] arguments.
pub fn run(cli: SasMapCli) -> Result<(), SasMapError> {
    env_logger::init();

    let (input, output_dir, overwrite, parallel, no_progress, as_json, mode) =
        match cli.command {
            SasMapCommands::Script {
                input,
                output_dir,
                overwrite,
                parallel,
                no_progress,
                as_json,
            } => (
                input,
                output_dir,
                overwrite,
                parallel,
                no_progress,
                as_json,
                Mode::Script,
            ),
            SasMapCommands::Log {
                input,
                output_dir,
                overwrite,
                parallel,
                no_progress,
                as_json,
            } => (
                input,
                output_dir,
                overwrite,
                parallel,
                no_progress,
                as_json,
                Mode::Log,
            ),
        };

    let smp = SasMapPath::new(input, output_dir, mode, overwrite)?;
    let files = smp.input_files()?;
    if files.is_empty() {
        println!(
            "{}: no *.{} files found under {}",
            "Warning".bright_yellow(),
            mode.extension(),
            smp.path.to_string_lossy().bright_cyan()
        );
        return Ok(());
    }

    debug!(
        "Processing {} {} file(s) from {}",
        files.len(),
        mode,
        smp.path.to_string_lossy()
    );
    println!(
        "Writing lineage for {} {} file(s) to {}",
        files.len(),
        mode,
        smp.out_dir.to_string_lossy().bright_yellow()
    );

    let pb = create_progress_bar(no_progress, files.len() as u64)?;

    let (s, r) = bounded(CHANNEL_CAPACITY);

    // Parse on a dedicated thread; a local pool keeps the global Rayon pool
    // untouched and makes --parallel a per-run decision.
    let reader_handle = thread::spawn(move || -> Result<(), SasMapError> {
        let num_threads = if parallel { 0 } else { 1 }; // 0 = rayon default (num CPUs)
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| SasMapError::Other(format!("Failed to build thread pool: {e}")))?;

        // Collecting into a Vec preserves file order even with parallel parsing.
        let results: Vec<ParsedFile> =
            pool.install(|| files.par_iter().map(|f| parse_file(f, mode)).collect());

        for parsed in results {
            if s.send(parsed).is_err() {
                return Err(SasMapError::Other(
                    "Error when attempting to send parsed data for writing".to_string(),
                ));
            }
        }
        Ok(())
    });

    let wtr = SasMapWriter::new(as_json);
    let mut failures: usize = 0;
    for parsed in r.iter() {
        let (path, outcome) = match parsed {
            ParsedFile::Script {
                path,
                stem,
                extract,
                graph,
            } => {
                let res = wtr.write_script_outputs(&smp, &stem, &extract, &graph);
                (path, res)
            }
            ParsedFile::Log {
                path,
                stem,
                extract,
                graph,
            } => {
                let res = wtr.write_log_outputs(&smp, &stem, &extract, &graph);
                (path, res)
            }
            ParsedFile::Failed { path, error } => (
                path,
                Err(SasMapError::Other(format!("could not be read: {error}"))),
            ),
        };

        match outcome {
            Ok(written) => {
                debug!(
                    "{} -> {} output file(s)",
                    path.to_string_lossy(),
                    written.len()
                );
            }
            Err(e) => {
                failures += 1;
                warn!("{}: {e}", path.to_string_lossy());
                println!(
                    "{}: skipped {}: {e}",
                    "Warning".bright_yellow(),
                    path.to_string_lossy()
                );
            }
        }
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    // Join the reader thread to surface any panics or errors.
    match reader_handle.join() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(e),
        Err(_) => {
            return Err(SasMapError::Other("Reader thread panicked".to_string()));
        }
    }

    if failures > 0 {
        println!(
            "{}: {failures} file(s) were skipped",
            "Warning".bright_yellow()
        );
    }

    Ok(())
}
