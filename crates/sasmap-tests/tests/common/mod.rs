use assert_cmd::Command;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Cache the built binary path to avoid rebuilding for each test.
static SASMAP_BIN: OnceLock<PathBuf> = OnceLock::new();

/// Helper function to get the sasmap binary command.
/// Uses escargot to build and locate the binary in the workspace (once).
pub fn sasmap_cmd() -> Command {
    let bin_path = SASMAP_BIN.get_or_init(|| {
        let bin = escargot::CargoBuild::new()
            .bin("sasmap")
            .current_release()
            .current_target()
            .manifest_path("../sasmap-cli/Cargo.toml")
            .run()
            .expect("Failed to build sasmap binary");

        bin.path().to_path_buf()
    });

    Command::new(bin_path)
}

/// A small but representative program: comments, macro assignments and
/// references, a data step, a dangling PROC SQL closed by the next proc,
/// a sort, and an export.
pub const SCRIPT_FIXTURE: &str = "\
/* monthly refresh job
   maintained by reporting */
%let month = 201906;
data work.clean;
set raw.billing;
run;
proc sql;
create table work.summary as select * from work.clean;
proc sort data=work.summary out=rpt.summary_&month;
by account;
run;
proc export data=rpt.summary_&month outfile='/srv/out/summary.csv' dbms=csv;
run;
* end of job;
";

/// A condensed job log: libref assignment, an echoed script, a data step,
/// and a sort procedure.
pub const LOG_FIXTURE: &str = "\
NOTE: Libref RAW was successfully assigned as follows:\n\
      Engine:        V9\n\
      Physical Name: /srv/raw\n\
1    data work.clean;\n\
2    set raw.billing;\n\
3    run;\n\
NOTE: 120 observations read from the data set RAW.BILLING.\n\
NOTE: The data set WORK.CLEAN has 120 observations and 9 variables.\n\
NOTE: DATA statement used (Total process time):\n\
      real time           0.04 seconds\n\
4    proc sort data=work.clean out=work.sorted; by account; run;\n\
NOTE: 120 observations read from the data set WORK.CLEAN.\n\
NOTE: The data set WORK.SORTED has 120 observations and 9 variables.\n\
NOTE: PROCEDURE SORT used (Total process time):\n\
      real time           0.01 seconds\n";
