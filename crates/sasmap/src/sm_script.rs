//! Script-side extraction: the ordered stripping pipeline.
//!
//! The extractor runs a fixed sequence of pattern-specific sub-extractors
//! over a [`LineBuffer`]. Each sub-extractor finds every occurrence of its
//! construct, builds typed [`Component`]s, and blanks the consumed spans so
//! later phases cannot re-match them. Order matters: comments are stripped
//! first so keywords inside them cannot open false blocks, and inline
//! comments run last because their pattern is the most permissive.
//!
//! Multi-line constructs are recognized with a small per-kind state machine:
//! a `beg` regex opens a block, an `end` regex closes it, and the joined
//! block text is then re-matched against the `total` regex to capture the
//! semantic groups. A construct wholly contained in one line is matched by
//! the `total` regex directly.

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::{Captures, Regex};

use crate::patterns::{DATASET_OPTS, DATA_NAME, FILE_PATH, MACRO_VAR, NAME_PART};
use crate::patterns::{RE_DATA_NAME, RE_MACRO_VAR, RE_PROC_LINE};
use crate::sm_buffer::LineBuffer;
use crate::sm_component::{Component, ComponentKind, MacroRef, Span};
use crate::sm_name::{DataName, DEFAULT_LIBREF};

lazy_static! {
    // Block comments: /* ... */
    static ref RE_COMMENT_BLOCK_TOTAL: Regex =
        Regex::new(r"(?s)^.*(/\*.*?\*/).*$").unwrap();
    static ref RE_COMMENT_BLOCK_BEG: Regex = Regex::new(r"^.*/\*.*$").unwrap();
    static ref RE_COMMENT_BLOCK_END: Regex = Regex::new(r"^.*\*/.*$").unwrap();

    // Macro-variable references, one component per matching line.
    static ref RE_MACRO_VAR_LINE: Regex =
        Regex::new(&format!(r"^(.*{mv}.*)$", mv = MACRO_VAR)).unwrap();

    // %let name = value;
    static ref RE_LET_TOTAL: Regex =
        Regex::new(r"(?si)^\s*(%let\b.*;).*$").unwrap();
    static ref RE_LET_BEG: Regex = Regex::new(r"(?i)^\s*%let\b.*$").unwrap();
    static ref RE_LET_END: Regex = Regex::new(r"^.*;.*$").unwrap();
    static ref RE_LET_ASSIGN: Regex = Regex::new(&format!(
        r"(?si)^\s*%let\s+({np})\s*=\s*(.+)\s*;",
        np = NAME_PART
    ))
    .unwrap();

    // call symput('name', expr);
    static ref RE_SYMPUT_TOTAL: Regex =
        Regex::new(r"(?si)^\s*(call\s+symput\b.*;).*$").unwrap();
    static ref RE_SYMPUT_BEG: Regex =
        Regex::new(r"(?i)^\s*call\s+symput\b.*").unwrap();
    static ref RE_SYMPUT_END: Regex = Regex::new(r"^.*;.*$").unwrap();
    static ref RE_SYMPUT_ASSIGN: Regex = Regex::new(&format!(
        r#"(?si)^\s*call\s+symput\s*\(\s*['"]({np})['"]\s*,\s*(.+)\s*\)\s*;"#,
        np = NAME_PART
    ))
    .unwrap();

    // DATA ... RUN; steps
    static ref RE_DATA_TOTAL: Regex =
        Regex::new(r"(?si)^[ ]*(data\s+.*?;(?:.*?;)*?\s*run;).*$").unwrap();
    static ref RE_DATA_BEG: Regex = Regex::new(r"(?i)^[ ]*data\s+.*$").unwrap();
    static ref RE_DATA_END: Regex = Regex::new(r"(?i)^[ ]*run;.*$").unwrap();
    static ref RE_DATA_STMT: Regex = Regex::new(&format!(
        r"(?si)^\s*(data(?:\s+(?:{np}\.)?{np}(?:\s*{opts})?)+\s*;)",
        np = NAME_PART,
        opts = DATASET_OPTS
    ))
    .unwrap();
    static ref RE_DATA_CLEAN: Regex = Regex::new(&format!(
        r"(?si)(?:^\s*data\s+)|(?:{opts})|;",
        opts = DATASET_OPTS
    ))
    .unwrap();
    static ref RE_SET_STMT: Regex = Regex::new(&format!(
        r"(?si)(\bset(?:\s+(?:{np}\.)?{np}(?:\s*{opts})?)+\s*;)",
        np = NAME_PART,
        opts = DATASET_OPTS
    ))
    .unwrap();
    static ref RE_SET_CLEAN: Regex = Regex::new(&format!(
        r"(?si)(?:^\s*set\s+)|(?:{opts})|;",
        opts = DATASET_OPTS
    ))
    .unwrap();

    // PROC SQL ... QUIT;/RUN; or closed by the next PROC
    static ref RE_SQL_TOTAL: Regex = Regex::new(
        r"(?si)^[ ]*(proc\s+sql(?:\s+.*?)?;(?:.*?;)*?\s*(?:run\s*;|quit\s*;|proc\s*)).*$"
    )
    .unwrap();
    static ref RE_SQL_BEG: Regex =
        Regex::new(r"(?i)^[ ]*proc\s+sql(?:\s+.*?)?;.*$").unwrap();
    static ref RE_SQL_END: Regex =
        Regex::new(r"(?i)^[ ]*(?:run\s*;|quit\s*;|proc\s).*$").unwrap();
    static ref RE_TRAILING_PROC: Regex = Regex::new(r"(?i)\bproc\s*$").unwrap();
    static ref RE_SQL_CREATE: Regex = Regex::new(&format!(
        r"(?si)create\s+(?:table|view)\s+{dn}\s+as\s+",
        dn = DATA_NAME.as_str()
    ))
    .unwrap();
    static ref RE_SQL_INSERT: Regex = Regex::new(&format!(
        r"(?si)insert\s+into\s+{dn}",
        dn = DATA_NAME.as_str()
    ))
    .unwrap();
    static ref RE_SQL_UPDATE: Regex =
        Regex::new(&format!(r"(?si)update\s+{dn}", dn = DATA_NAME.as_str())).unwrap();
    static ref RE_SQL_FROM: Regex =
        Regex::new(&format!(r"(?si)from\s+{dn}", dn = DATA_NAME.as_str())).unwrap();
    static ref RE_SQL_JOIN: Regex = Regex::new(&format!(
        r"(?si)(?:inner|(?:left|right|full)?\s*outer)?\s+join\s+{dn}",
        dn = DATA_NAME.as_str()
    ))
    .unwrap();

    // PROC SORT / PROC IMPORT ... RUN;
    static ref RE_STD_TOTAL: Regex = Regex::new(
        r"(?si)^[ ]*(proc\s+(sort|import)\s+(?:data|datafile)\s*=(?:.+?);(?:.*?;)*?\s*run;).*$"
    )
    .unwrap();
    static ref RE_STD_BEG: Regex =
        Regex::new(r"(?i)^[ ]*proc\s+(?:sort|import)\s+(?:data|datafile)\s*=.+$").unwrap();
    static ref RE_STD_END: Regex = Regex::new(r"(?i)^[ ]*run;.*$").unwrap();
    static ref RE_SORT_IN_OUT: Regex = Regex::new(&format!(
        r"(?si)^\s*proc\s+sort\s+data\s*=\s*{dn}[^;]*?(?:\bout\s*=\s*{dn}[^;]*)?;",
        dn = DATA_NAME.as_str()
    ))
    .unwrap();
    static ref RE_IMPORT_IN_OUT: Regex = Regex::new(&format!(
        r"(?si)^\s*proc\s+import\s+(?:datafile|datatable)\s*=\s*({fp})[^;]*?(?:\bout\s*=\s*{dn}[^;]*)?;",
        fp = FILE_PATH,
        dn = DATA_NAME.as_str()
    ))
    .unwrap();

    // PROC EXPORT ... RUN;
    static ref RE_EXPORT_TOTAL: Regex = Regex::new(
        r"(?si)^[ ]*(proc\s+export\s+data\s*=(?:.+?);(?:.*?;)*?\s*run;).*$"
    )
    .unwrap();
    static ref RE_EXPORT_BEG: Regex =
        Regex::new(r"(?i)^[ ]*proc\s+export\s+data\s*=.+$").unwrap();
    static ref RE_EXPORT_IN_OUT: Regex = Regex::new(&format!(
        r"(?si)^\s*proc\s+export\s+data\s*=\s*{dn}[^;]*?\b(?:outfile|outtable)\s*=\s*({fp})",
        dn = DATA_NAME.as_str(),
        fp = FILE_PATH
    ))
    .unwrap();

    // Recognized user-defined macro calls: %libname(...); %exist_file(...);
    static ref RE_MACRO_CALL_TOTAL: Regex =
        Regex::new(r"(?si)^\s*(%(libname|exist_file)\(.*\);).*$").unwrap();
    static ref RE_MACRO_CALL_BEG: Regex =
        Regex::new(r"(?i)^\s*%libname\(.*$").unwrap();
    static ref RE_MACRO_CALL_END: Regex = Regex::new(r"^.*\);.*$").unwrap();

    // Inline statement comments: * ... ;
    // Lines containing `=` are excluded so `x = y*z;` is not mistaken for a
    // comment. The rule also misses genuine comments on such lines.
    static ref RE_COMMENT_INLINE_TOTAL: Regex =
        Regex::new(r"(?s)^[^=]*(\*+[^;]*;).*$").unwrap();
    static ref RE_COMMENT_INLINE_BEG: Regex = Regex::new(r"^[^=]*\*.*?$").unwrap();
    static ref RE_COMMENT_INLINE_END: Regex = Regex::new(r"^.*;.*$").unwrap();
}

/// Everything the script pass produced for one program.
#[derive(Debug)]
pub struct ScriptExtract {
    /// Every extracted component, in pipeline order.
    pub components: Vec<Component>,
    /// The blanked buffer; whatever is left is the residual.
    pub buffer: LineBuffer,
    /// Blocks that opened but were discarded (unterminated at end of file,
    /// or failing their semantic re-match).
    pub discarded_blocks: usize,
}

impl ScriptExtract {
    /// Components sorted by start line, the order used for tabular output.
    pub fn sorted_components(&self) -> Vec<&Component> {
        let mut sorted: Vec<&Component> = self.components.iter().collect();
        sorted.sort_by_key(|c| c.span.start);
        sorted
    }

    /// Total lines covered by comment components.
    pub fn comment_line_count(&self) -> usize {
        self.components
            .iter()
            .filter(|c| c.is_comment())
            .map(|c| c.span.len())
            .sum()
    }
}

/// Runs the full ordered stripping pipeline over `text`.
pub fn extract_script(text: &str) -> ScriptExtract {
    let mut buffer = LineBuffer::new(text);
    let mut components: Vec<Component> = Vec::new();
    let mut discarded = 0usize;

    let mut run_pass = |buffer: &mut LineBuffer,
                        components: &mut Vec<Component>,
                        total: &Regex,
                        beg: &Regex,
                        end: &Regex,
                        build: &dyn Fn(Span, &Captures<'_>) -> Option<Component>| {
        let (found, d) = find_components(buffer, total, beg, end, build);
        discarded += d;
        for c in &found {
            buffer.blank(c.span, &c.content);
        }
        components.extend(found);
    };

    // 1. Block comments
    run_pass(
        &mut buffer,
        &mut components,
        &RE_COMMENT_BLOCK_TOTAL,
        &RE_COMMENT_BLOCK_BEG,
        &RE_COMMENT_BLOCK_END,
        &build_comment_block,
    );

    // 2. Macro-variable references. Non-consuming: the same tokens must stay
    // visible to the later phases, so nothing is blanked.
    components.extend(find_macro_var_refs(&buffer));

    // 3. %let assignments
    run_pass(
        &mut buffer,
        &mut components,
        &RE_LET_TOTAL,
        &RE_LET_BEG,
        &RE_LET_END,
        &build_macro_let,
    );

    // 4. call symput(...)
    run_pass(
        &mut buffer,
        &mut components,
        &RE_SYMPUT_TOTAL,
        &RE_SYMPUT_BEG,
        &RE_SYMPUT_END,
        &build_macro_symput,
    );

    // 5. DATA steps
    run_pass(
        &mut buffer,
        &mut components,
        &RE_DATA_TOTAL,
        &RE_DATA_BEG,
        &RE_DATA_END,
        &build_data_step,
    );

    // 6. PROC SQL blocks
    run_pass(
        &mut buffer,
        &mut components,
        &RE_SQL_TOTAL,
        &RE_SQL_BEG,
        &RE_SQL_END,
        &build_proc_sql,
    );

    // 7. PROC SORT / PROC IMPORT
    run_pass(
        &mut buffer,
        &mut components,
        &RE_STD_TOTAL,
        &RE_STD_BEG,
        &RE_STD_END,
        &build_proc_standard,
    );

    // 8. PROC EXPORT
    run_pass(
        &mut buffer,
        &mut components,
        &RE_EXPORT_TOTAL,
        &RE_EXPORT_BEG,
        &RE_STD_END,
        &build_proc_export,
    );

    // 9. Recognized user-defined macro calls
    run_pass(
        &mut buffer,
        &mut components,
        &RE_MACRO_CALL_TOTAL,
        &RE_MACRO_CALL_BEG,
        &RE_MACRO_CALL_END,
        &build_macro_call,
    );

    // 10. Inline comments
    run_pass(
        &mut buffer,
        &mut components,
        &RE_COMMENT_INLINE_TOTAL,
        &RE_COMMENT_INLINE_BEG,
        &RE_COMMENT_INLINE_END,
        &build_comment_inline,
    );

    ScriptExtract {
        components,
        buffer,
        discarded_blocks: discarded,
    }
}

/// The per-kind component finder.
///
/// Walks the buffer line by line. From the idle state a `total` match on a
/// single line emits immediately. Otherwise `beg` opens a block and `end`
/// closes it on a later line; a stale `end` left over from before the block
/// opened is cleared. When the terminator line itself opens another PROC,
/// that line is scanned again so the following procedure is recognized from
/// its opening line.
fn find_components(
    buffer: &LineBuffer,
    total: &Regex,
    beg: &Regex,
    end: &Regex,
    build: &dyn Fn(Span, &Captures<'_>) -> Option<Component>,
) -> (Vec<Component>, usize) {
    let mut found = Vec::new();
    let mut discarded = 0usize;
    let mut start: Option<usize> = None;
    let mut end_line: Option<usize> = None;
    let mut i = 0usize;

    while i < buffer.len() {
        let Some(line) = buffer.line(i) else { break };
        let mut rescan = false;

        if start.is_none() && total.is_match(line) {
            if let Some(caps) = total.captures(line) {
                match build(Span { start: i, end: i + 1 }, &caps) {
                    Some(comp) => found.push(comp),
                    None => {
                        debug!("line {i}: matched construct failed semantic parse, skipped");
                        discarded += 1;
                    }
                }
            }
        } else {
            if beg.is_match(line) {
                if start.is_none() {
                    start = Some(i);
                }
                if let (Some(s), Some(e)) = (start, end_line) {
                    if s >= e {
                        end_line = None;
                    }
                }
            }
            if end.is_match(line) && start != Some(i) {
                end_line = Some(i + 1);
                if start.is_some() && RE_PROC_LINE.is_match(line) {
                    rescan = true;
                }
            }
            if let (Some(s), Some(e)) = (start, end_line) {
                let span = Span { start: s, end: e };
                let block = buffer.joined(span);
                match total.captures(&block) {
                    Some(caps) => match build(span, &caps) {
                        Some(comp) => found.push(comp),
                        None => {
                            debug!("lines {s}..{e}: block failed semantic parse, skipped");
                            discarded += 1;
                        }
                    },
                    None => {
                        debug!("lines {s}..{e}: joined block did not re-match, skipped");
                        discarded += 1;
                    }
                }
                start = None;
                end_line = None;
            }
        }

        if !rescan {
            i += 1;
        }
    }

    if let (Some(s), None) = (start, end_line) {
        warn!("unterminated block opening at line {s} discarded at end of file");
        discarded += 1;
    }

    (found, discarded)
}

/// Read-only scan for `&name` references, one component per matching line.
fn find_macro_var_refs(buffer: &LineBuffer) -> Vec<Component> {
    let mut found = Vec::new();
    for (i, line) in buffer.lines().enumerate() {
        if let Some(caps) = RE_MACRO_VAR_LINE.captures(line) {
            let content = caps[1].to_string();
            let line_text = content.trim().to_string();
            let refs: Vec<MacroRef> = RE_MACRO_VAR
                .captures_iter(&content)
                .map(|c| MacroRef {
                    name: c[1].to_string(),
                    line: line_text.clone(),
                })
                .collect();
            found.push(Component {
                span: Span { start: i, end: i + 1 },
                content,
                kind: ComponentKind::MacroVarRef { refs },
            });
        }
    }
    found
}

fn matched_content(caps: &Captures<'_>, group: usize) -> Option<String> {
    caps.get(group).map(|m| m.as_str().trim().to_string())
}

fn build_comment_block(span: Span, caps: &Captures<'_>) -> Option<Component> {
    Some(Component {
        span,
        content: matched_content(caps, 1)?,
        kind: ComponentKind::CommentBlock,
    })
}

fn build_comment_inline(span: Span, caps: &Captures<'_>) -> Option<Component> {
    Some(Component {
        span,
        content: matched_content(caps, 0)?,
        kind: ComponentKind::CommentInline,
    })
}

fn build_macro_let(span: Span, caps: &Captures<'_>) -> Option<Component> {
    let content = matched_content(caps, 1)?;
    let assign = RE_LET_ASSIGN.captures(&content)?;
    let kind = ComponentKind::MacroLet {
        name: assign[1].to_string(),
        value: assign[2].trim().to_string(),
    };
    Some(Component { span, content, kind })
}

fn build_macro_symput(span: Span, caps: &Captures<'_>) -> Option<Component> {
    let content = matched_content(caps, 1)?;
    let assign = RE_SYMPUT_ASSIGN.captures(&content)?;
    let kind = ComponentKind::MacroSymput {
        name: assign[1].to_string(),
        value: assign[2].trim().to_string(),
    };
    Some(Component { span, content, kind })
}

fn build_data_step(span: Span, caps: &Captures<'_>) -> Option<Component> {
    let content = matched_content(caps, 1)?;

    let stmt = RE_DATA_STMT.captures(&content)?;
    let cleaned = RE_DATA_CLEAN.replace_all(&stmt[1], "");
    let data_out: Vec<DataName> = RE_DATA_NAME
        .captures_iter(&cleaned)
        .map(|c| DataName::from_captures(&c, 1))
        .collect();

    // Only the first table of the first SET statement is recorded.
    let data_in: Vec<DataName> = match RE_SET_STMT.captures(&content) {
        Some(set_stmt) => {
            let cleaned = RE_SET_CLEAN.replace_all(&set_stmt[1], "");
            RE_DATA_NAME
                .captures(cleaned.trim())
                .map(|c| DataName::from_captures(&c, 1))
                .into_iter()
                .collect()
        }
        None => Vec::new(),
    };

    Some(Component {
        span,
        content,
        kind: ComponentKind::DataStep { data_in, data_out },
    })
}

fn build_proc_sql(span: Span, caps: &Captures<'_>) -> Option<Component> {
    let raw = caps.get(1)?.as_str();

    // A block closed by the next PROC captured that proc's opening keyword;
    // give the keyword back so the following procedure stays recognizable,
    // and shrink the span off its line.
    let (text, dangling) = match RE_TRAILING_PROC.find(raw) {
        Some(m) => (&raw[..m.start()], true),
        None => (raw, false),
    };
    let content = text.trim().to_string();
    let span = if dangling && span.len() > 1 {
        Span {
            start: span.start,
            end: span.end - 1,
        }
    } else {
        span
    };

    let mut data_out = Vec::new();
    for c in RE_SQL_CREATE.captures_iter(&content) {
        data_out.push(DataName::from_captures(&c, 1));
    }
    for c in RE_SQL_INSERT.captures_iter(&content) {
        data_out.push(DataName::from_captures(&c, 1));
    }
    for c in RE_SQL_UPDATE.captures_iter(&content) {
        data_out.push(DataName::from_captures(&c, 1));
    }

    let mut data_in = Vec::new();
    for c in RE_SQL_FROM.captures_iter(&content) {
        data_in.push(DataName::from_captures(&c, 1));
    }
    for c in RE_SQL_JOIN.captures_iter(&content) {
        data_in.push(DataName::from_captures(&c, 1));
    }

    Some(Component {
        span,
        content,
        kind: ComponentKind::ProcSql { data_in, data_out },
    })
}

fn build_proc_standard(span: Span, caps: &Captures<'_>) -> Option<Component> {
    let content = matched_content(caps, 1)?;
    let name = caps.get(2)?.as_str().to_lowercase();

    let kind = match name.as_str() {
        "sort" => {
            let c = RE_SORT_IN_OUT.captures(&content)?;
            let data_in = DataName::from_captures(&c, 1);
            let data_out = match c.get(4) {
                Some(member) => DataName::qualified(
                    c.get(3).map(|m| m.as_str()),
                    member.as_str(),
                ),
                None => DataName::new(DEFAULT_LIBREF, data_in.member.clone()),
            };
            ComponentKind::ProcSort {
                data_in: vec![data_in],
                data_out: vec![data_out],
            }
        }
        "import" => {
            let c = RE_IMPORT_IN_OUT.captures(&content)?;
            let data_in = DataName::path(c.get(1)?.as_str());
            let data_out = match c.get(3) {
                Some(member) => DataName::qualified(
                    c.get(2).map(|m| m.as_str()),
                    member.as_str(),
                ),
                None => DataName::new(DEFAULT_LIBREF, "none"),
            };
            ComponentKind::ProcImport {
                data_in: vec![data_in],
                data_out: vec![data_out],
            }
        }
        _ => return None,
    };

    Some(Component { span, content, kind })
}

fn build_proc_export(span: Span, caps: &Captures<'_>) -> Option<Component> {
    let content = matched_content(caps, 1)?;
    let c = RE_EXPORT_IN_OUT.captures(&content)?;
    let data_in = DataName::from_captures(&c, 1);
    let data_out = DataName::path(c.get(3)?.as_str());
    Some(Component {
        span,
        content,
        kind: ComponentKind::ProcExport {
            data_in: vec![data_in],
            data_out: vec![data_out],
        },
    })
}

fn build_macro_call(span: Span, caps: &Captures<'_>) -> Option<Component> {
    let content = matched_content(caps, 1)?;
    let name = caps.get(2)?.as_str().to_lowercase();
    Some(Component {
        span,
        content,
        kind: ComponentKind::MacroCallUserDef { name },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_names(names: &[DataName]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn only_kind<'a>(
        extract: &'a ScriptExtract,
        pred: fn(&ComponentKind) -> bool,
    ) -> Vec<&'a Component> {
        extract
            .components
            .iter()
            .filter(|c| pred(&c.kind))
            .collect()
    }

    #[test]
    fn single_line_data_step() {
        let extract = extract_script("data out1; set in1; run;");
        let steps = only_kind(&extract, |k| matches!(k, ComponentKind::DataStep { .. }));
        assert_eq!(steps.len(), 1);
        let ComponentKind::DataStep { data_in, data_out } = &steps[0].kind else {
            unreachable!()
        };
        assert_eq!(step_names(data_in), vec!["work.in1"]);
        assert_eq!(step_names(data_out), vec!["work.out1"]);
        // The whole script was recognized, so the residual is fully blank.
        assert!((extract.buffer.extraction_ratio() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn multi_line_data_step_with_options() {
        let text = "data lib.out2 (keep=a b);\n  set lib.in2 (where=(x > 1));\n  a = 1;\nrun;\n";
        let extract = extract_script(text);
        let steps = only_kind(&extract, |k| matches!(k, ComponentKind::DataStep { .. }));
        assert_eq!(steps.len(), 1);
        let ComponentKind::DataStep { data_in, data_out } = &steps[0].kind else {
            unreachable!()
        };
        assert_eq!(step_names(data_out), vec!["lib.out2"]);
        assert_eq!(step_names(data_in), vec!["lib.in2"]);
        assert_eq!(steps[0].span, Span { start: 0, end: 4 });
    }

    #[test]
    fn data_step_records_only_first_set_table() {
        let extract = extract_script("data merged; set first second third; run;");
        let ComponentKind::DataStep { data_in, .. } = &extract.components[0].kind else {
            unreachable!()
        };
        assert_eq!(step_names(data_in), vec!["work.first"]);
    }

    #[test]
    fn proc_sql_multi_output_multi_input() {
        let text = "proc sql; create table lib.a as select * from lib.x; \
                    insert into lib.b select * from lib.y; quit;";
        let extract = extract_script(text);
        let sqls = only_kind(&extract, |k| matches!(k, ComponentKind::ProcSql { .. }));
        assert_eq!(sqls.len(), 1);
        let ComponentKind::ProcSql { data_in, data_out } = &sqls[0].kind else {
            unreachable!()
        };
        assert_eq!(step_names(data_out), vec!["lib.a", "lib.b"]);
        assert_eq!(step_names(data_in), vec!["lib.x", "lib.y"]);
    }

    #[test]
    fn proc_sql_join_targets_are_inputs() {
        let text = "proc sql;\ncreate table j as select * from a\n\
                    inner join b on a.k = b.k\nleft outer join c on a.k = c.k;\nquit;\n";
        let extract = extract_script(text);
        let ComponentKind::ProcSql { data_in, .. } = &extract.components[0].kind else {
            unreachable!()
        };
        let names = step_names(data_in);
        assert!(names.contains(&"work.a".to_string()));
        assert!(names.contains(&"work.b".to_string()));
        assert!(names.contains(&"work.c".to_string()));
    }

    #[test]
    fn dangling_proc_sql_closed_by_next_proc() {
        let text = "proc sql;\ncreate table work.a as select * from work.b;\n\
                    proc sort data=work.a;\nby x;\nrun;\n";
        let extract = extract_script(text);

        let sqls = only_kind(&extract, |k| matches!(k, ComponentKind::ProcSql { .. }));
        assert_eq!(sqls.len(), 1);
        // The component ends before the line that opens the next proc.
        assert_eq!(sqls[0].span, Span { start: 0, end: 2 });
        let ComponentKind::ProcSql { data_in, data_out } = &sqls[0].kind else {
            unreachable!()
        };
        assert_eq!(step_names(data_out), vec!["work.a"]);
        assert_eq!(step_names(data_in), vec!["work.b"]);

        // The following proc must still be recognized in full.
        let sorts = only_kind(&extract, |k| matches!(k, ComponentKind::ProcSort { .. }));
        assert_eq!(sorts.len(), 1);
        assert_eq!(sorts[0].span, Span { start: 2, end: 5 });
    }

    #[test]
    fn proc_sort_without_out_defaults_to_work() {
        let extract = extract_script("proc sort data=lib.t;\nby k;\nrun;\n");
        let ComponentKind::ProcSort { data_in, data_out } = &extract.components[0].kind
        else {
            unreachable!()
        };
        assert_eq!(step_names(data_in), vec!["lib.t"]);
        assert_eq!(step_names(data_out), vec!["work.t"]);
    }

    #[test]
    fn proc_sort_with_out_and_options() {
        let extract =
            extract_script("proc sort data=lib.t out=lib.s nodupkey;\nby k;\nrun;\n");
        let ComponentKind::ProcSort { data_in, data_out } = &extract.components[0].kind
        else {
            unreachable!()
        };
        assert_eq!(step_names(data_in), vec!["lib.t"]);
        assert_eq!(step_names(data_out), vec!["lib.s"]);
    }

    #[test]
    fn proc_import_marks_path_input() {
        let text =
            "proc import datafile='/data/flights.csv' out=work.flights dbms=csv replace;\nrun;\n";
        let extract = extract_script(text);
        let ComponentKind::ProcImport { data_in, data_out } = &extract.components[0].kind
        else {
            unreachable!()
        };
        assert_eq!(data_in[0].libref, "none");
        assert_eq!(data_in[0].member, "'/data/flights.csv'");
        assert_eq!(step_names(data_out), vec!["work.flights"]);
    }

    #[test]
    fn proc_export_marks_path_output() {
        let text = "proc export data=work.final outfile='/out/final.csv' dbms=csv;\nrun;\n";
        let extract = extract_script(text);
        let ComponentKind::ProcExport { data_in, data_out } = &extract.components[0].kind
        else {
            unreachable!()
        };
        assert_eq!(step_names(data_in), vec!["work.final"]);
        assert_eq!(data_out[0].libref, "none");
    }

    #[test]
    fn let_and_symput_assignments() {
        let text = "%let year = 2019;\ndata _null_;\n\
                    call symput('cutoff', put(today(), date9.));\nrun;\n";
        let extract = extract_script(text);

        let lets = only_kind(&extract, |k| matches!(k, ComponentKind::MacroLet { .. }));
        assert_eq!(lets.len(), 1);
        let ComponentKind::MacroLet { name, value } = &lets[0].kind else {
            unreachable!()
        };
        assert_eq!(name, "year");
        assert_eq!(value, "2019");

        let symputs = only_kind(&extract, |k| matches!(k, ComponentKind::MacroSymput { .. }));
        assert_eq!(symputs.len(), 1);
        let ComponentKind::MacroSymput { name, value } = &symputs[0].kind else {
            unreachable!()
        };
        assert_eq!(name, "cutoff");
        assert_eq!(value, "put(today(), date9.)");
    }

    #[test]
    fn macro_var_refs_do_not_consume() {
        let text = "%let root = /srv;\nlibname in \"&root/data\";\n";
        let extract = extract_script(text);

        let refs = only_kind(&extract, |k| matches!(k, ComponentKind::MacroVarRef { .. }));
        assert_eq!(refs.len(), 1);
        let ComponentKind::MacroVarRef { refs } = &refs[0].kind else {
            unreachable!()
        };
        assert_eq!(refs[0].name, "&root");

        // The libname statement is not an extracted kind, so the referencing
        // line must survive into the residual.
        assert_eq!(extract.buffer.line(1), Some("libname in \"&root/data\";"));
    }

    #[test]
    fn multi_line_block_comment_blanked() {
        let text = "/* monthly refresh\n   do not edit */\ndata a; set b; run;\n";
        let extract = extract_script(text);
        let comments = only_kind(&extract, |k| matches!(k, ComponentKind::CommentBlock));
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].span, Span { start: 0, end: 2 });
        assert_eq!(extract.buffer.line(0), Some(""));
        assert_eq!(extract.buffer.line(1), Some(""));
    }

    #[test]
    fn keywords_inside_comments_are_ignored() {
        let text = "/* data fake; set nope; run; */\ndata real; set src; run;\n";
        let extract = extract_script(text);
        let steps = only_kind(&extract, |k| matches!(k, ComponentKind::DataStep { .. }));
        assert_eq!(steps.len(), 1);
        let ComponentKind::DataStep { data_out, .. } = &steps[0].kind else {
            unreachable!()
        };
        assert_eq!(step_names(data_out), vec!["work.real"]);
    }

    #[test]
    fn inline_comment_skips_lines_with_equals() {
        let text = "* cleanup step;\nx = y*z;\n";
        let extract = extract_script(text);
        let inline = only_kind(&extract, |k| matches!(k, ComponentKind::CommentInline));
        assert_eq!(inline.len(), 1);
        assert_eq!(inline[0].span, Span { start: 0, end: 1 });
        // The expression line is untouched.
        assert_eq!(extract.buffer.line(1), Some("x = y*z;"));
    }

    #[test]
    fn user_defined_macro_call() {
        let extract = extract_script("%libname(lib1, \"/srv/data\");\n");
        let ComponentKind::MacroCallUserDef { name } = &extract.components[0].kind else {
            unreachable!()
        };
        assert_eq!(name, "libname");
    }

    #[test]
    fn unterminated_block_is_discarded_without_blanking() {
        let text = "proc sql;\ncreate table a as select * from b;\n";
        let extract = extract_script(text);
        let sqls = only_kind(&extract, |k| matches!(k, ComponentKind::ProcSql { .. }));
        assert!(sqls.is_empty());
        assert!(extract.discarded_blocks >= 1);
        // Nothing blanked.
        assert_eq!(extract.buffer.line(0), Some("proc sql;"));
    }

    #[test]
    fn blanking_spans_never_overlap() {
        let text = "/* load */\n%let y = 2020;\ndata a;\nset b;\nrun;\n\
                    proc sql;\ncreate table c as select * from a;\nquit;\n\
                    proc sort data=c;\nby k;\nrun;\n* done;\n";
        let extract = extract_script(text);
        let blanking: Vec<&Component> = extract
            .components
            .iter()
            .filter(|c| !matches!(c.kind, ComponentKind::MacroVarRef { .. }))
            .collect();
        for (i, a) in blanking.iter().enumerate() {
            for b in blanking.iter().skip(i + 1) {
                assert!(
                    !a.span.overlaps(&b.span),
                    "overlap between {:?} and {:?}",
                    a.span,
                    b.span
                );
            }
        }
        assert!(blanking.len() >= 5);
    }

    #[test]
    fn buffer_length_constant_through_pipeline() {
        let text = "/* c */\ndata a;\nset b;\nrun;\nproc sort data=a;\nrun;\n";
        let extract = extract_script(text);
        assert_eq!(
            extract.buffer.len(),
            text.trim_end_matches('\n').split('\n').count()
        );
    }
}
