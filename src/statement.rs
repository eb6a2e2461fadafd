//! Line classification for SELECTWAY programs.
//!
//! Each call looks at one line and, for `/if` and `/while`, the indented
//! lines that follow it. Expression text is kept verbatim in the resulting
//! [`Stmt`]; it is evaluated each time the statement runs.

use crate::{
    ast::{Stmt, StmtKind},
    diagnostics::{Diagnostic, DiagnosticKind},
    store::is_identifier,
};

/// One nesting level. Lines starting with it belong to the enclosing block.
pub const INDENT: &str = "    ";

const RANDOM_USAGE: &str = "Invalid /random usage: /random <var> <min> <max>";
const INPUT_USAGE: &str = "Invalid /input usage: /input [\"prompt\"] <var>";

/// Parses the statement starting at `lines[index]` and returns it with the
/// number of lines it spans. `first_line` is the 1-based line number of
/// `lines[0]` in the program text.
pub fn parse_statement(lines: &[&str], index: usize, first_line: usize) -> (Stmt, usize) {
    let line_no = first_line + index;
    let line = lines[index].trim();
    let single = |kind: StmtKind| (Stmt { kind, line: line_no }, 1);

    if line.is_empty() || line.starts_with('#') {
        return single(StmtKind::Nop);
    }
    if let Some(expr) = keyword_argument(line, "/print") {
        return single(StmtKind::Print {
            expr: expr.to_string(),
        });
    }
    if let Some(rest) = keyword_argument(line, "/input") {
        return single(parse_input(rest));
    }
    if let Some(rest) = keyword_argument(line, "/random") {
        return single(parse_random(rest));
    }
    if let Some((target, expr)) = assignment(line) {
        return single(StmtKind::Assign {
            target: target.to_string(),
            expr: expr.to_string(),
        });
    }
    if let Some(condition) = keyword_argument(line, "/if") {
        let (then_lines, mut next) = collect_block(lines, index + 1);
        let then_branch = parse_block(&then_lines, first_line + index + 1);
        let else_branch = if next < lines.len() && lines[next].trim() == "/else" {
            let (else_lines, after) = collect_block(lines, next + 1);
            let branch = parse_block(&else_lines, first_line + next + 1);
            next = after;
            Some(branch)
        } else {
            None
        };
        let stmt = Stmt {
            kind: StmtKind::If {
                condition: condition.to_string(),
                then_branch,
                else_branch,
            },
            line: line_no,
        };
        return (stmt, next - index);
    }
    if let Some(condition) = keyword_argument(line, "/while") {
        let (body_lines, next) = collect_block(lines, index + 1);
        let stmt = Stmt {
            kind: StmtKind::While {
                condition: condition.to_string(),
                body: parse_block(&body_lines, first_line + index + 1),
            },
            line: line_no,
        };
        return (stmt, next - index);
    }
    single(StmtKind::Unknown(line.to_string()))
}

/// Parses every statement of an already de-indented block.
pub fn parse_block(lines: &[&str], first_line: usize) -> Vec<Stmt> {
    let mut statements = Vec::new();
    let mut index = 0;
    while index < lines.len() {
        let (stmt, consumed) = parse_statement(lines, index, first_line);
        statements.push(stmt);
        index += consumed;
    }
    statements
}

/// Gathers the run of indented lines starting at `start`, stripped of one
/// indentation level. Returns them with the index of the first line after
/// the block.
pub fn collect_block<'a>(lines: &[&'a str], start: usize) -> (Vec<&'a str>, usize) {
    let mut block = Vec::new();
    let mut index = start;
    while let Some(line) = lines.get(index).copied().and_then(|line| line.strip_prefix(INDENT)) {
        block.push(line);
        index += 1;
    }
    (block, index)
}

/// `/keyword <argument>`: the keyword must be followed by whitespace.
fn keyword_argument<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    rest.starts_with(char::is_whitespace).then(|| rest.trim())
}

/// `/<identifier> = <expr>`, split on the first `=`.
fn assignment(line: &str) -> Option<(&str, &str)> {
    let (target, expr) = line.strip_prefix('/')?.split_once('=')?;
    let target = target.trim();
    is_identifier(target).then(|| (target, expr.trim()))
}

fn parse_input(rest: &str) -> StmtKind {
    let (prompt, target) = match rest.chars().next() {
        Some(quote @ ('"' | '\'')) => match rest[1..].find(quote) {
            Some(end) => (Some(rest[1..end + 1].to_string()), rest[end + 2..].trim()),
            None => {
                return StmtKind::Malformed(
                    Diagnostic::new(DiagnosticKind::Usage, INPUT_USAGE)
                        .with_note("unterminated prompt"),
                );
            }
        },
        _ => (None, rest),
    };
    if !is_identifier(target) {
        return StmtKind::Malformed(
            Diagnostic::new(DiagnosticKind::Usage, INPUT_USAGE)
                .with_note(format!("`{target}` is not a variable name")),
        );
    }
    StmtKind::Input {
        prompt,
        target: target.to_string(),
    }
}

fn parse_random(rest: &str) -> StmtKind {
    let usage = |note: String| {
        StmtKind::Malformed(Diagnostic::new(DiagnosticKind::Usage, RANDOM_USAGE).with_note(note))
    };
    let parts: Vec<&str> = rest.split_whitespace().collect();
    let [target, min, max] = parts[..] else {
        return usage(format!("expected 3 arguments, found {}", parts.len()));
    };
    if !is_identifier(target) {
        return usage(format!("`{target}` is not a variable name"));
    }
    let (Ok(min), Ok(max)) = (min.parse::<i64>(), max.parse::<i64>()) else {
        return usage("bounds must be integer literals".into());
    };
    if min > max {
        return usage(format!("empty range {min}..={max}"));
    }
    StmtKind::Random {
        target: target.to_string(),
        min,
        max,
    }
}
