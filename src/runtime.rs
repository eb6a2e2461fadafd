use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tracing::{debug, warn};

use crate::{
    ast::{Stmt, StmtKind},
    diagnostics::{Diagnostic, DiagnosticKind, Result, SelectwayError},
    evaluator::try_evaluate_with,
    host::{Console, RandomSource, StdConsole, StdRandom},
    parser::PlusSplit,
    statement::parse_statement,
    store::VariableStore,
    value::Value,
};

/// Knobs a caller can set before running a program. The defaults impose no
/// limits and reproduce the documented expression behavior.
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    pub split: PlusSplit,
    /// Assignments inside `/if`, `/else` and `/while` blocks turn numeric
    /// looking strings into numbers.
    pub coerce_block_assignments: bool,
    pub max_loop_iterations: Option<u64>,
    /// Checked before every statement; raising it aborts the run.
    pub interrupt: Option<Arc<AtomicBool>>,
}

impl ExecutionContext {
    pub fn with_split(mut self, split: PlusSplit) -> Self {
        self.split = split;
        self
    }

    pub fn with_block_coercion(mut self, enabled: bool) -> Self {
        self.coerce_block_assignments = enabled;
        self
    }

    pub fn with_max_loop_iterations(mut self, limit: u64) -> Self {
        self.max_loop_iterations = Some(limit);
        self
    }

    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }
}

pub struct Interpreter<C = StdConsole, R = StdRandom> {
    store: VariableStore,
    console: C,
    random: R,
    context: ExecutionContext,
    depth: usize,
    line: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_host(StdConsole, StdRandom::new())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Console, R: RandomSource> Interpreter<C, R> {
    pub fn with_host(console: C, random: R) -> Self {
        Self {
            store: VariableStore::new(),
            console,
            random,
            context: ExecutionContext::default(),
            depth: 0,
            line: 0,
        }
    }

    pub fn with_context(mut self, context: ExecutionContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_store(mut self, store: VariableStore) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    pub fn into_store(self) -> VariableStore {
        self.store
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Runs `source` from its first line to its last. Statement-level
    /// problems are reported on the console and the run carries on; only
    /// host failures and caller-imposed limits end it early.
    #[tracing::instrument(level = "debug", skip_all, fields(lines = source.lines().count()))]
    pub fn run(&mut self, source: &str) -> Result<()> {
        let lines: Vec<&str> = source.lines().collect();
        let mut index = 0;
        while index < lines.len() {
            index += self.execute_line(&lines, index)?;
        }
        Ok(())
    }

    /// Executes the statement starting at `lines[index]` and returns how many
    /// lines it consumed: one, or the introductory line plus its blocks.
    pub fn execute_line(&mut self, lines: &[&str], index: usize) -> Result<usize> {
        let (stmt, consumed) = parse_statement(lines, index, 1);
        self.execute_statement(&stmt)?;
        Ok(consumed)
    }

    fn execute_statement(&mut self, stmt: &Stmt) -> Result<()> {
        self.check_interrupt()?;
        self.line = stmt.line;
        debug!(line = stmt.line, depth = self.depth, kind = stmt.kind.name(), "statement");
        match &stmt.kind {
            StmtKind::Nop => Ok(()),
            StmtKind::Print { expr } => {
                let value = self.evaluate(expr)?;
                self.console.write_line(&value.to_string())?;
                Ok(())
            }
            StmtKind::Input { prompt, target } => {
                let prompt = prompt
                    .clone()
                    .unwrap_or_else(|| format!("Enter value for {target}: "));
                let text = self.console.read_line(&prompt)?.ok_or_else(|| {
                    SelectwayError::InputExhausted {
                        target: target.clone(),
                    }
                })?;
                let value = Value::from_input(&text);
                debug!(line = stmt.line, variable = %target, %value, "input");
                self.store.assign(target.clone(), value);
                Ok(())
            }
            StmtKind::Random { target, min, max } => {
                let value = self.random.between(*min, *max);
                debug!(line = stmt.line, variable = %target, value, "random");
                self.store.assign(target.clone(), Value::Int(value));
                Ok(())
            }
            StmtKind::Assign { target, expr } => {
                let mut value = self.evaluate(expr)?;
                if self.depth > 0 && self.context.coerce_block_assignments {
                    value = value.coerce_numeric();
                }
                debug!(line = stmt.line, variable = %target, %value, "assign");
                self.store.assign(target.clone(), value);
                Ok(())
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let branch = if self.condition(condition)?.unwrap_or(false) {
                    Some(then_branch)
                } else {
                    else_branch.as_ref()
                };
                match branch {
                    Some(statements) => self.execute_block(statements),
                    None => Ok(()),
                }
            }
            StmtKind::While { condition, body } => {
                let mut iterations: u64 = 0;
                while self.condition(condition)? == Some(true) {
                    if let Some(limit) = self.context.max_loop_iterations {
                        if iterations >= limit {
                            return Err(SelectwayError::IterationLimit { limit });
                        }
                    }
                    iterations += 1;
                    self.execute_block(body)?;
                }
                debug!(line = stmt.line, iterations, "loop finished");
                Ok(())
            }
            StmtKind::Malformed(diagnostic) => self.report(diagnostic),
            StmtKind::Unknown(text) => self.report(&Diagnostic::new(
                DiagnosticKind::UnknownStatement,
                format!("Unknown statement: {text}"),
            )),
        }
    }

    fn execute_block(&mut self, statements: &[Stmt]) -> Result<()> {
        self.depth += 1;
        debug!(depth = self.depth, statements = statements.len(), "enter block");
        let result = statements
            .iter()
            .try_for_each(|stmt| self.execute_statement(stmt));
        self.depth -= 1;
        result
    }

    /// Evaluates expression text, reporting failures and yielding `Int(0)`.
    pub fn evaluate(&mut self, source: &str) -> Result<Value> {
        match try_evaluate_with(source, &self.store, self.context.split) {
            Ok(value) => Ok(value),
            Err(diagnostic) => {
                self.report(&diagnostic)?;
                Ok(Value::Int(0))
            }
        }
    }

    /// Truthiness of a condition, or `None` when it could not be evaluated.
    fn condition(&mut self, source: &str) -> Result<Option<bool>> {
        match try_evaluate_with(source, &self.store, self.context.split) {
            Ok(value) => Ok(Some(value.is_truthy())),
            Err(cause) => {
                let mut diagnostic = Diagnostic::new(DiagnosticKind::Condition, cause.message);
                diagnostic.span = cause.span;
                diagnostic.notes = cause.notes;
                self.report(&diagnostic)?;
                Ok(None)
            }
        }
    }

    fn report(&mut self, diagnostic: &Diagnostic) -> Result<()> {
        let summary = diagnostic.summary();
        warn!(line = self.line, kind = ?diagnostic.kind, "{summary}");
        self.console.write_line(&summary)?;
        Ok(())
    }

    fn check_interrupt(&self) -> Result<()> {
        match &self.context.interrupt {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(SelectwayError::Interrupted),
            _ => Ok(()),
        }
    }
}

/// Runs `source` against `store` with the process console and an
/// OS-seeded random source.
pub fn run(source: &str, store: &mut VariableStore) -> Result<()> {
    let mut interpreter = Interpreter::new().with_store(std::mem::take(store));
    let result = interpreter.run(source);
    *store = interpreter.into_store();
    result
}
