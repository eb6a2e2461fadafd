use crate::{
    diagnostics::{Diagnostic, SourceSpan},
    value::Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: SourceSpan,
    /// Height of the tree rooted here; leaves are 1.
    pub depth: usize,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    Literal(Value),
    Variable(String),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Concat(Vec<ConcatPart>),
}

/// One `+`-separated piece of a concatenation-mode expression.
#[derive(Debug, Clone)]
pub enum ConcatPart {
    Literal(String),
    /// Non-quoted segment. `expr` is `None` when the segment does not parse,
    /// in which case the raw `source` text is appended.
    SubExpr { source: String, expr: Option<Expr> },
}

#[derive(Debug, Clone)]
pub enum StmtKind {
    Nop,
    Print {
        expr: String,
    },
    Input {
        prompt: Option<String>,
        target: String,
    },
    Random {
        target: String,
        min: i64,
        max: i64,
    },
    Assign {
        target: String,
        expr: String,
    },
    If {
        condition: String,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
    While {
        condition: String,
        body: Vec<Stmt>,
    },
    /// Recognized form with unusable arguments; reported when reached.
    Malformed(Diagnostic),
    Unknown(String),
}

impl StmtKind {
    pub fn name(&self) -> &'static str {
        match self {
            StmtKind::Nop => "nop",
            StmtKind::Print { .. } => "print",
            StmtKind::Input { .. } => "input",
            StmtKind::Random { .. } => "random",
            StmtKind::Assign { .. } => "assign",
            StmtKind::If { .. } => "if",
            StmtKind::While { .. } => "while",
            StmtKind::Malformed(_) => "malformed",
            StmtKind::Unknown(_) => "unknown",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    /// 1-based line in the program text.
    pub line: usize,
}
