//! Abstract Syntax Tree
//!
//! Arena-allocated AST for handler programs.

/// AST node ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub u32);

/// AST container
#[derive(Debug, Default, Clone)]
pub struct Ast {
    nodes: Vec<AstNodeKind>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: AstNodeKind) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: ExprId) -> Option<&AstNodeKind> {
        self.nodes.get(id.0 as usize)
    }
}

#[derive(Debug, Clone)]
pub enum AstNodeKind {
    // Statements
    ExpressionStatement { expr: ExprId },
    ReturnStatement { argument: Option<ExprId> },

    // Expressions
    Identifier { name: Box<str> },
    This,
    Literal { value: LiteralValue },
    Member { object: ExprId, property: Box<str> },
    Call { callee: ExprId, arguments: Vec<ExprId> },
    /// Target is always a `Member`
    Assign { target: ExprId, value: ExprId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Box<str>),
}

/// A parsed handler: the statements of one `on*` attribute
#[derive(Debug, Clone)]
pub struct Program {
    pub(crate) ast: Ast,
    pub(crate) body: Vec<ExprId>,
    source: Box<str>,
}

impl Program {
    pub(crate) fn new(ast: Ast, body: Vec<ExprId>, source: &str) -> Self {
        Self { ast, body, source: source.into() }
    }

    /// Original handler source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of top-level statements
    pub fn statement_count(&self) -> usize {
        self.body.len()
    }
}
