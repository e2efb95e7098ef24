//! AST node arena.
//!
//! Nodes live in a flat arena and reference each other through
//! `NodeId` indices, so trees need no per-node boxing and the whole
//! program can be handed to the evaluator behind a single `Rc`.

use crate::Span;

/// Index of a node in its [`NodeArena`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Binary operators, including the keyword logicals.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    Ne,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

/// One `if`/`elif` arm. `block` records whether the body used the
/// `do`-block shape, which changes the arm's result to the null
/// sentinel.
#[derive(Clone, Debug, PartialEq)]
pub struct IfCase {
    pub cond: NodeId,
    pub body: NodeId,
    pub block: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Number(f64),
    Str(String),
    /// List literal. Also used for statement sequences, which evaluate
    /// to the list of their statements' values.
    List(Vec<NodeId>),
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    /// `this name is value`
    Assign {
        name: String,
        value: NodeId,
    },
    Access {
        name: String,
    },
    If {
        cases: Vec<IfCase>,
        else_body: Option<NodeId>,
        else_block: bool,
    },
    For {
        var: String,
        start: NodeId,
        end: NodeId,
        step: Option<NodeId>,
        body: NodeId,
        block: bool,
    },
    /// `until cond …`: a while loop, the keyword does not negate.
    While {
        cond: NodeId,
        body: NodeId,
        block: bool,
    },
    /// `task name(params) …`. Inline bodies auto-return their value.
    TaskDef {
        name: Option<String>,
        params: Vec<String>,
        body: NodeId,
        auto_return: bool,
    },
    Call {
        callee: NodeId,
        args: Vec<NodeId>,
    },
    /// `give [value]`
    Return {
        value: Option<NodeId>,
    },
    /// `proceed`
    Continue,
    /// `stop`
    Break,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

/// Flat storage for all nodes of one parse.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeArena {
    nodes: Vec<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        NodeArena::default()
    }

    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node { kind, span });
        id
    }

    /// Fetch a node. Ids are only minted by `alloc`, so a miss means a
    /// cross-arena id; the dummy keeps lookups infallible.
    #[inline]
    pub fn get(&self, id: NodeId) -> &Node {
        static DUMMY: Node = Node {
            kind: NodeKind::Continue,
            span: Span::DUMMY,
        };
        self.nodes.get(id.index()).unwrap_or(&DUMMY)
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.get(id).kind
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.get(id).span
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A parsed program: the arena plus its root statement sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub arena: NodeArena,
    pub root: NodeId,
}
