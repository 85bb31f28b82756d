use crate::span::Span;
use serde::Serialize;

/// A full statement: one or more clauses joined by `#`, all layered onto
/// the same slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub clauses: Vec<Clause>,
    pub span: Span,
}

/// One clause of a statement, e.g. `note "c3 e3"` or `hold:0 0.8`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clause {
    pub kind: ClauseKind,
    pub pattern: Node,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ClauseKind {
    /// `gate "..."`: voice numbers 1..12.
    Gate,
    /// `note "..."`: note names or MIDI numbers.
    Note,
    /// `s "..."`: sample names.
    Sample,
    /// `<param> ...`: an unquoted number pattern for a control parameter.
    Float { param: String },
}

/// A node of the pattern tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Node {
    Atom(AtomNode),
    Group(GroupNode),
    Element(Box<ElementNode>),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Atom(atom) => atom.span,
            Node::Group(group) => group.span,
            Node::Element(element) => element.span,
        }
    }
}

/// A leaf: a name, a number, or a rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtomNode {
    pub value: AtomValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AtomValue {
    Name(String),
    Number(f64),
    Rest,
}

/// How a group's children share time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Alignment {
    /// `[a b c]` or a bare sequence: children squeeze into one cycle.
    Fastcat,
    /// `<a b c>`: one child per cycle.
    Slowcat,
    /// `[a, b]`: children play simultaneously.
    Stack,
    /// `{a b, c d e}`: branches run at a shared step rate.
    Polymeter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupNode {
    pub alignment: Alignment,
    pub children: Vec<Node>,
    /// Step rate override from `{...}!n`.
    pub steps_override: Option<u64>,
    pub span: Span,
}

/// A sequence element: a source node plus the modifiers attached to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementNode {
    pub source: Node,
    pub ops: Vec<ElementOp>,
    /// Relative width within the enclosing sequence, set by `@`.
    pub weight: f64,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ElementOp {
    /// `*n`
    Fast(f64),
    /// `/n`
    Slow(f64),
    /// `(pulses,steps)` or `(pulses,steps,rotation)`
    Euclid {
        pulses: f64,
        steps: f64,
        rotation: Option<f64>,
        span: Span,
    },
    /// `a..b`, expands to an inclusive run of integers
    Range { end: Node },
}
