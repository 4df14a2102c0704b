//! Relations owned by component and analysis definitions.
//!
//! Control-flow relations (`for`, `if`, `switch`) own nested relation
//! lists, so a relation tree can nest arbitrarily deep. Instantiation
//! assigns every relation a tree index addressing its nested position.

use smol_str::SmolStr;

use crate::base::Span;

use super::expressions::{ComponentReference, Expression};

/// A relation declared in a definition body.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    Equation(Equation),
    Assertion(Assertion),
    Connection(Connection),
    Continuity(Continuity),
    AnalysisPoint(AnalysisPoint),
    ForLoop(ForLoop),
    If(IfRelation),
    Switch(SwitchRelation),
}

impl Relation {
    pub fn span(&self) -> Span {
        match self {
            Relation::Equation(r) => r.span,
            Relation::Assertion(r) => r.span,
            Relation::Connection(r) => r.span,
            Relation::Continuity(r) => r.span,
            Relation::AnalysisPoint(r) => r.span,
            Relation::ForLoop(r) => r.span,
            Relation::If(r) => r.span,
            Relation::Switch(r) => r.span,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Relation::Equation(_) => "equation",
            Relation::Assertion(_) => "assertion",
            Relation::Connection(_) => "connection",
            Relation::Continuity(_) => "continuity",
            Relation::AnalysisPoint(_) => "analysis point",
            Relation::ForLoop(_) => "for loop",
            Relation::If(_) => "if statement",
            Relation::Switch(_) => "switch statement",
        }
    }
}

/// `lhs = rhs`, optionally an initial equation.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub lhs: Expression,
    pub rhs: Expression,
    pub initial: bool,
    pub doc: Option<String>,
    pub span: Span,
}

/// `assert(condition, message)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assertion {
    pub condition: Expression,
    pub message: String,
    pub span: Span,
}

/// `connect(a, b, ...)` — equates two or more connector references.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub refs: Vec<ComponentReference>,
    pub span: Span,
}

/// `continuity(a, b, ...)` — asserts shared continuity across variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Continuity {
    pub refs: Vec<ComponentReference>,
    pub span: Span,
}

/// A named marker over an existing connection, used by downstream
/// tooling without altering model semantics.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPoint {
    pub name: SmolStr,
    pub refs: Vec<ComponentReference>,
    pub span: Span,
}

/// `for index in range ... end` over a nested relation list.
#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub index: SmolStr,
    pub range: Expression,
    pub body: Vec<Relation>,
    pub span: Span,
}

/// `if ... elseif ... else ... end` over nested relation lists.
#[derive(Debug, Clone, PartialEq)]
pub struct IfRelation {
    pub condition: Expression,
    pub yes: Vec<Relation>,
    pub else_ifs: Vec<ElseIfClause>,
    pub else_body: Vec<Relation>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseIfClause {
    pub condition: Expression,
    pub body: Vec<Relation>,
    pub span: Span,
}

/// `switch discriminant ... case ... end`; the discriminant must be a
/// simple reference to an enum-typed variable.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchRelation {
    pub discriminant: Expression,
    pub cases: Vec<SwitchCase>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub case: SmolStr,
    pub body: Vec<Relation>,
    pub span: Span,
}
