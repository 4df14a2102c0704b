//! Expression trees and component references.
//!
//! Expressions are carried through the semantic core structurally: the
//! core never evaluates them. `Display` unparses an expression back to
//! stable concrete text; connection and analysis-point consolidation
//! compare references by that unparsed identity.

use indexmap::IndexMap;
use smol_str::SmolStr;
use std::fmt;

/// One dotted segment of a component reference, with optional subscripts.
#[derive(Debug, Clone, PartialEq)]
pub struct RefPart {
    pub name: SmolStr,
    pub subscripts: Vec<Expression>,
}

impl RefPart {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            subscripts: Vec::new(),
        }
    }
}

/// A dotted reference to a connector, component, or variable
/// (`ground.g.v`, `resistors[i].p`).
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentReference {
    pub parts: Vec<RefPart>,
}

impl ComponentReference {
    pub fn new(parts: Vec<RefPart>) -> Self {
        Self { parts }
    }

    /// A single-segment, unsubscripted reference.
    pub fn simple(name: impl Into<SmolStr>) -> Self {
        Self {
            parts: vec![RefPart::new(name)],
        }
    }

    /// A dotted reference built from plain segments.
    pub fn dotted(segments: impl IntoIterator<Item = impl Into<SmolStr>>) -> Self {
        Self {
            parts: segments.into_iter().map(RefPart::new).collect(),
        }
    }

    /// True when the reference is one bare identifier.
    pub fn is_simple(&self) -> bool {
        self.parts.len() == 1 && self.parts[0].subscripts.is_empty()
    }

    /// The first segment's name.
    pub fn root_name(&self) -> &str {
        &self.parts[0].name
    }
}

impl fmt::Display for ComponentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", part.name)?;
            if !part.subscripts.is_empty() {
                write!(f, "[")?;
                for (j, sub) in part.subscripts.iter().enumerate() {
                    if j > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{sub}")?;
                }
                write!(f, "]")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "-"),
            UnaryOp::Not => write!(f, "not "),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        };
        write!(f, "{op}")
    }
}

/// An expression as produced by the parser collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    RealLiteral(f64),
    IntegerLiteral(i64),
    BooleanLiteral(bool),
    StringLiteral(String),
    Reference(ComponentReference),
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
    Ternary {
        condition: Box<Expression>,
        yes: Box<Expression>,
        no: Box<Expression>,
    },
    Call {
        function: ComponentReference,
        positional: Vec<Expression>,
        keyword: IndexMap<SmolStr, Expression>,
    },
    Array(Vec<Expression>),
    Range {
        start: Box<Expression>,
        step: Option<Box<Expression>>,
        stop: Box<Expression>,
    },
}

impl Expression {
    pub fn reference(name: impl Into<SmolStr>) -> Self {
        Expression::Reference(ComponentReference::simple(name))
    }

    /// The underlying reference, when this expression is exactly one
    /// component reference (used by switch discriminants).
    pub fn as_reference(&self) -> Option<&ComponentReference> {
        match self {
            Expression::Reference(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::RealLiteral(v) => write!(f, "{v}"),
            Expression::IntegerLiteral(v) => write!(f, "{v}"),
            Expression::BooleanLiteral(v) => write!(f, "{v}"),
            Expression::StringLiteral(v) => write!(f, "{v:?}"),
            Expression::Reference(r) => write!(f, "{r}"),
            Expression::Unary { op, operand } => write!(f, "{op}{operand}"),
            Expression::Binary { op, lhs, rhs } => write!(f, "({lhs} {op} {rhs})"),
            Expression::Ternary { condition, yes, no } => {
                write!(f, "(if {condition} then {yes} else {no})")
            }
            Expression::Call {
                function,
                positional,
                keyword,
            } => {
                write!(f, "{function}(")?;
                let mut first = true;
                for arg in positional {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "{arg}")?;
                }
                for (name, arg) in keyword {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "{name}={arg}")?;
                }
                write!(f, ")")
            }
            Expression::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Expression::Range { start, step, stop } => match step {
                Some(step) => write!(f, "{start}:{step}:{stop}"),
                None => write!(f, "{start}:{stop}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_unparse() {
        let r = ComponentReference::dotted(["ground", "g", "v"]);
        assert_eq!(r.to_string(), "ground.g.v");
        assert!(!r.is_simple());
        assert!(ComponentReference::simple("x").is_simple());
    }

    #[test]
    fn test_subscripted_reference_unparse() {
        let mut part = RefPart::new("resistors");
        part.subscripts.push(Expression::reference("i"));
        let r = ComponentReference::new(vec![part, RefPart::new("p")]);
        assert_eq!(r.to_string(), "resistors[i].p");
    }

    #[test]
    fn test_expression_unparse() {
        let expr = Expression::Binary {
            op: BinaryOp::Mul,
            lhs: Box::new(Expression::reference("R")),
            rhs: Box::new(Expression::reference("i")),
        };
        assert_eq!(expr.to_string(), "(R * i)");
    }

    #[test]
    fn test_as_reference() {
        assert!(Expression::reference("mode").as_reference().is_some());
        assert!(Expression::IntegerLiteral(1).as_reference().is_none());
    }
}
