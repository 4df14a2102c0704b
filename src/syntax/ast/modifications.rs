//! Value modifications applied to inherited or declared members.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::expressions::Expression;

/// A named set of modifications, in source order.
pub type Modifications = IndexMap<SmolStr, Modification>;

/// One override of a member attribute.
///
/// `final` forbids any further override by a consumer further down the
/// inheritance/instantiation chain. A modification may carry a direct
/// value (`expr`), nested sub-modifications, or both.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Modification {
    pub is_final: bool,
    pub expr: Option<Expression>,
    pub nested: Option<Modifications>,
}

impl Modification {
    /// A plain, overridable value.
    pub fn value(expr: Expression) -> Self {
        Self {
            is_final: false,
            expr: Some(expr),
            nested: None,
        }
    }

    /// A `final` value, locked against further override.
    pub fn final_value(expr: Expression) -> Self {
        Self {
            is_final: true,
            expr: Some(expr),
            nested: None,
        }
    }

    /// A modification with only nested sub-modifications.
    pub fn nested(nested: Modifications) -> Self {
        Self {
            is_final: false,
            expr: None,
            nested: Some(nested),
        }
    }

    pub fn with_nested(mut self, nested: Modifications) -> Self {
        self.nested = Some(nested);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let m = Modification::value(Expression::IntegerLiteral(5));
        assert!(!m.is_final);
        assert!(m.expr.is_some());

        let m = Modification::final_value(Expression::IntegerLiteral(5));
        assert!(m.is_final);

        let mut nested = Modifications::new();
        nested.insert("min".into(), Modification::value(Expression::RealLiteral(0.0)));
        let m = Modification::nested(nested);
        assert!(m.expr.is_none());
        assert_eq!(m.nested.as_ref().map(|n| n.len()), Some(1));
    }
}
