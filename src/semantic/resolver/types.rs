//! The resolved-type hierarchy.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::base::Entity;
use crate::syntax::ast::{ConnectorDirection, Expression};

/// Which builtin a scalar ultimately resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Real,
    Integer,
    Boolean,
    String,
    Native,
}

impl ScalarKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Real => "Real",
            ScalarKind::Integer => "Integer",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::String => "String",
            ScalarKind::Native => "Native",
        }
    }
}

/// One attribute of a scalar type (`units`, `min`, `guess`, ...), with
/// the finality carried over from the modification that set it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarAttribute {
    pub expr: Expression,
    pub is_final: bool,
}

/// A scalar type: a builtin kind plus merged attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarType {
    pub origin: Entity,
    pub kind: ScalarKind,
    pub attributes: IndexMap<SmolStr, ScalarAttribute>,
}

impl ScalarType {
    pub fn builtin(kind: ScalarKind) -> Self {
        Self {
            origin: Entity::builtin(kind.name()),
            kind,
            attributes: IndexMap::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Expression> {
        self.attributes.get(name).map(|a| &a.expr)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub origin: Entity,
    pub fields: IndexMap<SmolStr, ResolvedType>,
}

/// An enum resolves to a case-name → struct map; each case is an
/// independent struct type.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub origin: Entity,
    pub cases: IndexMap<SmolStr, StructType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    pub origin: Entity,
    pub positional: Vec<ResolvedType>,
    pub keyword: IndexMap<SmolStr, ResolvedType>,
    pub returns: Vec<ResolvedType>,
}

/// A component definition's type. Members are merged from the extends
/// chain during instantiation, so this stays a reference to the
/// definition rather than a member map.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentType {
    pub origin: Entity,
    pub partial: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisType {
    pub origin: Entity,
    pub partial: bool,
}

/// A connector type: one directed scalar, or a compound of qualified
/// fields.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectorType {
    Scalar {
        origin: Entity,
        direction: ConnectorDirection,
        inner: ScalarType,
    },
    Compound {
        origin: Entity,
        fields: IndexMap<SmolStr, ConnectorFieldType>,
    },
}

impl ConnectorType {
    pub fn origin(&self) -> &Entity {
        match self {
            ConnectorType::Scalar { origin, .. } | ConnectorType::Compound { origin, .. } => origin,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorFieldType {
    pub qualifier: ConnectorDirection,
    pub ty: Box<ResolvedType>,
}

/// The semantic meaning of a declaration after inheritance and
/// modification merging.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedType {
    Scalar(ScalarType),
    Struct(StructType),
    Enum(EnumType),
    Function(FunctionType),
    Component(ComponentType),
    Connector(ConnectorType),
    Analysis(AnalysisType),
    /// `elem` repeated along declared dimensions.
    Array {
        elem: Box<ResolvedType>,
        dims: Vec<Expression>,
    },
    /// A declaration guarded by a condition expression.
    Conditional {
        inner: Box<ResolvedType>,
        condition: Expression,
    },
}

impl ResolvedType {
    /// The entity this type was resolved from, skipping wrappers.
    pub fn origin(&self) -> &Entity {
        match self {
            ResolvedType::Scalar(s) => &s.origin,
            ResolvedType::Struct(s) => &s.origin,
            ResolvedType::Enum(e) => &e.origin,
            ResolvedType::Function(f) => &f.origin,
            ResolvedType::Component(c) => &c.origin,
            ResolvedType::Connector(c) => c.origin(),
            ResolvedType::Analysis(a) => &a.origin,
            ResolvedType::Array { elem, .. } => elem.origin(),
            ResolvedType::Conditional { inner, .. } => inner.origin(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ResolvedType::Scalar(s) => s.kind.name(),
            ResolvedType::Struct(_) => "struct",
            ResolvedType::Enum(_) => "enum",
            ResolvedType::Function(_) => "function",
            ResolvedType::Component(_) => "component",
            ResolvedType::Connector(_) => "connector",
            ResolvedType::Analysis(_) => "analysis",
            ResolvedType::Array { .. } => "array",
            ResolvedType::Conditional { .. } => "conditional",
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, ResolvedType::Scalar(_))
    }

    pub fn as_scalar(&self) -> Option<&ScalarType> {
        match self {
            ResolvedType::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumType> {
        match self {
            ResolvedType::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// The type under array/conditional wrappers.
    pub fn unwrapped(&self) -> &ResolvedType {
        match self {
            ResolvedType::Array { elem, .. } => elem.unwrapped(),
            ResolvedType::Conditional { inner, .. } => inner.unwrapped(),
            other => other,
        }
    }
}
