//! Top-level definition nodes and their member declarations.

use indexmap::IndexMap;
use serde_json::Value;
use smol_str::SmolStr;
use std::fmt;

use crate::base::Span;

use super::expressions::Expression;
use super::modifications::Modifications;
use super::relations::Relation;

/// A dotted (or simple) type name reference, resolved against the
/// declaring definition's scope.
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedName {
    pub parts: Vec<SmolStr>,
    pub span: Span,
}

impl QualifiedName {
    pub fn new(parts: impl IntoIterator<Item = impl Into<SmolStr>>, span: Span) -> Self {
        Self {
            parts: parts.into_iter().map(Into::into).collect(),
            span,
        }
    }

    pub fn simple(name: impl Into<SmolStr>, span: Span) -> Self {
        Self {
            parts: vec![name.into()],
            span,
        }
    }

    pub fn is_simple(&self) -> bool {
        self.parts.len() == 1
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join("."))
    }
}

// ============================================================================
// DEFINITIONS
// ============================================================================

/// A named, top-level declaration in a source file.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    ScalarType(ScalarTypeDef),
    StructType(StructTypeDef),
    EnumType(EnumTypeDef),
    FunctionType(FunctionTypeDef),
    ScalarConnector(ScalarConnectorDef),
    StructConnector(StructConnectorDef),
    Component(ComponentDef),
    Analysis(AnalysisDef),
}

impl Definition {
    pub fn name(&self) -> &SmolStr {
        match self {
            Definition::ScalarType(d) => &d.name,
            Definition::StructType(d) => &d.name,
            Definition::EnumType(d) => &d.name,
            Definition::FunctionType(d) => &d.name,
            Definition::ScalarConnector(d) => &d.name,
            Definition::StructConnector(d) => &d.name,
            Definition::Component(d) => &d.name,
            Definition::Analysis(d) => &d.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Definition::ScalarType(d) => d.span,
            Definition::StructType(d) => d.span,
            Definition::EnumType(d) => d.span,
            Definition::FunctionType(d) => d.span,
            Definition::ScalarConnector(d) => d.span,
            Definition::StructConnector(d) => d.span,
            Definition::Component(d) => d.span,
            Definition::Analysis(d) => d.span,
        }
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            Definition::ScalarType(d) => d.doc.as_deref(),
            Definition::StructType(d) => d.doc.as_deref(),
            Definition::EnumType(d) => d.doc.as_deref(),
            Definition::FunctionType(d) => d.doc.as_deref(),
            Definition::ScalarConnector(d) => d.doc.as_deref(),
            Definition::StructConnector(d) => d.doc.as_deref(),
            Definition::Component(d) => d.doc.as_deref(),
            Definition::Analysis(d) => d.doc.as_deref(),
        }
    }

    pub fn metadata(&self) -> Option<&Value> {
        match self {
            Definition::ScalarType(d) => d.metadata.as_ref(),
            Definition::StructType(d) => d.metadata.as_ref(),
            Definition::EnumType(d) => d.metadata.as_ref(),
            Definition::FunctionType(d) => d.metadata.as_ref(),
            Definition::ScalarConnector(d) => d.metadata.as_ref(),
            Definition::StructConnector(d) => d.metadata.as_ref(),
            Definition::Component(d) => d.metadata.as_ref(),
            Definition::Analysis(d) => d.metadata.as_ref(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Definition::ScalarType(_) => "scalar type",
            Definition::StructType(_) => "struct type",
            Definition::EnumType(_) => "enum type",
            Definition::FunctionType(_) => "function type",
            Definition::ScalarConnector(_) => "scalar connector",
            Definition::StructConnector(_) => "struct connector",
            Definition::Component(_) => "component",
            Definition::Analysis(_) => "analysis",
        }
    }
}

/// `type Voltage = Real(units="V")` — a scalar alias with modifications.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarTypeDef {
    pub name: SmolStr,
    pub base: QualifiedName,
    pub modifications: Modifications,
    pub doc: Option<String>,
    pub metadata: Option<Value>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructTypeDef {
    pub name: SmolStr,
    pub fields: IndexMap<SmolStr, FieldDeclaration>,
    pub doc: Option<String>,
    pub metadata: Option<Value>,
    pub span: Span,
}

/// A field of a struct type or of an enum case.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    pub name: SmolStr,
    pub ty: QualifiedName,
    pub dims: Vec<Expression>,
    pub condition: Option<Expression>,
    pub modifications: Modifications,
    pub doc: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumTypeDef {
    pub name: SmolStr,
    pub cases: IndexMap<SmolStr, EnumCase>,
    pub doc: Option<String>,
    pub metadata: Option<Value>,
    pub span: Span,
}

/// One case of an enum type; each case is structurally a struct.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumCase {
    pub name: SmolStr,
    pub fields: IndexMap<SmolStr, FieldDeclaration>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionTypeDef {
    pub name: SmolStr,
    pub positional: Vec<FunctionParameter>,
    pub keyword: IndexMap<SmolStr, FunctionParameter>,
    pub returns: Vec<FunctionParameter>,
    pub doc: Option<String>,
    pub metadata: Option<Value>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParameter {
    pub name: SmolStr,
    pub ty: QualifiedName,
    pub span: Span,
}

/// Direction/role qualifier of a connector or connector field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorDirection {
    Potential,
    Flow,
    Stream,
    Input,
    Output,
}

impl fmt::Display for ConnectorDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectorDirection::Potential => "potential",
            ConnectorDirection::Flow => "flow",
            ConnectorDirection::Stream => "stream",
            ConnectorDirection::Input => "input",
            ConnectorDirection::Output => "output",
        };
        write!(f, "{s}")
    }
}

/// `connector RealInput = input Real` — one directed scalar signal.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarConnectorDef {
    pub name: SmolStr,
    pub direction: ConnectorDirection,
    pub ty: QualifiedName,
    pub modifications: Modifications,
    pub doc: Option<String>,
    pub metadata: Option<Value>,
    pub span: Span,
}

/// `connector Pin` with potential/flow/stream fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StructConnectorDef {
    pub name: SmolStr,
    pub fields: IndexMap<SmolStr, ConnectorField>,
    pub doc: Option<String>,
    pub metadata: Option<Value>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorField {
    pub name: SmolStr,
    pub qualifier: ConnectorDirection,
    pub ty: QualifiedName,
    pub dims: Vec<Expression>,
    pub span: Span,
}

/// An inheritance clause: base reference plus value modifications.
#[derive(Debug, Clone, PartialEq)]
pub struct Extends {
    pub base: QualifiedName,
    pub modifications: Modifications,
    pub span: Span,
}

/// A connector member of a component definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorDeclaration {
    pub name: SmolStr,
    pub ty: QualifiedName,
    pub dims: Vec<Expression>,
    pub condition: Option<Expression>,
    pub doc: Option<String>,
    pub metadata: Option<Value>,
    pub span: Span,
}

/// A sub-component member of a component definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDeclaration {
    pub name: SmolStr,
    pub ty: QualifiedName,
    pub modifications: Modifications,
    pub dims: Vec<Expression>,
    pub condition: Option<Expression>,
    pub doc: Option<String>,
    pub metadata: Option<Value>,
    pub span: Span,
}

/// A parameter or variable member of a component or analysis definition.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub name: SmolStr,
    pub ty: QualifiedName,
    /// Declaration value (`parameter R::Resistance = 100`).
    pub default: Option<Expression>,
    pub modifications: Modifications,
    pub dims: Vec<Expression>,
    pub condition: Option<Expression>,
    pub doc: Option<String>,
    pub metadata: Option<Value>,
    pub span: Span,
}

/// A component definition: connectors, sub-components, parameters,
/// variables, and relations, plus inheritance clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDef {
    pub name: SmolStr,
    pub partial: bool,
    pub extends: Vec<Extends>,
    pub connectors: IndexMap<SmolStr, ConnectorDeclaration>,
    pub components: IndexMap<SmolStr, ComponentDeclaration>,
    pub parameters: IndexMap<SmolStr, VariableDeclaration>,
    pub variables: IndexMap<SmolStr, VariableDeclaration>,
    pub relations: Vec<Relation>,
    pub doc: Option<String>,
    pub metadata: Option<Value>,
    pub span: Span,
}

impl ComponentDef {
    /// An empty definition; members and relations are filled in by the
    /// parser collaborator (or by tests).
    pub fn new(name: impl Into<SmolStr>, span: Span) -> Self {
        Self {
            name: name.into(),
            partial: false,
            extends: Vec::new(),
            connectors: IndexMap::new(),
            components: IndexMap::new(),
            parameters: IndexMap::new(),
            variables: IndexMap::new(),
            relations: Vec::new(),
            doc: None,
            metadata: None,
            span,
        }
    }
}

/// An analysis definition: like a component but without connectors.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisDef {
    pub name: SmolStr,
    pub partial: bool,
    pub extends: Vec<Extends>,
    pub components: IndexMap<SmolStr, ComponentDeclaration>,
    pub parameters: IndexMap<SmolStr, VariableDeclaration>,
    pub variables: IndexMap<SmolStr, VariableDeclaration>,
    pub relations: Vec<Relation>,
    pub doc: Option<String>,
    pub metadata: Option<Value>,
    pub span: Span,
}

impl AnalysisDef {
    pub fn new(name: impl Into<SmolStr>, span: Span) -> Self {
        Self {
            name: name.into(),
            partial: false,
            extends: Vec::new(),
            components: IndexMap::new(),
            parameters: IndexMap::new(),
            variables: IndexMap::new(),
            relations: Vec::new(),
            doc: None,
            metadata: None,
            span,
        }
    }
}
