//! AST node types for Dyad declarations.

pub mod definitions;
pub mod expressions;
pub mod modifications;
pub mod relations;

pub use definitions::{
    AnalysisDef, ComponentDeclaration, ComponentDef, ConnectorDeclaration, ConnectorDirection,
    ConnectorField, Definition, EnumCase, EnumTypeDef, Extends, FieldDeclaration,
    FunctionParameter, FunctionTypeDef, QualifiedName, ScalarConnectorDef, ScalarTypeDef,
    StructConnectorDef, StructTypeDef, VariableDeclaration,
};
pub use expressions::{BinaryOp, ComponentReference, Expression, RefPart, UnaryOp};
pub use modifications::{Modification, Modifications};
pub use relations::{
    AnalysisPoint, Assertion, Connection, Continuity, ElseIfClause, Equation, ForLoop, IfRelation,
    Relation, SwitchCase, SwitchRelation,
};
