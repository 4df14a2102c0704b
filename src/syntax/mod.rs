//! # Syntax
//!
//! AST types for parsed Dyad source: definitions, member declarations,
//! relations, expressions, and modifications.
//!
//! These are the *declaration* shapes handed over by the parser
//! collaborator. The semantic meaning of a declaration — after
//! inheritance and modification merging — lives in the disjoint
//! [`crate::semantic::resolver`] type hierarchy.

pub mod ast;
pub mod source;

pub use ast::{
    AnalysisDef, AnalysisPoint, Assertion, BinaryOp, ComponentDeclaration, ComponentDef,
    ComponentReference, Connection, ConnectorDeclaration, ConnectorDirection, ConnectorField,
    Continuity, Definition, ElseIfClause, EnumCase, EnumTypeDef, Equation, Expression, Extends,
    FieldDeclaration, ForLoop, FunctionParameter, FunctionTypeDef, IfRelation, Modification,
    Modifications, QualifiedName, RefPart, Relation, ScalarConnectorDef, ScalarTypeDef,
    StructConnectorDef, StructTypeDef, SwitchCase, SwitchRelation, UnaryOp, VariableDeclaration,
};
pub use source::SourceFile;
