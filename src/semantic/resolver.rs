//! # Type Resolution
//!
//! Turns declarations into canonical [`ResolvedType`]s: the semantic
//! meaning of a declaration after its base reference is resolved and its
//! modifications are applied. Resolved types form a hierarchy disjoint
//! from the declaration AST and record the originating entity for
//! provenance.
//!
//! Resolution is a pure function of the current forest snapshot; the
//! workspace memoizes results per entity and invalidates them wholesale
//! when the tree is rebuilt.

mod lookup;
mod resolve;
mod types;

pub use lookup::{builtin_entity, builtin_type, is_builtin_name};
pub use resolve::Resolver;
pub(crate) use resolve::display_path;
pub use types::{
    AnalysisType, ComponentType, ConnectorFieldType, ConnectorType, EnumType, FunctionType,
    ResolvedType, ScalarAttribute, ScalarKind, ScalarType, StructType,
};
