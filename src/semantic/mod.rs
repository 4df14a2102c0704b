//! # Semantic Analysis
//!
//! The semantic model of the Dyad compiler: a recomputable attribute
//! index over the workspace forest, a memoized type-resolution engine,
//! modification merging, and the model instantiation ("flattening")
//! engine that expands a component definition together with everything
//! it extends into a fully resolved object graph.

pub mod index;
pub mod instantiate;
pub mod modification;
pub mod resolver;
pub mod symbols;
pub mod types;
pub mod workspace;

pub use index::{AttributeIndex, RelatedEntities};
pub use instantiate::{
    ComponentInstance, ConnectorInstance, ConstantInstance, DisjointSet, InstanceContext,
    ModelInstance, RelationInstance, TreeIndex, VariableInstance,
};
pub use modification::apply_modifications;
pub use resolver::{ResolvedType, Resolver};
pub use symbols::{SymbolTarget, resolve_symbol};
pub use types::{
    CompilerAssertion, Outcome, Problem, Severity, WorkspaceEvent, unique_problems,
};
pub use workspace::{QueryContext, Transaction, Workspace};
