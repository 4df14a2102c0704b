//! # Instantiation
//!
//! Expands a component (or analysis) definition — together with
//! everything it extends — into a fully resolved object graph of
//! connectors, components, parameters, variables, and relations.
//!
//! Inherited members merge with name-collision detection; connection
//! statements consolidate into equivalence classes through a disjoint
//! set; every relation instance carries an [`InstanceContext`] whose
//! tree index addresses its (possibly nested) position deterministically.
//!
//! Instances are immutable value trees created fresh on every call: they
//! hold entities, never references back into the AST.

mod disjoint_set;
mod flatten;
mod model;

pub use disjoint_set::DisjointSet;
pub use flatten::{instantiate_model, instantiate_model_with_comparator};
pub use model::{
    AnalysisPointInstance, ComponentInstance, ConnectorInstance, ConstantInstance,
    ContinuityInstance, InstanceContext, ModelInstance, RelationInstance, TreeIndex,
    VariableInstance,
};
