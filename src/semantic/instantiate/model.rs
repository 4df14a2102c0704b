//! Flattened instance types.

use indexmap::IndexMap;
use serde_json::Value;
use smol_str::SmolStr;
use std::fmt;

use crate::base::Entity;
use crate::semantic::resolver::{ConnectorType, ResolvedType};
use crate::syntax::ast::{
    Assertion, ComponentReference, Equation, Expression, Modifications,
};

/// Position of a relation instance in the (possibly nested) relation
/// tree of one instantiated model. Stable and unique per instance, so
/// diagnostics and code generators can address any nested statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeIndex(Vec<usize>);

impl TreeIndex {
    /// The index of a top-level relation at `position`.
    pub fn root(position: usize) -> Self {
        Self(vec![position])
    }

    /// Extend with one nested path segment.
    pub fn child(&self, segment: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment);
        Self(segments)
    }

    pub fn segments(&self) -> &[usize] {
        &self.0
    }

    /// Renumber the top-level segment when merging inherited relations
    /// behind already-placed ones.
    pub(crate) fn shift_root(&mut self, offset: usize) {
        if let Some(first) = self.0.first_mut() {
            *first += offset;
        }
    }
}

impl fmt::Display for TreeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Provenance of a relation instance: the definition it came from and
/// its position in that definition's relation tree.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceContext {
    pub origin: Entity,
    pub tree_index: TreeIndex,
}

impl InstanceContext {
    pub fn new(origin: Entity, tree_index: TreeIndex) -> Self {
        Self { origin, tree_index }
    }
}

/// A connector member of an instantiated model.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorInstance {
    pub name: SmolStr,
    pub ty: ConnectorType,
    pub dims: Vec<Expression>,
    pub condition: Option<Expression>,
    /// The definition that declared this member (derived or base).
    pub origin: Entity,
    pub doc: Option<String>,
    pub metadata: Option<Value>,
}

/// A sub-component member. The member's own model is not expanded here:
/// holding the definition entity keeps the expansion lazy, and symbol
/// resolution forces it on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentInstance {
    pub name: SmolStr,
    /// The component definition this member instantiates.
    pub definition: Entity,
    pub modifications: Modifications,
    pub dims: Vec<Expression>,
    pub condition: Option<Expression>,
    pub origin: Entity,
    pub doc: Option<String>,
    pub metadata: Option<Value>,
}

/// A parameter or variable member.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInstance {
    pub name: SmolStr,
    pub ty: ResolvedType,
    /// Declaration value (`parameter R::Resistance = 100`).
    pub default: Option<Expression>,
    pub dims: Vec<Expression>,
    pub condition: Option<Expression>,
    pub origin: Entity,
    pub doc: Option<String>,
    pub metadata: Option<Value>,
}

/// A global constant (`time`, `π`).
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantInstance {
    pub name: SmolStr,
    pub ty: ResolvedType,
    pub value: Option<Expression>,
}

/// A continuity statement carried through to downstream consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuityInstance {
    pub refs: Vec<ComponentReference>,
    pub context: InstanceContext,
}

/// A named analysis-point marker over an existing connection.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPointInstance {
    pub name: SmolStr,
    pub refs: Vec<ComponentReference>,
    pub context: InstanceContext,
}

/// One instantiated relation, tagged with its provenance and nested
/// position.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationInstance {
    Equation {
        equation: Equation,
        context: InstanceContext,
    },
    Assertion {
        assertion: Assertion,
        context: InstanceContext,
    },
    Connection {
        refs: Vec<ComponentReference>,
        context: InstanceContext,
    },
    ForLoop {
        index: SmolStr,
        range: Expression,
        body: Vec<RelationInstance>,
        context: InstanceContext,
    },
    If {
        condition: Expression,
        yes: Vec<RelationInstance>,
        else_ifs: Vec<(Expression, Vec<RelationInstance>)>,
        else_body: Vec<RelationInstance>,
        context: InstanceContext,
    },
    Switch {
        discriminant: ComponentReference,
        cases: Vec<(SmolStr, Vec<RelationInstance>)>,
        context: InstanceContext,
    },
}

impl RelationInstance {
    pub fn context(&self) -> &InstanceContext {
        match self {
            RelationInstance::Equation { context, .. }
            | RelationInstance::Assertion { context, .. }
            | RelationInstance::Connection { context, .. }
            | RelationInstance::ForLoop { context, .. }
            | RelationInstance::If { context, .. }
            | RelationInstance::Switch { context, .. } => context,
        }
    }

    /// The directly nested relation instances, in branch order.
    pub fn children(&self) -> Box<dyn Iterator<Item = &RelationInstance> + '_> {
        match self {
            RelationInstance::ForLoop { body, .. } => Box::new(body.iter()),
            RelationInstance::If {
                yes,
                else_ifs,
                else_body,
                ..
            } => Box::new(
                yes.iter()
                    .chain(else_ifs.iter().flat_map(|(_, body)| body.iter()))
                    .chain(else_body.iter()),
            ),
            RelationInstance::Switch { cases, .. } => {
                Box::new(cases.iter().flat_map(|(_, body)| body.iter()))
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    fn find(&self, index: &TreeIndex) -> Option<&RelationInstance> {
        if self.context().tree_index == *index {
            return Some(self);
        }
        self.children().find_map(|relation| relation.find(index))
    }

    pub(crate) fn shift_root(&mut self, offset: usize) {
        match self {
            RelationInstance::Equation { context, .. }
            | RelationInstance::Assertion { context, .. }
            | RelationInstance::Connection { context, .. } => {
                context.tree_index.shift_root(offset);
            }
            RelationInstance::ForLoop { body, context, .. } => {
                context.tree_index.shift_root(offset);
                for relation in body {
                    relation.shift_root(offset);
                }
            }
            RelationInstance::If {
                yes,
                else_ifs,
                else_body,
                context,
                ..
            } => {
                context.tree_index.shift_root(offset);
                for relation in yes {
                    relation.shift_root(offset);
                }
                for (_, body) in else_ifs {
                    for relation in body {
                        relation.shift_root(offset);
                    }
                }
                for relation in else_body {
                    relation.shift_root(offset);
                }
            }
            RelationInstance::Switch { cases, context, .. } => {
                context.tree_index.shift_root(offset);
                for (_, body) in cases {
                    for relation in body {
                        relation.shift_root(offset);
                    }
                }
            }
        }
    }
}

/// The output of instantiation: one fully resolved object graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInstance {
    /// The definition this instance was flattened from.
    pub self_entity: Entity,
    pub partial: bool,
    pub connectors: IndexMap<SmolStr, ConnectorInstance>,
    pub components: IndexMap<SmolStr, ComponentInstance>,
    pub parameters: IndexMap<SmolStr, VariableInstance>,
    pub variables: IndexMap<SmolStr, VariableInstance>,
    pub relations: Vec<RelationInstance>,
    pub continuity: Vec<ContinuityInstance>,
    pub analysis_points: IndexMap<SmolStr, AnalysisPointInstance>,
    /// Connection equivalence classes after union–find consolidation.
    pub connection_sets: Vec<Vec<ComponentReference>>,
    pub doc: Option<String>,
    pub metadata: Option<Value>,
    /// Top-level relation positions assigned so far; inherited relations
    /// are renumbered past this watermark when instances merge.
    pub(crate) root_positions: usize,
}

impl ModelInstance {
    pub fn new(self_entity: Entity) -> Self {
        Self {
            self_entity,
            partial: false,
            connectors: IndexMap::new(),
            components: IndexMap::new(),
            parameters: IndexMap::new(),
            variables: IndexMap::new(),
            relations: Vec::new(),
            continuity: Vec::new(),
            analysis_points: IndexMap::new(),
            connection_sets: Vec::new(),
            doc: None,
            metadata: None,
            root_positions: 0,
        }
    }

    /// Address a (possibly nested) relation instance by tree index.
    pub fn relation_at(&self, index: &TreeIndex) -> Option<&RelationInstance> {
        self.relations
            .iter()
            .find_map(|relation| relation.find(index))
    }

    /// Every relation instance in the model, depth first, nested
    /// included.
    pub fn all_relations(&self) -> Vec<&RelationInstance> {
        fn collect<'a>(relation: &'a RelationInstance, out: &mut Vec<&'a RelationInstance>) {
            out.push(relation);
            for child in relation.children() {
                collect(child, out);
            }
        }
        let mut all = Vec::new();
        for relation in &self.relations {
            collect(relation, &mut all);
        }
        all
    }

    pub fn member_names(&self) -> impl Iterator<Item = &SmolStr> {
        self.connectors
            .keys()
            .chain(self.components.keys())
            .chain(self.parameters.keys())
            .chain(self.variables.keys())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_index_paths() {
        let root = TreeIndex::root(2);
        assert_eq!(root.segments(), &[2]);
        let nested = root.child(0).child(3);
        assert_eq!(nested.segments(), &[2, 0, 3]);
        assert_eq!(nested.to_string(), "2.0.3");
    }

    #[test]
    fn test_shift_root_moves_only_first_segment() {
        let mut index = TreeIndex::root(1).child(4);
        index.shift_root(10);
        assert_eq!(index.segments(), &[11, 4]);
    }
}
