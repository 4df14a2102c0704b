//! The flattening engine.
//!
//! `instantiate_model` expands a component or analysis definition into a
//! [`ModelInstance`]: inherited members merge first (derived
//! declarations shadow silently, two distinct bases colliding is an
//! `existing-element` problem), then the definition's own relations
//! instantiate in declaration order, each under a unique tree index.
//!
//! Structural errors accumulate as problems on a still-returned partial
//! instance wherever processing can continue; only a missing or
//! wrong-kinded definition fails the whole call.

use indexmap::IndexMap;
use serde_json::Value;
use smol_str::SmolStr;

use crate::base::Entity;
use crate::semantic::modification::apply_modifications;
use crate::semantic::resolver::{ResolvedType, Resolver};
use crate::semantic::types::{Outcome, Problem, kinds};
use crate::syntax::Definition;
use crate::syntax::ast::{
    AnalysisPoint, ComponentDeclaration, ComponentReference, ConnectorDeclaration, Extends,
    Modifications, Relation, SwitchRelation, VariableDeclaration,
};

use super::disjoint_set::DisjointSet;
use super::model::{
    AnalysisPointInstance, ComponentInstance, ConnectorInstance, ContinuityInstance,
    InstanceContext, ModelInstance, RelationInstance, TreeIndex, VariableInstance,
};

/// Instantiate a definition with structural connector-reference equality.
pub fn instantiate_model(
    resolver: &Resolver,
    entity: &Entity,
    mods: &Modifications,
    metadata_override: Option<Value>,
) -> Outcome<ModelInstance> {
    instantiate_model_with_comparator(resolver, entity, mods, metadata_override, |a, b| a == b)
}

/// Instantiate with a caller-supplied equality deciding when two
/// connector references are the same port during connection
/// consolidation.
pub fn instantiate_model_with_comparator(
    resolver: &Resolver,
    entity: &Entity,
    mods: &Modifications,
    metadata_override: Option<Value>,
    connector_eq: impl Fn(&ComponentReference, &ComponentReference) -> bool + 'static,
) -> Outcome<ModelInstance> {
    let mut flattener = Flattener {
        resolver,
        connections: DisjointSet::with_comparator(connector_eq),
        problems: Vec::new(),
    };
    flattener.instantiate(entity, mods, metadata_override)
}

/// What kind of definition is being flattened; analyses have no
/// connectors but otherwise instantiate identically.
#[derive(Clone, Copy, PartialEq)]
enum DefKind {
    Component,
    Analysis,
}

/// A borrowed view over the parts shared by component and analysis
/// definitions.
struct DefParts<'d> {
    kind: DefKind,
    partial: bool,
    extends: &'d [Extends],
    connectors: Option<&'d IndexMap<SmolStr, ConnectorDeclaration>>,
    components: &'d IndexMap<SmolStr, ComponentDeclaration>,
    parameters: &'d IndexMap<SmolStr, VariableDeclaration>,
    variables: &'d IndexMap<SmolStr, VariableDeclaration>,
    relations: &'d [Relation],
    doc: Option<&'d str>,
    metadata: Option<&'d Value>,
}

impl<'d> DefParts<'d> {
    fn of(def: &'d Definition) -> Option<Self> {
        match def {
            Definition::Component(d) => Some(Self {
                kind: DefKind::Component,
                partial: d.partial,
                extends: &d.extends,
                connectors: Some(&d.connectors),
                components: &d.components,
                parameters: &d.parameters,
                variables: &d.variables,
                relations: &d.relations,
                doc: d.doc.as_deref(),
                metadata: d.metadata.as_ref(),
            }),
            Definition::Analysis(d) => Some(Self {
                kind: DefKind::Analysis,
                partial: d.partial,
                extends: &d.extends,
                connectors: None,
                components: &d.components,
                parameters: &d.parameters,
                variables: &d.variables,
                relations: &d.relations,
                doc: d.doc.as_deref(),
                metadata: d.metadata.as_ref(),
            }),
            _ => None,
        }
    }
}

struct Flattener<'a> {
    resolver: &'a Resolver<'a>,
    connections: DisjointSet<ComponentReference>,
    problems: Vec<Problem>,
}

impl<'a> Flattener<'a> {
    fn instantiate(
        &mut self,
        entity: &Entity,
        mods: &Modifications,
        metadata_override: Option<Value>,
    ) -> Outcome<ModelInstance> {
        let Some(def) = self.resolver.definition(entity) else {
            return Outcome::failure(
                Problem::error(kinds::MISSING_DEFINITION, "Missing definition")
                    .with_details(format!("cannot instantiate `{entity}`: no such definition"))
                    .with_instance(entity.clone()),
            );
        };
        let Some(parts) = DefParts::of(def) else {
            return Outcome::failure(
                Problem::error(kinds::INVALID_ENTITY, "Not instantiable")
                    .with_details(format!(
                        "`{entity}` is a {}, not a component or analysis",
                        def.kind_name()
                    ))
                    .with_instance(entity.clone()),
            );
        };

        tracing::debug!(entity = %entity, "instantiating model");

        let mut instance = ModelInstance::new(entity.clone());
        instance.partial = parts.partial;
        instance.doc = parts.doc.map(str::to_string);
        instance.metadata = metadata_override.or_else(|| parts.metadata.cloned());

        // Own members first: derived declarations shadow inherited ones.
        if let Some(connectors) = parts.connectors {
            for decl in connectors.values() {
                self.add_connector(&mut instance, decl, entity);
            }
        }
        for decl in parts.components.values() {
            self.add_component(&mut instance, decl, entity);
        }
        for decl in parts.parameters.values() {
            self.add_variable(&mut instance, decl, entity, true);
        }
        for decl in parts.variables.values() {
            self.add_variable(&mut instance, decl, entity, false);
        }

        // Inherited members, in extends order.
        for extends in parts.extends {
            self.merge_extends(&mut instance, extends, entity, parts.kind);
        }

        // Declaration-value overrides supplied by the caller.
        self.apply_instance_modifications(&mut instance, mods, entity);

        // Own relations, behind every inherited relation.
        self.add_relations(&mut instance, parts.relations, entity);

        instance.connection_sets = self
            .connections
            .sets()
            .into_iter()
            .map(|set| set.into_iter().cloned().collect())
            .collect();

        Outcome::from_parts(Some(instance), std::mem::take(&mut self.problems))
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    fn add_connector(
        &mut self,
        instance: &mut ModelInstance,
        decl: &ConnectorDeclaration,
        origin: &Entity,
    ) {
        let resolved = self.resolver.resolve_reference(&decl.ty, origin);
        let (value, mut problems) = resolved.into_parts();
        self.problems.append(&mut problems);
        match value {
            Some(ResolvedType::Connector(ty)) => {
                instance.connectors.insert(
                    decl.name.clone(),
                    ConnectorInstance {
                        name: decl.name.clone(),
                        ty,
                        dims: decl.dims.clone(),
                        condition: decl.condition.clone(),
                        origin: origin.clone(),
                        doc: decl.doc.clone(),
                        metadata: decl.metadata.clone(),
                    },
                );
            }
            Some(other) => {
                let mut problem = Problem::error(kinds::INVALID_ENTITY, "Invalid connector type")
                    .with_details(format!(
                        "`{}` must be a connector, found {}",
                        decl.ty,
                        other.kind_name()
                    ))
                    .with_instance(origin.clone());
                if let Some(location) = self.resolver.locate(origin, decl.span) {
                    problem.location = Some(location);
                }
                self.problems.push(problem);
            }
            None => {}
        }
    }

    fn add_component(
        &mut self,
        instance: &mut ModelInstance,
        decl: &ComponentDeclaration,
        origin: &Entity,
    ) {
        let resolved = self.resolver.resolve_reference(&decl.ty, origin);
        let (value, mut problems) = resolved.into_parts();
        self.problems.append(&mut problems);
        match value {
            Some(ResolvedType::Component(ty)) => {
                if ty.partial {
                    let mut problem =
                        Problem::error(kinds::PARTIAL_DEFINITION, "Partial component used")
                            .with_details(format!(
                                "`{}` is partial and cannot be used as a concrete sub-component",
                                decl.ty
                            ))
                            .with_instance(ty.origin.clone());
                    if let Some(location) = self.resolver.locate(origin, decl.span) {
                        problem.location = Some(location);
                    }
                    self.problems.push(problem);
                }
                instance.components.insert(
                    decl.name.clone(),
                    ComponentInstance {
                        name: decl.name.clone(),
                        definition: ty.origin,
                        modifications: decl.modifications.clone(),
                        dims: decl.dims.clone(),
                        condition: decl.condition.clone(),
                        origin: origin.clone(),
                        doc: decl.doc.clone(),
                        metadata: decl.metadata.clone(),
                    },
                );
            }
            Some(other) => {
                let mut problem = Problem::error(kinds::INVALID_ENTITY, "Invalid component type")
                    .with_details(format!(
                        "`{}` must be a component, found {}",
                        decl.ty,
                        other.kind_name()
                    ))
                    .with_instance(origin.clone());
                if let Some(location) = self.resolver.locate(origin, decl.span) {
                    problem.location = Some(location);
                }
                self.problems.push(problem);
            }
            None => {}
        }
    }

    fn add_variable(
        &mut self,
        instance: &mut ModelInstance,
        decl: &VariableDeclaration,
        origin: &Entity,
        parameter: bool,
    ) {
        let resolved = self
            .resolver
            .resolve_reference(&decl.ty, origin)
            .chain(|ty| {
                if decl.modifications.is_empty() {
                    Outcome::Success(ty)
                } else {
                    apply_modifications(ty, &decl.modifications, origin)
                }
            });
        let (value, mut problems) = resolved.into_parts();
        self.problems.append(&mut problems);
        let Some(ty) = value else { return };

        let member = VariableInstance {
            name: decl.name.clone(),
            ty,
            default: decl.default.clone(),
            dims: decl.dims.clone(),
            condition: decl.condition.clone(),
            origin: origin.clone(),
            doc: decl.doc.clone(),
            metadata: decl.metadata.clone(),
        };
        if parameter {
            instance.parameters.insert(decl.name.clone(), member);
        } else {
            instance.variables.insert(decl.name.clone(), member);
        }
    }

    // ------------------------------------------------------------------
    // Inheritance
    // ------------------------------------------------------------------

    fn merge_extends(
        &mut self,
        instance: &mut ModelInstance,
        extends: &Extends,
        derived: &Entity,
        kind: DefKind,
    ) {
        let lookup = self.resolver.lookup_type(&extends.base, derived);
        let (base_entity, mut problems) = lookup.into_parts();
        self.problems.append(&mut problems);
        let Some(base_entity) = base_entity else { return };

        let base_kind = self
            .resolver
            .definition(&base_entity)
            .and_then(|def| DefParts::of(def).map(|p| p.kind));
        if base_kind != Some(kind) {
            let mut problem = Problem::error(kinds::INVALID_ENTITY, "Invalid base")
                .with_details(format!(
                    "`{}` cannot extend `{}`: the base is not the same kind of definition",
                    derived, extends.base
                ))
                .with_instance(derived.clone());
            if let Some(location) = self.resolver.locate(derived, extends.span) {
                problem.location = Some(location);
            }
            self.problems.push(problem);
            return;
        }

        // A fresh flattener per base: its connection sets are discarded
        // and re-consolidated here across the merged relation list.
        let base_outcome =
            instantiate_model(self.resolver, &base_entity, &extends.modifications, None);
        let (base, mut problems) = base_outcome.into_parts();
        self.problems.append(&mut problems);
        let Some(base) = base else { return };

        self.merge_base(instance, base, derived);
    }

    fn merge_base(&mut self, instance: &mut ModelInstance, base: ModelInstance, derived: &Entity) {
        let offset = instance.root_positions;

        let problems = &mut self.problems;
        let base_entity = &base.self_entity;

        merge_members(
            &mut instance.connectors,
            base.connectors,
            "connector",
            |member| &member.origin,
            derived,
            base_entity,
            problems,
        );
        merge_members(
            &mut instance.components,
            base.components,
            "component",
            |member| &member.origin,
            derived,
            base_entity,
            problems,
        );
        merge_members(
            &mut instance.parameters,
            base.parameters,
            "parameter",
            |member| &member.origin,
            derived,
            base_entity,
            problems,
        );
        merge_members(
            &mut instance.variables,
            base.variables,
            "variable",
            |member| &member.origin,
            derived,
            base_entity,
            problems,
        );

        for mut relation in base.relations {
            relation.shift_root(offset);
            self.consolidate_connections(&relation);
            instance.relations.push(relation);
        }
        for mut continuity in base.continuity {
            continuity.context.tree_index.shift_root(offset);
            instance.continuity.push(continuity);
        }
        for (name, mut point) in base.analysis_points {
            point.context.tree_index.shift_root(offset);
            if instance.analysis_points.contains_key(&name) {
                self.problems.push(
                    Problem::error(kinds::EXISTING_ANALYSIS_POINT, "Duplicate analysis point")
                        .with_details(format!(
                            "analysis point `{name}` inherited from `{base_entity}` is already declared"
                        ))
                        .with_instance(derived.clone()),
                );
            } else {
                instance.analysis_points.insert(name, point);
            }
        }

        instance.root_positions += base.root_positions;
    }

    /// Record caller-supplied value overrides on matching members.
    /// With no `redeclare` in the language, modifications can only
    /// change declaration values and sub-component modifications.
    fn apply_instance_modifications(
        &mut self,
        instance: &mut ModelInstance,
        mods: &Modifications,
        entity: &Entity,
    ) {
        for (name, modification) in mods {
            if let Some(member) = instance
                .parameters
                .get_mut(name)
                .or_else(|| instance.variables.get_mut(name))
            {
                if let Some(expr) = &modification.expr {
                    member.default = Some(expr.clone());
                }
                continue;
            }
            if let Some(member) = instance.components.get_mut(name) {
                if let Some(nested) = &modification.nested {
                    for (key, sub) in nested {
                        member.modifications.insert(key.clone(), sub.clone());
                    }
                }
                continue;
            }
            self.problems.push(
                Problem::warning(kinds::MISSING_DEFINITION, "Unknown modification target")
                    .with_details(format!("`{entity}` has no member named `{name}`"))
                    .with_instance(entity.clone()),
            );
        }
    }

    // ------------------------------------------------------------------
    // Relations
    // ------------------------------------------------------------------

    fn add_relations(
        &mut self,
        instance: &mut ModelInstance,
        relations: &[Relation],
        origin: &Entity,
    ) {
        for relation in relations {
            let position = instance.root_positions;
            instance.root_positions += 1;
            let context = InstanceContext::new(origin.clone(), TreeIndex::root(position));
            let outcome = self.instantiate_relation(relation, context, relations, instance);
            let (value, mut problems) = outcome.into_parts();
            self.problems.append(&mut problems);
            if let Some(Some(relation_instance)) = value {
                instance.relations.push(relation_instance);
            }
        }
    }

    /// Instantiate one relation under `context`. Continuity statements
    /// and analysis points land in their own instance lists and return
    /// no relation instance.
    fn instantiate_relation(
        &mut self,
        relation: &Relation,
        context: InstanceContext,
        siblings: &[Relation],
        instance: &mut ModelInstance,
    ) -> Outcome<Option<RelationInstance>> {
        match relation {
            Relation::Equation(equation) => Outcome::Success(Some(RelationInstance::Equation {
                equation: equation.clone(),
                context,
            })),
            Relation::Assertion(assertion) => Outcome::Success(Some(RelationInstance::Assertion {
                assertion: assertion.clone(),
                context,
            })),
            Relation::Connection(connection) => {
                let relation_instance = RelationInstance::Connection {
                    refs: connection.refs.clone(),
                    context,
                };
                self.consolidate_connections(&relation_instance);
                Outcome::Success(Some(relation_instance))
            }
            Relation::Continuity(continuity) => {
                instance.continuity.push(ContinuityInstance {
                    refs: continuity.refs.clone(),
                    context,
                });
                Outcome::Success(None)
            }
            Relation::AnalysisPoint(point) => self.add_analysis_point(
                instance,
                point,
                context,
                siblings,
            ),
            Relation::ForLoop(for_loop) => self
                .instantiate_nested(
                    &for_loop.body,
                    &context.tree_index,
                    None,
                    &context.origin,
                    siblings,
                    instance,
                )
                .map(|body| {
                    Some(RelationInstance::ForLoop {
                        index: for_loop.index.clone(),
                        range: for_loop.range.clone(),
                        body,
                        context,
                    })
                }),
            Relation::If(if_relation) => {
                let yes = self.instantiate_nested(
                    &if_relation.yes,
                    &context.tree_index,
                    Some(0),
                    &context.origin,
                    siblings,
                    instance,
                );
                let else_ifs = Outcome::combine(if_relation.else_ifs.iter().enumerate().map(
                    |(i, clause)| {
                        self.instantiate_nested(
                            &clause.body,
                            &context.tree_index,
                            Some(1 + i),
                            &context.origin,
                            siblings,
                            instance,
                        )
                        .map(|body| (clause.condition.clone(), body))
                    },
                ));
                let else_body = self.instantiate_nested(
                    &if_relation.else_body,
                    &context.tree_index,
                    Some(1 + if_relation.else_ifs.len()),
                    &context.origin,
                    siblings,
                    instance,
                );

                // Every branch group must instantiate for the statement
                // to survive.
                let (yes, problems_yes) = yes.into_parts();
                let (else_ifs, problems_elseifs) = else_ifs.into_parts();
                let (else_body, problems_else) = else_body.into_parts();
                let problems = [problems_yes, problems_elseifs, problems_else].concat();
                match (yes, else_ifs, else_body) {
                    (Some(yes), Some(else_ifs), Some(else_body)) => Outcome::from_parts(
                        Some(Some(RelationInstance::If {
                            condition: if_relation.condition.clone(),
                            yes,
                            else_ifs,
                            else_body,
                            context,
                        })),
                        problems,
                    ),
                    _ => Outcome::Failure(problems),
                }
            }
            Relation::Switch(switch) => self.instantiate_switch(switch, context, siblings, instance),
        }
    }

    fn instantiate_nested(
        &mut self,
        body: &[Relation],
        parent: &TreeIndex,
        branch: Option<usize>,
        origin: &Entity,
        siblings: &[Relation],
        instance: &mut ModelInstance,
    ) -> Outcome<Vec<RelationInstance>> {
        let base = match branch {
            Some(segment) => parent.child(segment),
            None => parent.clone(),
        };
        let outcomes: Vec<Outcome<Option<RelationInstance>>> = body
            .iter()
            .enumerate()
            .map(|(position, relation)| {
                let context = InstanceContext::new(origin.clone(), base.child(position));
                self.instantiate_relation(relation, context, siblings, instance)
            })
            .collect();
        Outcome::combine(outcomes).map(|nested| nested.into_iter().flatten().collect())
    }

    fn add_analysis_point(
        &mut self,
        instance: &mut ModelInstance,
        point: &AnalysisPoint,
        context: InstanceContext,
        siblings: &[Relation],
    ) -> Outcome<Option<RelationInstance>> {
        let locate = |mut problem: Problem| {
            if let Some(location) = self.resolver.locate(&context.origin, point.span) {
                problem.location = Some(location);
            }
            problem
        };

        if point.refs.len() != 2 {
            return Outcome::Partial(
                None,
                vec![locate(
                    Problem::error(kinds::INVALID_ANALYSIS_POINT, "Invalid analysis point")
                        .with_details(format!(
                            "analysis point `{}` requires exactly two connector references, found {}",
                            point.name,
                            point.refs.len()
                        ))
                        .with_instance(context.origin.clone()),
                )],
            );
        }

        let a = point.refs[0].to_string();
        let b = point.refs[1].to_string();
        if !has_connection_pair(siblings, &a, &b) {
            return Outcome::Partial(
                None,
                vec![locate(
                    Problem::error(kinds::INVALID_ANALYSIS_POINT, "Invalid analysis point")
                        .with_details(format!(
                            "analysis point `{}` names `{a}` and `{b}`, but no connect statement pairs them",
                            point.name
                        ))
                        .with_instance(context.origin.clone()),
                )],
            );
        }

        if instance.analysis_points.contains_key(&point.name) {
            return Outcome::Partial(
                None,
                vec![locate(
                    Problem::error(kinds::EXISTING_ANALYSIS_POINT, "Duplicate analysis point")
                        .with_details(format!(
                            "analysis point `{}` is already declared in this instance",
                            point.name
                        ))
                        .with_instance(context.origin.clone()),
                )],
            );
        }

        instance.analysis_points.insert(
            point.name.clone(),
            AnalysisPointInstance {
                name: point.name.clone(),
                refs: point.refs.clone(),
                context,
            },
        );
        Outcome::Success(None)
    }

    fn instantiate_switch(
        &mut self,
        switch: &SwitchRelation,
        context: InstanceContext,
        siblings: &[Relation],
        instance: &mut ModelInstance,
    ) -> Outcome<Option<RelationInstance>> {
        let locate = |resolver: &Resolver, mut problem: Problem| {
            if let Some(location) = resolver.locate(&context.origin, switch.span) {
                problem.location = Some(location);
            }
            problem
        };

        let discriminant = match switch.discriminant.as_reference() {
            Some(reference) if reference.is_simple() => reference.clone(),
            _ => {
                return Outcome::failure(locate(
                    self.resolver,
                    Problem::error(kinds::UNEXPECTED_TYPE, "Invalid switch discriminant")
                        .with_details(format!(
                            "switch discriminant `{}` must be a simple connector or variable reference",
                            switch.discriminant
                        ))
                        .with_instance(context.origin.clone()),
                ));
            }
        };

        let name = discriminant.root_name();
        let member_ty = instance
            .connectors
            .get(name)
            .map(|_| None)
            .or_else(|| instance.components.get(name).map(|_| None))
            .or_else(|| {
                instance
                    .parameters
                    .get(name)
                    .or_else(|| instance.variables.get(name))
                    .map(|member| member.ty.unwrapped().as_enum().map(|_| ()))
            });
        match member_ty {
            Some(Some(())) => {}
            Some(None) => {
                return Outcome::failure(locate(
                    self.resolver,
                    Problem::error(kinds::UNEXPECTED_TYPE, "Invalid switch discriminant")
                        .with_details(format!(
                            "switch discriminant `{name}` must resolve to a variable of enum type"
                        ))
                        .with_instance(context.origin.clone()),
                ));
            }
            None => {
                return Outcome::failure(locate(
                    self.resolver,
                    Problem::error(kinds::MISSING_DEFINITION, "Unknown switch discriminant")
                        .with_details(format!("`{name}` is not a member of this model"))
                        .with_instance(context.origin.clone()),
                ));
            }
        }

        let cases = Outcome::combine(switch.cases.iter().enumerate().map(|(ordinal, case)| {
            self.instantiate_nested(
                &case.body,
                &context.tree_index,
                Some(ordinal),
                &context.origin,
                siblings,
                instance,
            )
            .map(|body| (case.case.clone(), body))
        }));
        cases.map(|cases| {
            Some(RelationInstance::Switch {
                discriminant,
                cases,
                context,
            })
        })
    }

    // ------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------

    /// Feed every connect statement in a relation subtree into the
    /// union–find structure.
    fn consolidate_connections(&mut self, relation: &RelationInstance) {
        if let RelationInstance::Connection { refs, .. } = relation {
            for reference in refs {
                if !self.connections.contains(reference) {
                    self.connections.add(reference.clone());
                }
            }
            let refs: Vec<&ComponentReference> = refs.iter().collect();
            self.connections.multi_join(&refs);
        }
        for child in relation.children() {
            self.consolidate_connections(child);
        }
    }
}

/// Insert-or-conflict merge for one member map. Derived declarations
/// shadow silently; a collision between two distinct bases is an
/// `existing-element` problem and the earlier binding wins.
fn merge_members<M>(
    into: &mut IndexMap<SmolStr, M>,
    from: IndexMap<SmolStr, M>,
    member_kind: &str,
    origin_of: fn(&M) -> &Entity,
    derived: &Entity,
    base: &Entity,
    problems: &mut Vec<Problem>,
) {
    for (name, member) in from {
        match into.get(&name) {
            None => {
                into.insert(name, member);
            }
            Some(existing) => {
                let existing_origin = origin_of(existing);
                let incoming_origin = origin_of(&member);
                // The same ancestor arriving twice through a diamond is
                // not a conflict, and neither is a derived shadow.
                if existing_origin == derived || existing_origin == incoming_origin {
                    continue;
                }
                problems.push(
                    Problem::error(kinds::EXISTING_ELEMENT, "Conflicting inherited member")
                        .with_details(format!(
                            "{member_kind} `{name}` is contributed by both `{existing_origin}` and `{incoming_origin}` (via `{base}`)"
                        ))
                        .with_instance(derived.clone()),
                );
            }
        }
    }
}

/// Whether any connect statement in `relations` (nested included) pairs
/// the two references, compared by unparsed textual identity.
fn has_connection_pair(relations: &[Relation], a: &str, b: &str) -> bool {
    relations.iter().any(|relation| match relation {
        Relation::Connection(connection) => {
            let mut saw_a = false;
            let mut saw_b = false;
            for reference in &connection.refs {
                let text = reference.to_string();
                saw_a |= text == a;
                saw_b |= text == b;
            }
            saw_a && saw_b
        }
        Relation::ForLoop(for_loop) => has_connection_pair(&for_loop.body, a, b),
        Relation::If(if_relation) => {
            has_connection_pair(&if_relation.yes, a, b)
                || if_relation
                    .else_ifs
                    .iter()
                    .any(|clause| has_connection_pair(&clause.body, a, b))
                || has_connection_pair(&if_relation.else_body, a, b)
        }
        Relation::Switch(switch) => switch
            .cases
            .iter()
            .any(|case| has_connection_pair(&case.body, a, b)),
        _ => false,
    })
}
