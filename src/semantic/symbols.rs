//! # Symbol Resolution
//!
//! Resolves a bare identifier, in the context of a definition, to a
//! declared member or a global constant.
//!
//! The search instantiates the context definition memo-free and probes,
//! in order: connectors, components (forcing the member's lazy model
//! expansion), parameters, then variables; the fixed global table
//! (`time`, `π`/`pi`) is the fallback. No match is a
//! `missing-definition` failure — name existence is the front end's job,
//! so reaching that failure indicates a caller bug.

use crate::base::Entity;
use crate::semantic::instantiate::{
    ComponentInstance, ConnectorInstance, ConstantInstance, ModelInstance, VariableInstance,
    instantiate_model,
};
use crate::semantic::resolver::{ResolvedType, Resolver, ScalarKind, ScalarType};
use crate::semantic::types::{Outcome, Problem, kinds};
use crate::syntax::ast::{Expression, Modifications};

/// What a name resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolTarget {
    Connector(ConnectorInstance),
    /// The member and its forced model expansion.
    Component(ComponentInstance, Box<ModelInstance>),
    Parameter(VariableInstance),
    Variable(VariableInstance),
    Constant(ConstantInstance),
}

/// Resolve `name` against the members of `context`, falling back to the
/// global constant table.
pub fn resolve_symbol(resolver: &Resolver, name: &str, context: &Entity) -> Outcome<SymbolTarget> {
    instantiate_model(resolver, context, &Modifications::new(), None)
        .chain(|instance| match lookup_member(resolver, &instance, name) {
            Some(outcome) => outcome,
            None => match global_constant(name) {
                Some(constant) => Outcome::Success(SymbolTarget::Constant(constant)),
                None => Outcome::failure(
                    Problem::error(kinds::MISSING_DEFINITION, "Unknown symbol")
                        .with_details(format!("`{name}` is not a member of `{context}`"))
                        .with_instance(context.clone()),
                ),
            },
        })
}

fn lookup_member(
    resolver: &Resolver,
    instance: &ModelInstance,
    name: &str,
) -> Option<Outcome<SymbolTarget>> {
    if let Some(connector) = instance.connectors.get(name) {
        return Some(Outcome::Success(SymbolTarget::Connector(connector.clone())));
    }
    if let Some(component) = instance.components.get(name) {
        // Force the member's expansion: the instance only holds the
        // definition entity.
        let forced = instantiate_model(
            resolver,
            &component.definition,
            &component.modifications,
            None,
        );
        let component = component.clone();
        return Some(
            forced.map(|model| SymbolTarget::Component(component, Box::new(model))),
        );
    }
    if let Some(parameter) = instance.parameters.get(name) {
        return Some(Outcome::Success(SymbolTarget::Parameter(parameter.clone())));
    }
    if let Some(variable) = instance.variables.get(name) {
        return Some(Outcome::Success(SymbolTarget::Variable(variable.clone())));
    }
    None
}

/// The fixed global constant table.
fn global_constant(name: &str) -> Option<ConstantInstance> {
    let real = ResolvedType::Scalar(ScalarType::builtin(ScalarKind::Real));
    match name {
        "time" => Some(ConstantInstance {
            name: "time".into(),
            ty: real,
            value: None,
        }),
        "π" | "pi" => Some(ConstantInstance {
            name: name.into(),
            ty: real,
            value: Some(Expression::RealLiteral(std::f64::consts::PI)),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_table() {
        assert!(global_constant("time").is_some());
        let pi = global_constant("π").unwrap();
        assert_eq!(
            pi.value,
            Some(Expression::RealLiteral(std::f64::consts::PI))
        );
        assert!(global_constant("pi").is_some());
        assert!(global_constant("tau").is_none());
    }
}
