//! # Modification Engine
//!
//! Applies a set of key/value overrides to a resolved type. `final`
//! locks an attribute against any later override further down the
//! inheritance/instantiation chain.
//!
//! Dispatch follows what the type resolves to:
//! - scalar kinds merge attribute modifications into the attribute map;
//! - a scalar connector recurses into its inner scalar;
//! - component, analysis, and compound-connector types pass through
//!   unchanged — Dyad has no `redeclare`-equivalent yet, so there is
//!   nothing for a modification to rebind (a known language gap, not a
//!   silent bug);
//! - aggregate kinds (function/struct/enum/array/conditional) are
//!   modified field-wise during resolution, never as a whole; reaching
//!   them here is a fatal assertion.

use crate::base::Entity;
use crate::semantic::types::{CompilerAssertion, Outcome, Problem, kinds};
use crate::syntax::ast::{Modification, Modifications};

use super::resolver::{ConnectorType, ResolvedType, ScalarAttribute, ScalarType};

/// Apply `mods` to `ty`. `instance` identifies the declaration being
/// modified, for problem reporting.
pub fn apply_modifications(
    ty: ResolvedType,
    mods: &Modifications,
    instance: &Entity,
) -> Outcome<ResolvedType> {
    if mods.is_empty() {
        return Outcome::Success(ty);
    }
    match ty {
        ResolvedType::Scalar(scalar) => {
            apply_scalar(scalar, mods, instance).map(ResolvedType::Scalar)
        }
        ResolvedType::Connector(ConnectorType::Scalar {
            origin,
            direction,
            inner,
        }) => apply_scalar(inner, mods, instance).map(|inner| {
            ResolvedType::Connector(ConnectorType::Scalar {
                origin,
                direction,
                inner,
            })
        }),
        ty @ (ResolvedType::Connector(ConnectorType::Compound { .. })
        | ResolvedType::Component(_)
        | ResolvedType::Analysis(_)) => {
            // No `redeclare` in the language yet: nothing to rebind.
            tracing::trace!(
                instance = %instance,
                kind = ty.kind_name(),
                "modifications on this kind are a pass-through"
            );
            Outcome::Success(ty)
        }
        other => CompilerAssertion::AggregateModification(other.kind_name().to_string()).raise(),
    }
}

fn apply_scalar(
    mut scalar: ScalarType,
    mods: &Modifications,
    instance: &Entity,
) -> Outcome<ScalarType> {
    let mut problems = Vec::new();
    for (name, modification) in mods {
        apply_attribute(&mut scalar, name.as_str(), modification, instance, &mut problems);
    }
    Outcome::from_parts(Some(scalar), problems)
}

fn apply_attribute(
    scalar: &mut ScalarType,
    name: &str,
    modification: &Modification,
    instance: &Entity,
    problems: &mut Vec<Problem>,
) {
    if modification.nested.is_some() {
        problems.push(
            Problem::error(kinds::UNIMPLEMENTED, "Unsupported modification")
                .with_details(format!(
                    "nested modification of scalar attribute `{name}` is not supported"
                ))
                .with_instance(instance.clone()),
        );
        return;
    }
    let Some(expr) = &modification.expr else {
        return;
    };

    if let Some(existing) = scalar.attributes.get(name) {
        if existing.is_final {
            problems.push(
                Problem::error(kinds::MODIFICATION_CONFLICT, "Modification conflict")
                    .with_details(format!(
                        "attribute `{name}` was declared final by `{}` and cannot be overridden",
                        scalar.origin
                    ))
                    .with_instance(instance.clone()),
            );
            return;
        }
    }
    scalar.attributes.insert(
        name.into(),
        ScalarAttribute {
            expr: expr.clone(),
            is_final: modification.is_final,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ast::Expression;
    use indexmap::IndexMap;

    fn real() -> ResolvedType {
        ResolvedType::Scalar(ScalarType::builtin(super::super::resolver::ScalarKind::Real))
    }

    fn entity() -> Entity {
        Entity::definition("Lib", Vec::new(), "Voltage")
    }

    fn mods(entries: &[(&str, Modification)]) -> Modifications {
        entries
            .iter()
            .map(|(k, v)| (smol_str::SmolStr::new(k), v.clone()))
            .collect()
    }

    #[test]
    fn test_non_final_override_wins_last() {
        let first = apply_modifications(
            real(),
            &mods(&[("min", Modification::value(Expression::IntegerLiteral(1)))]),
            &entity(),
        );
        let second = first.chain(|ty| {
            apply_modifications(
                ty,
                &mods(&[("min", Modification::value(Expression::IntegerLiteral(2)))]),
                &entity(),
            )
        });
        let ty = second.into_value().unwrap();
        let scalar = ty.as_scalar().unwrap();
        assert_eq!(scalar.attribute("min"), Some(&Expression::IntegerLiteral(2)));
    }

    #[test]
    fn test_final_locks_attribute() {
        let first = apply_modifications(
            real(),
            &mods(&[("min", Modification::final_value(Expression::IntegerLiteral(1)))]),
            &entity(),
        );
        let second = first.chain(|ty| {
            apply_modifications(
                ty,
                &mods(&[("min", Modification::value(Expression::IntegerLiteral(2)))]),
                &entity(),
            )
        });
        assert_eq!(second.problems().len(), 1);
        assert_eq!(second.problems()[0].kind, kinds::MODIFICATION_CONFLICT);
        // The locked value survives.
        let ty = second.into_value().unwrap();
        let scalar = ty.as_scalar().unwrap();
        assert_eq!(scalar.attribute("min"), Some(&Expression::IntegerLiteral(1)));
    }

    #[test]
    fn test_component_passthrough() {
        let ty = ResolvedType::Component(super::super::resolver::ComponentType {
            origin: entity(),
            partial: false,
        });
        let outcome = apply_modifications(
            ty.clone(),
            &mods(&[("R", Modification::value(Expression::RealLiteral(100.0)))]),
            &entity(),
        );
        assert_eq!(outcome, Outcome::Success(ty));
    }

    #[test]
    #[should_panic(expected = "compiler assertion")]
    fn test_aggregate_modification_is_fatal() {
        let ty = ResolvedType::Struct(super::super::resolver::StructType {
            origin: entity(),
            fields: IndexMap::new(),
        });
        let _ = apply_modifications(
            ty,
            &mods(&[("x", Modification::value(Expression::IntegerLiteral(1)))]),
            &entity(),
        );
    }
}
