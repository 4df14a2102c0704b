//! Type resolution: scalar alias chains, modification finality across
//! the chain, struct/enum/connector resolution, and failure modes.

mod helpers;

use helpers::*;

use dyad::semantic::resolver::{ConnectorType, ResolvedType, Resolver};
use dyad::semantic::types::kinds;
use dyad::syntax::ast::{
    ConnectorDirection, Definition, Expression, Modification, Modifications, ScalarTypeDef,
};

fn scalar_with(name: &str, base: &str, mods: Modifications) -> Definition {
    Definition::ScalarType(ScalarTypeDef {
        name: name.into(),
        base: qn(base),
        modifications: mods,
        doc: None,
        metadata: None,
        span: span(),
    })
}

fn mods(entries: &[(&str, Modification)]) -> Modifications {
    entries
        .iter()
        .map(|(name, modification)| (smol_str::SmolStr::new(name), modification.clone()))
        .collect()
}

#[test]
fn test_scalar_alias_chain_merges_attributes() {
    let forest = forest_with(vec![
        scalar_with(
            "Voltage",
            "Real",
            mods(&[(
                "units",
                Modification::value(Expression::StringLiteral("V".into())),
            )]),
        ),
        scalar_with(
            "HighVoltage",
            "Voltage",
            mods(&[(
                "min",
                Modification::value(Expression::RealLiteral(1000.0)),
            )]),
        ),
    ]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let resolved = resolver.resolve_entity(&entity("HighVoltage"));
    let ty = resolved.value().expect("resolves");
    let scalar = ty.as_scalar().expect("is scalar");
    assert_eq!(scalar.kind.name(), "Real");
    // Provenance is the alias itself, attributes merge down the chain.
    assert_eq!(scalar.origin, entity("HighVoltage"));
    assert!(scalar.attribute("units").is_some());
    assert!(scalar.attribute("min").is_some());
}

#[test]
fn test_final_attribute_locks_across_chain() {
    let forest = forest_with(vec![
        scalar_with(
            "Positive",
            "Real",
            mods(&[(
                "min",
                Modification::final_value(Expression::RealLiteral(0.0)),
            )]),
        ),
        scalar_with(
            "Sneaky",
            "Positive",
            mods(&[("min", Modification::value(Expression::RealLiteral(-1.0)))]),
        ),
    ]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let resolved = resolver.resolve_entity(&entity("Sneaky"));
    assert!(
        resolved
            .problems()
            .iter()
            .any(|p| p.kind == kinds::MODIFICATION_CONFLICT),
        "expected a modification conflict, got {:?}",
        resolved.problems()
    );
    // The locked value survives.
    let ty = resolved.value().expect("still usable");
    let scalar = ty.as_scalar().expect("is scalar");
    assert_eq!(
        scalar.attribute("min"),
        Some(&Expression::RealLiteral(0.0))
    );
}

#[test]
fn test_non_scalar_base_is_invalid_entity() {
    let forest = forest_with(vec![
        pin_connector("Pin"),
        scalar_with("Weird", "Pin", Modifications::new()),
    ]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let resolved = resolver.resolve_entity(&entity("Weird"));
    assert!(resolved.is_failure());
    assert_eq!(resolved.problems()[0].kind, kinds::INVALID_ENTITY);
}

#[test]
fn test_unknown_base_is_missing_definition() {
    let forest = forest_with(vec![scalar_with("Lost", "Nowhere", Modifications::new())]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let resolved = resolver.resolve_entity(&entity("Lost"));
    assert!(resolved.is_failure());
    assert_eq!(resolved.problems()[0].kind, kinds::MISSING_DEFINITION);
}

#[test]
fn test_cyclic_alias_fails_instead_of_diverging() {
    let forest = forest_with(vec![
        scalar_with("A", "B", Modifications::new()),
        scalar_with("B", "A", Modifications::new()),
    ]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let resolved = resolver.resolve_entity(&entity("A"));
    assert!(resolved.is_failure());
    assert_eq!(resolved.problems()[0].kind, kinds::INVALID_ENTITY);
}

#[test]
fn test_compound_connector_resolution() {
    let forest = forest_with(vec![pin_connector("Pin")]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let resolved = resolver.resolve_entity(&entity("Pin"));
    let ty = resolved.value().expect("resolves");
    match ty {
        ResolvedType::Connector(ConnectorType::Compound { origin, fields }) => {
            assert_eq!(origin, &entity("Pin"));
            assert_eq!(fields.len(), 2);
            assert_eq!(fields["v"].qualifier, ConnectorDirection::Potential);
            assert_eq!(fields["i"].qualifier, ConnectorDirection::Flow);
        }
        other => panic!("expected compound connector, got {other:?}"),
    }
}

#[test]
fn test_scalar_connector_resolution() {
    let forest = forest_with(vec![
        scalar_with(
            "Voltage",
            "Real",
            mods(&[(
                "units",
                Modification::value(Expression::StringLiteral("V".into())),
            )]),
        ),
        Definition::ScalarConnector(dyad::syntax::ast::ScalarConnectorDef {
            name: "VoltageInput".into(),
            direction: ConnectorDirection::Input,
            ty: qn("Voltage"),
            modifications: Modifications::new(),
            doc: None,
            metadata: None,
            span: span(),
        }),
    ]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let resolved = resolver.resolve_entity(&entity("VoltageInput"));
    let ty = resolved.value().expect("resolves");
    match ty {
        ResolvedType::Connector(ConnectorType::Scalar {
            origin,
            direction,
            inner,
        }) => {
            assert_eq!(origin, &entity("VoltageInput"));
            assert_eq!(*direction, ConnectorDirection::Input);
            assert!(inner.attribute("units").is_some());
        }
        other => panic!("expected scalar connector, got {other:?}"),
    }
}

#[test]
fn test_enum_cases_resolve_as_structs() {
    let forest = forest_with(vec![simple_enum("Mode", &["On", "Off", "Tripped"])]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let resolved = resolver.resolve_entity(&entity("Mode"));
    let ty = resolved.value().expect("resolves");
    let cases = &ty.as_enum().expect("is enum").cases;
    assert_eq!(cases.len(), 3);
    assert!(cases.contains_key("Tripped"));
}

#[test]
fn test_builtins_resolve_without_index() {
    let forest = forest_with(vec![]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let resolved = resolver.resolve_entity(&dyad::base::Entity::builtin("Boolean"));
    assert_eq!(
        resolved.value().map(|ty| ty.kind_name()),
        Some("Boolean")
    );
}
