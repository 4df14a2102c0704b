//! Inheritance merging: shadowing, cross-base conflicts, diamonds,
//! partial models, and value modifications on instantiation.

mod helpers;

use helpers::*;

use dyad::semantic::instantiate::instantiate_model;
use dyad::semantic::resolver::Resolver;
use dyad::semantic::types::kinds;
use dyad::syntax::ast::{Expression, Modification, Modifications};

#[test]
fn test_extends_without_conflict() {
    let forest = forest_with(vec![
        pin_connector("Pin"),
        ComponentBuilder::new("TwoPin")
            .partial()
            .connector("p", "Pin")
            .connector("n", "Pin")
            .build(),
        ComponentBuilder::new("Resistor")
            .extends("TwoPin")
            .connector("q", "Pin")
            .build(),
    ]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let outcome = instantiate_model(&resolver, &entity("Resistor"), &Modifications::new(), None);
    let instance = outcome.value().expect("instantiates");
    assert!(outcome.problems().is_empty(), "{:?}", outcome.problems());
    assert!(instance.connectors.contains_key("p"));
    assert!(instance.connectors.contains_key("n"));
    assert!(instance.connectors.contains_key("q"));
    assert!(!instance.partial);
}

#[test]
fn test_two_bases_colliding_raise_existing_element() {
    let forest = forest_with(vec![
        pin_connector("Pin"),
        ComponentBuilder::new("BaseA").connector("p", "Pin").build(),
        ComponentBuilder::new("BaseB").connector("p", "Pin").build(),
        ComponentBuilder::new("Derived")
            .extends("BaseA")
            .extends("BaseB")
            .build(),
    ]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let outcome = instantiate_model(&resolver, &entity("Derived"), &Modifications::new(), None);
    let instance = outcome.value().expect("still instantiates");

    let conflicts: Vec<_> = outcome
        .problems()
        .iter()
        .filter(|p| p.kind == kinds::EXISTING_ELEMENT)
        .collect();
    assert_eq!(conflicts.len(), 1, "{:?}", outcome.problems());
    assert!(conflicts[0].details.contains("BaseA"));
    assert!(conflicts[0].details.contains("BaseB"));

    // The earlier binding wins.
    assert_eq!(instance.connectors["p"].origin, entity("BaseA"));
}

#[test]
fn test_diamond_inheritance_is_not_a_conflict() {
    let forest = forest_with(vec![
        pin_connector("Pin"),
        ComponentBuilder::new("Root").connector("p", "Pin").build(),
        ComponentBuilder::new("Left").extends("Root").build(),
        ComponentBuilder::new("Right").extends("Root").build(),
        ComponentBuilder::new("Joined")
            .extends("Left")
            .extends("Right")
            .build(),
    ]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let outcome = instantiate_model(&resolver, &entity("Joined"), &Modifications::new(), None);
    let instance = outcome.value().expect("instantiates");
    assert!(outcome.problems().is_empty(), "{:?}", outcome.problems());
    assert_eq!(instance.connectors["p"].origin, entity("Root"));
}

#[test]
fn test_derived_declaration_shadows_base_silently() {
    let forest = forest_with(vec![
        pin_connector("Pin"),
        pin_connector("OtherPin"),
        ComponentBuilder::new("Base").connector("p", "Pin").build(),
        ComponentBuilder::new("Derived")
            .extends("Base")
            .connector("p", "OtherPin")
            .build(),
    ]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let outcome = instantiate_model(&resolver, &entity("Derived"), &Modifications::new(), None);
    let instance = outcome.value().expect("instantiates");
    assert!(outcome.problems().is_empty(), "{:?}", outcome.problems());
    assert_eq!(instance.connectors["p"].ty.origin(), &entity("OtherPin"));
}

#[test]
fn test_partial_base_instantiates_but_partial_member_is_flagged() {
    let forest = forest_with(vec![
        pin_connector("Pin"),
        ComponentBuilder::new("TwoPin")
            .partial()
            .connector("p", "Pin")
            .build(),
        // Extending a partial base is the point of partial models.
        ComponentBuilder::new("Resistor").extends("TwoPin").build(),
        // Using one as a concrete sub-component is not.
        ComponentBuilder::new("Broken")
            .component("stage", "TwoPin")
            .build(),
    ]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let fine = instantiate_model(&resolver, &entity("Resistor"), &Modifications::new(), None);
    assert!(fine.problems().is_empty(), "{:?}", fine.problems());

    let partial_itself =
        instantiate_model(&resolver, &entity("TwoPin"), &Modifications::new(), None);
    assert!(partial_itself.value().map(|i| i.partial).unwrap_or(false));

    let broken = instantiate_model(&resolver, &entity("Broken"), &Modifications::new(), None);
    assert!(
        broken
            .problems()
            .iter()
            .any(|p| p.kind == kinds::PARTIAL_DEFINITION),
        "{:?}",
        broken.problems()
    );
    // The member is still present so processing can continue.
    assert!(broken.value().expect("partial result").components.contains_key("stage"));
}

#[test]
fn test_extends_modifications_override_parameter_defaults() {
    let mut overrides = Modifications::new();
    overrides.insert(
        "R".into(),
        Modification::value(Expression::RealLiteral(4700.0)),
    );

    let forest = forest_with(vec![
        ComponentBuilder::new("Base")
            .parameter("R", "Real", Some(Expression::RealLiteral(100.0)))
            .build(),
        ComponentBuilder::new("Tuned")
            .extends_with("Base", overrides)
            .build(),
    ]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let outcome = instantiate_model(&resolver, &entity("Tuned"), &Modifications::new(), None);
    let instance = outcome.value().expect("instantiates");
    assert_eq!(
        instance.parameters["R"].default,
        Some(Expression::RealLiteral(4700.0))
    );
}

#[test]
fn test_caller_modifications_override_defaults() {
    let forest = forest_with(vec![
        ComponentBuilder::new("Resistor")
            .parameter("R", "Real", Some(Expression::RealLiteral(100.0)))
            .build(),
    ]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let mut mods = Modifications::new();
    mods.insert(
        "R".into(),
        Modification::value(Expression::RealLiteral(220.0)),
    );
    let outcome = instantiate_model(&resolver, &entity("Resistor"), &mods, None);
    let instance = outcome.value().expect("instantiates");
    assert_eq!(
        instance.parameters["R"].default,
        Some(Expression::RealLiteral(220.0))
    );
}

#[test]
fn test_instantiating_missing_definition_is_hard_failure() {
    let forest = forest_with(vec![]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let outcome = instantiate_model(&resolver, &entity("Ghost"), &Modifications::new(), None);
    assert!(outcome.is_failure());
    assert_eq!(outcome.problems()[0].kind, kinds::MISSING_DEFINITION);
}

#[test]
fn test_metadata_override_replaces_definition_metadata() {
    let forest = forest_with(vec![ComponentBuilder::new("Block").build()]);
    let index = index_of(&forest);
    let resolver = Resolver::new(&forest, &index);

    let override_value = serde_json::json!({ "layout": { "x": 10 } });
    let outcome = instantiate_model(
        &resolver,
        &entity("Block"),
        &Modifications::new(),
        Some(override_value.clone()),
    );
    assert_eq!(
        outcome.value().and_then(|i| i.metadata.as_ref()),
        Some(&override_value)
    );
}
