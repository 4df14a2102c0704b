//! Entity encoding properties: lossless round-trips and mutually
//! exclusive kind namespaces.

use rstest::rstest;
use smol_str::SmolStr;

use dyad::base::{Entity, EntityKind};

fn path(segments: &[&str]) -> Vec<SmolStr> {
    segments.iter().map(|s| SmolStr::new(s)).collect()
}

#[rstest]
#[case::library(Entity::library("Electrical"))]
#[case::root_module(Entity::module("Electrical", path(&[])))]
#[case::nested_module(Entity::module("Electrical", path(&["Analog", "Basic"])))]
#[case::root_file(Entity::file("Electrical", path(&[]), "ground.dyad"))]
#[case::nested_file(Entity::file("Electrical", path(&["Analog"]), "resistor.dyad"))]
#[case::root_definition(Entity::definition("Electrical", path(&[]), "Ground"))]
#[case::nested_definition(Entity::definition("Electrical", path(&["Analog", "Basic"]), "Resistor"))]
#[case::builtin(Entity::builtin("Real"))]
#[case::builtin_native(Entity::builtin("Native"))]
fn test_round_trip(#[case] entity: Entity) {
    let encoded = entity.to_string();
    let decoded: Entity = encoded.parse().expect("decodes");
    assert_eq!(decoded, entity, "round-trip failed for `{encoded}`");
    assert_eq!(decoded.to_string(), encoded);
}

#[test]
fn test_kind_namespaces_are_mutually_exclusive() {
    let samples = [
        (EntityKind::Library, "urn:dyad:library:Electrical"),
        (EntityKind::Module, "urn:dyad:module:Electrical:Analog"),
        (
            EntityKind::File,
            "urn:dyad:file:Electrical:Analog:resistor.dyad",
        ),
        (
            EntityKind::Definition,
            "urn:dyad:definition:Electrical:Analog:Resistor",
        ),
        (EntityKind::Builtin, "urn:dyad:builtin:Real"),
    ];
    for (kind, encoded) in &samples {
        for (other_kind, _) in &samples {
            assert_eq!(
                other_kind.matches(encoded),
                kind == other_kind,
                "`{encoded}` vs {other_kind:?}"
            );
        }
    }
}

#[test]
fn test_distinct_identities_never_collide() {
    let a = Entity::definition("Lib", path(&["Sub"]), "X");
    let b = Entity::definition("Lib", path(&[]), "X");
    let c = Entity::definition("Lib", path(&["Sub"]), "Y");
    let d = Entity::file("Lib", path(&["Sub"]), "X");
    let encodings = [a, b, c, d].map(|e| e.to_string());
    for (i, left) in encodings.iter().enumerate() {
        for (j, right) in encodings.iter().enumerate() {
            assert_eq!(left == right, i == j);
        }
    }
}

#[test]
fn test_structural_equality_is_string_equality() {
    let a = Entity::definition("Lib", path(&["Sub"]), "X");
    let b: Entity = a.to_string().parse().expect("decodes");
    assert_eq!(a, b);
    assert_eq!(a.to_string(), b.to_string());
}
