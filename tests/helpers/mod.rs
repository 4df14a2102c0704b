//! Shared builders for semantic tests: a single-library forest plus
//! declaration constructors, so tests read close to Dyad source.

#![allow(dead_code)]

use indexmap::IndexMap;
use smol_str::SmolStr;

use dyad::base::{Entity, Span};
use dyad::project::ProjectManifest;
use dyad::semantic::index::AttributeIndex;
use dyad::semantic::workspace::{Forest, Library};
use dyad::syntax::ast::{
    ComponentDeclaration, ComponentDef, ComponentReference, Connection, ConnectorDeclaration,
    ConnectorDirection, ConnectorField, Definition, EnumCase, EnumTypeDef, Equation, Expression,
    Extends, Modifications, QualifiedName, Relation, ScalarTypeDef, StructConnectorDef,
    VariableDeclaration,
};
use dyad::syntax::SourceFile;

pub const LIB: &str = "Main";

pub fn span() -> Span {
    Span::from_coords(0, 0, 0, 0)
}

pub fn qn(name: &str) -> QualifiedName {
    QualifiedName::new(name.split('.'), span())
}

pub fn entity(name: &str) -> Entity {
    Entity::definition(LIB, Vec::<SmolStr>::new(), name)
}

/// One library, root module, all definitions in `main.dyad`.
pub fn forest_with(defs: Vec<Definition>) -> Forest {
    let mut file = SourceFile::new();
    for def in defs {
        file.insert(def);
    }
    let mut forest = Forest::new();
    forest.add_library(Library::new(LIB, ProjectManifest::new(LIB, "0.1.0")));
    forest.insert_file(LIB, &[], "main.dyad", file);
    forest
}

pub fn index_of(forest: &Forest) -> AttributeIndex {
    AttributeIndex::build(forest)
}

// ----------------------------------------------------------------------
// Definitions
// ----------------------------------------------------------------------

pub fn scalar_type(name: &str, base: &str) -> Definition {
    Definition::ScalarType(ScalarTypeDef {
        name: name.into(),
        base: qn(base),
        modifications: Modifications::new(),
        doc: None,
        metadata: None,
        span: span(),
    })
}

/// An electrical-style compound connector with a potential and a flow
/// field, both `Real`.
pub fn pin_connector(name: &str) -> Definition {
    let mut fields = IndexMap::new();
    fields.insert(
        SmolStr::new("v"),
        ConnectorField {
            name: "v".into(),
            qualifier: ConnectorDirection::Potential,
            ty: qn("Real"),
            dims: Vec::new(),
            span: span(),
        },
    );
    fields.insert(
        SmolStr::new("i"),
        ConnectorField {
            name: "i".into(),
            qualifier: ConnectorDirection::Flow,
            ty: qn("Real"),
            dims: Vec::new(),
            span: span(),
        },
    );
    Definition::StructConnector(StructConnectorDef {
        name: name.into(),
        fields,
        doc: None,
        metadata: None,
        span: span(),
    })
}

/// A one-case-per-name enum with empty case structs.
pub fn simple_enum(name: &str, cases: &[&str]) -> Definition {
    let mut case_map = IndexMap::new();
    for case in cases {
        case_map.insert(
            SmolStr::new(*case),
            EnumCase {
                name: (*case).into(),
                fields: IndexMap::new(),
                span: span(),
            },
        );
    }
    Definition::EnumType(EnumTypeDef {
        name: name.into(),
        cases: case_map,
        doc: None,
        metadata: None,
        span: span(),
    })
}

// ----------------------------------------------------------------------
// Component building
// ----------------------------------------------------------------------

pub struct ComponentBuilder {
    def: ComponentDef,
}

impl ComponentBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            def: ComponentDef::new(name, span()),
        }
    }

    pub fn partial(mut self) -> Self {
        self.def.partial = true;
        self
    }

    pub fn extends(mut self, base: &str) -> Self {
        self.def.extends.push(Extends {
            base: qn(base),
            modifications: Modifications::new(),
            span: span(),
        });
        self
    }

    pub fn extends_with(mut self, base: &str, modifications: Modifications) -> Self {
        self.def.extends.push(Extends {
            base: qn(base),
            modifications,
            span: span(),
        });
        self
    }

    pub fn connector(mut self, name: &str, ty: &str) -> Self {
        self.def.connectors.insert(
            name.into(),
            ConnectorDeclaration {
                name: name.into(),
                ty: qn(ty),
                dims: Vec::new(),
                condition: None,
                doc: None,
                metadata: None,
                span: span(),
            },
        );
        self
    }

    pub fn component(mut self, name: &str, ty: &str) -> Self {
        self.def.components.insert(
            name.into(),
            ComponentDeclaration {
                name: name.into(),
                ty: qn(ty),
                modifications: Modifications::new(),
                dims: Vec::new(),
                condition: None,
                doc: None,
                metadata: None,
                span: span(),
            },
        );
        self
    }

    pub fn parameter(mut self, name: &str, ty: &str, default: Option<Expression>) -> Self {
        self.def.parameters.insert(
            name.into(),
            VariableDeclaration {
                name: name.into(),
                ty: qn(ty),
                default,
                modifications: Modifications::new(),
                dims: Vec::new(),
                condition: None,
                doc: None,
                metadata: None,
                span: span(),
            },
        );
        self
    }

    pub fn variable(mut self, name: &str, ty: &str) -> Self {
        self.def.variables.insert(
            name.into(),
            VariableDeclaration {
                name: name.into(),
                ty: qn(ty),
                default: None,
                modifications: Modifications::new(),
                dims: Vec::new(),
                condition: None,
                doc: None,
                metadata: None,
                span: span(),
            },
        );
        self
    }

    pub fn relation(mut self, relation: Relation) -> Self {
        self.def.relations.push(relation);
        self
    }

    pub fn build(self) -> Definition {
        Definition::Component(self.def)
    }
}

// ----------------------------------------------------------------------
// Relations and expressions
// ----------------------------------------------------------------------

pub fn reference(path: &str) -> ComponentReference {
    ComponentReference::dotted(path.split('.'))
}

pub fn connect(refs: &[&str]) -> Relation {
    Relation::Connection(Connection {
        refs: refs.iter().map(|r| reference(r)).collect(),
        span: span(),
    })
}

pub fn equation(lhs: &str, rhs: Expression) -> Relation {
    Relation::Equation(Equation {
        lhs: Expression::Reference(reference(lhs)),
        rhs,
        initial: false,
        doc: None,
        span: span(),
    })
}
