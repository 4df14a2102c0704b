//! Structured diagnostics.
//!
//! Every expected failure in the semantic core is a [`Problem`]: a typed,
//! severity-tagged record, usually carrying the entity it concerns and a
//! `{file, span}` source location. Problems travel through
//! [`super::Outcome`] values; they are deduplicated before being
//! surfaced to users.

use crate::base::{Entity, SourceLocation, Span};

/// Severity of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Problem kind identifiers used across the engines.
pub mod kinds {
    /// Two inheritance bases contribute a member of the same name.
    pub const EXISTING_ELEMENT: &str = "existing-element";
    /// An analysis point re-declares a name already used in the instance.
    pub const EXISTING_ANALYSIS_POINT: &str = "existing-analysis-point";
    /// An analysis point names connectors with no matching `connect`.
    pub const INVALID_ANALYSIS_POINT: &str = "invalid-analysis-point";
    /// A reference resolved to an entity of the wrong kind.
    pub const INVALID_ENTITY: &str = "invalid-entity";
    /// A value had an unexpected resolved type (e.g. switch on non-enum).
    pub const UNEXPECTED_TYPE: &str = "unexpected-type";
    /// A name resolved to nothing; indicates a caller/front-end bug.
    pub const MISSING_DEFINITION: &str = "missing-definition";
    /// An attribute locked by a `final` modification was overridden.
    pub const MODIFICATION_CONFLICT: &str = "modification-conflict";
    /// A partial definition was used where a concrete one is required.
    pub const PARTIAL_DEFINITION: &str = "partial-definition";
    /// A construct the language defines but the core does not implement yet.
    pub const UNIMPLEMENTED: &str = "unimplemented";
    /// A project manifest is structurally invalid.
    pub const INVALID_MANIFEST: &str = "invalid-manifest";
    /// An uncaught panic converted at a trust boundary.
    pub const INTERNAL_ERROR: &str = "internal-error";
    /// A file-system provider refused or failed an operation.
    pub const PROVIDER_FAILURE: &str = "provider-failure";
}

/// A structured diagnostic record.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    /// Stable machine-readable kind (see [`kinds`]).
    pub kind: &'static str,
    /// Short human-readable title.
    pub title: String,
    pub severity: Severity,
    /// The entity the problem concerns, when one exists.
    pub instance: Option<Entity>,
    /// Longer human-readable description.
    pub details: String,
    /// Source location, when the problem points into a file.
    pub location: Option<SourceLocation>,
}

impl Problem {
    pub fn new(kind: &'static str, title: impl Into<String>, severity: Severity) -> Self {
        Self {
            kind,
            title: title.into(),
            severity,
            instance: None,
            details: String::new(),
            location: None,
        }
    }

    pub fn error(kind: &'static str, title: impl Into<String>) -> Self {
        Self::new(kind, title, Severity::Error)
    }

    pub fn warning(kind: &'static str, title: impl Into<String>) -> Self {
        Self::new(kind, title, Severity::Warning)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn with_instance(mut self, instance: Entity) -> Self {
        self.instance = Some(instance);
        self
    }

    pub fn at(mut self, file: impl Into<String>, span: Span) -> Self {
        self.location = Some(SourceLocation::new(file, span));
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.title)?;
        if !self.details.is_empty() {
            write!(f, ": {}", self.details)?;
        }
        if let Some(location) = &self.location {
            write!(f, " ({location})")?;
        }
        Ok(())
    }
}

/// Deduplicate problems, preserving first-seen order.
///
/// Two problems are the same diagnostic when kind, details, and location
/// coincide; repeated resolution of a shared base otherwise multiplies
/// identical reports.
pub fn unique_problems(problems: Vec<Problem>) -> Vec<Problem> {
    let mut seen: Vec<(&'static str, String, Option<SourceLocation>)> = Vec::new();
    let mut unique = Vec::new();
    for problem in problems {
        let key = (problem.kind, problem.details.clone(), problem.location.clone());
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        unique.push(problem);
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_display() {
        let p = Problem::error(kinds::INVALID_ENTITY, "Invalid entity")
            .with_details("`Pin` is not a scalar type")
            .at("electrical/pin.dyad", Span::from_coords(3, 0, 3, 12));
        assert_eq!(
            p.to_string(),
            "[invalid-entity] Invalid entity: `Pin` is not a scalar type (electrical/pin.dyad:3:0)"
        );
    }

    #[test]
    fn test_unique_problems() {
        let a = Problem::error(kinds::EXISTING_ELEMENT, "Duplicate").with_details("p");
        let b = Problem::error(kinds::EXISTING_ELEMENT, "Duplicate").with_details("p");
        let c = Problem::error(kinds::EXISTING_ELEMENT, "Duplicate").with_details("q");
        let unique = unique_problems(vec![a.clone(), b, c.clone()]);
        assert_eq!(unique, vec![a, c]);
    }
}
