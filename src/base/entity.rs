//! Entity addressing for libraries, modules, files, definitions, and builtins.
//!
//! An [`Entity`] is a stable, string-encoded address that identifies a node
//! in the workspace forest independently of its in-memory representation.
//! Encodings are URN-like, one namespace prefix per kind, so the kinds
//! partition the string space and kind tests are mutually exclusive.
//!
//! Encoding and decoding are lossless: `unparse(create(parts)) == parts`
//! for every valid entity.

use smol_str::SmolStr;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const URN_PREFIX: &str = "urn:dyad:";

/// The five entity kinds, each with its own namespace prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Library,
    Module,
    File,
    Definition,
    Builtin,
}

impl EntityKind {
    /// The namespace tag used in the string encoding.
    pub fn tag(&self) -> &'static str {
        match self {
            EntityKind::Library => "library",
            EntityKind::Module => "module",
            EntityKind::File => "file",
            EntityKind::Definition => "definition",
            EntityKind::Builtin => "builtin",
        }
    }

    /// Detect the kind of an encoded entity string, if it is one.
    pub fn detect(encoded: &str) -> Option<EntityKind> {
        let rest = encoded.strip_prefix(URN_PREFIX)?;
        let tag = rest.split(':').next()?;
        match tag {
            "library" => Some(EntityKind::Library),
            "module" => Some(EntityKind::Module),
            "file" => Some(EntityKind::File),
            "definition" => Some(EntityKind::Definition),
            "builtin" => Some(EntityKind::Builtin),
            _ => None,
        }
    }

    /// Whether `encoded` is a well-formed entity of this kind.
    pub fn matches(&self, encoded: &str) -> bool {
        Entity::from_str(encoded)
            .map(|e| e.kind() == *self)
            .unwrap_or(false)
    }
}

/// A stable address for a node in the workspace forest.
///
/// Entities are structurally comparable: two entities are equal exactly
/// when their string encodings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Entity {
    /// A library (one manifest, one module tree).
    Library { name: SmolStr },
    /// A module inside a library; `path` is empty for the root module.
    Module { library: SmolStr, path: Vec<SmolStr> },
    /// A source file inside a module.
    File {
        library: SmolStr,
        path: Vec<SmolStr>,
        file: SmolStr,
    },
    /// A named top-level definition inside a module.
    Definition {
        library: SmolStr,
        path: Vec<SmolStr>,
        name: SmolStr,
    },
    /// A built-in type (`Real`, `Integer`, `Boolean`, `String`, `Native`).
    Builtin { name: SmolStr },
}

/// Failure to decode an entity string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityParseError {
    #[error("not an entity: missing `{URN_PREFIX}` prefix in `{0}`")]
    MissingPrefix(String),
    #[error("unknown entity kind `{0}`")]
    UnknownKind(String),
    #[error("malformed `{kind}` entity: expected {expected} field(s), got {got}")]
    FieldCount {
        kind: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("empty segment in entity `{0}`")]
    EmptySegment(String),
}

impl Entity {
    pub fn library(name: impl Into<SmolStr>) -> Entity {
        Entity::Library { name: name.into() }
    }

    pub fn module(library: impl Into<SmolStr>, path: impl IntoIterator<Item = SmolStr>) -> Entity {
        Entity::Module {
            library: library.into(),
            path: path.into_iter().collect(),
        }
    }

    pub fn file(
        library: impl Into<SmolStr>,
        path: impl IntoIterator<Item = SmolStr>,
        file: impl Into<SmolStr>,
    ) -> Entity {
        Entity::File {
            library: library.into(),
            path: path.into_iter().collect(),
            file: file.into(),
        }
    }

    pub fn definition(
        library: impl Into<SmolStr>,
        path: impl IntoIterator<Item = SmolStr>,
        name: impl Into<SmolStr>,
    ) -> Entity {
        Entity::Definition {
            library: library.into(),
            path: path.into_iter().collect(),
            name: name.into(),
        }
    }

    pub fn builtin(name: impl Into<SmolStr>) -> Entity {
        Entity::Builtin { name: name.into() }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Library { .. } => EntityKind::Library,
            Entity::Module { .. } => EntityKind::Module,
            Entity::File { .. } => EntityKind::File,
            Entity::Definition { .. } => EntityKind::Definition,
            Entity::Builtin { .. } => EntityKind::Builtin,
        }
    }

    pub fn is_library(&self) -> bool {
        matches!(self, Entity::Library { .. })
    }

    pub fn is_module(&self) -> bool {
        matches!(self, Entity::Module { .. })
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Entity::File { .. })
    }

    pub fn is_definition(&self) -> bool {
        matches!(self, Entity::Definition { .. })
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Entity::Builtin { .. })
    }

    /// The owning library's name, for every kind except builtins.
    pub fn library_name(&self) -> Option<&str> {
        match self {
            Entity::Library { name } => Some(name),
            Entity::Module { library, .. }
            | Entity::File { library, .. }
            | Entity::Definition { library, .. } => Some(library),
            Entity::Builtin { .. } => None,
        }
    }

    /// The module path, for module/file/definition entities.
    pub fn module_path(&self) -> Option<&[SmolStr]> {
        match self {
            Entity::Module { path, .. }
            | Entity::File { path, .. }
            | Entity::Definition { path, .. } => Some(path),
            _ => None,
        }
    }

    /// The leaf name: library name, file name, definition name, or builtin name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Entity::Library { name } => Some(name),
            Entity::Module { .. } => None,
            Entity::File { file, .. } => Some(file),
            Entity::Definition { name, .. } => Some(name),
            Entity::Builtin { name } => Some(name),
        }
    }

    /// The entity one level up the forest: definition/file → owning module,
    /// module → parent module (or library at the root), library/builtin → none.
    pub fn parent(&self) -> Option<Entity> {
        match self {
            Entity::Library { .. } | Entity::Builtin { .. } => None,
            Entity::Module { library, path } => {
                if path.is_empty() {
                    Some(Entity::library(library.clone()))
                } else {
                    Some(Entity::Module {
                        library: library.clone(),
                        path: path[..path.len() - 1].to_vec(),
                    })
                }
            }
            Entity::File { library, path, .. } | Entity::Definition { library, path, .. } => {
                Some(Entity::Module {
                    library: library.clone(),
                    path: path.clone(),
                })
            }
        }
    }

    /// The module that owns this entity, if it has one.
    pub fn owning_module(&self) -> Option<Entity> {
        match self {
            Entity::Module { .. } => Some(self.clone()),
            Entity::File { library, path, .. } | Entity::Definition { library, path, .. } => {
                Some(Entity::Module {
                    library: library.clone(),
                    path: path.clone(),
                })
            }
            _ => None,
        }
    }
}

fn encode_path(path: &[SmolStr]) -> String {
    path.join(".")
}

fn decode_path(field: &str, encoded: &str) -> Result<Vec<SmolStr>, EntityParseError> {
    if field.is_empty() {
        return Ok(Vec::new());
    }
    let mut path = Vec::new();
    for segment in field.split('.') {
        if segment.is_empty() {
            return Err(EntityParseError::EmptySegment(encoded.to_string()));
        }
        path.push(SmolStr::new(segment));
    }
    Ok(path)
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Library { name } => write!(f, "{URN_PREFIX}library:{name}"),
            Entity::Module { library, path } => {
                write!(f, "{URN_PREFIX}module:{library}:{}", encode_path(path))
            }
            Entity::File {
                library,
                path,
                file,
            } => write!(
                f,
                "{URN_PREFIX}file:{library}:{}:{file}",
                encode_path(path)
            ),
            Entity::Definition {
                library,
                path,
                name,
            } => write!(
                f,
                "{URN_PREFIX}definition:{library}:{}:{name}",
                encode_path(path)
            ),
            Entity::Builtin { name } => write!(f, "{URN_PREFIX}builtin:{name}"),
        }
    }
}

impl FromStr for Entity {
    type Err = EntityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix(URN_PREFIX)
            .ok_or_else(|| EntityParseError::MissingPrefix(s.to_string()))?;
        let (tag, fields_str) = match rest.split_once(':') {
            Some((tag, fields)) => (tag, fields),
            None => return Err(EntityParseError::UnknownKind(rest.to_string())),
        };
        let fields: Vec<&str> = fields_str.split(':').collect();

        let expect = |kind: &'static str, n: usize| {
            if fields.len() == n {
                Ok(())
            } else {
                Err(EntityParseError::FieldCount {
                    kind,
                    expected: n,
                    got: fields.len(),
                })
            }
        };

        let nonempty = |field: &str| {
            if field.is_empty() {
                Err(EntityParseError::EmptySegment(s.to_string()))
            } else {
                Ok(SmolStr::new(field))
            }
        };

        match tag {
            "library" => {
                expect("library", 1)?;
                Ok(Entity::Library {
                    name: nonempty(fields[0])?,
                })
            }
            "module" => {
                expect("module", 2)?;
                Ok(Entity::Module {
                    library: nonempty(fields[0])?,
                    path: decode_path(fields[1], s)?,
                })
            }
            "file" => {
                expect("file", 3)?;
                Ok(Entity::File {
                    library: nonempty(fields[0])?,
                    path: decode_path(fields[1], s)?,
                    file: nonempty(fields[2])?,
                })
            }
            "definition" => {
                expect("definition", 3)?;
                Ok(Entity::Definition {
                    library: nonempty(fields[0])?,
                    path: decode_path(fields[1], s)?,
                    name: nonempty(fields[2])?,
                })
            }
            "builtin" => {
                expect("builtin", 1)?;
                Ok(Entity::Builtin {
                    name: nonempty(fields[0])?,
                })
            }
            other => Err(EntityParseError::UnknownKind(other.to_string())),
        }
    }
}
