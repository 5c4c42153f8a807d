//! In-memory compilation: the bundled [`SymbolQuery`] adapter.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::query::{DeclaredType, QueryScope, SymbolQuery};
use crate::types::{DefinitionKey, TypeRef, TypeSymbol};

/// A referenced assembly and the types it exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assembly {
    /// Assembly name.
    pub name: String,
    /// Declared types.
    #[serde(default)]
    pub types: Vec<TypeSymbol>,
}

/// A source unit added to the compilation by a generator pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSource {
    /// Name of the generator that produced the unit.
    pub generator: String,
    /// Unit file name, e.g. `Demo.Widgets.g.cs`.
    pub hint_name: String,
    /// Source text.
    pub text: String,
}

/// Where a type lives: `None` for the current assembly, otherwise an index
/// into `references`, paired with the index of the type in that assembly.
type Slot = (Option<usize>, usize);

/// A snapshot of a host compilation.
///
/// Compilations are immutable values: generator passes produce a new
/// compilation via [`with_generated`](Self::with_generated) instead of
/// mutating the one they were given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Compilation {
    assembly: String,
    #[serde(default)]
    target_framework: Option<String>,
    #[serde(default)]
    types: Vec<TypeSymbol>,
    #[serde(default)]
    references: Vec<Assembly>,
    #[serde(default)]
    generated: Vec<GeneratedSource>,
    #[serde(skip)]
    index: OnceLock<HashMap<DefinitionKey, Vec<Slot>>>,
}

impl Compilation {
    /// Creates an empty compilation for `assembly`.
    pub fn new(assembly: impl Into<String>, target_framework: Option<&str>) -> Self {
        Self {
            assembly: assembly.into(),
            target_framework: target_framework.map(str::to_string),
            ..Self::default()
        }
    }

    /// Parses a compilation from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, QueryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a compilation from a JSON file.
    pub fn load(path: &Path) -> Result<Self, QueryError> {
        let json = std::fs::read_to_string(path).map_err(|source| QueryError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let compilation = Self::from_json(&json)?;
        tracing::debug!(
            path = %path.display(),
            types = compilation.types.len(),
            references = compilation.references.len(),
            "loaded compilation"
        );
        Ok(compilation)
    }

    /// Serialises the compilation to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, QueryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Adds a type to the current assembly.
    pub fn add_type(&mut self, ty: TypeSymbol) {
        self.types.push(ty);
        self.index = OnceLock::new();
    }

    /// Adds a referenced assembly.
    pub fn add_reference(&mut self, assembly: Assembly) {
        self.references.push(assembly);
        self.index = OnceLock::new();
    }

    /// Overrides the recorded target platform moniker.
    pub fn set_target_framework(&mut self, moniker: Option<&str>) {
        self.target_framework = moniker.map(str::to_string);
    }

    /// Returns a new compilation extended with generated units and any types
    /// those units declare.
    pub fn with_generated(
        &self,
        sources: impl IntoIterator<Item = GeneratedSource>,
        added_types: impl IntoIterator<Item = TypeSymbol>,
    ) -> Self {
        let mut next = Self {
            assembly: self.assembly.clone(),
            target_framework: self.target_framework.clone(),
            types: self.types.clone(),
            references: self.references.clone(),
            generated: self.generated.clone(),
            index: OnceLock::new(),
        };
        next.generated.extend(sources);
        next.types.extend(added_types);
        next
    }

    /// Types declared in the current assembly.
    pub fn types(&self) -> &[TypeSymbol] {
        &self.types
    }

    /// Referenced assemblies.
    pub fn references(&self) -> &[Assembly] {
        &self.references
    }

    /// Units added by earlier generator passes, in the order they were added.
    pub fn generated(&self) -> &[GeneratedSource] {
        &self.generated
    }

    /// Finds a generated unit by hint name.
    pub fn generated_source(&self, hint_name: &str) -> Option<&GeneratedSource> {
        self.generated.iter().find(|s| s.hint_name == hint_name)
    }

    fn index(&self) -> &HashMap<DefinitionKey, Vec<Slot>> {
        self.index.get_or_init(|| {
            let mut index: HashMap<DefinitionKey, Vec<Slot>> = HashMap::new();
            for (i, ty) in self.types.iter().enumerate() {
                index.entry(ty.definition()).or_default().push((None, i));
            }
            for (a, assembly) in self.references.iter().enumerate() {
                for (i, ty) in assembly.types.iter().enumerate() {
                    index.entry(ty.definition()).or_default().push((Some(a), i));
                }
            }
            index
        })
    }

    fn declared(&self, slot: Slot) -> Option<DeclaredType<'_>> {
        match slot {
            (None, i) => self.types.get(i).map(|symbol| DeclaredType {
                symbol,
                assembly: &self.assembly,
                is_current: true,
            }),
            (Some(a), i) => {
                let assembly = self.references.get(a)?;
                assembly.types.get(i).map(|symbol| DeclaredType {
                    symbol,
                    assembly: &assembly.name,
                    is_current: false,
                })
            }
        }
    }
}

impl SymbolQuery for Compilation {
    fn assembly_name(&self) -> &str {
        &self.assembly
    }

    fn target_framework(&self) -> Option<&str> {
        self.target_framework.as_deref()
    }

    fn types_with_attribute(
        &self,
        attribute: &str,
        scope: QueryScope,
    ) -> Result<Vec<DeclaredType<'_>>, QueryError> {
        let mut found: Vec<DeclaredType<'_>> = self
            .types
            .iter()
            .filter(|t| t.has_attribute(attribute))
            .map(|symbol| DeclaredType {
                symbol,
                assembly: &self.assembly,
                is_current: true,
            })
            .collect();
        if scope == QueryScope::IncludeReferences {
            for assembly in &self.references {
                found.extend(
                    assembly
                        .types
                        .iter()
                        .filter(|t| t.has_attribute(attribute))
                        .map(|symbol| DeclaredType {
                            symbol,
                            assembly: &assembly.name,
                            is_current: false,
                        }),
                );
            }
        }
        tracing::trace!(attribute, count = found.len(), "types with attribute");
        Ok(found)
    }

    fn resolve(&self, ty: &TypeRef) -> Result<Option<DeclaredType<'_>>, QueryError> {
        let Some(key) = ty.definition() else {
            return Ok(None);
        };
        let Some(slots) = self.index().get(&key) else {
            return Ok(None);
        };
        // The current assembly shadows references; duplicates within a single
        // assembly are a broken symbol table.
        let owner = slots
            .iter()
            .map(|(assembly, _)| *assembly)
            .min_by_key(|assembly| assembly.map_or(0, |i| i + 1))
            .flatten();
        let matching: Vec<Slot> = slots
            .iter()
            .copied()
            .filter(|(assembly, _)| *assembly == owner)
            .collect();
        if matching.len() > 1 {
            let assembly = match owner {
                None => self.assembly.clone(),
                Some(a) => self
                    .references
                    .get(a)
                    .map(|r| r.name.clone())
                    .unwrap_or_default(),
            };
            let name = if key.namespace.is_empty() {
                key.name.clone()
            } else {
                format!("{}.{}", key.namespace, key.name)
            };
            return Err(QueryError::Ambiguous {
                name,
                assembly,
                count: matching.len(),
            });
        }
        Ok(matching.first().and_then(|slot| self.declared(*slot)))
    }
}
