//! The registry and its lookup tables.

use std::collections::{BTreeMap, HashMap};

use indexmap::map::Entry;
use indexmap::IndexMap;
use optreg_model::{CollectionModel, LookupShape, PropertyLookupInfo};
use optreg_symbols::ConstantValue;

use crate::error::RegistryError;
use crate::key::{KeyRef, OwnedKey, Probe, StoredKey};

/// One option instance. Every logical name of the same type resolves to
/// the same `OptionInstance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionInstance {
    full_type_name: String,
    key_values: BTreeMap<String, ConstantValue>,
    is_empty: bool,
}

impl OptionInstance {
    /// Fully-qualified type name; empty for the sentinel.
    pub fn full_type_name(&self) -> &str {
        &self.full_type_name
    }

    /// The value of a lookup property on this instance.
    pub fn key_value(&self, property: &str) -> Option<&ConstantValue> {
        self.key_values.get(property)
    }

    /// Returns `true` for the empty sentinel.
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Single(usize),
    Many(Vec<usize>),
}

impl Slot {
    fn new(multiple: bool, index: usize) -> Self {
        if multiple {
            Slot::Many(vec![index])
        } else {
            Slot::Single(index)
        }
    }

    /// Adds a later option with the same key. Single-valued slots keep the
    /// first option; aliases of an instance already present are ignored.
    fn absorb(&mut self, index: usize) {
        if let Slot::Many(indices) = self {
            if !indices.contains(&index) {
                indices.push(index);
            }
        }
    }
}

#[derive(Debug)]
enum Table {
    Alternate(IndexMap<StoredKey, Slot>),
    PerKey(HashMap<OwnedKey, Slot>),
}

#[derive(Debug)]
struct LookupTable {
    property: String,
    multiple: bool,
    ignore_case: bool,
    table: Table,
}

impl LookupTable {
    fn new(lookup: &PropertyLookupInfo, shape: LookupShape) -> Self {
        let table = match shape {
            LookupShape::AlternateLookup => Table::Alternate(IndexMap::new()),
            LookupShape::PerKeyDictionary => Table::PerKey(HashMap::new()),
        };
        Self {
            property: lookup.property_name.clone(),
            multiple: lookup.allow_multiple,
            // A custom comparer has no in-process equivalent; it compares
            // ordinally here.
            ignore_case: lookup.ignores_case(),
            table,
        }
    }

    fn insert(&mut self, key: KeyRef<'_>, index: usize) {
        let multiple = self.multiple;
        match &mut self.table {
            Table::Alternate(map) => {
                let Some(key) = OwnedKey::verbatim(key) else {
                    return;
                };
                match map.entry(StoredKey::new(key, self.ignore_case)) {
                    Entry::Occupied(mut e) => e.get_mut().absorb(index),
                    Entry::Vacant(e) => {
                        e.insert(Slot::new(multiple, index));
                    }
                }
            }
            Table::PerKey(map) => {
                let Some(key) = OwnedKey::normalize(key, self.ignore_case) else {
                    return;
                };
                map.entry(key)
                    .and_modify(|slot| slot.absorb(index))
                    .or_insert_with(|| Slot::new(multiple, index));
            }
        }
    }

    fn get(&self, key: KeyRef<'_>) -> Option<&Slot> {
        if key == KeyRef::Null {
            return None;
        }
        match &self.table {
            Table::Alternate(map) => map.get(&Probe::new(key, self.ignore_case)),
            Table::PerKey(map) => map.get(&OwnedKey::normalize(key, self.ignore_case)?),
        }
    }
}

/// A registry over one collection, in one lookup shape.
#[derive(Debug)]
pub struct Registry {
    name: String,
    shape: LookupShape,
    instances: Vec<OptionInstance>,
    empty: OptionInstance,
    /// `(logical name, instance)` in model order.
    all: Vec<(String, usize)>,
    by_name: HashMap<String, usize>,
    lookups: Vec<LookupTable>,
    default_lookup: Option<usize>,
}

impl Registry {
    /// Builds the registry for `model` using `shape` for every lookup table.
    ///
    /// Options are inserted in model order; for single-valued lookups the
    /// first option with a key wins, and null or non-constant keys are not
    /// indexed.
    pub fn build(model: &CollectionModel, shape: LookupShape) -> Result<Self, RegistryError> {
        if let Some(l) = model.lookups.iter().find(|l| l.is_default && l.allow_multiple) {
            return Err(RegistryError::MultiValuedDefault(l.property_name.clone()));
        }
        let mut instances: Vec<OptionInstance> = Vec::new();
        let mut by_type: HashMap<&str, usize> = HashMap::new();
        let mut by_name: HashMap<String, usize> = HashMap::new();
        let mut all = Vec::with_capacity(model.options.len());
        for option in &model.options {
            let index = *by_type
                .entry(option.full_type_name.as_str())
                .or_insert_with(|| {
                    instances.push(OptionInstance {
                        full_type_name: option.full_type_name.clone(),
                        key_values: option.key_values.clone(),
                        is_empty: false,
                    });
                    instances.len() - 1
                });
            if by_name.insert(option.name.clone(), index).is_some() {
                return Err(RegistryError::DuplicateName(option.name.clone()));
            }
            all.push((option.name.clone(), index));
        }

        let mut lookups = Vec::with_capacity(model.lookups.len());
        for lookup in &model.lookups {
            let mut table = LookupTable::new(lookup, shape);
            for (_, index) in &all {
                match instances[*index].key_value(&lookup.property_name) {
                    Some(value) => table.insert(KeyRef::from_constant(value), *index),
                    None => tracing::trace!(
                        property = %lookup.property_name,
                        option = %instances[*index].full_type_name,
                        "key value not constant, not indexed"
                    ),
                }
            }
            lookups.push(table);
        }

        let empty = OptionInstance {
            full_type_name: String::new(),
            key_values: model
                .lookups
                .iter()
                .filter_map(|l| Some((l.property_name.clone(), l.empty_value.clone()?)))
                .collect(),
            is_empty: true,
        };
        tracing::debug!(
            collection = %model.definition.name,
            shape = shape.label(),
            options = all.len(),
            instances = instances.len(),
            "built registry"
        );
        Ok(Self {
            name: model.definition.name.clone(),
            shape,
            instances,
            empty,
            all,
            by_name,
            default_lookup: model.lookups.iter().position(|l| l.is_default),
            lookups,
        })
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lookup shape the tables were built with.
    pub fn shape(&self) -> LookupShape {
        self.shape
    }

    /// Number of logical options.
    pub fn count(&self) -> usize {
        self.all.len()
    }

    /// Number of distinct instances; aliases share one.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Every option in model order, aliases included.
    pub fn all(&self) -> impl Iterator<Item = &OptionInstance> + '_ {
        self.all.iter().map(|(_, index)| &self.instances[*index])
    }

    /// Every logical name in model order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.all.iter().map(|(name, _)| name.as_str())
    }

    /// The sentinel returned on a miss.
    pub fn empty(&self) -> &OptionInstance {
        &self.empty
    }

    /// The option with logical name `name` (ordinal), or the sentinel.
    pub fn from_name(&self, name: &str) -> &OptionInstance {
        self.try_from_name(name).unwrap_or(&self.empty)
    }

    /// The option with logical name `name` (ordinal).
    pub fn try_from_name(&self, name: &str) -> Option<&OptionInstance> {
        self.by_name.get(name).map(|index| &self.instances[*index])
    }

    fn table(&self, property: &str) -> Result<&LookupTable, RegistryError> {
        self.lookups
            .iter()
            .find(|t| t.property == property)
            .ok_or_else(|| RegistryError::UnknownLookup(property.to_string()))
    }

    /// Single-valued lookup by `property`; the sentinel on a miss.
    pub fn lookup(
        &self,
        property: &str,
        key: KeyRef<'_>,
    ) -> Result<&OptionInstance, RegistryError> {
        Ok(self.try_lookup(property, key)?.unwrap_or(&self.empty))
    }

    /// Single-valued lookup by `property`.
    pub fn try_lookup(
        &self,
        property: &str,
        key: KeyRef<'_>,
    ) -> Result<Option<&OptionInstance>, RegistryError> {
        let table = self.table(property)?;
        match table.get(key) {
            None => Ok(None),
            Some(Slot::Single(index)) => Ok(Some(&self.instances[*index])),
            Some(Slot::Many(_)) => Err(RegistryError::Arity {
                property: property.to_string(),
                multiple: true,
            }),
        }
    }

    /// Multi-valued lookup by `property`; empty on a miss.
    pub fn lookup_many(
        &self,
        property: &str,
        key: KeyRef<'_>,
    ) -> Result<Vec<&OptionInstance>, RegistryError> {
        let table = self.table(property)?;
        if !table.multiple {
            return Err(RegistryError::Arity {
                property: property.to_string(),
                multiple: false,
            });
        }
        Ok(match table.get(key) {
            Some(Slot::Many(indices)) => indices.iter().map(|i| &self.instances[*i]).collect(),
            Some(Slot::Single(index)) => vec![&self.instances[*index]],
            None => Vec::new(),
        })
    }

    fn default_property(&self) -> Result<&str, RegistryError> {
        self.default_lookup
            .map(|i| self.lookups[i].property.as_str())
            .ok_or(RegistryError::NoDefaultKey)
    }

    /// Lookup by the default key; the sentinel on a miss.
    pub fn get(&self, key: KeyRef<'_>) -> Result<&OptionInstance, RegistryError> {
        self.lookup(self.default_property()?, key)
    }

    /// Lookup by the default key.
    pub fn try_get(&self, key: KeyRef<'_>) -> Result<Option<&OptionInstance>, RegistryError> {
        self.try_lookup(self.default_property()?, key)
    }
}

/// Returns `true` if `a` and `b` are the same instance.
pub fn same_instance(a: &OptionInstance, b: &OptionInstance) -> bool {
    std::ptr::eq(a, b)
}
