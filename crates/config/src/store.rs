//! Configuration store grouped by section.
//!
//! Responsibilities:
//! - Hold the original text of every option, grouped by section.
//! - Merge one store into another with last-writer-wins semantics.
//! - Produce decoded views (`Store<Value>`) for the query API.
//!
//! Does NOT handle:
//! - Locating or parsing files (see `loader` and `ini`).
//! - The decode rules themselves (see `value`).
//!
//! Invariants:
//! - Section and option names are case-sensitive and unique.
//! - Sections and options keep their first-insertion order; overwrites keep the slot.
//! - Merging only adds or overwrites. Nothing is ever removed.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::value::{Value, decode};

/// A named group of options. `V` is `String` for raw storage and `Value` for decoded views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<V = String> {
    name: String,
    options: Vec<(String, V)>,
}

impl Section<String> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::empty(name.into())
    }

    /// Raw text of an option.
    pub fn get(&self, option: &str) -> Option<&str> {
        self.find(option).map(String::as_str)
    }

    /// Mutable access to a raw value, used to extend multi-line values.
    pub(crate) fn get_mut(&mut self, option: &str) -> Option<&mut String> {
        self.options
            .iter_mut()
            .find(|(key, _)| key == option)
            .map(|(_, value)| value)
    }

    /// Decode every option of this section.
    pub fn decoded(&self) -> Section<Value> {
        Section {
            name: self.name.clone(),
            options: self
                .options
                .iter()
                .map(|(key, raw)| (key.clone(), decode(raw)))
                .collect(),
        }
    }
}

impl Section<Value> {
    pub fn get(&self, option: &str) -> Option<&Value> {
        self.find(option)
    }
}

impl<V> Section<V> {
    fn empty(name: String) -> Self {
        Self {
            name,
            options: Vec::new(),
        }
    }

    fn find(&self, option: &str) -> Option<&V> {
        self.options
            .iter()
            .find(|(key, _)| key == option)
            .map(|(_, value)| value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contains(&self, option: &str) -> bool {
        self.find(option).is_some()
    }

    /// Set or overwrite an option.
    pub fn set(&mut self, option: impl Into<String>, value: impl Into<V>) {
        let option = option.into();
        let value = value.into();
        match self.options.iter_mut().find(|(key, _)| *key == option) {
            Some(slot) => slot.1 = value,
            None => self.options.push((option, value)),
        }
    }

    /// Options in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn option_names(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Mapping of section name to its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store<V = String> {
    sections: Vec<Section<V>>,
}

impl<V> Default for Store<V> {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
        }
    }
}

impl Store<String> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw text of an option.
    pub fn get(&self, section: &str, option: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(option))
    }

    /// Decode every option of every section.
    pub fn decoded(&self) -> Store<Value> {
        Store {
            sections: self.sections.iter().map(Section::decoded).collect(),
        }
    }
}

impl Store<Value> {
    pub fn get(&self, section: &str, option: &str) -> Option<&Value> {
        self.section(section).and_then(|s| s.get(option))
    }
}

impl<V> Store<V> {
    pub fn section(&self, name: &str) -> Option<&Section<V>> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Get a section, creating it empty if absent.
    pub fn section_mut(&mut self, name: &str) -> &mut Section<V> {
        let index = match self.sections.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sections.push(Section::empty(name.to_string()));
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }

    /// Set an option, creating the section if needed.
    pub fn set(&mut self, section: &str, option: impl Into<String>, value: impl Into<V>) {
        self.section_mut(section).set(option, value);
    }

    /// Apply `other` on top of `self`, key-for-key within each section.
    pub fn merge(&mut self, other: Store<V>) {
        for section in other.sections {
            let target = self.section_mut(&section.name);
            for (option, value) in section.options {
                target.set(option, value);
            }
        }
    }

    /// Sections in insertion order.
    pub fn sections(&self) -> impl Iterator<Item = &Section<V>> {
        self.sections.iter()
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl<V: Serialize> Serialize for Section<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.options.len()))?;
        for (key, value) in &self.options {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<V: Serialize> Serialize for Store<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for section in &self.sections {
            map.serialize_entry(&section.name, section)?;
        }
        map.end()
    }
}
