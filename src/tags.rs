use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::registry::{BUILTIN_TAGS, BuiltinTag, OPERATORS, Operator};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    String,
    Boolean,
    Integer,
    Duration,
    Date,
    Percentage,
}

impl FieldKind {
    /// Whether `>`, `<=` and friends make sense for this kind.
    #[must_use]
    pub fn is_ordered(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Duration | Self::Date | Self::Percentage
        )
    }
}

/// Where a tag's value suggestions come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    /// Fixed list, filtered locally
    Predefined,
    /// Fixed list plus a live release lookup
    Releases,
    /// Fixed list plus the injected member list
    Members,
    /// Debounced remote lookup
    #[default]
    Lookup,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDescriptor {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub source: ValueSource,
    #[serde(default)]
    pub values: Vec<String>,
    /// Leading matches that are always shown, regardless of the item limit
    #[serde(default)]
    pub max_suggested_values: Option<usize>,
}

impl TagDescriptor {
    #[must_use]
    pub fn new(key: &str, kind: FieldKind, source: ValueSource) -> Self {
        Self {
            key: key.to_string(),
            kind,
            source,
            values: Vec::new(),
            max_suggested_values: None,
        }
    }

    #[must_use]
    pub fn with_values(mut self, values: &[&str]) -> Self {
        self.values = values.iter().map(ToString::to_string).collect();
        self
    }

    /// Operators offered in the helper group for this tag.
    #[must_use]
    pub fn valid_operators(&self) -> Vec<Operator> {
        OPERATORS
            .iter()
            .filter(|syntax| self.kind.is_ordered() || !syntax.relational)
            .map(|syntax| syntax.operator)
            .collect()
    }
}

impl From<&BuiltinTag> for TagDescriptor {
    fn from(tag: &BuiltinTag) -> Self {
        Self {
            key: tag.key.to_string(),
            kind: tag.kind,
            source: tag.source,
            values: tag.values.iter().map(ToString::to_string).collect(),
            max_suggested_values: tag.max_suggested_values,
        }
    }
}

/// Known tag keys, ordered by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SupportedTags {
    tags: BTreeMap<String, TagDescriptor>,
}

impl SupportedTags {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn builtin() -> Self {
        let mut tags = Self::new();
        for tag in BUILTIN_TAGS {
            tags.insert(TagDescriptor::from(tag));
        }
        tags
    }

    pub fn insert(&mut self, tag: TagDescriptor) {
        self.tags.insert(tag.key.clone(), tag);
    }

    /// Adds or replaces tags; map keys win over an empty `key` field.
    pub fn extend(&mut self, overrides: &BTreeMap<String, TagDescriptor>) {
        for (key, tag) in overrides {
            let mut tag = tag.clone();
            if tag.key.is_empty() {
                tag.key = key.clone();
            }
            self.insert(tag);
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TagDescriptor> {
        self.tags.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tags.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl FromIterator<TagDescriptor> for SupportedTags {
    fn from_iter<I: IntoIterator<Item = TagDescriptor>>(iter: I) -> Self {
        let mut tags = Self::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}
