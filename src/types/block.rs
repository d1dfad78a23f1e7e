//! Block descriptors parsed from palette keys.

use indexmap::IndexMap;

/// Block state properties, in declaration order.
///
/// Keys are unique: when a key repeats, the first occurrence is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockProperties(IndexMap<String, String>);

impl BlockProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the inside of a `[...]` property list, e.g. `facing=north,half=top`.
    pub fn parse(list: &str) -> Self {
        let mut properties = Self::new();
        for entry in list.split(',') {
            if let Some((key, value)) = entry.split_once('=') {
                properties.insert(key, value);
            }
        }
        properties
    }

    /// Insert a property unless the key is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for BlockProperties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// A block name plus its state properties, e.g. `minecraft:oak_stairs[facing=north]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDescriptor {
    /// Block name, e.g., "minecraft:stone"
    pub name: String,
    /// Block properties, e.g., {"facing": "north"}
    pub properties: BlockProperties,
}

impl BlockDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BlockProperties::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Parse a palette key. Properties run from the first `[` to the first `]`
    /// after it (or to the end of the key when unterminated).
    pub fn parse(key: &str) -> Self {
        match key.split_once('[') {
            Some((name, rest)) => {
                let list = rest.split_once(']').map_or(rest, |(list, _)| list);
                Self {
                    name: name.to_string(),
                    properties: BlockProperties::parse(list),
                }
            }
            None => Self::new(key),
        }
    }

    /// Get the block ID without namespace (e.g., "stone").
    pub fn block_id(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, id)| id)
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key)
    }

    /// Check if this is an air block.
    pub fn is_air(&self) -> bool {
        matches!(self.block_id(), "air" | "cave_air" | "void_air")
    }
}

impl std::fmt::Display for BlockDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.properties.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}[{}]", self.name, self.properties)
        }
    }
}
