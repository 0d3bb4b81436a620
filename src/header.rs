//! Headers container.
//!
//! HTTP header names are case-insensitive, but proxies and debugging tools
//! care about the exact bytes that went over the wire, so this container
//! keeps every field in insertion order with its original casing while
//! indexing lookups by upper-cased name. Repeated names stay repeated; two
//! `X-Color` fields are two entries, never a comma-joined value.

use std::collections::HashMap;
use std::fmt;

/// An ordered, case-insensitive multi-map of HTTP header fields.
///
/// Immutable once built; use [`builder`](RawHeaders::builder) or
/// [`to_builder`](RawHeaders::to_builder) to construct or derive one.
#[derive(Debug, Clone)]
pub struct RawHeaders {
    entries: Vec<(String, String)>,
    index: HashMap<String, Vec<usize>>,
}

impl RawHeaders {
    /// A headers container with no fields.
    pub fn empty() -> RawHeaders {
        RawHeaders {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Starts building a new headers container.
    pub fn builder() -> HeadersBuilder {
        HeadersBuilder {
            entries: Vec::new(),
        }
    }

    /// Starts a builder seeded with this container's entries.
    pub fn to_builder(&self) -> HeadersBuilder {
        HeadersBuilder {
            entries: self.entries.clone(),
        }
    }

    /// All values for `name`, in insertion order. Lookup is
    /// case-insensitive; the list is empty when the name is absent.
    pub fn get(&self, name: &str) -> Vec<&str> {
        match self.index.get(&name.to_uppercase()) {
            Some(positions) => positions
                .iter()
                .map(|&i| self.entries[i].1.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    /// The first value for `name`, if any.
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.index
            .get(&name.to_uppercase())
            .and_then(|positions| positions.first())
            .map(|&i| self.entries[i].1.as_str())
    }

    /// Whether at least one field with `name` is present, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&name.to_uppercase())
    }

    /// The field names in insertion order, original casing, repeats kept.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// The distinct upper-cased names, ordered by first insertion.
    pub fn unique_names(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for (name, _) in &self.entries {
            let upper = name.to_uppercase();
            if !seen.contains(&upper) {
                seen.push(upper);
            }
        }
        seen
    }

    /// A map from upper-cased name to the ordered list of values for it.
    pub fn as_map(&self) -> HashMap<String, Vec<String>> {
        let mut map: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in &self.entries {
            map.entry(name.to_uppercase())
                .or_insert_with(Vec::new)
                .push(value.clone());
        }
        map
    }

    /// The number of fields, counting repeats.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the container holds no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, value)` pairs in insertion order, original casing.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl PartialEq for RawHeaders {
    fn eq(&self, other: &RawHeaders) -> bool {
        self.entries == other.entries
    }
}

impl Eq for RawHeaders {}

/// Writes each field as `Name: value\r\n`, byte-identical in order and
/// casing to how the fields were inserted.
impl fmt::Display for RawHeaders {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (name, value) in &self.entries {
            write!(f, "{}: {}\r\n", name, value)?;
        }
        Ok(())
    }
}

/// A builder for [`RawHeaders`](RawHeaders).
///
/// Names are stored as given; the parser validates characters before
/// insertion, and callers constructing headers directly are expected to
/// supply legal names.
#[derive(Debug, Clone)]
pub struct HeadersBuilder {
    entries: Vec<(String, String)>,
}

impl HeadersBuilder {
    /// Appends a field, keeping any existing entries with the same name.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> HeadersBuilder {
        self.entries.push((name.into(), value.into()));
        self
    }

    /// Removes every entry whose upper-cased name matches `name`, then
    /// appends a single `(name, value)` entry with the supplied casing.
    pub fn overwrite(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> HeadersBuilder {
        let name = name.into();
        let upper = name.to_uppercase();
        self.entries.retain(|(n, _)| n.to_uppercase() != upper);
        self.entries.push((name, value.into()));
        self
    }

    /// Removes every entry whose upper-cased name matches `name`.
    pub fn remove(mut self, name: &str) -> HeadersBuilder {
        let upper = name.to_uppercase();
        self.entries.retain(|(n, _)| n.to_uppercase() != upper);
        self
    }

    /// Appends all entries of `other`, in order, after the current ones.
    pub fn merge(mut self, other: &RawHeaders) -> HeadersBuilder {
        for (name, value) in other.iter() {
            self.entries.push((name.to_string(), value.to_string()));
        }
        self
    }

    /// Freezes the builder into an immutable container.
    pub fn build(self) -> RawHeaders {
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, (name, _)) in self.entries.iter().enumerate() {
            index
                .entry(name.to_uppercase())
                .or_insert_with(Vec::new)
                .push(i);
        }
        RawHeaders {
            entries: self.entries,
            index,
        }
    }
}
