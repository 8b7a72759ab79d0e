//! Ordered, case-insensitive header collection.
//!
//! # Design
//! Headers are kept as an insertion-ordered list of owned pairs rather than a
//! map: the same key may appear more than once, and the order in which the
//! caller set headers is preserved on the wire. Key comparisons are ASCII
//! case-insensitive; keys are stored exactly as the caller wrote them.

/// Well-known key for the request/response media type.
pub const CONTENT_TYPE: &str = "content-type";

/// Well-known key for the body length in bytes.
pub const CONTENT_LENGTH: &str = "content-length";

/// Well-known key identifying the calling application.
pub const USER_AGENT: &str = "user-agent";

/// An ordered, mutable set of header key-value pairs.
///
/// Mutations before a request is executed affect the outgoing request;
/// mutations afterwards have no effect. Not safe for concurrent mutation —
/// each instance is owned by the call site that created it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(String, String)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Returns the first value for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value for `name` in insertion order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replaces every existing value for `name` with a single value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.entries.push((name, value.into()));
    }

    /// Appends a value for `name` without touching existing ones.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Removes every value for `name`, returning how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        before - self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merges `other` into `self`: every key present in `other` replaces the
    /// values already here, so the merged-in set wins on conflicts.
    pub fn merge_from(&mut self, other: &HeaderSet) {
        let mut replaced: Vec<&str> = Vec::new();
        for (name, value) in other.iter() {
            if !replaced.iter().any(|k| k.eq_ignore_ascii_case(name)) {
                self.remove(name);
                replaced.push(name);
            }
            self.entries.push((name.to_string(), value.to_string()));
        }
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.get(USER_AGENT)
    }

    pub fn set_user_agent(&mut self, value: impl Into<String>) {
        self.set(USER_AGENT, value);
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get(CONTENT_TYPE)
    }

    pub fn set_content_type(&mut self, value: impl Into<String>) {
        self.set(CONTENT_TYPE, value);
    }

    /// Parses the `content-length` header, if present and numeric.
    pub fn content_length(&self) -> Option<u64> {
        self.get(CONTENT_LENGTH).and_then(|v| v.parse().ok())
    }

    pub fn set_content_length(&mut self, len: u64) {
        self.set(CONTENT_LENGTH, len.to_string());
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for HeaderSet {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}
