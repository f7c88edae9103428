//! Payment parameter map

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Name/value pairs exchanged between forms, the wizard and outgoing requests.
///
/// Keys are unique; a later insert replaces an earlier value. Entries with
/// an empty key or an empty value are kept (they matter for validation) but
/// never transmitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterMap(BTreeMap<String, String>);

impl ParameterMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Remove a value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Does the map contain the key
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of entries, transmittable or not
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Is the map empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterate over all entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over the entries that go on the wire
    pub fn transmittable(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(k, v)| !k.is_empty() && !v.is_empty())
    }

    /// Encode as `application/x-www-form-urlencoded`
    pub fn to_form_body(&self) -> String {
        let pairs: Vec<(&str, &str)> = self.transmittable().collect();
        // Encoding a sequence of string pairs cannot fail.
        serde_urlencoded::to_string(pairs).unwrap_or_default()
    }

    /// Encode as a URL query, `?k=v&...`, or an empty string
    pub fn to_query(&self) -> String {
        let body = self.to_form_body();
        if body.is_empty() {
            body
        } else {
            format!("?{}", body)
        }
    }
}

impl Extend<(String, String)> for ParameterMap {
    fn extend<T: IntoIterator<Item = (String, String)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<HashMap<String, String>> for ParameterMap {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl From<ParameterMap> for HashMap<String, String> {
    fn from(map: ParameterMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for ParameterMap {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParameterMap {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_insert_wins() {
        let mut params = ParameterMap::new().with("amount", "10");
        assert_eq!(params.insert("amount", "20"), Some("10".to_string()));
        assert_eq!(params.get("amount"), Some("20"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_form_body_drops_empty_entries() {
        let params = ParameterMap::new()
            .with("sum", "100.50")
            .with("comment", "")
            .with("", "orphan")
            .with("to", "41001 000");

        assert_eq!(params.len(), 4);
        assert_eq!(params.to_form_body(), "sum=100.50&to=41001+000");
        assert_eq!(params.to_query(), "?sum=100.50&to=41001+000");
        assert_eq!(ParameterMap::new().with("x", "").to_query(), "");
    }

    #[test]
    fn test_json_shape() {
        let params: ParameterMap = serde_json::from_str(r#"{"amount":"10"}"#).unwrap();
        assert_eq!(params.get("amount"), Some("10"));
        assert_eq!(serde_json::to_string(&params).unwrap(), r#"{"amount":"10"}"#);
    }
}
