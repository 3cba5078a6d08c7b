//! Attribute access for objects evaluated by the matcher.

use std::collections::{BTreeMap, HashMap};

use crate::value::Value;

/// Capability of exposing named attributes to the matcher.
///
/// Implementors decide which attributes are declared. A declared attribute
/// holding a zero or null value still exists.
pub trait AttributeSpecifiable {
    /// Returns the value of the attribute, or `None` if it is not declared.
    fn value_for_attribute(&self, name: &str) -> Option<Value>;

    /// Returns true if the attribute is declared.
    fn attribute_exists(&self, name: &str) -> bool {
        self.value_for_attribute(name).is_some()
    }
}

impl<T: AttributeSpecifiable + ?Sized> AttributeSpecifiable for &T {
    fn value_for_attribute(&self, name: &str) -> Option<Value> {
        (**self).value_for_attribute(name)
    }

    fn attribute_exists(&self, name: &str) -> bool {
        (**self).attribute_exists(name)
    }
}

impl AttributeSpecifiable for HashMap<String, Value> {
    fn value_for_attribute(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn attribute_exists(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

impl AttributeSpecifiable for BTreeMap<String, Value> {
    fn value_for_attribute(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn attribute_exists(&self, name: &str) -> bool {
        self.contains_key(name)
    }
}

/// An ordered record of declared attributes.
///
/// # Example
///
/// ```
/// use filterql::{Attributes, AttributeSpecifiable, Value};
///
/// let json = serde_json::json!({"name": "bob", "meta": {"age": 3}});
/// let attrs = Attributes::from_json(&json).unwrap();
///
/// assert_eq!(attrs.value_for_attribute("name"), Some(Value::from("bob")));
/// assert_eq!(attrs.value_for_attribute("meta.age"), Some(Value::Int(3)));
/// assert!(attrs.attribute_exists("meta"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    values: BTreeMap<String, Value>,
}

impl Attributes {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an attribute, replacing any previous value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Declares an attribute, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builds a record from a JSON object.
    ///
    /// Nested objects are flattened to dotted keys (`a.b`) and the parent key
    /// is declared with a null value. Returns `None` if `json` is not an object.
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        let object = json.as_object()?;
        let mut attributes = Self::new();
        attributes.flatten("", object);
        Some(attributes)
    }

    fn flatten(&mut self, prefix: &str, object: &serde_json::Map<String, serde_json::Value>) {
        for (key, value) in object {
            let name = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match value {
                serde_json::Value::Object(inner) => {
                    self.values.insert(name.clone(), Value::Null);
                    self.flatten(&name, inner);
                }
                other => {
                    self.values.insert(name, Value::from(other.clone()));
                }
            }
        }
    }

    /// Returns the declared attribute names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Returns the number of declared attributes.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no attribute is declared.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl AttributeSpecifiable for Attributes {
    fn value_for_attribute(&self, name: &str) -> Option<Value> {
        self.values.value_for_attribute(name)
    }

    fn attribute_exists(&self, name: &str) -> bool {
        self.values.attribute_exists(name)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
