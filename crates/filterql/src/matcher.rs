//! Evaluation of filters against attribute-bearing objects.
//!
//! Equality follows document-database semantics: a list attribute equals a
//! list value when both hold the same elements in the same order, and
//! otherwise when one of its elements equals the value.
//!
//! # Example
//!
//! ```
//! use filterql::{Attributes, FilterMatcher};
//!
//! let filter = filterql::parse(r#"tags == "blue" and owner exists"#).unwrap();
//! let objects = vec![
//!     Attributes::new().with("tags", vec!["red", "blue"]).with("owner", "ann"),
//!     Attributes::new().with("tags", vec!["red"]).with("owner", "bob"),
//! ];
//!
//! let matcher = FilterMatcher::new(&filter);
//! let matched = matcher.filter_objects(&objects).unwrap();
//! assert_eq!(matched.len(), 1);
//! ```

use tracing::debug;

use crate::attributes::AttributeSpecifiable;
use crate::error::{MatchError, MatchResult};
use crate::filter::{Clause, Combinator, Comparator, Comparison, Filter, Group};
use crate::value::Value;

/// Evaluates one filter against any number of objects.
#[derive(Debug, Clone, Copy)]
pub struct FilterMatcher<'a> {
    filter: &'a Filter,
}

impl<'a> FilterMatcher<'a> {
    /// Creates a matcher for the given filter.
    pub fn new(filter: &'a Filter) -> Self {
        Self { filter }
    }

    /// Returns true if the object matches the filter.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::UnsupportedComparator`] when the filter uses a
    /// comparator other than `==`, `!=`, `exists` or `not exists` on a path
    /// that gets evaluated.
    pub fn matches<T: AttributeSpecifiable + ?Sized>(&self, object: &T) -> MatchResult<bool> {
        matches_filter(object, self.filter)
    }

    /// Returns the objects matching the filter, in order.
    ///
    /// Stops at the first error.
    pub fn filter_objects<'b, T: AttributeSpecifiable>(
        &self,
        objects: &'b [T],
    ) -> MatchResult<Vec<&'b T>> {
        let mut matched = Vec::new();
        for object in objects {
            if self.matches(object)? {
                matched.push(object);
            }
        }
        Ok(matched)
    }
}

impl Filter {
    /// Returns true if the object matches this filter.
    ///
    /// See [`matches_filter`].
    pub fn matches<T: AttributeSpecifiable + ?Sized>(&self, object: &T) -> MatchResult<bool> {
        matches_filter(object, self)
    }
}

/// Returns true if `object` matches every clause of `filter`.
///
/// Clauses are evaluated in order and evaluation stops at the first clause
/// that fails or errors. An empty filter matches everything.
///
/// # Panics
///
/// Panics if a `==` or `!=` comparison was built without a value.
pub fn matches_filter<T: AttributeSpecifiable + ?Sized>(
    object: &T,
    filter: &Filter,
) -> MatchResult<bool> {
    for clause in filter.clauses() {
        let matched = match clause {
            Clause::Comparison(comparison) => matches_comparison(object, comparison)?,
            Clause::Group(group) => matches_group(object, group)?,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn matches_group<T: AttributeSpecifiable + ?Sized>(object: &T, group: &Group) -> MatchResult<bool> {
    match group.combinator {
        Combinator::And => {
            for filter in &group.filters {
                if !matches_filter(object, filter)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Combinator::Or => {
            for filter in &group.filters {
                if matches_filter(object, filter)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

fn matches_comparison<T: AttributeSpecifiable + ?Sized>(
    object: &T,
    comparison: &Comparison,
) -> MatchResult<bool> {
    match comparison.comparator {
        Comparator::Equal => Ok(equals(
            &attribute_value(object, &comparison.key),
            expected_value(comparison),
        )),
        Comparator::NotEqual => Ok(!equals(
            &attribute_value(object, &comparison.key),
            expected_value(comparison),
        )),
        Comparator::Exists => Ok(object.attribute_exists(&comparison.key)),
        Comparator::NotExists => Ok(!object.attribute_exists(&comparison.key)),
        comparator => {
            debug!(key = %comparison.key, %comparator, "comparator cannot be evaluated");
            Err(MatchError::UnsupportedComparator { comparator })
        }
    }
}

fn attribute_value<T: AttributeSpecifiable + ?Sized>(object: &T, key: &str) -> Value {
    object.value_for_attribute(key).unwrap_or(Value::Null)
}

fn expected_value(comparison: &Comparison) -> &Value {
    match comparison.value() {
        Some(value) => value,
        None => panic!(
            "comparison `{} {}` has no value",
            comparison.key, comparison.comparator
        ),
    }
}

/// Equality between an attribute and a filter value.
///
/// A list attribute matches either the exact list or any element equal to the
/// value; absent attributes are null and only equal null.
fn equals(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::List(items) => {
            actual.loosely_equals(expected) || items.iter().any(|item| item.loosely_equals(expected))
        }
        _ => actual.loosely_equals(expected),
    }
}
