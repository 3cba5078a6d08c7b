//! Programmatic construction of filters.

use crate::filter::{Clause, Combinator, Comparator, Comparison, Filter, Group};
use crate::value::Value;

/// Builder appending clauses to a filter in call order.
///
/// A key started with [`with_key`](Self::with_key) must be completed by a
/// comparator before the filter can be finished with [`done`](Self::done).
///
/// # Example
///
/// ```
/// use filterql::FilterComposer;
///
/// let filter = FilterComposer::new()
///     .with_key("namespace").equals("/acme")
///     .with_key("tags").contains(["prod", "eu"])
///     .or([
///         FilterComposer::new().with_key("age").greater_than(18).done(),
///         FilterComposer::new().with_key("admin").exists().done(),
///     ])
///     .done();
///
/// assert_eq!(
///     filter.to_string(),
///     r#"namespace == "/acme" and tags contains ["prod", "eu"] or ((age > 18) or (admin exists))"#
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterComposer {
    clauses: Vec<Clause>,
}

impl FilterComposer {
    /// Creates an empty composer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a comparison on `key`.
    pub fn with_key(self, key: impl Into<String>) -> FilterValueComposer {
        FilterValueComposer {
            composer: self,
            key: key.into(),
        }
    }

    /// Adds a group whose sub-filters must all match.
    pub fn and(self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.push_group(Combinator::And, filters)
    }

    /// Adds a group where at least one sub-filter must match.
    pub fn or(self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.push_group(Combinator::Or, filters)
    }

    /// Finishes the composition.
    pub fn done(self) -> Filter {
        Filter::from_clauses(self.clauses)
    }

    fn push_group(mut self, combinator: Combinator, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.clauses.push(Clause::Group(Group {
            combinator,
            filters: filters.into_iter().collect(),
        }));
        self
    }
}

/// Builder state after [`FilterComposer::with_key`], waiting for a comparator.
#[derive(Debug, Clone)]
#[must_use = "a key must be completed by a comparator"]
pub struct FilterValueComposer {
    composer: FilterComposer,
    key: String,
}

impl FilterValueComposer {
    fn push(mut self, comparator: Comparator, values: Vec<Value>) -> FilterComposer {
        self.composer.clauses.push(Clause::Comparison(Comparison {
            key: self.key,
            comparator,
            values,
        }));
        self.composer
    }

    fn push_single(self, comparator: Comparator, value: impl Into<Value>) -> FilterComposer {
        self.push(comparator, vec![value.into()])
    }

    fn push_many<I, V>(self, comparator: Comparator, values: I) -> FilterComposer
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push(comparator, values.into_iter().map(Into::into).collect())
    }

    /// `key == value`
    pub fn equals(self, value: impl Into<Value>) -> FilterComposer {
        self.push_single(Comparator::Equal, value)
    }

    /// `key != value`
    pub fn not_equals(self, value: impl Into<Value>) -> FilterComposer {
        self.push_single(Comparator::NotEqual, value)
    }

    /// `key > value`
    pub fn greater_than(self, value: impl Into<Value>) -> FilterComposer {
        self.push_single(Comparator::Greater, value)
    }

    /// `key >= value`
    pub fn greater_or_equal_than(self, value: impl Into<Value>) -> FilterComposer {
        self.push_single(Comparator::GreaterOrEqual, value)
    }

    /// `key < value`
    pub fn lesser_than(self, value: impl Into<Value>) -> FilterComposer {
        self.push_single(Comparator::Lesser, value)
    }

    /// `key <= value`
    pub fn lesser_or_equal_than(self, value: impl Into<Value>) -> FilterComposer {
        self.push_single(Comparator::LesserOrEqual, value)
    }

    /// `key in [values]`
    pub fn in_values<I, V>(self, values: I) -> FilterComposer
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push_many(Comparator::In, values)
    }

    /// `key not in [values]`
    pub fn not_in<I, V>(self, values: I) -> FilterComposer
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push_many(Comparator::NotIn, values)
    }

    /// `key contains [values]`
    pub fn contains<I, V>(self, values: I) -> FilterComposer
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push_many(Comparator::Contain, values)
    }

    /// `key not contains [values]`
    pub fn not_contains<I, V>(self, values: I) -> FilterComposer
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push_many(Comparator::NotContain, values)
    }

    /// `key matches [values]`
    pub fn matches<I, V>(self, values: I) -> FilterComposer
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.push_many(Comparator::Match, values)
    }

    /// `key exists`
    pub fn exists(self) -> FilterComposer {
        self.push(Comparator::Exists, vec![Value::Bool(true)])
    }

    /// `key not exists`
    pub fn not_exists(self) -> FilterComposer {
        self.push(Comparator::NotExists, vec![Value::Bool(false)])
    }
}
