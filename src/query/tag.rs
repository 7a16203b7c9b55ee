//! Tag predicates on elements.

use std::fmt;

/// A condition over an element's tags. Value-carrying kinds hold their value
/// inline so a missing value cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagPredicate {
    /// `["key"]`
    Exists(String),
    /// `[!"key"]`
    NotExists(String),
    /// `["key"="value"]`
    Equals(String, String),
    /// `["key"!="value"]`
    NotEquals(String, String),
    /// `["key"~"regex"]`
    RegexMatch(String, String),
    /// `["key"!~"regex"]`
    RegexNotMatch(String, String),
}

impl TagPredicate {
    pub fn exists(key: impl Into<String>) -> Self {
        TagPredicate::Exists(key.into())
    }

    pub fn not_exists(key: impl Into<String>) -> Self {
        TagPredicate::NotExists(key.into())
    }

    pub fn equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        TagPredicate::Equals(key.into(), value.into())
    }

    pub fn not_equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        TagPredicate::NotEquals(key.into(), value.into())
    }

    pub fn regex_match(key: impl Into<String>, value: impl Into<String>) -> Self {
        TagPredicate::RegexMatch(key.into(), value.into())
    }

    pub fn regex_not_match(key: impl Into<String>, value: impl Into<String>) -> Self {
        TagPredicate::RegexNotMatch(key.into(), value.into())
    }

    pub fn key(&self) -> &str {
        match self {
            TagPredicate::Exists(key)
            | TagPredicate::NotExists(key)
            | TagPredicate::Equals(key, _)
            | TagPredicate::NotEquals(key, _)
            | TagPredicate::RegexMatch(key, _)
            | TagPredicate::RegexNotMatch(key, _) => key,
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            TagPredicate::Exists(_) | TagPredicate::NotExists(_) => None,
            TagPredicate::Equals(_, value)
            | TagPredicate::NotEquals(_, value)
            | TagPredicate::RegexMatch(_, value)
            | TagPredicate::RegexNotMatch(_, value) => Some(value),
        }
    }

    /// Operator text as it appears in the clause.
    pub fn operator(&self) -> &'static str {
        match self {
            TagPredicate::Exists(_) => "",
            TagPredicate::NotExists(_) => "!",
            TagPredicate::Equals(..) => "=",
            TagPredicate::NotEquals(..) => "!=",
            TagPredicate::RegexMatch(..) => "~",
            TagPredicate::RegexNotMatch(..) => "!~",
        }
    }
}

impl fmt::Display for TagPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value() {
            None => write!(f, "[{}\"{}\"]", self.operator(), self.key()),
            Some(value) => write!(f, "[\"{}\"{}\"{}\"]", self.key(), self.operator(), value),
        }
    }
}
