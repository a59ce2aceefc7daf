use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A single key/value attribute carried by a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// A named bundle of attributes conferred on bound subjects
///
/// Attributes are stored as a list, not a map: duplicate keys are permitted
/// at this level and are only collapsed when the list is projected into an
/// [`crate::EffectiveAttributes`] lookup (last occurrence wins).
///
/// `id` is `None` for a group that has not been persisted yet, and for the
/// synthetic group produced by [`crate::merge_groups`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Option<Uuid>,
    pub attributes: Vec<Attribute>,
}

impl Group {
    pub fn new(id: Uuid, attributes: Vec<Attribute>) -> Self {
        Self {
            id: Some(id),
            attributes,
        }
    }

    /// A group without an assigned identifier; the store assigns one on put
    pub fn with_attributes(attributes: Vec<Attribute>) -> Self {
        Self {
            id: None,
            attributes,
        }
    }
}

/// A named, stored condition tree
///
/// `condition` mirrors the wire shape, where the root condition is optional;
/// checking a policy without one fails with
/// [`crate::PolicyError::MalformedPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: Option<Uuid>,
    pub condition: Option<Condition>,
}

impl Policy {
    pub fn new(id: Uuid, condition: Condition) -> Self {
        Self {
            id: Some(id),
            condition: Some(condition),
        }
    }

    pub fn with_condition(condition: Condition) -> Self {
        Self {
            id: None,
            condition: Some(condition),
        }
    }
}

/// One node of a policy's predicate tree
///
/// Exactly one variant per node; dispatch is a single exhaustive match, so
/// an unrecognized node cannot survive deserialization. The two malformed
/// shapes the wire format still allows (a policy without a root condition, a
/// negation without an inner condition) are rejected at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Permitted iff every listed key is present in the effective attributes
    HasAttribute { keys: Vec<String> },
    /// Compare one attribute's value against a literal
    EvaluateAttribute {
        key: String,
        op: Operation,
        value: String,
    },
    /// Invert the inner verdict; errors pass through unchanged
    Negation { condition: Option<Box<Condition>> },
    /// Permitted iff every child is permitted; short-circuits on the first
    /// non-permitted child. Empty is permitted.
    And { conditions: Vec<Condition> },
    /// Permitted iff any child is permitted; short-circuits on the first
    /// permitted child. Empty is denied.
    Or { conditions: Vec<Condition> },
}

impl Condition {
    pub fn has_attribute<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::HasAttribute {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn evaluate_attribute(key: &str, op: Operation, value: &str) -> Self {
        Self::EvaluateAttribute {
            key: key.to_string(),
            op,
            value: value.to_string(),
        }
    }

    pub fn negation(inner: Condition) -> Self {
        Self::Negation {
            condition: Some(Box::new(inner)),
        }
    }

    pub fn and(conditions: Vec<Condition>) -> Self {
        Self::And { conditions }
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Self::Or { conditions }
    }
}

/// Comparison operator for [`Condition::EvaluateAttribute`]
///
/// All comparisons are string-typed: the ordered operators compare
/// lexicographically and `Contains` is a substring test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Eq,
    Contains,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl Operation {
    /// Whether the operator holds between an attribute's value and the
    /// condition's literal
    pub fn holds(self, attribute: &str, value: &str) -> bool {
        match self {
            Operation::Eq => attribute == value,
            Operation::Contains => attribute.contains(value),
            Operation::Gt => attribute > value,
            Operation::Lt => attribute < value,
            Operation::Gte => attribute >= value,
            Operation::Lte => attribute <= value,
        }
    }
}

/// Terminal evaluation outcome
///
/// `Unknown` exists for wire compatibility only; a successful evaluation
/// always resolves to `Permitted` or `Denied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Unknown,
    Permitted,
    Denied,
}

impl Verdict {
    /// Swap Permitted and Denied; anything else is returned unchanged
    pub fn negate(self) -> Self {
        match self {
            Verdict::Permitted => Verdict::Denied,
            Verdict::Denied => Verdict::Permitted,
            other => other,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Unknown => write!(f, "UNKNOWN"),
            Verdict::Permitted => write!(f, "PERMITTED"),
            Verdict::Denied => write!(f, "DENIED"),
        }
    }
}

/// Caller-supplied request context threaded through evaluation
///
/// No current operator inspects it; it is carried so context-sensitive
/// operators can be added without changing the evaluation signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextProperty {
    pub properties: Vec<Attribute>,
}
