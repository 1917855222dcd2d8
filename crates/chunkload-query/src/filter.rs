use serde::{Deserialize, Serialize};

use crate::operator::Operator;
use crate::value::Value;

/// One `(column, operator, operand)` predicate. A filter list is AND-combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn starts_with(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::new(field, Operator::StartsWith, Value::String(prefix.into()))
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Eq, value)
    }

    /// Test a single cell against this predicate.
    pub fn matches(&self, cell: &Value) -> bool {
        match self.operator {
            // Non-string cells and non-string operands never match a prefix.
            Operator::StartsWith => match (cell, &self.value) {
                (Value::String(s), Value::String(prefix)) => s.starts_with(prefix.as_str()),
                _ => false,
            },
            Operator::Eq => match (cell, &self.value) {
                (Value::Null, Value::Null) => true,
                (Value::Number(a), Value::Number(b)) => a == b,
                (Value::String(a), Value::String(b)) => a == b,
                (Value::Bool(a), Value::Bool(b)) => a == b,
                _ => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_requires_string_cell() {
        let f = Filter::starts_with("name", "Zu");
        assert!(f.matches(&Value::from("Zulu")));
        assert!(!f.matches(&Value::from("Zeta")));
        assert!(!f.matches(&Value::Null));
        assert!(!f.matches(&Value::Number(12.0)));
    }

    #[test]
    fn empty_prefix_matches_any_string() {
        let f = Filter::starts_with("name", "");
        assert!(f.matches(&Value::from("")));
        assert!(f.matches(&Value::from("anything")));
        assert!(!f.matches(&Value::Null));
    }

    #[test]
    fn eq_compares_same_shapes() {
        assert!(Filter::equals("n", 3.0).matches(&Value::Number(3.0)));
        assert!(!Filter::equals("n", 3.0).matches(&Value::from("3")));
        assert!(Filter::equals("flag", false).matches(&Value::Bool(false)));
        assert!(Filter::equals("gone", Value::Null).matches(&Value::Null));
        assert!(!Filter::equals("gone", Value::Null).matches(&Value::from("")));
    }
}
