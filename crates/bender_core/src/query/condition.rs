//! Column/value equality predicate.

use rusqlite::types::Value;

/// Immutable `column = value` predicate.
///
/// Built per call and consumed by the select/update/delete builders. The
/// column name is not checked against any table definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    column: String,
    value: Value,
}

impl Condition {
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Creates an equality condition on `column`.
pub fn column_value_condition(column: impl Into<String>, value: impl Into<Value>) -> Condition {
    Condition {
        column: column.into(),
        value: value.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::column_value_condition;
    use rusqlite::types::Value;

    #[test]
    fn condition_keeps_column_and_value() {
        let condition = column_value_condition("id", "abc".to_string());
        assert_eq!(condition.column(), "id");
        assert_eq!(condition.value(), &Value::Text("abc".to_string()));
    }

    #[test]
    fn condition_accepts_integer_values() {
        let condition = column_value_condition("author_id", 7_i64);
        assert_eq!(condition.value(), &Value::Integer(7));
    }
}
