use serde_json::Value as Json;

use crate::filter::Filter;
use crate::operator::Operator;
use crate::value::Value;

/// Parse error for filter lists.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("filter parse error: {0}")]
pub struct FilterParseError(pub String);

/// Parse a JSON filter list into AND-combined predicates.
///
/// Each entry is a `[column, operator, operand]` triple:
///
/// ```json
/// [["name", "starts-with", "Za"], ["state", "eq", "CA"]]
/// ```
///
/// The operand must be a JSON scalar; arrays and objects are rejected.
pub fn parse_filters(json: &Json) -> Result<Vec<Filter>, FilterParseError> {
    let entries = json
        .as_array()
        .ok_or_else(|| FilterParseError("filter list must be an array".into()))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| parse_triple(i, entry))
        .collect()
}

fn parse_triple(index: usize, entry: &Json) -> Result<Filter, FilterParseError> {
    let parts = match entry.as_array() {
        Some(parts) if parts.len() == 3 => parts,
        _ => {
            return Err(FilterParseError(format!(
                "filter {index} must be a [column, operator, operand] triple"
            )));
        }
    };

    let field = parts[0]
        .as_str()
        .ok_or_else(|| FilterParseError(format!("filter {index}: column must be a string")))?;
    let operator: Operator = parts[1]
        .as_str()
        .ok_or_else(|| FilterParseError(format!("filter {index}: operator must be a string")))?
        .parse()
        .map_err(|e| FilterParseError(format!("filter {index}: {e}")))?;
    let operand = scalar(&parts[2])
        .ok_or_else(|| FilterParseError(format!("filter {index}: operand must be a scalar")))?;

    if operator == Operator::StartsWith && operand.as_str().is_none() {
        return Err(FilterParseError(format!(
            "filter {index}: starts-with needs a string operand"
        )));
    }

    Ok(Filter::new(field, operator, operand))
}

fn scalar(json: &Json) -> Option<Value> {
    match json {
        Json::Null => Some(Value::Null),
        Json::Bool(b) => Some(Value::Bool(*b)),
        Json::Number(n) => n.as_f64().map(Value::Number),
        Json::String(s) => Some(Value::String(s.clone())),
        Json::Array(_) | Json::Object(_) => None,
    }
}
