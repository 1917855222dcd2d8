use std::time::Instant;

use chunkload_query::{Filter, Record, Select, Value};

use crate::codec::decode;
use crate::column_map::ColumnMap;
use crate::error::EngineError;
use crate::row::{EntityTable, Row};

/// Produce labeled records for every entity matching `options`.
///
/// Results follow the table's key order. A `columns` list replaces the
/// working map, and filters resolve against that working map: a filter on a
/// column outside it sees an absent (`null`) cell. No index is used: cost
/// is entities × filters.
///
/// Only a projection naming an undeclared column is an error.
pub fn select(
    table: &EntityTable,
    columns: &ColumnMap,
    options: &Select,
) -> Result<Vec<Record>, EngineError> {
    if options.is_unrestricted() {
        return Ok(table.values().map(|row| decode(row, columns)).collect());
    }

    let started = Instant::now();

    let projected;
    let output = match &options.columns {
        Some(names) => {
            projected = columns.project(names)?;
            &projected
        }
        None => columns,
    };

    let predicates: Vec<(Option<usize>, &Filter)> = options
        .filters
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|filter| (output.position(&filter.field), filter))
        .collect();

    let records: Vec<Record> = table
        .values()
        .filter(|row| matches_all(row, &predicates))
        .map(|row| decode(row, output))
        .collect();

    tracing::debug!(
        entities = table.len(),
        matched = records.len(),
        filters = predicates.len(),
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "selected subset"
    );
    Ok(records)
}

fn matches_all(row: &Row, predicates: &[(Option<usize>, &Filter)]) -> bool {
    predicates
        .iter()
        .all(|(position, filter)| match position.and_then(|p| row.get(p)) {
            Some(cell) => filter.matches(cell),
            None => filter.matches(&Value::Null),
        })
}
