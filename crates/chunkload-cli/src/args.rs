use std::time::Duration;

use chunkload_query::{Filter, FilterParseError, parse_filters};
use chunkload_store::{Select, StoreConfig};
use clap::Parser;

/// Load partitioned CSV resources into one merged entity table and query it.
#[derive(Parser, Debug)]
#[command(name = "chunkload", version)]
pub struct Args {
    /// Base URL the partition ids are appended to.
    #[arg(long, env = "CHUNKLOAD_ENDPOINT")]
    pub endpoint: String,

    /// Declared column order; the first column keys entities.
    #[arg(long, env = "CHUNKLOAD_COLUMNS", value_delimiter = ',', required = true)]
    pub columns: Vec<String>,

    /// Cap on concurrent fetch+parse work. Unbounded when unset.
    #[arg(long = "max-concurrent", env = "CHUNKLOAD_MAX_CONCURRENT")]
    pub max_concurrent: Option<usize>,

    /// Per-partition load timeout in milliseconds.
    #[arg(long = "timeout-ms", env = "CHUNKLOAD_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Keep records whose COLUMN starts with VALUE. Repeatable; all must hold.
    #[arg(long = "prefix", value_name = "COLUMN=VALUE", value_parser = parse_prefix)]
    pub prefixes: Vec<Filter>,

    /// Extra filters as JSON triples, e.g. '[["name","starts-with","Z"]]'.
    #[arg(long, value_name = "JSON")]
    pub filters: Option<String>,

    /// Columns to print. All declared columns when unset. Filters only see
    /// the selected columns.
    #[arg(long, value_delimiter = ',')]
    pub select: Option<Vec<String>>,

    /// Retry partitions that errored, once, before querying.
    #[arg(long)]
    pub retry: bool,

    /// Partition ids to load.
    #[arg(required = true)]
    pub partitions: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ArgsError {
    #[error("--filters is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Filter(#[from] FilterParseError),
}

impl Args {
    pub fn store_config(&self) -> StoreConfig {
        let mut config = StoreConfig::new(self.endpoint.clone(), self.columns.iter().cloned());
        if let Some(limit) = self.max_concurrent {
            config = config.with_max_concurrent_loads(limit);
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_load_timeout(Duration::from_millis(ms));
        }
        config
    }

    /// Prefix flags and JSON filters combined into one query.
    pub fn query(&self) -> Result<Select, ArgsError> {
        let mut filters = self.prefixes.clone();
        if let Some(json) = &self.filters {
            let value: serde_json::Value = serde_json::from_str(json)?;
            filters.extend(parse_filters(&value)?);
        }

        let mut select = Select::all();
        if let Some(columns) = &self.select {
            select = select.columns(columns.iter().cloned());
        }
        if !filters.is_empty() {
            select = select.filters(filters);
        }
        Ok(select)
    }
}

fn parse_prefix(raw: &str) -> Result<Filter, String> {
    match raw.split_once('=') {
        Some((column, prefix)) if !column.is_empty() => Ok(Filter::starts_with(column, prefix)),
        _ => Err(format!("expected COLUMN=VALUE, got {raw:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkload_query::Operator;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("chunkload").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn builds_config_from_flags() {
        let args = parse(&[
            "--endpoint",
            "http://localhost/schools",
            "--columns",
            "id,name,lat",
            "--max-concurrent",
            "4",
            "--timeout-ms",
            "2500",
            "06.csv",
            "01.csv",
        ]);
        let config = args.store_config();
        assert_eq!(config.endpoint, "http://localhost/schools");
        assert_eq!(config.columns, vec!["id", "name", "lat"]);
        assert_eq!(config.max_concurrent_loads, Some(4));
        assert_eq!(config.load_timeout, Some(Duration::from_millis(2500)));
        assert_eq!(args.partitions, vec!["06.csv", "01.csv"]);
    }

    #[test]
    fn combines_prefixes_and_json_filters() {
        let args = parse(&[
            "--endpoint",
            "http://x",
            "--columns",
            "id,name",
            "--prefix",
            "name=Zu",
            "--filters",
            r#"[["id","eq",2]]"#,
            "--select",
            "name",
            "06.csv",
        ]);
        let select = args.query().unwrap();
        let filters = select.filters.unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0], Filter::starts_with("name", "Zu"));
        assert_eq!(filters[1].operator, Operator::Eq);
        assert_eq!(select.columns, Some(vec!["name".to_string()]));
    }

    #[test]
    fn no_restrictions_means_unrestricted_query() {
        let args = parse(&["--endpoint", "http://x", "--columns", "id", "06.csv"]);
        assert!(args.query().unwrap().is_unrestricted());
    }

    #[test]
    fn rejects_malformed_prefix() {
        let err = Args::try_parse_from([
            "chunkload",
            "--endpoint",
            "http://x",
            "--columns",
            "id",
            "--prefix",
            "name",
            "06.csv",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("COLUMN=VALUE"));
    }

    #[test]
    fn reports_bad_filter_json() {
        let args = parse(&[
            "--endpoint",
            "http://x",
            "--columns",
            "id",
            "--filters",
            "[[",
            "06.csv",
        ]);
        assert!(matches!(args.query(), Err(ArgsError::Json(_))));
    }

    #[test]
    fn requires_partitions() {
        assert!(Args::try_parse_from(["chunkload", "--endpoint", "http://x", "--columns", "id"]).is_err());
    }
}
