use chunkload_query::Record;

use crate::error::LoadError;
use crate::infer::{AutoType, InferType};

/// Turns the raw text of one partition into labeled records.
pub trait Parse: Send + Sync {
    fn parse(&self, text: &str) -> Result<Vec<Record>, LoadError>;
}

/// Header-first delimited text, one record per line.
///
/// Short rows leave trailing columns absent, extra cells beyond the header
/// are ignored, and a repeated header name keeps its last cell.
#[derive(Debug, Clone)]
pub struct CsvParser<I = AutoType> {
    infer: I,
    delimiter: u8,
}

impl Default for CsvParser<AutoType> {
    fn default() -> Self {
        Self::new(AutoType)
    }
}

impl<I: InferType> CsvParser<I> {
    pub fn new(infer: I) -> Self {
        Self {
            infer,
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl<I: InferType> Parse for CsvParser<I> {
    fn parse(&self, text: &str) -> Result<Vec<Record>, LoadError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let mut record = Record::with_capacity(headers.len());
            for (name, raw) in headers.iter().zip(row.iter()) {
                record.insert(name, self.infer.infer(raw));
            }
            records.push(record);
        }
        Ok(records)
    }
}
