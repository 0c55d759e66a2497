//! Bytes + encoding to rows of strings

use encoding_rs::Encoding;
use crate::error::DataError;

/// Turns the bytes of one data file into rows of cell texts
pub trait GridParser {
    /// Decode `bytes` with the encoding named by `encoding` and split into rows
    fn parse(&self, bytes: &[u8], encoding: &str) -> Result<Vec<Vec<String>>, DataError>;
}

/// Look up an encoding by label ("UTF-8", "utf8", "GBK", ...)
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding, DataError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| DataError::UnknownEncoding(label.to_string()))
}

/// Decode bytes, honoring a byte-order mark if present
pub fn decode(bytes: &[u8], encoding: &str) -> Result<String, DataError> {
    let encoding = encoding_for_label(encoding)?;
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(DataError::Decode(used.name().to_string()));
    }
    Ok(text.into_owned())
}

/// CSV grid parser: comma separated, no header handling, ragged rows allowed
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvGridParser;

impl GridParser for CsvGridParser {
    fn parse(&self, bytes: &[u8], encoding: &str) -> Result<Vec<Vec<String>>, DataError> {
        let text = decode(bytes, encoding)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_and_ragged_rows() {
        let rows = CsvGridParser
            .parse(b"id,name\n1,\"a,b\"\n2\n", "UTF-8")
            .unwrap();
        assert_eq!(rows, vec![
            vec!["id".to_string(), "name".to_string()],
            vec!["1".to_string(), "a,b".to_string()],
            vec!["2".to_string()],
        ]);
    }

    #[test]
    fn strips_bom() {
        let rows = CsvGridParser.parse(b"\xEF\xBB\xBFid\n1\n", "utf-8").unwrap();
        assert_eq!(rows[0][0], "id");
    }

    #[test]
    fn decodes_gbk() {
        // "剑" in GBK
        let rows = CsvGridParser.parse(b"\xBD\xA3\n", "GBK").unwrap();
        assert_eq!(rows[0][0], "剑");
    }

    #[test]
    fn unknown_encoding() {
        let err = CsvGridParser.parse(b"a", "no-such-encoding").unwrap_err();
        assert!(matches!(err, DataError::UnknownEncoding(_)));
    }
}
