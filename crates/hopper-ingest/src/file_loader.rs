//! Parse an uploaded delimited file into a [`TabularFile`].
//!
//! The first row is the header. Every other row must have exactly as many
//! fields. Empty fields become `NULL`. Nothing is checked against the
//! destination table; a mismatch surfaces as a write failure later.

use std::collections::HashSet;
use std::io::Read;

use flate2::read::GzDecoder;
use hopper_core::{FileUpload, TabularFile};

use crate::error::ParseError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const GZIP_MAGIC: &[u8] = &[0x1F, 0x8B];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    pub delimiter: u8,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// True when the upload carries nothing to parse.
#[must_use]
pub fn is_empty(upload: &FileUpload) -> bool {
    upload.is_blank()
}

/// Parse `upload` as CSV (gunzipping `.gz` payloads first).
///
/// # Errors
///
/// Returns a [`ParseError`] for a missing, empty or duplicated header name,
/// a row whose field count differs from the header, invalid UTF-8, or a
/// corrupt gzip stream.
pub fn parse(upload: &FileUpload, options: &ParseOptions) -> Result<TabularFile, ParseError> {
    let decoded = decompress(upload)?;
    let bytes = decoded
        .strip_prefix(UTF8_BOM)
        .unwrap_or(decoded.as_slice());

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let columns = header_names(reader.headers().map_err(classify)?)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(classify)?;
        rows.push(
            record
                .iter()
                .map(|field| (!field.is_empty()).then(|| field.to_string()))
                .collect(),
        );
    }

    tracing::debug!(
        file = %upload.name,
        columns = columns.len(),
        rows = rows.len(),
        "parsed upload"
    );
    Ok(TabularFile::new(columns, rows)?)
}

fn decompress(upload: &FileUpload) -> Result<Vec<u8>, ParseError> {
    let gzipped = upload.name.to_ascii_lowercase().ends_with(".gz")
        || upload.bytes.starts_with(GZIP_MAGIC);
    if !gzipped {
        return Ok(upload.bytes.clone());
    }
    let mut out = Vec::new();
    GzDecoder::new(upload.bytes.as_slice())
        .read_to_end(&mut out)
        .map_err(|source| ParseError::Gzip {
            name: upload.name.clone(),
            source,
        })?;
    Ok(out)
}

fn header_names(headers: &csv::StringRecord) -> Result<Vec<String>, ParseError> {
    if headers.is_empty() {
        return Err(ParseError::MissingHeader);
    }
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(headers.len());
    for (index, name) in headers.iter().enumerate() {
        if name.is_empty() {
            return Err(ParseError::EmptyHeader {
                position: index + 1,
            });
        }
        if !seen.insert(name.to_ascii_uppercase()) {
            return Err(ParseError::DuplicateHeader(name.to_string()));
        }
        columns.push(name.to_string());
    }
    Ok(columns)
}

fn classify(err: csv::Error) -> ParseError {
    match err.kind() {
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => {
            return ParseError::FieldCount {
                line: pos.as_ref().map_or(0, csv::Position::line),
                expected: *expected_len,
                found: *len,
            };
        }
        csv::ErrorKind::Utf8 { pos, .. } => {
            return ParseError::InvalidUtf8 {
                line: pos.as_ref().map_or(0, csv::Position::line),
            };
        }
        _ => {}
    }
    ParseError::Csv(err)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn upload(text: &str) -> FileUpload {
        FileUpload::new("data.csv", text.as_bytes().to_vec())
    }

    fn parse_default(text: &str) -> Result<TabularFile, ParseError> {
        parse(&upload(text), &ParseOptions::default())
    }

    #[test]
    fn parses_header_and_rows() {
        let table = parse_default("NAME,SALARY\nada,100\nbob,\n").expect("parse");
        assert_eq!(table.columns(), ["NAME", "SALARY"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0], vec![Some("ada".into()), Some("100".into())]);
        assert_eq!(table.rows()[1], vec![Some("bob".into()), None]);
    }

    #[test]
    fn quoted_fields_keep_delimiters_and_newlines() {
        let table = parse_default("NAME,NOTE\n\"smith, j\",\"two\nlines\"\n").expect("parse");
        assert_eq!(
            table.rows()[0],
            vec![Some("smith, j".into()), Some("two\nlines".into())]
        );
    }

    #[test]
    fn header_only_file_has_no_rows() {
        let table = parse_default("NAME,SALARY\n").expect("parse");
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn strips_bom_but_keeps_header_padding() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"NAME, SALARY \nada,1\n");
        let table = parse(&FileUpload::new("bom.csv", bytes), &ParseOptions::default())
            .expect("parse");
        assert_eq!(table.columns(), ["NAME", " SALARY "]);
    }

    #[test]
    fn custom_delimiter() {
        let options = ParseOptions { delimiter: b'\t' };
        let table = parse(&upload("NAME\tSALARY\nada\t100\n"), &options).expect("parse");
        assert_eq!(table.rows()[0][1].as_deref(), Some("100"));
    }

    #[test]
    fn reads_gzipped_upload() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"NAME,SALARY\nada,100\n").expect("write");
        let bytes = encoder.finish().expect("finish");

        let table = parse(&FileUpload::new("data.csv.gz", bytes), &ParseOptions::default())
            .expect("parse");
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn corrupt_gzip_is_rejected() {
        let err = parse(
            &FileUpload::new("data.csv.gz", b"not gzip at all".to_vec()),
            &ParseOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::Gzip { ref name, .. } if name == "data.csv.gz"));
    }

    #[test]
    fn ragged_row_reports_line() {
        let err = parse_default("A,B,C\n1,2,3\n4,5\n").unwrap_err();
        assert!(
            matches!(
                err,
                ParseError::FieldCount {
                    line: 3,
                    expected: 3,
                    found: 2
                }
            ),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = parse(
            &FileUpload::new("data.csv", b"NAME\n\xff\xfe\n".to_vec()),
            &ParseOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::InvalidUtf8 { .. }), "got {err:?}");
    }

    #[rstest]
    #[case("A,,C\n1,2,3\n", "header column 2 has no name")]
    #[case("A,B,a\n1,2,3\n", "header name \"a\" appears more than once")]
    #[case("", "the file has no header row")]
    fn bad_headers(#[case] text: &str, #[case] expected: &str) {
        let err = parse_default(text).unwrap_err();
        assert_eq!(err.to_string(), expected);
    }

    #[rstest]
    #[case(b"", true)]
    #[case(b"  \n\t", true)]
    #[case(b"A\n", false)]
    fn blank_uploads(#[case] bytes: &[u8], #[case] blank: bool) {
        assert_eq!(is_empty(&FileUpload::new("x.csv", bytes.to_vec())), blank);
    }
}
