//! Generic RF2 file parser.
//!
//! Provides a streaming parser for SNOMED CT RF2 tab-delimited files and a
//! single-line entry point for callers that already have text lines.

use std::fs::File;
use std::io::{BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};
use snomed_types::SctId;

use crate::types::{SnomedError, SnomedResult};

/// Trait for types that can be parsed from one RF2 data line.
pub trait Rf2Record: Sized {
    /// Human-readable record kind, used in error messages.
    const RECORD_NAME: &'static str;

    /// Expected column names for this record type, in order.
    const EXPECTED_COLUMNS: &'static [&'static str];

    /// Builds a record from already-split fields.
    ///
    /// Implementations may assume `fields.len() == EXPECTED_COLUMNS.len()`.
    fn from_fields(fields: &[&str]) -> SnomedResult<Self>;

    /// Parses one tab-delimited line.
    ///
    /// Fails if the field count differs from the column count or any field
    /// is malformed.
    fn parse_line(line: &str) -> SnomedResult<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        Self::parse_fields(&fields)
    }

    /// Checks the arity, then delegates to [`Rf2Record::from_fields`].
    fn parse_fields(fields: &[&str]) -> SnomedResult<Self> {
        if fields.len() != Self::EXPECTED_COLUMNS.len() {
            return Err(SnomedError::FieldCount {
                record: Self::RECORD_NAME,
                expected: Self::EXPECTED_COLUMNS.len(),
                found: fields.len(),
            });
        }
        Self::from_fields(fields)
    }
}

/// Validates a header line given as raw text.
pub fn validate_header_line<T: Rf2Record>(line: &str) -> SnomedResult<()> {
    let columns: Vec<&str> = line.split('\t').collect();
    validate_columns::<T>(&columns)
}

fn validate_columns<T: Rf2Record>(columns: &[&str]) -> SnomedResult<()> {
    let expected = T::EXPECTED_COLUMNS;

    if columns.len() != expected.len() {
        return Err(SnomedError::InvalidHeader {
            expected: expected.len(),
            found: columns.len(),
        });
    }

    for (i, (found, expected_col)) in columns.iter().zip(expected).enumerate() {
        // Handle UTF-8 BOM at start of file
        let found = found.trim_start_matches('\u{feff}');
        if found != *expected_col {
            return Err(SnomedError::UnexpectedColumn {
                position: i,
                expected: expected_col.to_string(),
                found: found.to_string(),
            });
        }
    }

    Ok(())
}

/// Parses a sequence of text lines whose first element is the header.
///
/// Blank lines are skipped. The iterator stops at the first error, which
/// is yielded as its last item.
pub fn parse_lines<T, I>(lines: I) -> impl Iterator<Item = SnomedResult<T>>
where
    T: Rf2Record,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut lines = lines.into_iter();
    let header = match lines.next() {
        Some(line) => validate_header_line::<T>(line.as_ref()),
        None => Err(SnomedError::InvalidHeader {
            expected: T::EXPECTED_COLUMNS.len(),
            found: 0,
        }),
    };

    let mut failed = false;
    let header_error = header.err();
    let body = lines.filter_map(|line| {
        let line = line.as_ref();
        if line.trim().is_empty() {
            None
        } else {
            Some(T::parse_line(line))
        }
    });

    header_error
        .map(Err)
        .into_iter()
        .chain(body)
        .take_while(move |item| {
            let keep = !failed;
            failed |= item.is_err();
            keep
        })
}

/// A streaming parser for RF2 files.
///
/// Reads record-by-record. The header is validated when the parser is
/// created, so a wrong file fails before any row is consumed.
pub struct Rf2Parser<R: Read, T: Rf2Record> {
    reader: Reader<R>,
    records_read: usize,
    _marker: PhantomData<T>,
}

impl<T: Rf2Record> Rf2Parser<BufReader<File>, T> {
    /// Creates a new parser from a file path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or has invalid headers.
    pub fn from_path<P: AsRef<Path>>(path: P) -> SnomedResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SnomedError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read, T: Rf2Record> Rf2Parser<R, T> {
    /// Creates a new parser from a reader.
    pub fn from_reader(reader: R) -> SnomedResult<Self> {
        // RF2 terms may contain quote characters, so quoting must be off.
        // Arity is checked per row by `Rf2Record::parse_fields`.
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .trim(csv::Trim::None)
            .from_reader(reader);

        let headers = csv_reader.headers()?;
        let columns: Vec<&str> = headers.iter().collect();
        validate_columns::<T>(&columns)?;

        Ok(Self {
            reader: csv_reader,
            records_read: 0,
            _marker: PhantomData,
        })
    }

    /// Returns the number of records read so far.
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Parses all records into a Vec, failing on the first bad row.
    pub fn parse_all(self) -> SnomedResult<Vec<T>> {
        self.collect()
    }
}

impl<R: Read, T: Rf2Record> Iterator for Rf2Parser<R, T> {
    type Item = SnomedResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    self.records_read += 1;

                    // Skip empty records
                    if record.iter().all(|f| f.trim().is_empty()) {
                        continue;
                    }

                    let fields: Vec<&str> = record.iter().collect();
                    return Some(T::parse_fields(&fields));
                }
                Ok(false) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Helper functions for parsing RF2 field values.
pub mod parse {
    use snomed_types::EffectiveTime;

    use super::{SctId, SnomedError, SnomedResult};

    /// Parses an SCTID from a string.
    ///
    /// Ids must fit in a signed 64-bit integer, the width of the persisted
    /// graph format.
    pub fn sctid(value: &str) -> SnomedResult<SctId> {
        value
            .parse::<i64>()
            .ok()
            .and_then(|id| SctId::try_from(id).ok())
            .ok_or_else(|| SnomedError::InvalidSctId {
                value: value.to_string(),
            })
    }

    /// Parses a boolean from "0" or "1".
    pub fn boolean(value: &str) -> SnomedResult<bool> {
        match value {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(SnomedError::InvalidBoolean {
                value: value.to_string(),
            }),
        }
    }

    /// Parses an effective time (YYYYMMDD).
    pub fn effective_time(value: &str) -> SnomedResult<EffectiveTime> {
        EffectiveTime::from_yyyymmdd(value).ok_or_else(|| SnomedError::InvalidDate {
            value: value.to_string(),
        })
    }

    /// Parses an integer value.
    pub fn integer<T: std::str::FromStr>(value: &str) -> SnomedResult<T> {
        value.parse::<T>().map_err(|_| SnomedError::InvalidInteger {
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use snomed_types::Rf2Concept;

    const HEADER: &str = "id\teffectiveTime\tactive\tmoduleId\tdefinitionStatusId";

    #[test]
    fn test_parse_sctid() {
        assert_eq!(parse::sctid("404684003").unwrap(), 404684003u64);
        assert!(parse::sctid("not_a_number").is_err());
        assert!(parse::sctid("").is_err());
        assert!(parse::sctid("-1").is_err());
        assert_eq!(
            parse::sctid("9223372036854775807").unwrap(),
            i64::MAX as SctId
        );
        assert!(matches!(
            parse::sctid("9223372036854775808"),
            Err(SnomedError::InvalidSctId { .. })
        ));
    }

    #[test]
    fn test_parse_boolean() {
        assert!(!parse::boolean("0").unwrap());
        assert!(parse::boolean("1").unwrap());
        assert!(parse::boolean("true").is_err());
        assert!(parse::boolean(" 1").is_err());
    }

    #[test]
    fn test_parse_effective_time() {
        assert_eq!(
            parse::effective_time("20020131").unwrap().to_string(),
            "20020131"
        );
        assert!(parse::effective_time("2020-01-31").is_err());
        assert!(parse::effective_time("2002013").is_err());
        assert!(parse::effective_time("20020132").is_err());
        assert!(matches!(
            parse::effective_time("00000101"),
            Err(SnomedError::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse::integer::<u32>("0").unwrap(), 0u32);
        assert!(parse::integer::<u32>("abc").is_err());
    }

    #[test]
    fn test_reader_parses_rows() {
        let text = format!(
            "{HEADER}\n100\t20020131\t1\t900000000000207008\t900000000000074008\n\n200\t20020131\t0\t900000000000207008\t900000000000074008\n"
        );
        let parser = Rf2Parser::<_, Rf2Concept>::from_reader(text.as_bytes()).unwrap();
        let concepts = parser.parse_all().unwrap();
        assert_eq!(concepts.len(), 2);
        assert!(!concepts[1].active);
    }

    #[test]
    fn test_reader_accepts_bom() {
        let text = format!(
            "\u{feff}{HEADER}\n100\t20020131\t1\t900000000000207008\t900000000000074008\n"
        );
        assert!(Rf2Parser::<_, Rf2Concept>::from_reader(text.as_bytes()).is_ok());
    }

    #[test]
    fn test_reader_rejects_bad_header() {
        let text = "id\teffectiveTime\tactive\tmoduleId\n";
        let err = Rf2Parser::<_, Rf2Concept>::from_reader(text.as_bytes())
            .err()
            .unwrap();
        assert!(matches!(err, SnomedError::InvalidHeader { expected: 5, found: 4 }));

        let text = "id\teffectiveTime\tactive\tmodule\tdefinitionStatusId\n";
        let err = Rf2Parser::<_, Rf2Concept>::from_reader(text.as_bytes())
            .err()
            .unwrap();
        assert!(matches!(err, SnomedError::UnexpectedColumn { position: 3, .. }));
    }

    #[test]
    fn test_reader_fails_on_short_row() {
        let text = format!("{HEADER}\n100\t20020131\t1\t900000000000207008\n");
        let parser = Rf2Parser::<_, Rf2Concept>::from_reader(text.as_bytes()).unwrap();
        let err = parser.parse_all().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(matches!(err, SnomedError::FieldCount { expected: 5, found: 4, .. }));
    }

    #[test]
    fn test_parse_lines_stops_at_first_error() {
        let lines = vec![
            HEADER,
            "100\t20020131\t1\t900000000000207008\t900000000000074008",
            "200\t20020131\tX\t900000000000207008\t900000000000074008",
            "300\t20020131\t1\t900000000000207008\t900000000000074008",
        ];
        let results: Vec<_> = parse_lines::<Rf2Concept, _>(lines).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(SnomedError::InvalidBoolean { .. })));
    }

    #[test]
    fn test_parse_lines_reports_header_error() {
        let results: Vec<_> = parse_lines::<Rf2Concept, _>(vec!["id\tfoo"]).collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(SnomedError::InvalidHeader { .. })));
    }
}
