// 🔁 CSV Interchange - Export sessions, import them back (or from elsewhere)
//
// Import is all-or-nothing: the first bad row aborts the whole file and the
// caller gets an error instead of a partial batch. Nothing touches the store
// until every row has parsed.

pub mod export;
pub mod native;
pub mod third_party;

pub use export::{export_sessions, export_to_path, NATIVE_COLUMNS, TAG_SEPARATOR};
pub use native::NativeImporter;
pub use third_party::{ThirdPartyImporter, THIRD_PARTY_COLUMNS};

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::entities::Session;
use crate::error::ImportError;

// ============================================================================
// FORMATS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvFormat {
    /// Our own export layout
    Native,
    /// Fixed 44-column export from another bankroll tracker
    ThirdParty,
}

impl CsvFormat {
    pub fn name(&self) -> &'static str {
        match self {
            CsvFormat::Native => "native",
            CsvFormat::ThirdParty => "third-party",
        }
    }
}

/// One CSV layout → sessions
///
/// Adding a layout = one new implementor + one arm in `detect_format`/`get_importer`.
pub trait SessionImporter {
    fn format(&self) -> CsvFormat;

    /// Every row must have exactly this many fields
    fn expected_columns(&self) -> usize;

    /// Parse one data row. `line` is the 1-based line in the file.
    fn parse_row(&self, line: usize, record: &StringRecord) -> Result<Session, ImportError>;
}

/// Pick the layout from the header row
pub fn detect_format(headers: &StringRecord) -> Result<CsvFormat, ImportError> {
    let matches = |expected: &[&str]| {
        headers.len() == expected.len()
            && headers
                .iter()
                .zip(expected.iter())
                .all(|(found, wanted)| found.trim().eq_ignore_ascii_case(wanted))
    };

    if matches(&NATIVE_COLUMNS[..]) {
        return Ok(CsvFormat::Native);
    }
    if matches(&THIRD_PARTY_COLUMNS[..]) {
        return Ok(CsvFormat::ThirdParty);
    }

    let preview: Vec<&str> = headers.iter().take(3).collect();
    Err(ImportError::UnknownFormat(preview.join(", ")))
}

pub fn get_importer(format: CsvFormat) -> Box<dyn SessionImporter> {
    match format {
        CsvFormat::Native => Box::new(NativeImporter::new()),
        CsvFormat::ThirdParty => Box::new(ThirdPartyImporter::new()),
    }
}

/// Read a whole CSV document into sessions
pub fn import_sessions<R: Read>(reader: R) -> Result<(CsvFormat, Vec<Session>), ImportError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.is_empty() {
        return Err(ImportError::EmptyFile);
    }

    let format = detect_format(&headers)?;
    let importer = get_importer(format);

    let mut sessions = Vec::new();
    for (index, result) in csv_reader.records().enumerate() {
        let record = result?;
        // Physical line of the record's first byte; quoted notes may span lines
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(index + 2);

        if record.len() != importer.expected_columns() {
            return Err(ImportError::ColumnCount {
                line,
                expected: importer.expected_columns(),
                found: record.len(),
            });
        }

        sessions.push(importer.parse_row(line, &record)?);
    }

    info!(format = format.name(), sessions = sessions.len(), "parsed CSV");
    Ok((format, sessions))
}

pub fn import_from_path(path: &Path) -> Result<(CsvFormat, Vec<Session>), ImportError> {
    let file = File::open(path)?;
    import_sessions(file)
}

// ============================================================================
// FIELD HELPERS (shared by importers)
// ============================================================================

pub(crate) const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn field<'a>(record: &'a StringRecord, index: usize) -> &'a str {
    record.get(index).map(str::trim).unwrap_or("")
}

/// Strip currency decoration: "$1,250.00" → "1250.00", "($40)" → "-40"
fn clean_number(raw: &str) -> String {
    let trimmed = raw.trim();
    let negative_parens = trimmed.starts_with('(') && trimmed.ends_with(')');
    let digits: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if negative_parens && !digits.starts_with('-') {
        format!("-{}", digits)
    } else {
        digits
    }
}

pub(crate) fn required_money(
    record: &StringRecord,
    index: usize,
    line: usize,
    name: &'static str,
) -> Result<f64, ImportError> {
    let raw = field(record, index);
    clean_number(raw)
        .parse::<f64>()
        .map_err(|_| ImportError::InvalidNumber {
            line,
            field: name,
            value: raw.to_string(),
        })
}

pub(crate) fn optional_money(
    record: &StringRecord,
    index: usize,
    line: usize,
    name: &'static str,
) -> Result<Option<f64>, ImportError> {
    if field(record, index).is_empty() {
        return Ok(None);
    }
    required_money(record, index, line, name).map(Some)
}

pub(crate) fn optional_u32(
    record: &StringRecord,
    index: usize,
    line: usize,
    name: &'static str,
) -> Result<Option<u32>, ImportError> {
    let raw = field(record, index);
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u32>()
        .map(Some)
        .map_err(|_| ImportError::InvalidNumber {
            line,
            field: name,
            value: raw.to_string(),
        })
}

pub(crate) fn optional_mood(
    record: &StringRecord,
    index: usize,
    line: usize,
) -> Result<Option<u8>, ImportError> {
    let raw = field(record, index);
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<u8>() {
        Ok(mood) if (1..=5).contains(&mood) => Ok(Some(mood)),
        _ => Err(ImportError::InvalidField {
            line,
            field: "mood",
            value: raw.to_string(),
        }),
    }
}

pub(crate) fn date_time(
    raw: &str,
    formats: &[&str],
    line: usize,
    name: &'static str,
) -> Result<NaiveDateTime, ImportError> {
    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())
        .ok_or_else(|| ImportError::InvalidDate {
            line,
            field: name,
            value: raw.to_string(),
        })
}

pub(crate) fn yes_no(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "yes" | "y" | "true" | "1")
}

/// Split a tag cell on any of `separators`, dropping blanks
pub(crate) fn split_tags(raw: &str, separators: &[char]) -> Vec<String> {
    raw.split(separators)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_format() {
        let native = StringRecord::from(NATIVE_COLUMNS.to_vec());
        assert_eq!(detect_format(&native).unwrap(), CsvFormat::Native);

        let third = StringRecord::from(THIRD_PARTY_COLUMNS.to_vec());
        assert_eq!(detect_format(&third).unwrap(), CsvFormat::ThirdParty);

        let bogus = StringRecord::from(vec!["Date", "Amount"]);
        assert!(matches!(detect_format(&bogus), Err(ImportError::UnknownFormat(_))));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let result = import_sessions("".as_bytes());
        assert!(matches!(result, Err(ImportError::EmptyFile)));
    }

    #[test]
    fn test_clean_number() {
        assert_eq!(clean_number("$1,250.50"), "1250.50");
        assert_eq!(clean_number("-$40"), "-40");
        assert_eq!(clean_number("($40.00)"), "-40.00");
        assert_eq!(clean_number(" 12 "), "12");
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags("Vacation; Vegas,  ", &[';', ',']), vec!["Vacation", "Vegas"]);
        assert_eq!(split_tags("Vegas, NV;Live", &[';']), vec!["Vegas, NV", "Live"]);
        assert!(split_tags("", &[';']).is_empty());
    }

    #[test]
    fn test_yes_no() {
        assert!(yes_no("Yes"));
        assert!(yes_no("TRUE"));
        assert!(!yes_no("no"));
        assert!(!yes_no(""));
    }
}
