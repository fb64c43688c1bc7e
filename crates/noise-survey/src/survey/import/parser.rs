use crate::survey::values::parse_number;
use csv::StringRecord;
use std::io::Read;

/// Header names a logging meter may use for the A-weighted level column.
const LEVEL_HEADERS: [&str; 4] = ["laeq", "laeq (db)", "leq", "level"];

pub(crate) struct ParsedLog {
    pub(crate) readings: Vec<String>,
    pub(crate) skipped_rows: usize,
}

/// `Ok(None)` when no column carries a recognised level header.
pub(crate) fn parse_log<R: Read>(reader: R) -> Result<Option<ParsedLog>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let Some(column) = level_column(&headers) else {
        return Ok(None);
    };

    let mut readings = Vec::new();
    let mut skipped_rows = 0;
    for record in csv_reader.records() {
        let record = record?;
        match record.get(column).filter(|cell| parse_number(cell).is_some()) {
            Some(cell) => readings.push(cell.to_string()),
            None => skipped_rows += 1,
        }
    }

    Ok(Some(ParsedLog {
        readings,
        skipped_rows,
    }))
}

fn level_column(headers: &StringRecord) -> Option<usize> {
    let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
    LEVEL_HEADERS
        .iter()
        .find_map(|wanted| normalized.iter().position(|header| header == wanted))
}

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
pub(crate) fn level_column_for_tests(headers: &[&str]) -> Option<usize> {
    level_column(&StringRecord::from(headers.to_vec()))
}
