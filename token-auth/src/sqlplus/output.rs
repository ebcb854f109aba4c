//! Parsing of SQL*Plus output in `SET MARKUP CSV ON` mode

use crate::client::QueryResult;

/// Prefixes of lines SQL*Plus prints for errors.
const ERROR_PREFIXES: &[&str] = &["ORA-", "SP2-", "TNS-", "PLS-"];

/// Lines that report an error, in order.
pub fn error_lines(output: &[String]) -> Vec<&str> {
    output
        .iter()
        .map(|line| line.trim())
        .filter(|line| ERROR_PREFIXES.iter().any(|p| line.starts_with(p)))
        .collect()
}

/// Split one CSV record. Quoted fields may contain commas and `""` escapes.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// First non-blank line is the header, the rest are rows.
pub fn parse_csv_output(output: &[String]) -> QueryResult {
    let mut records = output
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_csv_line(line));

    let columns = records.next().unwrap_or_default();
    QueryResult {
        columns,
        rows: records.collect(),
    }
}
