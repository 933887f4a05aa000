//! Minimal comma-separated record reading and writing.
//!
//! Handles quoted fields, doubled quotes inside quoted fields, embedded
//! newlines, and CRLF line endings. Records may have a variable number of
//! fields. Blank lines are skipped.

use std::io::{self, Write};
use std::iter::Peekable;
use std::str::Chars;

use crate::error::OwnershipError;

/// One parsed record together with the line it started on (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

fn csv_error(line: usize, message: &str) -> OwnershipError {
    OwnershipError::Csv {
        line,
        message: message.to_string(),
    }
}

/// Parse all records from `input`.
pub fn parse_records(input: &str) -> Result<Vec<Record>, OwnershipError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut chars = input.chars().peekable();
    let mut records = Vec::new();
    let mut line = 1;

    while chars.peek().is_some() {
        let start_line = line;
        let (fields, any_quoted) = parse_record(&mut chars, &mut line)?;
        let blank = fields.len() == 1 && fields[0].is_empty() && !any_quoted;
        if !blank {
            records.push(Record {
                line: start_line,
                fields,
            });
        }
    }

    Ok(records)
}

fn parse_record(
    chars: &mut Peekable<Chars<'_>>,
    line: &mut usize,
) -> Result<(Vec<String>, bool), OwnershipError> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut field_quoted = false;
    let mut any_quoted = false;

    loop {
        match chars.next() {
            None => {
                fields.push(field);
                return Ok((fields, any_quoted));
            }
            Some('"') if field.is_empty() && !field_quoted => {
                field_quoted = true;
                any_quoted = true;
                read_quoted(chars, line, &mut field)?;
                match chars.peek() {
                    None | Some(',') | Some('\n') | Some('\r') => {}
                    Some(_) => {
                        return Err(csv_error(*line, "unexpected character after closing quote"));
                    }
                }
            }
            Some('"') => return Err(csv_error(*line, "bare quote in unquoted field")),
            Some(',') => {
                fields.push(std::mem::take(&mut field));
                field_quoted = false;
            }
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                *line += 1;
                fields.push(field);
                return Ok((fields, any_quoted));
            }
            Some('\n') => {
                *line += 1;
                fields.push(field);
                return Ok((fields, any_quoted));
            }
            Some(c) => field.push(c),
        }
    }
}

fn read_quoted(
    chars: &mut Peekable<Chars<'_>>,
    line: &mut usize,
    field: &mut String,
) -> Result<(), OwnershipError> {
    let start_line = *line;
    loop {
        match chars.next() {
            None => return Err(csv_error(start_line, "unterminated quoted field")),
            Some('"') => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    return Ok(());
                }
            }
            Some(c) => {
                if c == '\n' {
                    *line += 1;
                }
                field.push(c);
            }
        }
    }
}

fn needs_quotes(field: &str) -> bool {
    field.starts_with([' ', '\t']) || field.contains([',', '"', '\n', '\r'])
}

/// Write one record terminated by `\n`, quoting fields where required.
pub fn write_record<W, S>(out: &mut W, fields: &[S]) -> io::Result<()>
where
    W: Write,
    S: AsRef<str>,
{
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.write_all(b",")?;
        }
        let field = field.as_ref();
        if needs_quotes(field) {
            write!(out, "\"{}\"", field.replace('"', "\"\""))?;
        } else {
            out.write_all(field.as_bytes())?;
        }
    }
    out.write_all(b"\n")
}

#[cfg(test)]
#[path = "csv_io_test.rs"]
mod tests;
