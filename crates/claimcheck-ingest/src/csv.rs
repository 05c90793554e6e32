//! Minimal CSV reader for header-first tables.
//!
//! Fields are comma separated; a field wrapped in double quotes may contain
//! commas, newlines, and `""` escaped quotes. Records end at LF or CRLF. A
//! leading byte-order mark is dropped and blank lines are skipped. The first
//! record is the header; short records are padded with empty fields.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CsvError {
    #[error("line {line}: unterminated quoted field")]
    UnterminatedQuote { line: usize },

    #[error("line {line}: unexpected character {found:?} after closing quote")]
    AfterClosingQuote { line: usize, found: char },

    #[error("line {line}: record has {found} fields, header has {expected}")]
    TooManyFields {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("missing header row")]
    MissingHeader,
}

/// One data record with the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub line: usize,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub records: Vec<CsvRecord>,
    index: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

struct Reader {
    state: State,
    line: usize,
    record_line: usize,
    field: String,
    record: Vec<String>,
    has_content: bool,
    out: Vec<CsvRecord>,
}

impl Reader {
    fn end_field(&mut self) {
        self.record.push(std::mem::take(&mut self.field));
        self.state = State::FieldStart;
    }

    fn end_record(&mut self) {
        self.end_field();
        let fields = std::mem::take(&mut self.record);
        if self.has_content {
            self.out.push(CsvRecord {
                line: self.record_line,
                fields,
            });
        }
        self.has_content = false;
        self.record_line = self.line;
    }
}

fn read_records(text: &str) -> Result<Vec<CsvRecord>, CsvError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = Reader {
        state: State::FieldStart,
        line: 1,
        record_line: 1,
        field: String::new(),
        record: Vec::new(),
        has_content: false,
        out: Vec::new(),
    };
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\r' && chars.peek() == Some(&'\n') && reader.state != State::Quoted {
            continue;
        }
        match (reader.state, c) {
            (State::Quoted, '"') => reader.state = State::QuoteInQuoted,
            (State::Quoted, other) => {
                if other == '\n' {
                    reader.line += 1;
                }
                reader.field.push(other);
            }
            (State::QuoteInQuoted, '"') => {
                reader.field.push('"');
                reader.state = State::Quoted;
            }
            (State::FieldStart, '"') => {
                reader.state = State::Quoted;
                reader.has_content = true;
            }
            (_, ',') => {
                reader.has_content = true;
                reader.end_field();
            }
            (_, '\n' | '\r') => {
                reader.line += 1;
                reader.end_record();
            }
            (State::QuoteInQuoted, found) => {
                return Err(CsvError::AfterClosingQuote {
                    line: reader.line,
                    found,
                });
            }
            (State::FieldStart | State::Unquoted, other) => {
                reader.field.push(other);
                reader.state = State::Unquoted;
                reader.has_content = true;
            }
        }
    }

    if reader.state == State::Quoted {
        return Err(CsvError::UnterminatedQuote {
            line: reader.record_line,
        });
    }
    if reader.has_content || !reader.field.is_empty() {
        reader.end_record();
    }
    Ok(reader.out)
}

impl CsvTable {
    pub fn parse(text: &str) -> Result<Self, CsvError> {
        let mut records = read_records(text)?.into_iter();
        let header: Vec<String> = records
            .next()
            .ok_or(CsvError::MissingHeader)?
            .fields
            .into_iter()
            .map(|name| name.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for mut record in records {
            if record.fields.len() > header.len() {
                return Err(CsvError::TooManyFields {
                    line: record.line,
                    expected: header.len(),
                    found: record.fields.len(),
                });
            }
            record.fields.resize(header.len(), String::new());
            rows.push(record);
        }

        let mut index = BTreeMap::new();
        for (position, name) in header.iter().enumerate() {
            index.entry(name.clone()).or_insert(position);
        }
        Ok(Self {
            header,
            records: rows,
            index,
        })
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Required columns absent from the header, in the order given.
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.has_column(name))
            .map(|name| name.to_string())
            .collect()
    }

    /// Cell of `record` under column `name`, if the column exists.
    pub fn get<'a>(&self, record: &'a CsvRecord, name: &str) -> Option<&'a str> {
        self.column(name)
            .and_then(|position| record.fields.get(position))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
