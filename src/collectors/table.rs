//! Header-first tabular output of the `mm*` administration commands.

use crate::error::CheckError;
use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `-Y` machine-readable output: `cmd::HEADER:version:...`
    Colon,
    /// Human-readable output, columns separated by runs of blanks.
    Whitespace,
}

/// Parsed output: row zero is the header, every other row is data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    index:  HashMap<String, usize>,
    rows:   Vec<Vec<String>>,
}

impl Table {
    pub fn parse(text: &str, delimiter: Delimiter) -> Table {
        let mut lines: Vec<&str> = text.split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l))
            .collect();
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }

        let mut rows: Vec<Vec<String>> = lines.into_iter()
            .map(|line| split_line(line, delimiter))
            .collect();
        if rows.is_empty() { return Table::default(); }

        let header = rows.remove(0);
        let mut index = HashMap::with_capacity(header.len());
        for (i, name) in header.iter().enumerate() {
            // First occurrence wins; -Y headers repeat "reserved".
            index.entry(name.clone()).or_insert(i);
        }

        Table { index, rows }
    }

    pub fn len(&self) -> usize { self.rows.len() }

    /// Column index of a header field.
    pub fn column(&self, name: &str) -> Result<usize, CheckError> {
        self.index.get(name).copied()
            .ok_or_else(|| CheckError::FieldNotFound(name.to_string()))
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().enumerate().map(move |(n, fields)| Row { table: self, number: n + 1, fields })
    }
}

fn split_line(line: &str, delimiter: Delimiter) -> Vec<String> {
    match delimiter {
        Delimiter::Colon      => line.split(':').map(str::to_string).collect(),
        Delimiter::Whitespace => line.split_whitespace().map(str::to_string).collect(),
    }
}

/// One data row with named and positional access.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table:  &'a Table,
    number: usize,
    fields: &'a [String],
}

impl<'a> Row<'a> {
    pub fn fields(&self) -> &'a [String] { self.fields }

    pub fn at(&self, index: usize) -> Result<&'a str, CheckError> {
        self.fields.get(index)
            .map(String::as_str)
            .ok_or(CheckError::MissingColumn { row: self.number, index })
    }

    pub fn get(&self, name: &str) -> Result<&'a str, CheckError> {
        self.at(self.table.column(name)?)
    }

    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T, CheckError> {
        let raw = self.get(name)?;
        raw.trim().parse().map_err(|_| CheckError::invalid(name, raw))
    }
}
