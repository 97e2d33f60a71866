//! Minimal CSV record writer

use std::io::{self, Write};

/// Writes comma-separated records, one per line
///
/// Fields containing the delimiter, a quote, CR or LF are wrapped in quotes
/// with embedded quotes doubled.
pub struct CsvWriter<W: Write> {
    inner: W,
    delimiter: char,
}

impl<W: Write> CsvWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            delimiter: ',',
        }
    }

    pub fn write_record<I, S>(&mut self, fields: I) -> io::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut line = String::new();
        for (idx, field) in fields.into_iter().enumerate() {
            if idx > 0 {
                line.push(self.delimiter);
            }
            push_field(&mut line, field.as_ref(), self.delimiter);
        }
        line.push('\n');
        self.inner.write_all(line.as_bytes())
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

fn push_field(line: &mut String, field: &str, delim: char) {
    if field.contains(delim) || field.contains(['"', '\n', '\r']) {
        line.push('"');
        line.push_str(&field.replace('"', "\"\""));
        line.push('"');
    } else {
        line.push_str(field);
    }
}
