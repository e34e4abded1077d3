use std::io::{self, Write};

use docparse_core::{DocumentError, ErrorOutput, ParsedDocument};

/// Write the success object as a single JSON line.
pub fn write_success(w: &mut dyn Write, doc: &ParsedDocument) -> io::Result<()> {
    write_json_line(w, doc)
}

/// Write `{"error": ...}` as a single JSON line.
pub fn write_error(w: &mut dyn Write, err: &DocumentError) -> io::Result<()> {
    write_json_line(w, &ErrorOutput::from(err))
}

fn write_json_line<T: serde::Serialize + ?Sized>(w: &mut dyn Write, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *w, value)?;
    writeln!(w)?;
    w.flush()
}
