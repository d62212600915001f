use std::io::{self, Write};

/// Writes to stdout, treating a closed pipe (`invoicedash invoices | head`) as
/// success.
pub fn write_stdout_text(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write_all_tolerant(&mut stdout, text.as_bytes())
}

pub fn write_stdout_line(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    write_all_tolerant(&mut stdout, text.as_bytes())?;
    write_all_tolerant(&mut stdout, b"\n")
}

fn write_all_tolerant(writer: &mut dyn Write, bytes: &[u8]) -> io::Result<()> {
    let result = writer.write_all(bytes).and_then(|()| writer.flush());
    match result {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
