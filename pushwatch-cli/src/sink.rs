//! Alert output for the command line.

use pushwatch_core::{Alert, AlertSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Writes alerts as plain text messages
pub struct WriterSink<W: Write> {
    writer: Mutex<W>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl WriterSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> AlertSink for WriterSink<W> {
    type Error = io::Error;

    fn dispatch(&self, recipient: Option<&str>, alert: &Alert) -> Result<(), Self::Error> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| io::Error::other("alert writer poisoned"))?;

        if let Some(recipient) = recipient {
            writeln!(writer, "To: {}", recipient)?;
        }
        writeln!(writer, "Subject: {}", alert.subject())?;
        writeln!(writer)?;
        write!(writer, "{}", alert.body())?;
        writer.flush()
    }
}
