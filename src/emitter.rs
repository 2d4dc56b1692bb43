use std::io::Write;

use crate::diagnostic::Diagnostic;

pub trait Emitter {
    fn emit<W: Write>(&self, writer: &mut W, diagnostics: &[&Diagnostic]) -> anyhow::Result<()>;
}

/// One diagnostic per line: `<path>: Line <row>: <code> <message>`.
pub struct ConciseEmitter;

impl Emitter for ConciseEmitter {
    fn emit<W: Write>(&self, writer: &mut W, diagnostics: &[&Diagnostic]) -> anyhow::Result<()> {
        for diagnostic in diagnostics {
            writeln!(writer, "{diagnostic}")?;
        }
        Ok(())
    }
}

pub struct JsonEmitter;

impl Emitter for JsonEmitter {
    fn emit<W: Write>(&self, writer: &mut W, diagnostics: &[&Diagnostic]) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(writer, diagnostics)?;
        Ok(())
    }
}
