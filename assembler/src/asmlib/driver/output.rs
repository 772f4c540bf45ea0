use std::io::Write;
use std::path::Path;

use tracing::{Level, event, span};

use super::super::encoder::Program;
use super::super::types::{AssemblerFailure, IoAction, IoFailed, IoTarget};
use super::AssembledProgram;

fn write_failed(target: IoTarget) -> impl FnOnce(std::io::Error) -> AssemblerFailure {
    move |error| {
        AssemblerFailure::Io(IoFailed {
            action: IoAction::Write,
            target,
            error,
        })
    }
}

/// Write the program as its cells separated by commas.  No newline
/// follows the last cell.
///
/// # Errors
///
/// Failure to write the output file.
pub fn write_program<W: Write>(
    program: &Program,
    writer: &mut W,
    output_file_name: &Path,
) -> Result<(), AssemblerFailure> {
    let span = span!(Level::ERROR, "write program", output = %output_file_name.display());
    let _enter = span.enter();

    let unresolved = program.cells().iter().filter(|c| !c.is_resolved()).count();
    if unresolved > 0 {
        // The final pass either resolves every reference or fails.
        event!(
            Level::ERROR,
            "writing {unresolved} unresolved cells; the assembler should not have generated them; this is a bug."
        );
    }
    let target = || IoTarget::File(output_file_name.to_owned());
    write!(writer, "{program}").map_err(write_failed(target()))?;
    writer.flush().map_err(write_failed(target()))?;
    event!(Level::DEBUG, "wrote {} cells", program.len());
    Ok(())
}

/// Write a listing of `assembled` (see [`AssembledProgram::listing`]).
///
/// # Errors
///
/// Failure to write to stdout.
pub fn write_listing<W: Write>(
    assembled: &AssembledProgram,
    writer: &mut W,
) -> Result<(), AssemblerFailure> {
    writer
        .write_all(assembled.listing().as_bytes())
        .and_then(|()| writer.flush())
        .map_err(write_failed(IoTarget::Stdout))
}
