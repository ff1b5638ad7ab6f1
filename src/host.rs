//! Running program files.

use std::io::Read;
use std::path::Path;

use crate::data::Value;
use crate::session::Interpreter;

/// Read and run each file in turn, in a single session.
///
/// Later files see the definitions of earlier ones.
/// Stops at the first failure; errors name the file they came from.
pub fn run_files(interp: &Interpreter, paths: &[impl AsRef<Path>]) -> std::io::Result<Value> {
    let session = interp.session();
    let mut result = Value::Nil;
    for path in paths {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|e| {
            std::io::Error::new(e.kind(), format!("could not read {}: {e}", path.display()))
        })?;
        tracing::debug!("running {}", path.display());
        result = interp
            .run(&src, &session)
            .map_err(|e| e.annotate(path.display().to_string()))?;
    }
    Ok(result)
}

/// Read the whole input as one program, and run it in a new session.
pub fn run_reader(interp: &Interpreter, input: &mut impl Read) -> std::io::Result<Value> {
    let mut src = String::new();
    input.read_to_string(&mut src)?;
    Ok(interp.run(&src, &interp.session())?)
}
