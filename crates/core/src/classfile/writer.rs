use super::reader::ClassImage;
use crate::error::{BugexError, Result};

/// Re-emits a parsed image.
///
/// Serialization recomputes the constant pool count, every attribute length
/// and the code lengths from the parsed structure. Instructions, exception
/// tables, line tables and stack map frames are written back unchanged, so
/// the recorded `max_stack`/`max_locals` stay valid for the untouched code.
pub fn rewrite(image: &ClassImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .class_file()
        .to_bytes(&mut bytes)
        .map_err(|e| BugexError::MalformedInput(format!("cannot re-emit class image: {e:?}")))?;
    Ok(bytes)
}
