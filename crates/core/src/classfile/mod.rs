//! Structural access to binary class images.
//!
//! The pipeline for one class is `reader` (bytes to [`ClassImage`]),
//! `extract` (methods to facts) and `writer` (image back to bytes).

pub mod extract;
pub mod reader;
pub mod writer;

pub use extract::{LineRange, extract_facts, is_initializer};
pub use reader::{ClassImage, LineMarker, MethodView};
pub use writer::rewrite;
