use crate::error::Result;
use crate::fact::Fact;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

pub const RESULT_FILE_NAME: &str = "bugex-results.xml";

/// Writes `facts` to `<output_dir>bugex-results.xml`.
///
/// `output_dir` is used as a plain prefix, so it is either empty (working
/// directory) or ends with `/`.
pub fn export_to_xml(facts: &[Fact], output_dir: &str) -> Result<PathBuf> {
    let path = PathBuf::from(format!("{output_dir}{RESULT_FILE_NAME}"));
    info!("Exporting {} facts to '{}'.", facts.len(), path.display());
    let mut writer = BufWriter::new(File::create(&path)?);
    write_facts_xml(facts, &mut writer)?;
    writer.flush()?;
    Ok(path)
}

pub fn write_facts_xml<W: Write>(facts: &[Fact], out: &mut W) -> std::io::Result<()> {
    writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(out, "<facts>")?;
    for fact in facts {
        writeln!(out, "<fact>")?;
        write_element(out, "className", &fact.class_name)?;
        if let Some(method_name) = &fact.method_name {
            write_element(out, "methodName", method_name)?;
        }
        if let Some(line_number) = fact.line_number {
            write_element(out, "lineNumber", &line_number.to_string())?;
        }
        write_element(out, "explanation", &fact.explanation)?;
        write_element(out, "factType", fact.fact_type.as_str())?;
        writeln!(out, "</fact>")?;
    }
    write!(out, "</facts>")
}

fn write_element<W: Write>(out: &mut W, tag: &str, text: &str) -> std::io::Result<()> {
    writeln!(out, "  <{tag}>{}</{tag}>", escape(text))
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
