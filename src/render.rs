use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::process::Command;

use serde::Serialize;
use tera::{Context, Tera, Value};

use crate::error::{InvoiceError, Result};
use crate::layout::Block;

// Embedded at compile time so the binary is self-contained.
const INVOICE_TEMPLATE: &str = include_str!("../templates/invoice.typ.tera");

/// Fixed page setup handed to the typesetter alongside the blocks.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageGeometry {
    pub paper: &'static str,
    pub margin_in: f64,
    pub bottom_margin_in: f64,
}

/// US Letter, 1in margins, reduced bottom margin.
pub const LETTER: PageGeometry = PageGeometry {
    paper: "us-letter",
    margin_in: 1.0,
    bottom_margin_in: 0.25,
};

/// Fails early when the `typst` binary is missing, before any state changes.
pub fn ensure_typst() -> Result<()> {
    Command::new("typst")
        .arg("--version")
        .output()
        .map(|_| ())
        .map_err(|_| InvoiceError::RendererUnavailable)
}

/// Turns a block sequence into Typst markup and compiles it to PDF.
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.register_filter("typst", typst_escape);
        tera.add_raw_template("invoice.typ", INVOICE_TEMPLATE)?;
        Ok(Renderer { tera })
    }

    /// Pure markup generation: same blocks and geometry, same bytes.
    pub fn render_markup(&self, blocks: &[Block], geometry: &PageGeometry) -> Result<String> {
        let mut context = Context::new();
        context.insert("page", geometry);
        context.insert("blocks", blocks);
        Ok(self.tera.render("invoice.typ", &context)?)
    }

    /// Writes markup next to the output file, invokes `typst compile`, and
    /// cleans up the intermediate source. A failed compilation leaves no
    /// output file behind.
    pub fn compile(
        &self,
        blocks: &[Block],
        geometry: &PageGeometry,
        output: &Path,
    ) -> Result<()> {
        let markup = self.render_markup(blocks, geometry)?;
        let source_path = output.with_extension("typ");
        fs::write(&source_path, markup)?;

        let status = Command::new("typst")
            .arg("compile")
            .arg(&source_path)
            .arg(output)
            .status();
        let _ = fs::remove_file(&source_path);

        match status {
            Ok(code) if code.success() => Ok(()),
            _ => {
                let _ = fs::remove_file(output);
                Err(InvoiceError::CompileFailed(output.to_path_buf()))
            }
        }
    }
}

/// Escapes user text for Typst markup so field content cannot change the
/// document structure. Embedded newlines become explicit line breaks.
fn typst_escape(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let input = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("typst filter expects a string"))?;
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' | '#' | '$' | '*' | '_' | '[' | ']' | '`' | '@' | '<' | '>' | '/' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str(" \\ "),
            _ => out.push(ch),
        }
    }
    Ok(Value::String(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::build_blocks;
    use crate::model::InvoiceRecord;

    fn record() -> InvoiceRecord {
        InvoiceRecord {
            invoice_number: "0007".into(),
            issue_date: "2025-01-31".into(),
            client_name: "Rexo, Inc.".into(),
            client_address: "251 Little Falls Drive, Wilmington, DE 19808".into(),
            client_ein: "33-2631448".into(),
            contractor_name: "Juana Molina".into(),
            contractor_cuil: "20-12345678-9".into(),
            contractor_tax_status: "monotributista".into(),
            service_description: "Contractor services - Software Engineer".into(),
            service_period: "Services provided during January 2025".into(),
            amount: 5000.0,
            account_holder: "Juana Molina".into(),
            dolartag: "$juana".into(),
            additional_payment_info: String::new(),
        }
    }

    #[test]
    fn rendering_twice_is_byte_identical() {
        let renderer = Renderer::new().unwrap();
        let blocks = build_blocks(&record()).unwrap();
        let first = renderer.render_markup(&blocks, &LETTER).unwrap();
        let second = renderer.render_markup(&blocks, &LETTER).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn markup_carries_formatted_content_and_geometry() {
        let renderer = Renderer::new().unwrap();
        let blocks = build_blocks(&record()).unwrap();
        let markup = renderer.render_markup(&blocks, &LETTER).unwrap();
        assert!(markup.contains("INVOICE"));
        assert!(markup.contains("us-letter"));
        assert!(markup.contains("0007"));
        assert!(markup.contains("$5,000.00"));
        assert!(markup.contains("Remittance Instructions"));
        assert!(markup.contains("no U.S. withholding applies"));
    }

    #[test]
    fn user_text_is_escaped_for_the_typesetter() {
        let renderer = Renderer::new().unwrap();
        let mut rec = record();
        rec.dolartag = "$juana".into();
        rec.client_name = "Acme #1 [test]".into();
        let blocks = build_blocks(&rec).unwrap();
        let markup = renderer.render_markup(&blocks, &LETTER).unwrap();
        assert!(markup.contains("\\$juana"));
        assert!(markup.contains("Acme \\#1 \\[test\\]"));
    }

    #[test]
    fn service_period_becomes_a_line_break() {
        let renderer = Renderer::new().unwrap();
        let blocks = build_blocks(&record()).unwrap();
        let markup = renderer.render_markup(&blocks, &LETTER).unwrap();
        assert!(
            markup.contains("Contractor services - Software Engineer \\ Services provided during January 2025")
        );
    }
}
