//! XML export and report merging
//!
//! Renders flagged entities as phpcs-flavoured `<error>` elements and
//! splices them into an existing phpcs XML report. The element shape,
//! including the double space before `source=`, is byte-compatible with
//! what downstream report consumers already parse; do not reformat it.

use ridilint_core::{Entity, PositionError, PositionResolver};

use crate::logging;

/// Render one `<error>` element per flagged entity, joined by newlines.
///
/// Entities are expected in serialization order; the position resolver
/// walks the source forward only, and running past the last line aborts
/// the export.
pub fn export_xml(source: &str, entities: &[Entity]) -> Result<String, PositionError> {
    let mut resolver = PositionResolver::new(source);
    let mut elements = Vec::with_capacity(entities.len());

    for entity in entities {
        let column = resolver.column_at(entity.file_pos)?;
        let reason = entity.reason.as_deref().unwrap_or_default();
        let payload = escape_xml(&format!("[{}] {} <{}>", entity.kind, reason, entity.clause));
        elements.push(format!(
            "<error line='{}' column='{}'  source='RIDI.LINT' severity='5' fixable='1'>{}</error>",
            entity.line, column, payload
        ));
    }

    logging::log(&format!("exported {} error elements", elements.len()));
    Ok(elements.join("\n"))
}

/// Splice our XML fragment into a phpcs report, immediately before the
/// first `</file>` closing tag. A missing fragment returns the report
/// unchanged. Plain string substitution, not XML-aware; reports with
/// multiple `<file>` blocks are out of scope.
pub fn merge_result(phpcs_xml: &str, lint_xml: Option<&str>) -> String {
    match lint_xml {
        Some(fragment) => {
            phpcs_xml.replacen("</file>", &format!("{}\n</file>", fragment), 1)
        }
        None => phpcs_xml.to_string(),
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
