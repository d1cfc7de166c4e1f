//! Offset-to-column resolution for report export
//!
//! The parser only guarantees byte offsets and start lines, so the exporter
//! derives columns itself. The column is measured to the start of the token
//! the offset points into: take the in-line prefix before the offset, strip
//! the trailing run of non-whitespace, and report the remaining byte length.
//! This matches the phpcs column semantics closely enough for display.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PositionError {
    /// The entity list and the source text are out of sync: an offset lies
    /// past the last source line. Export must abort rather than emit
    /// corrupted positions.
    #[error("entity offset {0} lies beyond the end of the source text")]
    SourceUnderflow(usize),
}

/// Forward-only cursor over the newline-split source text.
///
/// Offsets are expected in non-decreasing order; an offset behind the
/// cursor clamps to column 0 instead of rewinding.
pub struct PositionResolver<'s> {
    lines: Vec<&'s str>,
    index: usize,
    /// Byte length of all fully consumed lines, newlines included.
    consumed: usize,
}

impl<'s> PositionResolver<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            lines: source.split('\n').collect(),
            index: 0,
            consumed: 0,
        }
    }

    /// Resolve a byte offset to its 0-based token column.
    pub fn column_at(&mut self, file_pos: usize) -> Result<usize, PositionError> {
        loop {
            let Some(line) = self.lines.get(self.index) else {
                return Err(PositionError::SourceUnderflow(file_pos));
            };
            let line_end = self.consumed + line.len();
            if file_pos >= line_end {
                self.consumed = line_end + 1;
                self.index += 1;
                continue;
            }
            break;
        }

        let line = self.lines[self.index];
        let width = file_pos.saturating_sub(self.consumed);
        let prefix = line.get(..width).unwrap_or("");
        let trimmed = prefix.trim_end_matches(|c: char| !c.is_whitespace());
        Ok(trimmed.len())
    }
}
