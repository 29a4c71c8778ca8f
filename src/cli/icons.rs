//! Status glyphs for casx messages.
//!
//! Command summaries go to stderr so a table written to stdout stays
//! parseable; these prefixes mark what each summary line reports.

use console::{style, StyledObject};

/// Table written or build finished.
pub fn success() -> StyledObject<&'static str> {
    style("✓").green()
}

/// Selected files and corpus roots.
pub fn info() -> StyledObject<&'static str> {
    style("→").cyan()
}

/// Unfiltered corpus, empty selection or a document that is not an export.
pub fn warn() -> StyledObject<&'static str> {
    style("!").yellow()
}

/// Secondary output such as the exploded table.
pub fn dim_arrow() -> StyledObject<&'static str> {
    style("→").dim()
}
