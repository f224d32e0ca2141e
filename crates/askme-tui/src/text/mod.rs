//! Text rendering utilities.
//!
//! - [`render_markdown`] - Render markdown to styled ratatui Lines
//! - [`wrap_lines`] - Style-preserving line wrapping

mod markdown;
mod wrap;

pub use markdown::render_markdown;
pub use wrap::wrap_lines;
