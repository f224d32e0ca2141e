//! Markdown transcript export.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use crate::exchange::Exchange;
use crate::storage::atomic_write;

/// Directory, under the data directory, where exports land by default.
pub const TRANSCRIPTS_DIR: &str = "transcripts";

/// Errors that can occur when exporting a transcript.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Render the conversation log as a markdown document.
///
/// Responses are already markdown and are embedded as-is.
pub fn to_markdown(exchanges: &[Exchange], model: &str, exported_at: DateTime<Local>) -> String {
    let mut out = String::new();
    out.push_str("# Ask me..\n\n");
    let _ = writeln!(out, "- **Model**: {model}");
    let _ = writeln!(out, "- **Exported**: {}", exported_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "- **Exchanges**: {}", exchanges.len());

    for (i, exchange) in exchanges.iter().enumerate() {
        let _ = write!(
            out,
            "\n---\n\n## {}. Q: {}\n\n{}\n",
            i + 1,
            exchange.prompt.trim_end(),
            exchange.response.trim_end()
        );
    }

    out
}

/// Default export path: `<data_dir>/transcripts/<timestamp>.md`.
pub fn default_export_path(data_dir: &Path, now: DateTime<Local>) -> PathBuf {
    data_dir
        .join(TRANSCRIPTS_DIR)
        .join(format!("{}.md", now.format("%Y%m%d-%H%M%S")))
}

/// Write the transcript to `path`, creating parent directories.
pub fn export_transcript(
    exchanges: &[Exchange],
    model: &str,
    path: &Path,
) -> Result<PathBuf, TranscriptError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = to_markdown(exchanges, model, Local::now());
    atomic_write(path, content.as_bytes())?;

    info!(path = %path.display(), count = exchanges.len(), "Exported transcript");
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_to_markdown() {
        let exchanges = vec![
            Exchange::new("Hello", "World"),
            Exchange::new("List two", "- one\n- two\n"),
        ];
        let md = to_markdown(&exchanges, "gemini-1.5-flash", fixed_time());

        insta::assert_snapshot!(md, @r"
        # Ask me..

        - **Model**: gemini-1.5-flash
        - **Exported**: 2024-05-17 09:30:00
        - **Exchanges**: 2

        ---

        ## 1. Q: Hello

        World

        ---

        ## 2. Q: List two

        - one
        - two
        ");
    }

    #[test]
    fn test_to_markdown_empty_log() {
        let md = to_markdown(&[], "m", fixed_time());
        assert!(md.contains("- **Exchanges**: 0"));
        assert!(!md.contains("---"));
    }

    #[test]
    fn test_default_export_path() {
        let path = default_export_path(Path::new("/data"), fixed_time());
        assert_eq!(path, PathBuf::from("/data/transcripts/20240517-093000.md"));
    }

    #[test]
    fn test_export_creates_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("transcripts").join("out.md");

        let written =
            export_transcript(&[Exchange::new("Hello", "World")], "gemini-1.5-flash", &path)
                .unwrap();

        assert_eq!(written, path);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("## 1. Q: Hello"));
        assert!(content.contains("World"));
    }
}
