//! File-backed editor surface.
//!
//! [`FileEditor`] stands in for an interactive editor: the "document" is one
//! markdown file, and the optional selection is a whole-line range given on
//! the command line. Replacing the selection rewrites the file.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use pipeline::{EditorError, EditorSurface};
use thiserror::Error;

/// 1-based, inclusive range of lines, parsed from `"3-7"` or `"3"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub first: usize,
    pub last: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineRangeError {
    #[error("line range '{0}' is not of the form N or N-M")]
    Syntax(String),

    #[error("line numbers start at 1")]
    Zero,

    #[error("line range {first}-{last} ends before it starts")]
    Reversed { first: usize, last: usize },
}

impl FromStr for LineRange {
    type Err = LineRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = || LineRangeError::Syntax(s.to_string());
        let (first, last) = match s.trim().split_once('-') {
            Some((a, b)) => (a.trim(), b.trim()),
            None => (s.trim(), s.trim()),
        };
        let first: usize = first.parse().map_err(|_| syntax())?;
        let last: usize = last.parse().map_err(|_| syntax())?;
        if first == 0 || last == 0 {
            return Err(LineRangeError::Zero);
        }
        if last < first {
            return Err(LineRangeError::Reversed { first, last });
        }
        Ok(Self { first, last })
    }
}

/// Byte span covering lines `range.first..=range.last` of `text`.
///
/// The span excludes the final line's terminator so a replacement keeps the
/// line structure of the rest of the file.
fn line_span(text: &str, range: LineRange) -> Result<Range<usize>, EditorError> {
    let mut start = None;
    let mut offset = 0;
    for (index, line) in text.split_inclusive('\n').enumerate() {
        let number = index + 1;
        if number == range.first {
            start = Some(offset);
        }
        if number == range.last {
            let body = line.trim_end_matches(['\r', '\n']);
            let begin = start.unwrap_or(offset);
            return Ok(begin..offset + body.len());
        }
        offset += line.len();
    }
    Err(EditorError::InvalidSelection {
        message: format!(
            "lines {}-{} are outside a document of {} lines",
            range.first,
            range.last,
            text.lines().count()
        ),
    })
}

const STAGING_SUFFIX: &str = ".mdai-tmp";

#[derive(Debug)]
struct EditorState {
    text: String,
    selection: Option<Range<usize>>,
}

/// An [`EditorSurface`] over a single file on disk.
#[derive(Debug)]
pub struct FileEditor {
    path: PathBuf,
    state: Mutex<EditorState>,
}

impl FileEditor {
    /// Reads `path` and selects `lines`, if given.
    pub async fn open(path: impl Into<PathBuf>, lines: Option<LineRange>) -> Result<Self, EditorError> {
        let path = path.into();
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| EditorError::Backend {
                message: format!("{}: {e}", path.display()),
            })?;
        let selection = lines.map(|range| line_span(&text, range)).transpose()?;
        tracing::debug!(
            path = %path.display(),
            chars = text.chars().count(),
            selected = selection.is_some(),
            "document opened"
        );
        Ok(Self {
            path,
            state: Mutex::new(EditorState { text, selection }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn state(&self) -> std::sync::MutexGuard<'_, EditorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn write_atomically(&self, text: &str) -> std::io::Result<()> {
        let staging = self.staging_path();
        let written = match tokio::fs::write(&staging, text).await {
            Ok(()) => tokio::fs::rename(&staging, &self.path).await,
            Err(e) => Err(e),
        };
        if written.is_err() {
            if let Err(e) = tokio::fs::remove_file(&staging).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %staging.display(), error = %e, "staging file left behind");
                }
            }
        }
        written
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(STAGING_SUFFIX);
        PathBuf::from(staging)
    }
}

#[async_trait]
impl EditorSurface for FileEditor {
    fn value(&self) -> String {
        self.state().text.clone()
    }

    fn selection(&self) -> String {
        let state = self.state();
        state
            .selection
            .clone()
            .map(|span| state.text[span].to_string())
            .unwrap_or_default()
    }

    async fn replace_selection(&self, replacement: &str) -> Result<(), EditorError> {
        let updated = {
            let state = self.state();
            let span = state.selection.clone().ok_or(EditorError::NoSelection)?;
            let mut text = String::with_capacity(state.text.len() + replacement.len());
            text.push_str(&state.text[..span.start]);
            text.push_str(replacement);
            text.push_str(&state.text[span.end..]);
            text
        };

        self.write_atomically(&updated)
            .await
            .map_err(|e| EditorError::Backend {
                message: format!("{}: {e}", self.path.display()),
            })?;

        let mut state = self.state();
        state.text = updated;
        state.selection = None;
        Ok(())
    }
}
