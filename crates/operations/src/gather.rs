//! Input gatherer.
//!
//! Each function extracts the text an operation works on from the active
//! editor, or returns the [`NoInputReason`] that makes the operation a no-op.
//! Only zero-length text counts as empty; whitespace is sent as-is.

use pipeline::{EditorSurface, InputPrompt, NoInputReason, PromptResponse};

pub const INPUT_PROMPT_TITLE: &str = "Enter your input";
pub const INPUT_PROMPT_PLACEHOLDER: &str = "Enter text input...";

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Full document text.
pub fn full_document(editor: Option<&dyn EditorSurface>) -> Result<String, NoInputReason> {
    let editor = editor.ok_or(NoInputReason::NoActiveEditor)?;
    non_empty(editor.value()).ok_or(NoInputReason::EmptyDocument)
}

/// Current selection, falling back to the full document when nothing is selected.
pub fn selection_or_document(editor: Option<&dyn EditorSurface>) -> Result<String, NoInputReason> {
    let editor = editor.ok_or(NoInputReason::NoActiveEditor)?;
    non_empty(editor.selection())
        .or_else(|| non_empty(editor.value()))
        .ok_or(NoInputReason::EmptyDocument)
}

/// Current selection only; no fallback.
pub fn selection_only(editor: Option<&dyn EditorSurface>) -> Result<String, NoInputReason> {
    let editor = editor.ok_or(NoInputReason::NoActiveEditor)?;
    non_empty(editor.selection()).ok_or(NoInputReason::EmptySelection)
}

/// Document text, a newline, then a line of text from the prompt.
///
/// A cancelled prompt yields [`NoInputReason::PromptCancelled`]. The prompt
/// is not shown when there is no active editor.
pub async fn document_with_input(
    editor: Option<&dyn EditorSurface>,
    prompt: &dyn InputPrompt,
) -> Result<String, NoInputReason> {
    let editor = editor.ok_or(NoInputReason::NoActiveEditor)?;
    let document = editor.value();
    let input = match prompt
        .prompt(INPUT_PROMPT_TITLE, INPUT_PROMPT_PLACEHOLDER)
        .await
    {
        PromptResponse::Provided(text) => text,
        PromptResponse::Cancelled => return Err(NoInputReason::PromptCancelled),
    };
    Ok(format!("{document}\n{input}"))
}
