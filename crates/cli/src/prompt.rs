//! Terminal implementations of the input prompt.

use async_trait::async_trait;
use pipeline::{InputPrompt, PromptResponse};
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};
use tokio::sync::Mutex;

/// Reads prompted lines from stdin. End of input counts as a cancelled prompt.
///
/// One instance owns the buffered reader, so every prompt in a run must go
/// through it.
pub struct StdinPrompt {
    reader: Mutex<BufReader<Stdin>>,
}

impl StdinPrompt {
    pub fn new() -> Self {
        Self {
            reader: Mutex::new(BufReader::new(tokio::io::stdin())),
        }
    }

    /// Shows `label` on stderr and reads one line. `None` on end of input.
    pub async fn read_line(&self, label: &str) -> std::io::Result<Option<String>> {
        eprint!("{label}: ");
        let mut line = String::new();
        let read = self.reader.lock().await.read_line(&mut line).await?;
        if read == 0 {
            eprintln!();
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

#[async_trait]
impl InputPrompt for StdinPrompt {
    async fn prompt(&self, title: &str, placeholder: &str) -> PromptResponse {
        match self.read_line(&format!("{title} [{placeholder}]")).await {
            Ok(Some(line)) => PromptResponse::Provided(line),
            Ok(None) => PromptResponse::Cancelled,
            Err(e) => {
                tracing::warn!(error = %e, "reading input failed; treating prompt as cancelled");
                PromptResponse::Cancelled
            }
        }
    }
}

/// Answers every prompt with the text given on the command line.
pub struct FixedInput(pub String);

#[async_trait]
impl InputPrompt for FixedInput {
    async fn prompt(&self, _title: &str, _placeholder: &str) -> PromptResponse {
        PromptResponse::Provided(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_input_always_provides_its_text() {
        let prompt = FixedInput("extra context".to_string());
        assert_eq!(
            prompt.prompt("Enter your input", "Enter text input...").await,
            PromptResponse::Provided("extra context".to_string())
        );
    }
}
