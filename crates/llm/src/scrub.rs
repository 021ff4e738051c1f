//! Scrubbing of provider error bodies before they reach logs or reports.

const MAX_ERROR_CHARS: usize = 200;

/// Token prefixes that introduce a credential.
const SECRET_PREFIXES: [&str; 4] = ["sk-", "Bearer ", "api_key=", "access_token="];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

/// Replaces every credential-looking token with `[REDACTED]`.
pub fn scrub_secrets(input: &str) -> String {
    let mut scrubbed = input.to_string();
    for prefix in SECRET_PREFIXES {
        let mut search_from = 0;
        while let Some(rel) = scrubbed[search_from..].find(prefix) {
            let start = search_from + rel;
            let value_start = start + prefix.len();
            let value_len: usize = scrubbed[value_start..]
                .chars()
                .take_while(|c| is_secret_char(*c))
                .map(char::len_utf8)
                .sum();
            if value_len == 0 {
                search_from = value_start;
                continue;
            }
            scrubbed.replace_range(start..value_start + value_len, "[REDACTED]");
            search_from = start + "[REDACTED]".len();
        }
    }
    scrubbed
}

/// Scrubs and truncates a provider error body for display.
pub fn sanitize_error_body(body: &str) -> String {
    let scrubbed = scrub_secrets(body.trim());
    if scrubbed.chars().count() <= MAX_ERROR_CHARS {
        return scrubbed;
    }
    let mut truncated: String = scrubbed.chars().take(MAX_ERROR_CHARS).collect();
    truncated.push_str("...");
    truncated
}
