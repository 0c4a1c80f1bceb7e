//! Secret masking for logs and output
//!
//! Keeps daemon credentials out of logs, error messages, and `config show`

use std::borrow::Cow;

use regex::Regex;

/// Patterns that match credential formats seen in front of an mcpd daemon
const SECRET_PATTERNS: &[(&str, &str)] = &[
    // Authorization header values
    (r"(?i)bearer\s+[a-zA-Z0-9._~+/=-]+", "[MASKED_BEARER_TOKEN]"),
    // JWTs, often used as daemon tokens
    (r"eyJ[a-zA-Z0-9_-]+\.eyJ[a-zA-Z0-9_-]+\.[a-zA-Z0-9_-]+", "[MASKED_JWT]"),
    // Provider-style keys
    (r"sk-[a-zA-Z0-9_-]{20,}", "[MASKED_API_KEY]"),
    // Key assignments in config files, env dumps and CLI echoes
    (r#"(?i)api_key\s*[=:]\s*"?[a-zA-Z0-9._-]{8,}"?"#, "api_key = [MASKED_SECRET]"),
    (r"(?i)MCPD_API_KEY=\S+", "MCPD_API_KEY=[MASKED_SECRET]"),
];

/// Compiled secret patterns for efficient matching
pub struct SecretMasker {
    patterns: Vec<(Regex, &'static str)>,
}

impl Default for SecretMasker {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretMasker {
    #[must_use]
    pub fn new() -> Self {
        let patterns = SECRET_PATTERNS
            .iter()
            .filter_map(|(pattern, replacement)| {
                Regex::new(pattern).ok().map(|re| (re, *replacement))
            })
            .collect();

        Self { patterns }
    }

    /// Mask secrets in a string
    #[must_use]
    pub fn mask<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut result = Cow::Borrowed(text);

        for (pattern, replacement) in &self.patterns {
            if pattern.is_match(&result) {
                result = Cow::Owned(pattern.replace_all(&result, *replacement).into_owned());
            }
        }

        result
    }
}

static MASKER: std::sync::LazyLock<SecretMasker> = std::sync::LazyLock::new(SecretMasker::new);

/// Mask secrets in a string using the global masker
#[must_use]
pub fn mask_secrets(text: &str) -> Cow<'_, str> {
    MASKER.mask(text)
}

/// Short, non-reversible preview of a key: `abcd…` or `****`.
#[must_use]
pub fn redact_key(key: &str) -> String {
    let prefix: String = key.chars().take(4).collect();
    if key.chars().count() > 8 {
        format!("{prefix}…")
    } else {
        "****".to_string()
    }
}
