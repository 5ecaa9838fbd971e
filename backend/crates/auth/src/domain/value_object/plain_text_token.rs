//! Plain-text personal access token
//!
//! Wire form is `<token id>|<secret>`. Only the SHA-256 of the secret is
//! persisted, so this value exists once: in the register/login response.

use std::fmt;

use crate::domain::value_object::token_id::TokenId;

pub struct PlainTextToken(String);

impl PlainTextToken {
    pub fn new(token_id: &TokenId, secret: &str) -> Self {
        Self(format!("{}|{}", token_id, secret))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Split a presented bearer value into `(id, secret)`
    ///
    /// A value without `|` is treated as a bare secret.
    pub fn split(bearer: &str) -> (Option<&str>, &str) {
        match bearer.split_once('|') {
            Some((id, secret)) => (Some(id), secret),
            None => (None, bearer),
        }
    }
}

impl fmt::Debug for PlainTextToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PlainTextToken").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_and_split() {
        let id = TokenId::new();
        let token = PlainTextToken::new(&id, "abc123");
        assert_eq!(token.as_str(), format!("{}|abc123", id));

        let (parsed_id, secret) = PlainTextToken::split(token.as_str());
        assert_eq!(parsed_id, Some(id.to_string().as_str()));
        assert_eq!(secret, "abc123");
    }

    #[test]
    fn test_split_bare_secret() {
        assert_eq!(PlainTextToken::split("only-secret"), (None, "only-secret"));
    }

    #[test]
    fn test_debug_redaction() {
        let token = PlainTextToken::new(&TokenId::new(), "supersecret");
        assert!(!format!("{:?}", token).contains("supersecret"));
    }
}
