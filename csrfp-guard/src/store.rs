use crate::token::{Token, constant_time_eq};
use csrfp_session::Session;
use serde_json::Value;

/// The ordered token sequence kept in one session.
///
/// Tokens are stored oldest first under a single session key as a JSON
/// array of strings. A key that is missing or holds anything else reads as
/// an empty, never-issued sequence.
pub struct TokenStore<'a> {
    session: &'a mut Session,
    key: &'a str,
}

impl<'a> TokenStore<'a> {
    pub fn new(session: &'a mut Session, key: &'a str) -> Self {
        Self { session, key }
    }

    /// Current sequence, or `None` when nothing usable is stored.
    pub fn tokens(&self) -> Option<Vec<String>> {
        self.session.get::<Vec<String>>(self.key)
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.tokens()
            .is_some_and(|tokens| tokens.iter().any(|t| constant_time_eq(t, candidate)))
    }

    /// Append a token, creating the sequence if needed.
    pub fn issue(&mut self, token: &Token) {
        let mut tokens = self.tokens().unwrap_or_default();
        tokens.push(token.as_str().to_string());
        self.write(tokens);
    }

    /// Look for `candidate`, oldest first.
    ///
    /// On the first match every older token is dropped and `true` is
    /// returned; the match itself and everything newer stay. Without a
    /// match the sequence is left exactly as it was.
    pub fn validate_and_consume(&mut self, candidate: &str) -> bool {
        let Some(mut tokens) = self.tokens() else {
            return false;
        };

        let Some(position) = tokens.iter().position(|t| constant_time_eq(t, candidate)) else {
            return false;
        };

        if position > 0 {
            tokens.drain(..position);
            self.write(tokens);
        }
        true
    }

    fn write(&mut self, tokens: Vec<String>) {
        self.session
            .data
            .insert(self.key.to_string(), Value::from(tokens));
    }
}
