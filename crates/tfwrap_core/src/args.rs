//! Ordered argument vectors.

use crate::options::{build_arg, ArgValue, TfOption};

/// Arguments for one engine invocation: subcommand, flags, then positionals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentVector {
    tokens: Vec<String>,
}

impl ArgumentVector {
    pub fn new(subcommand: impl Into<String>) -> Self {
        Self {
            tokens: vec![subcommand.into()],
        }
    }

    /// Append the flag for `option` unless the builder omits it.
    pub fn flag(&mut self, option: TfOption, value: impl Into<ArgValue>) -> &mut Self {
        if let Some(token) = build_arg(option, value) {
            self.tokens.push(token);
        }
        self
    }

    /// Append the flag once per value.
    pub fn repeated<I, V>(&mut self, option: TfOption, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ArgValue>,
    {
        for value in values {
            self.flag(option, value);
        }
        self
    }

    pub fn push(&mut self, token: impl Into<String>) -> &mut Self {
        self.tokens.push(token.into());
        self
    }

    pub fn extend<I: IntoIterator<Item = String>>(&mut self, tokens: I) -> &mut Self {
        self.tokens.extend(tokens);
        self
    }

    /// Append a positional argument, shell-quoted.
    pub fn positional(&mut self, value: &str) -> &mut Self {
        self.tokens.push(shell_quote(value));
        self
    }

    pub fn subcommand(&self) -> &str {
        self.tokens.first().map(String::as_str).unwrap_or_default()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    pub fn position(&self, token: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t == token)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.tokens
    }
}

impl std::fmt::Display for ArgumentVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

/// Quote `value` for a POSIX shell if it contains anything outside the safe set.
pub fn shell_quote(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }

    let safe = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        return value.to_string();
    }

    format!("'{}'", value.replace('\'', "'\"'\"'"))
}
