// src/util/wildcard.rs

//! Whole-string matching where `*` stands for zero or more characters.
//!
//! Every other character, including `?` and `[`, is literal.

use regex::Regex;

use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct Wildcard {
    pattern: String,
    regex: Regex,
}

impl Wildcard {
    pub fn new(pattern: &str) -> Result<Self> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = Regex::new(&format!("(?s)^{body}$")).map_err(anyhow::Error::from)?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// One-shot form of [`Wildcard::is_match`].
pub fn matches(pattern: &str, text: &str) -> bool {
    Wildcard::new(pattern).is_ok_and(|w| w.is_match(text))
}
