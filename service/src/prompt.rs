//! Interactive field input with normalization and bounded retries.
//!
//! A [`Prompter`] owns an input and an output stream. Each read writes a
//! prompt, reads one line, trims it, and folds it to lower case. Required
//! fields that come back blank are asked for again until the
//! [`PromptPolicy`] budget runs out.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use stockroom_core::{Field, FieldValue};
//! use stockroom_service::Prompter;
//!
//! let mut prompter = Prompter::new(Cursor::new("  Apple \n"), Vec::new());
//! let brand = prompter.read_field(Field::Brand.spec()).unwrap();
//!
//! assert_eq!(brand, FieldValue::Text("apple".into()));
//! assert_eq!(prompter.output(), b"Brand: ");
//! ```

use std::io::{BufRead, Write};

use stockroom_core::{FieldKind, FieldSpec, FieldValue};
use tracing::debug;

use crate::error::ValidationError;

type Result<T> = std::result::Result<T, ValidationError>;

/// Retry budget for required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptPolicy {
    /// Additional attempts allowed after a blank answer.
    pub retries: u32,
}

impl PromptPolicy {
    pub fn new(retries: u32) -> Self {
        Self { retries }
    }

    /// Total reads allowed for one required field.
    pub fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

impl Default for PromptPolicy {
    fn default() -> Self {
        Self { retries: 1 }
    }
}

/// Reads normalized field values from a line-oriented input.
pub struct Prompter<R, W> {
    input: R,
    output: W,
    policy: PromptPolicy,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// Creates a prompter with the default policy.
    pub fn new(input: R, output: W) -> Self {
        Self::with_policy(input, output, PromptPolicy::default())
    }

    pub fn with_policy(input: R, output: W, policy: PromptPolicy) -> Self {
        Self {
            input,
            output,
            policy,
        }
    }

    pub fn policy(&self) -> PromptPolicy {
        self.policy
    }

    /// The stream prompts are written to.
    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    /// Reads a required text value shown as `"{label}: "`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InputExhausted`] when every attempt in the
    /// policy comes back blank.
    pub fn validate(&mut self, label: &str) -> Result<String> {
        let attempts = self.policy.attempts();
        for attempt in 1..=attempts {
            let value = self.prompt_line(&format!("{label}: "), label)?;
            if !value.is_empty() {
                return Ok(value);
            }
            debug!(field = label, attempt, attempts, "blank input for required field");
        }
        Err(ValidationError::InputExhausted {
            field: label.to_string(),
            attempts,
        })
    }

    /// Reads a required whole number shown as `"{label}: "`.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InputExhausted`] as for [`validate`](Self::validate),
    /// and [`ValidationError::InvalidNumber`] if the answer is not an `i64`.
    pub fn validate_integer(&mut self, label: &str) -> Result<i64> {
        let raw = self.validate(label)?;
        parse_integer(label, raw)
    }

    /// Reads a value shown as `"{label} [ {current} ]: "`; blank keeps `current`.
    pub fn validate_with_default(&mut self, label: &str, current: &str) -> Result<String> {
        let value = self.prompt_line(&format!("{label} [ {current} ]: "), label)?;
        if value.is_empty() {
            Ok(current.to_string())
        } else {
            Ok(value)
        }
    }

    /// Reads the field described by `spec` and parses it by kind.
    ///
    /// Optional fields accept a blank answer: empty text, or 0 for an
    /// integer.
    pub fn read_field(&mut self, spec: &FieldSpec) -> Result<FieldValue> {
        let raw = if spec.required {
            self.validate(spec.label)?
        } else {
            self.prompt_line(&format!("{}: ", spec.label), spec.label)?
        };
        parse_value(spec, raw)
    }

    /// Reads the field described by `spec`, keeping `current` on a blank answer.
    pub fn read_field_or(&mut self, spec: &FieldSpec, current: FieldValue) -> Result<FieldValue> {
        let raw = self.prompt_line(&format!("{} [ {current} ]: ", spec.label), spec.label)?;
        if raw.is_empty() {
            return Ok(current);
        }
        parse_value(spec, raw)
    }

    fn prompt_line(&mut self, prompt: &str, field: &str) -> Result<String> {
        self.output.write_all(prompt.as_bytes())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ValidationError::InputClosed {
                field: field.to_string(),
            });
        }
        Ok(normalize(&line))
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn parse_value(spec: &FieldSpec, raw: String) -> Result<FieldValue> {
    match spec.kind {
        FieldKind::Text => Ok(FieldValue::Text(raw)),
        FieldKind::Integer if raw.is_empty() => Ok(FieldValue::Integer(0)),
        FieldKind::Integer => parse_integer(spec.label, raw).map(FieldValue::Integer),
    }
}

fn parse_integer(label: &str, raw: String) -> Result<i64> {
    raw.parse::<i64>()
        .map_err(|_| ValidationError::InvalidNumber {
            field: label.to_string(),
            value: raw,
        })
}
