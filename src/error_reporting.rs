//! Diagnostic categories and the mask that decides which of them are reported.
//!
//! The categories mirror the classic runtime error levels so an existing
//! `DEV_ERROR_REPORTING` value from a site's config can be reused verbatim,
//! e.g. `E_ALL & ~E_DEPRECATED & ~E_USER_DEPRECATED & ~E_NOTICE`.

use crate::error::ConfigError;

pub const E_ERROR: u32 = 1;
pub const E_WARNING: u32 = 2;
pub const E_PARSE: u32 = 4;
pub const E_NOTICE: u32 = 8;
pub const E_CORE_ERROR: u32 = 16;
pub const E_CORE_WARNING: u32 = 32;
pub const E_COMPILE_ERROR: u32 = 64;
pub const E_COMPILE_WARNING: u32 = 128;
pub const E_USER_ERROR: u32 = 256;
pub const E_USER_WARNING: u32 = 512;
pub const E_USER_NOTICE: u32 = 1024;
pub const E_STRICT: u32 = 2048;
pub const E_RECOVERABLE_ERROR: u32 = 4096;
pub const E_DEPRECATED: u32 = 8192;
pub const E_USER_DEPRECATED: u32 = 16384;
pub const E_ALL: u32 = 32767;

const NAMED_LEVELS: &[(&str, u32)] = &[
    ("E_ERROR", E_ERROR),
    ("E_WARNING", E_WARNING),
    ("E_PARSE", E_PARSE),
    ("E_NOTICE", E_NOTICE),
    ("E_CORE_ERROR", E_CORE_ERROR),
    ("E_CORE_WARNING", E_CORE_WARNING),
    ("E_COMPILE_ERROR", E_COMPILE_ERROR),
    ("E_COMPILE_WARNING", E_COMPILE_WARNING),
    ("E_USER_ERROR", E_USER_ERROR),
    ("E_USER_WARNING", E_USER_WARNING),
    ("E_USER_NOTICE", E_USER_NOTICE),
    ("E_STRICT", E_STRICT),
    ("E_RECOVERABLE_ERROR", E_RECOVERABLE_ERROR),
    ("E_DEPRECATED", E_DEPRECATED),
    ("E_USER_DEPRECATED", E_USER_DEPRECATED),
    ("E_ALL", E_ALL),
];

/// Bitmask of diagnostic categories that get reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorReporting(u32);

impl Default for ErrorReporting {
    fn default() -> Self {
        Self(E_ALL & !E_DEPRECATED & !E_USER_DEPRECATED)
    }
}

impl ErrorReporting {
    pub const ALL: ErrorReporting = ErrorReporting(E_ALL);

    pub fn mask(&self) -> u32 {
        self.0
    }

    pub fn allows(&self, level: u32) -> bool {
        self.0 & level != 0
    }

    /// Resolve the mask from an optional override. An override that doesn't
    /// parse is ignored with a warning and the default mask is used.
    pub fn resolve(value: Option<&str>) -> Self {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => Self::default(),
            Some(v) => match Self::parse(v) {
                Ok(reporting) => reporting,
                Err(e) => {
                    tracing::warn!("{}; using default error reporting", e);
                    Self::default()
                }
            },
        }
    }

    /// Parse a decimal mask or an expression such as `E_ALL & ~E_NOTICE`.
    /// Operators are `&` and `|`, evaluated left to right; `~` negates a term.
    pub fn parse(expr: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::Invalid {
            name: crate::constants::env::ERROR_REPORTING,
            reason,
        };

        let mut mask: Option<u32> = None;
        let mut pending_op: Option<char> = None;
        let mut rest = expr.trim();

        while !rest.is_empty() {
            let (term, tail) = split_term(rest);
            if term.is_empty() {
                return Err(invalid(format!("expected a term at '{}'", rest)));
            }
            let value = term_value(term).ok_or_else(|| invalid(format!("unknown term '{}'", term)))?;

            mask = Some(match (mask, pending_op) {
                (None, None) => value,
                (Some(acc), Some('&')) => acc & value,
                (Some(acc), Some('|')) => acc | value,
                _ => return Err(invalid(format!("missing operator before '{}'", term))),
            });

            rest = tail.trim_start();
            pending_op = match rest.chars().next() {
                None => None,
                Some(op @ ('&' | '|')) => {
                    rest = rest[1..].trim_start();
                    if rest.is_empty() {
                        return Err(invalid(format!("dangling '{}'", op)));
                    }
                    Some(op)
                }
                Some(c) => return Err(invalid(format!("unexpected '{}'", c))),
            };
        }

        mask.map(|m| Self(m & E_ALL))
            .ok_or_else(|| invalid("empty expression".to_string()))
    }

    /// Emit `message` as a tracing event if `level` is reported.
    pub fn report(&self, level: u32, message: &str) {
        if !self.allows(level) {
            return;
        }
        const ERRORS: u32 = E_ERROR | E_PARSE | E_CORE_ERROR | E_COMPILE_ERROR | E_USER_ERROR | E_RECOVERABLE_ERROR;
        const WARNINGS: u32 = E_WARNING | E_CORE_WARNING | E_COMPILE_WARNING | E_USER_WARNING;
        if level & ERRORS != 0 {
            tracing::error!("{}", message);
        } else if level & WARNINGS != 0 {
            tracing::warn!("{}", message);
        } else {
            tracing::info!("{}", message);
        }
    }
}

/// Split one (possibly negated) term off the front of `input`.
fn split_term(input: &str) -> (&str, &str) {
    let mut end = 0;
    for (i, c) in input.char_indices() {
        if c == '&' || c == '|' || (c.is_whitespace() && !input[..i].trim_start_matches('~').trim().is_empty()) {
            break;
        }
        end = i + c.len_utf8();
    }
    (input[..end].trim(), &input[end..])
}

fn term_value(term: &str) -> Option<u32> {
    if let Some(inner) = term.strip_prefix('~') {
        return term_value(inner.trim_start()).map(|v| !v);
    }
    // Negative values such as -1 mean "every category"
    if let Ok(n) = term.parse::<i64>() {
        return Some((n & i64::from(E_ALL)) as u32);
    }
    NAMED_LEVELS
        .iter()
        .find(|(name, _)| *name == term)
        .map(|(_, value)| *value)
}
