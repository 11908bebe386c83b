//! Single-level glob matching for header file names.
//!
//! Supports `*` (any run of characters) and `?` (exactly one character).
//! Like shell globbing, a wildcard never matches a leading `.`, so hidden
//! files are only picked up by patterns that start with a literal dot.

use crate::error::{Result, SyncError};

/// A validated file-name pattern such as `*.h`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
}

impl Pattern {
    /// Validate a pattern. It must be non-empty and must not contain a path
    /// separator, since matching only ever looks at one directory level.
    pub fn new(raw: &str) -> Result<Self> {
        if raw.is_empty() {
            return Err(SyncError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "pattern is empty".to_string(),
            });
        }
        if raw.contains('/') || raw.contains('\\') {
            return Err(SyncError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "pattern must not contain path separators".to_string(),
            });
        }
        if raw.contains('[') || raw.contains(']') {
            return Err(SyncError::InvalidPattern {
                pattern: raw.to_string(),
                reason: "character classes are not supported, use `*` and `?`".to_string(),
            });
        }
        Ok(Self {
            raw: raw.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Check a file name against this pattern
    pub fn matches(&self, name: &str) -> bool {
        if name.starts_with('.') && !self.raw.starts_with('.') {
            return false;
        }
        matches_pattern(name, &self.raw)
    }
}

/// Iterative wildcard match with a single backtrack point at the last `*`.
/// Unicode-aware: works on chars, not bytes.
fn matches_pattern(name: &str, pattern: &str) -> bool {
    let mut name_it = name.chars();
    let mut pattern_it = pattern.chars();

    let mut star_p_it = None;
    let mut star_n_it = None;

    loop {
        let s_char = name_it.clone().next();
        let p_char = pattern_it.clone().next();

        match (s_char, p_char) {
            (Some(s), Some(p)) if p == s || p == '?' => {
                name_it.next();
                pattern_it.next();
            }
            (_, Some('*')) => {
                pattern_it.next();
                star_p_it = Some(pattern_it.clone());
                star_n_it = Some(name_it.clone());
            }
            (Some(_), _) => {
                if let (Some(star_p), Some(star_n)) = (star_p_it.as_mut(), star_n_it.as_mut()) {
                    if star_n.next().is_none() {
                        return false;
                    }
                    name_it = star_n.clone();
                    pattern_it = star_p.clone();
                } else {
                    return false;
                }
            }
            (None, _) => {
                return pattern_it.all(|c| c == '*');
            }
        }
    }
}
