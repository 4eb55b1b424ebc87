//! Trap predicates: which raw lines belong to a line schema.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

/// Caller-supplied trap closure.
pub type TrapFn = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Decides at decode time whether a raw line belongs to a line schema.
///
/// Sections are tried in declaration order and the first whose trap matches
/// consumes the line, so traps at one decision point must not overlap.
#[derive(Clone, Default)]
pub enum Trap {
    /// Matches every line.
    #[default]
    Always,
    /// Matches lines starting with the literal prefix.
    Prefix(String),
    /// Matches lines starting with none of the prefixes.
    NotPrefixes(Vec<String>),
    Regex(Regex),
    Custom(TrapFn),
}

impl Trap {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Trap::Prefix(prefix.into())
    }

    pub fn not_prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Trap::NotPrefixes(prefixes.into_iter().map(Into::into).collect())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Trap::Regex(Regex::new(pattern)?))
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Trap::Custom(Arc::new(f))
    }

    pub fn matches(&self, line: &str) -> bool {
        match self {
            Trap::Always => true,
            Trap::Prefix(prefix) => line.starts_with(prefix.as_str()),
            Trap::NotPrefixes(prefixes) => !prefixes.iter().any(|p| line.starts_with(p.as_str())),
            Trap::Regex(re) => re.is_match(line),
            Trap::Custom(f) => f(line),
        }
    }
}

impl fmt::Debug for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trap::Always => f.write_str("Always"),
            Trap::Prefix(p) => f.debug_tuple("Prefix").field(p).finish(),
            Trap::NotPrefixes(ps) => f.debug_tuple("NotPrefixes").field(ps).finish(),
            Trap::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
            Trap::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}
