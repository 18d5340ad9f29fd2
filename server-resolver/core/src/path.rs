//! URL path helpers shared by all resolution strategies.

use regex::Regex;

/// Joins `base` and `suffix` into a single path that ends with exactly one `/`.
///
/// Runs of slashes are collapsed, except for the `://` of a leading scheme. A result without a
/// scheme always starts with `/`. An empty `suffix` simply slash-terminates `base`.
pub fn build_path(base: &str, suffix: &str) -> String {
    let (scheme, base) = split_scheme(base);

    let mut path = String::with_capacity(scheme.len() + base.len() + suffix.len() + 2);
    path.push_str(scheme);
    if scheme.is_empty() {
        path.push('/');
    }
    for segment in base
        .split('/')
        .chain(suffix.split('/'))
        .filter(|s| !s.is_empty())
    {
        if !path.ends_with('/') {
            path.push('/');
        }
        path.push_str(segment);
    }
    if !path.ends_with('/') {
        path.push('/');
    }
    path
}

/// Splits a leading `scheme://` from `base`. A scheme with nothing after it is treated as an
/// ordinary path segment.
fn split_scheme(base: &str) -> (&str, &str) {
    if let Some(idx) = base.find("://") {
        let mut name = base[..idx].chars();
        let is_scheme = name.next().map_or(false, |c| c.is_ascii_alphabetic())
            && name.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'));
        let (scheme, rest) = base.split_at(idx + 3);
        if is_scheme && rest.split('/').any(|s| !s.is_empty()) {
            return (scheme, rest);
        }
    }
    ("", base)
}

/// Recovers the externally visible path prefix from an ingress path that was rewritten by the
/// configured path transform (e.g. `%s(.*)` for ingress controllers that require capture groups).
#[derive(Clone, Debug, Default)]
pub struct PathTransformInverter {
    inverse: Option<Regex>,
}

#[derive(Debug, thiserror::Error)]
pub enum PathTransformError {
    #[error("path transform {0:?} must contain a '%s' placeholder")]
    MissingPlaceholder(String),

    #[error("invalid path transform {fmt:?}: {source}")]
    Regex {
        fmt: String,
        #[source]
        source: regex::Error,
    },
}

// === impl PathTransformInverter ===

impl PathTransformInverter {
    const PLACEHOLDER: &'static str = "%s";

    /// Builds an inverter for `fmt`. Without a format, paths are returned unchanged.
    pub fn new(fmt: Option<&str>) -> Result<Self, PathTransformError> {
        let fmt = match fmt.map(str::trim).filter(|f| !f.is_empty()) {
            Some(fmt) => fmt,
            None => return Ok(Self::default()),
        };

        let (prefix, suffix) = fmt
            .split_once(Self::PLACEHOLDER)
            .ok_or_else(|| PathTransformError::MissingPlaceholder(fmt.to_string()))?;
        let pattern = format!("^{}(.*){}$", regex::escape(prefix), regex::escape(suffix));
        let inverse = Regex::new(&pattern).map_err(|source| PathTransformError::Regex {
            fmt: fmt.to_string(),
            source,
        })?;
        Ok(Self {
            inverse: Some(inverse),
        })
    }

    /// Returns the path as it was before the transform was applied. Paths that the transform could
    /// not have produced are returned unchanged.
    pub fn undo<'p>(&self, path: &'p str) -> &'p str {
        let inverse = match self.inverse.as_ref() {
            Some(inverse) => inverse,
            None => return path,
        };
        match inverse.captures(path).and_then(|caps| caps.get(1)) {
            Some(original) => original.as_str(),
            None => path,
        }
    }
}
