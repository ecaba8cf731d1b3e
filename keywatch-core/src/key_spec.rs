//! Key specifications.

use crate::error::KeySpecError;

/// The keys a subscription reacts to.
///
/// Built once when a subscription is created so dispatch never has to work
/// out whether it is looking at one code or many.
///
/// # Example
///
/// ```rust
/// use keywatch_core::KeySpec;
///
/// let spec = KeySpec::from(["Escape", "KeyA"]);
/// assert!(spec.matches("KeyA"));
/// assert!(!spec.matches("keya"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeySpec {
    /// Exactly one key code.
    Single(String),
    /// Any of the listed key codes. Order is kept but does not affect matching.
    AnyOf(Vec<String>),
}

impl KeySpec {
    /// A spec matching one code.
    pub fn single(code: impl Into<String>) -> Self {
        KeySpec::Single(code.into())
    }

    /// A spec matching any of `codes`.
    pub fn any_of<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KeySpec::AnyOf(codes.into_iter().map(Into::into).collect())
    }

    /// Like [`KeySpec::single`], rejecting an empty code.
    pub fn try_single(code: impl Into<String>) -> Result<Self, KeySpecError> {
        let spec = Self::single(code);
        spec.validate()?;
        Ok(spec)
    }

    /// Like [`KeySpec::any_of`], rejecting an empty list or an empty code.
    pub fn try_any_of<I, S>(codes: I) -> Result<Self, KeySpecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = Self::any_of(codes);
        spec.validate()?;
        Ok(spec)
    }

    /// Check that at least one real key code can match.
    pub fn validate(&self) -> Result<(), KeySpecError> {
        match self {
            KeySpec::Single(code) if code.is_empty() => Err(KeySpecError::EmptyCode(0)),
            KeySpec::Single(_) => Ok(()),
            KeySpec::AnyOf(codes) if codes.is_empty() => Err(KeySpecError::Empty),
            KeySpec::AnyOf(codes) => match codes.iter().position(String::is_empty) {
                Some(index) => Err(KeySpecError::EmptyCode(index)),
                None => Ok(()),
            },
        }
    }

    /// Whether `code` is matched by this spec.
    pub fn matches(&self, code: &str) -> bool {
        match self {
            KeySpec::Single(expected) => expected == code,
            KeySpec::AnyOf(codes) => codes.iter().any(|expected| expected == code),
        }
    }

    /// The codes named by this spec.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        let codes: &[String] = match self {
            KeySpec::Single(code) => std::slice::from_ref(code),
            KeySpec::AnyOf(codes) => codes,
        };
        codes.iter().map(String::as_str)
    }
}

impl From<&str> for KeySpec {
    fn from(code: &str) -> Self {
        KeySpec::single(code)
    }
}

impl From<String> for KeySpec {
    fn from(code: String) -> Self {
        KeySpec::Single(code)
    }
}

impl From<Vec<String>> for KeySpec {
    fn from(codes: Vec<String>) -> Self {
        KeySpec::AnyOf(codes)
    }
}

impl From<Vec<&str>> for KeySpec {
    fn from(codes: Vec<&str>) -> Self {
        KeySpec::any_of(codes)
    }
}

impl From<&[&str]> for KeySpec {
    fn from(codes: &[&str]) -> Self {
        KeySpec::any_of(codes.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for KeySpec {
    fn from(codes: [&str; N]) -> Self {
        KeySpec::any_of(codes)
    }
}
