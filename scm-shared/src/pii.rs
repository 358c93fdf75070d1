use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wraps a credential (gateway token, API key) so it never leaks through
/// `Debug`, `Display` or serialization. JSON carries only [`Masked::hint`].
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl Serialize for Masked<String> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.hint())
    }
}

impl Masked<String> {
    /// Last four characters behind a fixed mask, or empty when unset.
    pub fn hint(&self) -> String {
        let value = self.0.trim();
        if value.is_empty() {
            return String::new();
        }
        let chars: Vec<char> = value.chars().collect();
        if chars.len() <= 4 {
            return "****".to_string();
        }
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("****{}", tail)
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for Masked<String> {
    fn from(value: String) -> Self {
        Masked(value)
    }
}
