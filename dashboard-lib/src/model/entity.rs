//! Entity kind (REST resource category)

use std::str::FromStr;

use crate::error::ValidationError;

/// The REST resource category a table operates on (`products`, `taxes`, ...).
///
/// The name is used as a URL path segment (`/api/{kind}`), so only ASCII
/// letters, digits, `_` and `-` are accepted.
///
/// # Examples
///
/// ```
/// use dashboard_lib::model::EntityKind;
///
/// let kind: EntityKind = "products".parse().unwrap();
/// assert_eq!(kind, EntityKind::products());
/// assert!("../admin".parse::<EntityKind>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKind(String);

impl EntityKind {
    /// Creates an entity kind, checking that it is path-safe.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if valid {
            Ok(Self(name))
        } else {
            Err(ValidationError::EntityKind(name))
        }
    }

    pub fn products() -> Self {
        Self("products".to_string())
    }

    pub fn transactions() -> Self {
        Self("transactions".to_string())
    }

    pub fn taxes() -> Self {
        Self("taxes".to_string())
    }

    pub fn reports() -> Self {
        Self("reports".to_string())
    }

    pub fn shops() -> Self {
        Self("shops".to_string())
    }

    /// Returns the resource name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a singular noun for titles ("Create product").
    pub fn singular(&self) -> &str {
        let name = self.0.as_str();
        if let Some(stem) = name.strip_suffix("xes") {
            &name[..stem.len() + 1]
        } else if let Some(stem) = name.strip_suffix('s') {
            stem
        } else {
            name
        }
    }
}

impl FromStr for EntityKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
