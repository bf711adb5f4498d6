//! Field identifiers

use std::fmt;
use std::str::FromStr;

/// Identifies a field on a [`Row`](super::Row).
///
/// The activity fields the table knows about get their own variant; any other
/// field delivered by the source is addressed through [`FieldKey::Custom`].
/// Each key maps to the field name used on the wire and parses back from it.
///
/// # Example
///
/// ```
/// use activity_lib::model::FieldKey;
///
/// let key: FieldKey = "StartDateTime".parse().unwrap();
/// assert_eq!(key, FieldKey::StartDateTime);
/// assert_eq!(FieldKey::custom("Location").name(), "Location");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKey {
    /// Record identifier (`Id`).
    Id,
    /// Activity subject (`Subject`).
    Subject,
    /// Start timestamp (`StartDateTime`).
    StartDateTime,
    /// End timestamp (`EndDateTime`).
    EndDateTime,
    /// Last modification timestamp (`LastModifiedDate`).
    LastModifiedDate,
    /// Derived owner display name (`OwnerName`).
    OwnerName,
    /// Derived record link path (`LinkUrl`).
    LinkUrl,
    /// Any other field, by name.
    Custom(String),
}

impl FieldKey {
    /// Creates a key for an arbitrary field name.
    ///
    /// Known names resolve to their dedicated variant.
    pub fn custom(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::from_known(&name).unwrap_or(FieldKey::Custom(name))
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        match self {
            FieldKey::Id => "Id",
            FieldKey::Subject => "Subject",
            FieldKey::StartDateTime => "StartDateTime",
            FieldKey::EndDateTime => "EndDateTime",
            FieldKey::LastModifiedDate => "LastModifiedDate",
            FieldKey::OwnerName => "OwnerName",
            FieldKey::LinkUrl => "LinkUrl",
            FieldKey::Custom(name) => name,
        }
    }

    /// Returns `true` for the activity timestamp fields.
    pub fn is_datetime(&self) -> bool {
        matches!(
            self,
            FieldKey::StartDateTime | FieldKey::EndDateTime | FieldKey::LastModifiedDate
        )
    }

    fn from_known(name: &str) -> Option<Self> {
        let key = match name {
            "Id" => FieldKey::Id,
            "Subject" => FieldKey::Subject,
            "StartDateTime" => FieldKey::StartDateTime,
            "EndDateTime" => FieldKey::EndDateTime,
            "LastModifiedDate" => FieldKey::LastModifiedDate,
            "OwnerName" => FieldKey::OwnerName,
            "LinkUrl" => FieldKey::LinkUrl,
            _ => return None,
        };
        Some(key)
    }
}

impl FromStr for FieldKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(FieldKey::custom(s))
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for FieldKey {
    fn from(name: &str) -> Self {
        FieldKey::custom(name)
    }
}
