//! Airport options and the composite tokens that identify them.
//!
//! The provider identifies a place twice: by an opaque entity id and by a
//! short location code (the "sky id"). Both travel together through the form
//! as a single `"<entityId>, <skyId>"` token.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Separator between the entity id and the sky id in a token.
pub const TOKEN_SEPARATOR: &str = ", ";

/// A composite `"<entityId>, <skyId>"` airport identifier.
///
/// Both parts are non-empty and neither contains the separator, so a token
/// always splits into exactly two parts and re-joins to the same string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AirportToken {
    entity_id: String,
    sky_id: String,
}

impl AirportToken {
    /// Build a token from its two parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAirportToken`] if either part is empty or
    /// contains the separator.
    pub fn new(entity_id: impl Into<String>, sky_id: impl Into<String>) -> Result<Self, Error> {
        let entity_id = entity_id.into();
        let sky_id = sky_id.into();
        if !is_valid_part(&entity_id) || !is_valid_part(&sky_id) {
            return Err(Error::InvalidAirportToken {
                token: format!("{entity_id}{TOKEN_SEPARATOR}{sky_id}"),
            });
        }
        Ok(Self { entity_id, sky_id })
    }

    /// The provider-assigned entity identifier (first part).
    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// The short location code (second part).
    #[must_use]
    pub fn sky_id(&self) -> &str {
        &self.sky_id
    }
}

fn is_valid_part(part: &str) -> bool {
    !part.is_empty() && !part.contains(TOKEN_SEPARATOR)
}

impl FromStr for AirportToken {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidAirportToken {
            token: s.to_string(),
        };
        let (entity_id, sky_id) = s.split_once(TOKEN_SEPARATOR).ok_or_else(invalid)?;
        Self::new(entity_id, sky_id).map_err(|_| invalid())
    }
}

impl TryFrom<String> for AirportToken {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AirportToken> for String {
    fn from(token: AirportToken) -> Self {
        token.to_string()
    }
}

impl fmt::Display for AirportToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{TOKEN_SEPARATOR}{}", self.entity_id, self.sky_id)
    }
}

/// A selectable airport in the origin or destination picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportOption {
    /// The value stored by the form when this option is picked.
    pub token: AirportToken,
    /// Text shown to the user, e.g. `LOND (London)`.
    pub label: String,
}

impl AirportOption {
    /// Create an option from provider fields, labelled `"<skyId> (<title>)"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAirportToken`] if either id is unusable.
    pub fn from_provider(entity_id: &str, sky_id: &str, title: &str) -> Result<Self, Error> {
        let token = AirportToken::new(entity_id, sky_id)?;
        Ok(Self {
            label: format!("{sky_id} ({title})"),
            token,
        })
    }

    /// An option for a token typed in directly, labelled with its sky id.
    #[must_use]
    pub fn from_token(token: AirportToken) -> Self {
        Self {
            label: token.sky_id().to_string(),
            token,
        }
    }
}

impl fmt::Display for AirportOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}
