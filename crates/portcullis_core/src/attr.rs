//! Attribute paths over the abstract resource (or the requesting principal).

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The entity a policy attribute is rooted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeBase {
    /// The requesting principal (only known at request time)
    Principal,
    /// The abstract resource the filter constrains
    Resource,
}

impl AttributeBase {
    /// Get the textual prefix for this base
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Principal => "principal",
            Self::Resource => "resource",
        }
    }
}

/// A logical attribute path such as `resource.tenant`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributePath {
    /// Which entity the attribute belongs to
    pub base: AttributeBase,
    /// Attribute name, without the base prefix
    pub name: String,
}

impl AttributePath {
    /// Create a resource attribute path
    #[must_use]
    pub fn resource(name: impl Into<String>) -> Self {
        Self {
            base: AttributeBase::Resource,
            name: name.into(),
        }
    }

    /// Create a principal attribute path
    #[must_use]
    pub fn principal(name: impl Into<String>) -> Self {
        Self {
            base: AttributeBase::Principal,
            name: name.into(),
        }
    }

    /// Whether this path is rooted on the resource
    #[must_use]
    pub fn is_resource(&self) -> bool {
        self.base == AttributeBase::Resource
    }

    /// Parse a path of the form `resource.attr` or `principal.attr`
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidAttribute` if the base prefix is missing
    /// or the attribute name is empty.
    pub fn parse(s: &str) -> CoreResult<Self> {
        let s = s.trim();
        let (base, rest) = if let Some(rest) = s.strip_prefix("resource.") {
            (AttributeBase::Resource, rest)
        } else if let Some(rest) = s.strip_prefix("principal.") {
            (AttributeBase::Principal, rest)
        } else {
            return Err(CoreError::InvalidAttribute {
                reason: format!("missing resource/principal prefix: {}", s),
            });
        };

        if rest.is_empty() {
            return Err(CoreError::InvalidAttribute {
                reason: "empty attribute name".to_string(),
            });
        }

        Ok(Self {
            base,
            name: rest.to_string(),
        })
    }
}

impl FromStr for AttributePath {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.base.prefix(), self.name)
    }
}
