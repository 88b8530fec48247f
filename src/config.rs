//! Attribute binding configuration.
//!
//! Maps each [`AttributeChannel`] to the vertex attribute location it is fed
//! through and the attribute name shaders declare for it. The defaults put
//! the channels at locations 0 to 3 in canonical order. Any entry or field
//! left out of a document keeps the default for that channel.
//!
//! ```json
//! {
//!     "position": { "location": 0, "name": "a_position" },
//!     "normal": { "location": 1 }
//! }
//! ```
//!
//! An [`AttributeBindings`] value never binds two channels to one location.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::abs::AttributeChannel;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid attribute bindings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("attribute location {location} is bound to both {first} and {second}")]
    DuplicateLocation {
        location: u32,
        first: AttributeChannel,
        second: AttributeChannel,
    },
}

/// Where a single channel is bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeBinding {
    pub location: u32,
    pub name: String,
}

impl AttributeBinding {
    pub fn new(location: u32, name: &str) -> Self {
        Self {
            location,
            name: name.to_string(),
        }
    }
}

/// An entry as written in a document, either field may be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBinding {
    location: Option<u32>,
    name: Option<String>,
}

impl RawBinding {
    fn or(self, default: AttributeBinding) -> AttributeBinding {
        AttributeBinding {
            location: self.location.unwrap_or(default.location),
            name: self.name.unwrap_or(default.name),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawBindings {
    position: RawBinding,
    normal: RawBinding,
    tex_coord0: RawBinding,
    tex_coord1: RawBinding,
}

impl TryFrom<RawBindings> for AttributeBindings {
    type Error = ConfigError;

    fn try_from(raw: RawBindings) -> Result<Self, ConfigError> {
        let defaults = AttributeBindings::default();
        let bindings = AttributeBindings {
            position: raw.position.or(defaults.position),
            normal: raw.normal.or(defaults.normal),
            tex_coord0: raw.tex_coord0.or(defaults.tex_coord0),
            tex_coord1: raw.tex_coord1.or(defaults.tex_coord1),
        };
        bindings.validate()?;
        Ok(bindings)
    }
}

/// Bindings for every channel, with distinct locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBindings")]
pub struct AttributeBindings {
    position: AttributeBinding,
    normal: AttributeBinding,
    tex_coord0: AttributeBinding,
    tex_coord1: AttributeBinding,
}

impl Default for AttributeBindings {
    fn default() -> Self {
        Self {
            position: AttributeBinding::new(0, "a_position"),
            normal: AttributeBinding::new(1, "a_normal"),
            tex_coord0: AttributeBinding::new(2, "a_tex_coord0"),
            tex_coord1: AttributeBinding::new(3, "a_tex_coord1"),
        }
    }
}

impl AttributeBindings {
    /// Parses bindings from JSON and checks that no two channels share a location.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let raw: RawBindings = serde_json::from_str(s)?;
        raw.try_into()
    }

    /// Returns these bindings with `channel` rebound, unless that would share
    /// a location with another channel.
    pub fn with_binding(
        mut self,
        channel: AttributeChannel,
        binding: AttributeBinding,
    ) -> Result<Self, ConfigError> {
        *self.get_mut(channel) = binding;
        self.validate()?;
        Ok(self)
    }

    /// Like [`with_binding`](Self::with_binding), keeping the channel's name.
    pub fn with_location(
        self,
        channel: AttributeChannel,
        location: u32,
    ) -> Result<Self, ConfigError> {
        let name = self.get(channel).name.clone();
        self.with_binding(channel, AttributeBinding { location, name })
    }

    pub fn get(&self, channel: AttributeChannel) -> &AttributeBinding {
        match channel {
            AttributeChannel::Position => &self.position,
            AttributeChannel::Normal => &self.normal,
            AttributeChannel::TexCoord0 => &self.tex_coord0,
            AttributeChannel::TexCoord1 => &self.tex_coord1,
        }
    }

    fn get_mut(&mut self, channel: AttributeChannel) -> &mut AttributeBinding {
        match channel {
            AttributeChannel::Position => &mut self.position,
            AttributeChannel::Normal => &mut self.normal,
            AttributeChannel::TexCoord0 => &mut self.tex_coord0,
            AttributeChannel::TexCoord1 => &mut self.tex_coord1,
        }
    }

    pub fn location(&self, channel: AttributeChannel) -> u32 {
        self.get(channel).location
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (i, &first) in AttributeChannel::ALL.iter().enumerate() {
            for &second in &AttributeChannel::ALL[i + 1..] {
                if self.location(first) == self.location(second) {
                    return Err(ConfigError::DuplicateLocation {
                        location: self.location(first),
                        first,
                        second,
                    });
                }
            }
        }
        Ok(())
    }
}
