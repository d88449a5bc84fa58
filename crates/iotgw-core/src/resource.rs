//! Resource type vocabulary
//!
//! A resource type is the capability tag a node declares when it registers.
//! Tags the gateway does not recognize are kept as [`ResourceType::Other`]:
//! such nodes are still registered and discoverable, but trigger no side
//! effect (no observation, no command handoff).

use std::fmt;

/// Application-level capability tag declared by a node at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceType {
    /// Combined temperature + humidity sensor (two-value samples)
    TemperatureAndHumidity,
    /// Carbon monoxide sensor
    Co,
    /// HVAC actuator reporting its on/off status
    Hvac,
    /// Movement actuator driven by one-shot commands, never observed
    Movement,
    /// Registered but unrecognized capability
    Other,
}

impl ResourceType {
    /// Parse a raw resource-type tag as sent in a registration payload.
    ///
    /// Returns `None` for an empty tag (a client input error); any
    /// unrecognized non-empty tag maps to [`ResourceType::Other`].
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if tag.is_empty() {
            return None;
        }
        Some(match tag {
            "temperatureandhumidity" => ResourceType::TemperatureAndHumidity,
            "co" => ResourceType::Co,
            "hvac" => ResourceType::Hvac,
            "movement" => ResourceType::Movement,
            _ => ResourceType::Other,
        })
    }

    /// Canonical tag, as stored in the node directory and used in node URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::TemperatureAndHumidity => "temperatureandhumidity",
            ResourceType::Co => "co",
            ResourceType::Hvac => "hvac",
            ResourceType::Movement => "movement",
            ResourceType::Other => "other",
        }
    }

    /// Whether registering this resource type starts an observe relation
    pub fn is_observed(&self) -> bool {
        matches!(
            self,
            ResourceType::TemperatureAndHumidity | ResourceType::Co | ResourceType::Hvac
        )
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
