//! Simulation configuration
//!
//! Global toggles that shape movement feel. Persisted as JSON by the host
//! (storage itself lives outside the simulation).

use serde::{Deserialize, Serialize};

use crate::sim::SquishPolicy;

/// Simulation-wide configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    // === Slope correction ===
    /// Allow bodies to step up one-pixel ledges while moving horizontally
    pub slope_climb: bool,
    /// Allow grounded bodies to hug one-pixel descents instead of going airborne
    pub slope_descend: bool,

    // === Squish handling ===
    /// Reaction applied to newly spawned actors caught between a solid and a wall
    pub default_squish: SquishPolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            slope_climb: true,
            slope_descend: true,
            default_squish: SquishPolicy::Log,
        }
    }
}

impl SimConfig {
    /// Serialize to a JSON string for host-side persistence
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Load from a JSON string, falling back to defaults on parse failure
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(config) => {
                log::info!("Loaded simulation config");
                config
            }
            Err(err) => {
                log::warn!("Bad simulation config ({err}), using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_json_round_trip() {
        let mut config = SimConfig::default();
        config.slope_descend = false;
        config.default_squish = SquishPolicy::Despawn;

        let json = config.to_json().unwrap();
        let loaded = SimConfig::from_json(&json);

        assert!(!loaded.slope_descend);
        assert!(loaded.slope_climb);
        assert_eq!(loaded.default_squish, SquishPolicy::Despawn);
    }

    #[test]
    fn test_config_bad_json_falls_back() {
        let loaded = SimConfig::from_json("not json at all");
        assert!(loaded.slope_climb);
        assert_eq!(loaded.default_squish, SquishPolicy::Log);
    }
}
