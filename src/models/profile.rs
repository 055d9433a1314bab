//! Risk profile identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ScoringError;

/// One of the three fixed policy bundles.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl RiskProfile {
    /// All profiles, most restrictive first.
    pub const ALL: [RiskProfile; 3] = [Self::Conservative, Self::Moderate, Self::Aggressive];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "conservative",
            RiskProfile::Moderate => "moderate",
            RiskProfile::Aggressive => "aggressive",
        }
    }

    /// Resolve a profile name for the scoring paths.
    ///
    /// Unknown names fall back to `Moderate`. Filtering never uses this; it
    /// parses strictly and fails the whole call instead.
    pub fn or_moderate(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(profile = %name, "Unknown risk profile, scoring with moderate tables");
            RiskProfile::Moderate
        })
    }
}

impl FromStr for RiskProfile {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "conservative" => Ok(Self::Conservative),
            "moderate" => Ok(Self::Moderate),
            "aggressive" => Ok(Self::Aggressive),
            _ => Err(ScoringError::InvalidProfile(s.to_string())),
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Aggressive".parse::<RiskProfile>(), Ok(RiskProfile::Aggressive));
        assert_eq!(" moderate ".parse::<RiskProfile>(), Ok(RiskProfile::Moderate));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "yolo".parse::<RiskProfile>().unwrap_err();
        assert_eq!(err, ScoringError::InvalidProfile("yolo".to_string()));
    }

    #[test]
    fn test_scoring_fallback_is_moderate() {
        assert_eq!(RiskProfile::or_moderate("yolo"), RiskProfile::Moderate);
        assert_eq!(RiskProfile::or_moderate("conservative"), RiskProfile::Conservative);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&RiskProfile::Conservative).unwrap();
        assert_eq!(json, "\"conservative\"");
    }
}
