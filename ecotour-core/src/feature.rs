//! Sustainability features exposed by tour sites.
//!
//! Each variant carries a stable display string. The display string is the
//! persisted representation, so renaming one is a storage migration.
//!
//! # Examples
//! ```
//! use ecotour_core::Feature;
//!
//! assert_eq!(Feature::SolarEnergy.display_name(), "Solar Energy");
//! assert_eq!("Geothermal".parse::<Feature>(), Ok(Feature::Geothermal));
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A sustainability attribute a point of interest may exhibit.
///
/// Variants are ordered by declaration, which is also the order used when
/// features are listed or persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    /// Biofuel production or use.
    Biofuel,
    /// Geothermal heating or cooling.
    Geothermal,
    /// LEED-certified building.
    LeedCertification,
    /// Construction from low-impact materials.
    LowImpactMaterials,
    /// Rainwater capture and reuse.
    RainwaterRecovery,
    /// Solar power generation.
    SolarEnergy,
    /// Sustainable food production.
    SustainableAgriculture,
    /// On-site wastewater treatment.
    WastewaterTreatment,
}

/// Error returned when a display string names no [`Feature`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no feature with display name \"{token}\"")]
pub struct UnknownFeature {
    /// The token that failed to parse.
    pub token: String,
}

impl Feature {
    /// Every feature in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Biofuel,
        Self::Geothermal,
        Self::LeedCertification,
        Self::LowImpactMaterials,
        Self::RainwaterRecovery,
        Self::SolarEnergy,
        Self::SustainableAgriculture,
        Self::WastewaterTreatment,
    ];

    /// Return the stable display string for this feature.
    ///
    /// # Examples
    /// ```
    /// use ecotour_core::Feature;
    ///
    /// assert_eq!(Feature::LeedCertification.display_name(), "LEED Certification");
    /// ```
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Biofuel => "Biofuel",
            Self::Geothermal => "Geothermal",
            Self::LeedCertification => "LEED Certification",
            Self::LowImpactMaterials => "Low Impact Materials",
            Self::RainwaterRecovery => "Rainwater Recovery",
            Self::SolarEnergy => "Solar Energy",
            Self::SustainableAgriculture => "Sustainable Agriculture",
            Self::WastewaterTreatment => "Wastewater Treatment",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Feature {
    type Err = UnknownFeature;

    /// Parse a display string. Matching is exact and case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|feature| feature.display_name() == s)
            .ok_or_else(|| UnknownFeature {
                token: s.to_owned(),
            })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Feature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.display_name())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Feature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn display_matches_display_name() {
        for feature in Feature::ALL {
            assert_eq!(feature.to_string(), feature.display_name());
        }
    }

    #[rstest]
    #[case("Biofuel", Feature::Biofuel)]
    #[case("Low Impact Materials", Feature::LowImpactMaterials)]
    #[case("Wastewater Treatment", Feature::WastewaterTreatment)]
    fn parses_display_names(#[case] token: &str, #[case] expected: Feature) {
        assert_eq!(token.parse::<Feature>(), Ok(expected));
    }

    #[rstest]
    #[case("biofuel")]
    #[case("SOLAR_ENERGY")]
    #[case("")]
    fn rejects_unknown_tokens(#[case] token: &str) {
        let err = token
            .parse::<Feature>()
            .expect_err("token should not name a feature");
        assert_eq!(err.token, token);
    }

    #[rstest]
    fn all_is_in_declaration_order() {
        let mut sorted = Feature::ALL;
        sorted.sort();
        assert_eq!(sorted, Feature::ALL);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn serialises_as_display_name() {
        let json = serde_json::to_string(&Feature::RainwaterRecovery).expect("serialise feature");
        assert_eq!(json, "\"Rainwater Recovery\"");
        let err = serde_json::from_str::<Feature>("\"Wind\"").expect_err("unknown feature");
        assert!(err.to_string().contains("Wind"));
    }
}
