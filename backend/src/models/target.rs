//! Observation targets and their catalog metadata.

use serde::{Deserialize, Serialize};

/// Equatorial (J2000) sky coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquatorialCoord {
    /// Right ascension in degrees
    pub ra_deg: f64,
    /// Declination in degrees
    pub dec_deg: f64,
}

impl EquatorialCoord {
    pub fn new(ra_deg: f64, dec_deg: f64) -> Self {
        Self { ra_deg, dec_deg }
    }
}

/// Descriptive catalog attributes. Each field is independently nullable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogMetadata {
    /// Object-type code, e.g. `GlC` or `PN`
    pub object_type: Option<String>,
    /// Apparent visual magnitude
    pub magnitude: Option<f64>,
    /// Major axis in arc-minutes
    pub major_axis_arcmin: Option<f64>,
    /// Minor axis in arc-minutes
    pub minor_axis_arcmin: Option<f64>,
}

impl CatalogMetadata {
    /// Human-readable description of the object-type code, if known.
    pub fn object_type_description(&self) -> Option<&'static str> {
        self.object_type.as_deref().and_then(describe_object_type)
    }
}

/// A resolved observation target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Name as requested, e.g. `M13`
    pub name: String,
    /// Catalog designation if it differs from the name (e.g. `NGC 6205`)
    pub identifier: Option<String>,
    pub coordinates: EquatorialCoord,
    #[serde(default)]
    pub metadata: CatalogMetadata,
}

impl Target {
    pub fn new(name: impl Into<String>, coordinates: EquatorialCoord) -> Self {
        Self {
            name: name.into(),
            identifier: None,
            coordinates,
            metadata: CatalogMetadata::default(),
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_metadata(mut self, metadata: CatalogMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Map a SIMBAD-style object-type code to a description.
pub fn describe_object_type(code: &str) -> Option<&'static str> {
    let description = match code.trim() {
        "AGN" => "Active galaxy nucleus",
        "SNR" => "SuperNova remnant",
        "SFR" => "Star forming region",
        "GNe" => "Nebula",
        "RNe" => "Reflection nebula",
        "GDNe" => "Dark cloud (nebula)",
        "MoC" => "Molecular cloud",
        "IG" => "Interacting galaxies",
        "PaG" => "Pair of galaxies",
        "GiP" => "Galaxy in pair of galaxies",
        "CGG" => "Compact group of galaxies",
        "CIG" => "Cluster of galaxies",
        "BH" => "Black hole",
        "LSB" => "Low surface brightness galaxy",
        "SBG" => "Starburst galaxy",
        "H2G" => "HII galaxy",
        "GGG" | "G" => "Galaxy",
        "Cl" => "Cluster of stars",
        "GlC" => "Globular cluster",
        "OpC" | "Cl*" => "Open cluster",
        "LIN" => "LINER-type active galaxy nucleus",
        "SyG" => "Seyfert galaxy",
        "Sy1" => "Seyfert 1 galaxy",
        "Sy2" => "Seyfert 2 galaxy",
        "GiG" => "Galaxy towards a group of galaxies",
        "As*" => "Association of stars",
        "PN" => "Planetary nebula",
        _ => return None,
    };
    Some(description)
}
