//! Genormaliseerd rapportmodel zoals de viewer het gebruikt.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;

pub mod client;
pub mod normalize;

/// Volumevorm die gebruikt wordt als het rapport er geen meelevert.
pub const DEFAULT_VOLUME_SHAPE: [u32; 3] = [512, 512, 512];

/// Een volledig genormaliseerd rapport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub id: u64,
    /// Media-id waaronder het mesh-model gepubliceerd is.
    pub media_id: String,
    /// Voxeldimensies van het bronvolume.
    pub volume_shape: [u32; 3],
    /// Geordende lijst van regio's die de animatie langsloopt.
    pub segments_of_interest: Vec<String>,
    pub meshes: Vec<SegmentMesh>,
    /// Vereenvoudigde rapporttekst per taal.
    pub simplified_reports: BTreeMap<String, String>,
    pub metadata: ReportMetadata,
}

impl Report {
    #[must_use]
    pub fn segment(&self, name: &str) -> Option<&SegmentMesh> {
        self.meshes.iter().find(|mesh| mesh.name == name)
    }

    #[must_use]
    pub fn volume_shape_f64(&self) -> [f64; 3] {
        self.volume_shape.map(f64::from)
    }

    /// Beschikbare talen voor de vereenvoudigde tekst, alfabetisch.
    #[must_use]
    pub fn languages(&self) -> Vec<&str> {
        self.simplified_reports.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn simplified_text(&self, language: &str) -> Option<&str> {
        self.simplified_reports.get(language).map(String::as_str)
    }
}

/// Geometrische metadata van één anatomische structuur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMesh {
    pub name: String,
    /// Middelpunt van het segment in volumecoördinaten.
    #[serde(rename = "geometricOrigin", default)]
    pub geometric_origin: [f64; 3],
    /// Omvang van het segment, indien bekend.
    #[serde(default)]
    pub shape: Option<[f64; 3]>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(rename = "reportType", default)]
    pub report_type: Option<String>,
    #[serde(rename = "reportDate", default)]
    pub report_date: Option<String>,
}

impl ReportMetadata {
    /// Parseert het datumdeel (`YYYY-MM-DD`) van de rapportdatum.
    #[must_use]
    pub fn date(&self) -> Option<Date> {
        let raw = self.report_date.as_deref()?.trim();
        let date_part = raw.get(..10).unwrap_or(raw);
        Date::parse(date_part, format_description!("[year]-[month]-[day]")).ok()
    }
}
