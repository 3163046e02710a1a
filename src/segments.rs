//! Vertaling van mesh-nodenamen naar weergavenamen en materialen.
//!
//! Meshes in het glTF-model heten `Segment_<waarde>`, naar de labelwaarde in
//! het segmentatievolume. De tabel in `data/segment_materials.json` koppelt
//! die waarden aan een anatomische naam en een PBR-materiaal.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

const BUILTIN_TABLE: &str = include_str!("../data/segment_materials.json");

/// Basiskleur voor meshes die niet in de tabel voorkomen.
pub const UNMATCHED_BASE_COLOR: &str = "#000000";

static BUILTIN: OnceLock<SegmentTable> = OnceLock::new();

/// RGB-kleur met componenten in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    #[must_use]
    pub fn from_rgb255(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: r / 255.0,
            g: g / 255.0,
            b: b / 255.0,
        }
    }

    /// Parseert `#rrggbb` of `#rgb`.
    #[must_use]
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text.trim().strip_prefix('#')?;
        let expanded = match digits.len() {
            3 => digits.chars().flat_map(|ch| [ch, ch]).collect::<String>(),
            6 => digits.to_owned(),
            _ => return None,
        };

        u32::from_str_radix(&expanded, 16).ok().map(|value| {
            let r = f64::from((value >> 16) & 0xFF);
            let g = f64::from((value >> 8) & 0xFF);
            let b = f64::from(value & 0xFF);
            Self::from_rgb255(r, g, b)
        })
    }
}

/// Materiaalbeschrijving zoals de renderer die toepast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentMaterial {
    #[serde(rename = "Base Color")]
    pub base_color: String,
    #[serde(rename = "Roughness", default)]
    pub roughness: Option<f64>,
    #[serde(rename = "Metallic", default)]
    pub metalness: Option<f64>,
}

impl SegmentMaterial {
    #[must_use]
    pub fn unmatched() -> Self {
        Self {
            base_color: UNMATCHED_BASE_COLOR.to_owned(),
            roughness: None,
            metalness: None,
        }
    }

    #[must_use]
    pub fn color(&self) -> Option<Rgb> {
        Rgb::from_hex(&self.base_color)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct SegmentEntry {
    #[serde(rename = "segmentValue")]
    segment_value: u32,
    name: String,
    material: SegmentMaterial,
}

/// Resultaat van [`SegmentTable::resolve`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedSegment {
    pub display_name: String,
    pub material: SegmentMaterial,
    /// `false` als de naam niet in de tabel voorkomt.
    pub matched: bool,
}

/// Opzoektabel van segmentwaarden naar namen en materialen.
#[derive(Debug, Clone, Default)]
pub struct SegmentTable {
    entries: Vec<SegmentEntry>,
    by_mesh_name: HashMap<String, usize>,
    by_display_name: HashMap<String, usize>,
}

impl SegmentTable {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<SegmentEntry> = serde_json::from_str(text)?;
        let mut by_mesh_name = HashMap::with_capacity(entries.len());
        let mut by_display_name = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            by_mesh_name
                .entry(mesh_name_for(entry.segment_value))
                .or_insert(idx);
            by_display_name.entry(entry.name.clone()).or_insert(idx);
        }

        Ok(Self {
            entries,
            by_mesh_name,
            by_display_name,
        })
    }

    /// De ingebouwde tabel; een onleesbare tabel levert een lege tabel op.
    pub fn builtin() -> &'static SegmentTable {
        BUILTIN.get_or_init(|| {
            SegmentTable::from_json(BUILTIN_TABLE).unwrap_or_else(|err| {
                log::error!("ingebouwde segmenttabel is ongeldig: {err}");
                SegmentTable::default()
            })
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Canonieke naam voor een ruwe meshnaam; onbekende namen blijven ongewijzigd.
    #[must_use]
    pub fn display_name(&self, raw_name: &str) -> String {
        self.by_mesh_name
            .get(raw_name)
            .map_or_else(|| raw_name.to_owned(), |idx| self.entries[*idx].name.clone())
    }

    /// Materiaal voor een ruwe meshnaam of een canonieke naam.
    #[must_use]
    pub fn material_for(&self, name: &str) -> SegmentMaterial {
        self.lookup(name)
            .map_or_else(SegmentMaterial::unmatched, |entry| entry.material.clone())
    }

    #[must_use]
    pub fn resolve(&self, raw_name: &str) -> ResolvedSegment {
        match self.lookup(raw_name) {
            Some(entry) => ResolvedSegment {
                display_name: entry.name.clone(),
                material: entry.material.clone(),
                matched: true,
            },
            None => ResolvedSegment {
                display_name: raw_name.to_owned(),
                material: SegmentMaterial::unmatched(),
                matched: false,
            },
        }
    }

    fn lookup(&self, name: &str) -> Option<&SegmentEntry> {
        self.by_mesh_name
            .get(name)
            .or_else(|| self.by_display_name.get(name))
            .map(|idx| &self.entries[*idx])
    }
}

fn mesh_name_for(segment_value: u32) -> String {
    format!("Segment_{segment_value}")
}
