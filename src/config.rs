//! Configuratie van de viewer: endpoints, taal en animatieconstanten.
//!
//! Alle velden hebben een standaardwaarde zodat een lege JSON-object (`{}`)
//! of een ontbrekende configuratie vanuit JavaScript een bruikbare viewer
//! oplevert.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fouten bij het inlezen of valideren van de configuratie.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Het JSON-document kon niet gelezen worden.
    #[error("configuratie is geen geldige JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Een numerieke instelling valt buiten het toegestane bereik.
    #[error("ongeldige instelling `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuratie van de viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Basis-URL van de rapport-API.
    pub api_base_url: String,
    /// Basis-URL waaronder de mesh-assets gepubliceerd worden.
    pub media_base_url: String,
    /// Relatief pad voor het ophalen van rapportdetails.
    pub report_detail_path: String,
    /// Relatief pad voor het stellen van een vraag over het rapport.
    pub ask_question_path: String,
    /// Taal waarin de vereenvoudigde rapporttekst eerst getoond wordt.
    pub default_language: String,
    /// Verschuiving van het geladen mesh-model in de scene.
    pub model_offset: [f64; 3],
    /// Optioneel middelpunt van het volume; standaard `[0, shape.y / 2, 0]`.
    pub volume_center: Option<[f64; 3]>,
    pub animation: AnimationSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api/radio-reports".to_owned(),
            media_base_url: "http://localhost:8000/media".to_owned(),
            report_detail_path: "reports/get-detail/".to_owned(),
            ask_question_path: "reports/ask-question/".to_owned(),
            default_language: "English".to_owned(),
            model_offset: [0.0, 512.0, 0.0],
            volume_center: None,
            animation: AnimationSettings::default(),
        }
    }
}

impl ViewerConfig {
    /// Leest een configuratie uit JSON en valideert de animatie-instellingen.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.animation.validate()
    }

    #[must_use]
    pub fn report_detail_url(&self) -> String {
        join_url(&self.api_base_url, &self.report_detail_path)
    }

    #[must_use]
    pub fn ask_question_url(&self) -> String {
        join_url(&self.api_base_url, &self.ask_question_path)
    }

    /// URL van het glTF-model dat bij een rapport-media-id hoort.
    #[must_use]
    pub fn model_url(&self, media_id: &str) -> String {
        format!(
            "{}/segment-meshes/{media_id}/model.gltf",
            self.media_base_url.trim_end_matches('/')
        )
    }

    /// Middelpunt van het volume: de override uit de configuratie of het
    /// midden van de y-as.
    #[must_use]
    pub fn volume_center(&self, volume_shape: [f64; 3]) -> [f64; 3] {
        self.volume_center
            .unwrap_or([0.0, volume_shape[1] / 2.0, 0.0])
    }
}

/// Constanten die de camera-animatie sturen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Cameraafstand als fractie van `min(shape.x, shape.y)`.
    pub distance_ratio: f64,
    /// Camerahoogte als fractie van `shape.z`.
    pub height_ratio: f64,
    /// Tolerantie waarbinnen twee pose-assen als gelijk gelden.
    pub resolution: f64,
    pub turntable_seconds: f64,
    /// Draaisnelheid van de boom in radialen per seconde.
    pub angular_speed: f64,
    /// Lerp-factor per seconde; per frame geschaald met de frametijd.
    pub lerp_rate: f64,
    /// Doelopaciteit van niet-geselecteerde meshes tijdens het inzoomen.
    pub faded_opacity: f64,
    /// Positie van het puntlicht als fractie van de camerapositie.
    pub light_distance_ratio: f64,
    pub initial_yaw: f64,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            distance_ratio: 0.75,
            height_ratio: 0.5,
            resolution: 1.0,
            turntable_seconds: 10.0,
            angular_speed: 0.25,
            lerp_rate: 2.0,
            faded_opacity: 0.2,
            light_distance_ratio: 0.9,
            initial_yaw: 0.0,
        }
    }
}

impl AnimationSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("distance_ratio", self.distance_ratio)?;
        require_positive("height_ratio", self.height_ratio)?;
        require_positive("resolution", self.resolution)?;
        require_positive("turntable_seconds", self.turntable_seconds)?;
        require_positive("lerp_rate", self.lerp_rate)?;
        require_positive("light_distance_ratio", self.light_distance_ratio)?;

        if !self.angular_speed.is_finite() {
            return Err(invalid("angular_speed", "moet een eindig getal zijn"));
        }
        if !self.initial_yaw.is_finite() {
            return Err(invalid("initial_yaw", "moet een eindig getal zijn"));
        }
        if !(0.0..=1.0).contains(&self.faded_opacity) {
            return Err(invalid("faded_opacity", "moet tussen 0 en 1 liggen"));
        }

        Ok(())
    }
}

/// Haalt het numerieke rapport-id uit een paginapad, bv. `/reports/42/view`
/// met index 2.
#[must_use]
pub fn report_id_from_path(path: &str, index: usize) -> Option<u64> {
    path.split('/').nth(index)?.trim().parse().ok()
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "moet een positief eindig getal zijn"))
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_owned(),
    }
}
