#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod camera;
pub mod config;
pub mod report;
pub mod segments;
pub mod speech;
pub mod text;

use std::fmt;

use camera::{Animator, Direction, Frame};
use config::ViewerConfig;
use report::Report;
use report::normalize::parse_report_response;
use segments::SegmentTable;
use text::{LanguagePanel, TextReveal};
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // geen panic hook zonder feature
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // logging staat uit zonder debug_logs
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Een genormaliseerd rapport, klaar om aan een [`Viewer`] te geven.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct LoadedReport {
    report: Report,
}

#[wasm_bindgen]
impl LoadedReport {
    /// Normaliseer een ruwe API-response (`{ success, result: { report } }`).
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(text: &str, report_id: u64) -> Result<LoadedReport, JsValue> {
        parse_report_response(text, report_id)
            .map(LoadedReport::from)
            .map_err(to_js_error)
    }

    #[wasm_bindgen(getter)]
    pub fn id(&self) -> u64 {
        self.report.id
    }

    #[wasm_bindgen(getter, js_name = mediaId)]
    pub fn media_id(&self) -> String {
        self.report.media_id.clone()
    }

    /// Het volledige rapport als JS-object.
    #[wasm_bindgen(js_name = toJs)]
    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.report).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

impl From<Report> for LoadedReport {
    fn from(report: Report) -> Self {
        Self { report }
    }
}

impl LoadedReport {
    #[must_use]
    pub fn report(&self) -> &Report {
        &self.report
    }
}

/// Publiek aanspreekpunt voor de rapportviewer.
#[wasm_bindgen]
pub struct Viewer {
    config: ViewerConfig,
    report: Report,
    animator: Animator,
    panel: LanguagePanel,
}

#[wasm_bindgen]
impl Viewer {
    /// Maak een viewer; `config` mag `undefined` zijn.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, report: &LoadedReport) -> Result<Viewer, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            ViewerConfig::default()
        } else {
            serde_wasm_bindgen::from_value::<ViewerConfig>(config).map_err(to_js_error)?
        };
        config.validate().map_err(to_js_error)?;
        debug_log!(
            "viewer voor rapport {} met {} ROI's",
            report.report.id,
            report.report.segments_of_interest.len()
        );
        Ok(Viewer::with_config(config, report.report.clone()))
    }

    /// Zet de animatie `dt` seconden verder en geef het nieuwe frame terug.
    #[wasm_bindgen]
    pub fn tick(&mut self, dt: f64) -> Result<JsValue, JsValue> {
        let frame = self.advance_frame(dt);
        frame_to_js(&frame)
    }

    /// Spring naar de volgende ROI.
    #[wasm_bindgen(js_name = next)]
    pub fn next_region(&mut self) -> Result<JsValue, JsValue> {
        frame_to_js(&self.navigate(Direction::Next))
    }

    /// Spring naar de vorige ROI.
    #[wasm_bindgen(js_name = previous)]
    pub fn previous_region(&mut self) -> Result<JsValue, JsValue> {
        frame_to_js(&self.navigate(Direction::Previous))
    }

    /// Pauzeer of hervat de draaitafel; geeft de nieuwe afspeelstatus terug.
    #[wasm_bindgen(js_name = togglePlayback)]
    pub fn toggle_playback(&mut self) -> bool {
        self.animator.toggle_playback()
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.animator.reset();
    }

    /// Huidige opaciteit van een mesh.
    #[wasm_bindgen(js_name = opacityFor)]
    pub fn opacity_for(&self, mesh_name: &str) -> f64 {
        self.animator.opacity_for(mesh_name)
    }

    #[wasm_bindgen(js_name = modelUrl)]
    pub fn model_url(&self) -> String {
        self.config.model_url(&self.report.media_id)
    }

    #[wasm_bindgen(js_name = modelOffset)]
    pub fn model_offset(&self) -> Vec<f64> {
        self.config.model_offset.to_vec()
    }

    #[wasm_bindgen]
    pub fn languages(&self) -> Vec<String> {
        self.report
            .languages()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Kies een taal voor de vereenvoudigde tekst: `{ mode, text }` of `undefined`.
    #[wasm_bindgen(js_name = selectLanguage)]
    pub fn select_language(&mut self, language: &str) -> Result<JsValue, JsValue> {
        match self.choose_language(language) {
            Some(reveal) => serde_wasm_bindgen::to_value(&reveal)
                .map_err(|err| JsError::new(&err.to_string()).into()),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen(js_name = reportType)]
    pub fn report_type(&self) -> Option<String> {
        self.report.metadata.report_type.clone()
    }

    /// Rapportdatum als `YYYY-MM-DD`, indien leesbaar.
    #[wasm_bindgen(js_name = reportDate)]
    pub fn report_date(&self) -> Option<String> {
        self.report.metadata.date().map(|date| date.to_string())
    }
}

impl Viewer {
    #[must_use]
    pub fn with_config(config: ViewerConfig, report: Report) -> Self {
        let animator = Animator::new(&report, &config);
        let panel = LanguagePanel::new(&config.default_language);
        Self {
            config,
            report,
            animator,
            panel,
        }
    }

    pub fn advance_frame(&mut self, dt: f64) -> Frame {
        self.animator.advance(dt)
    }

    pub fn navigate(&mut self, direction: Direction) -> Frame {
        self.animator.navigate(direction)
    }

    pub fn choose_language(&mut self, language: &str) -> Option<TextReveal> {
        self.panel.select(&self.report, language)
    }

    #[must_use]
    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }
}

/// Weergavenaam en materiaal voor een ruwe meshnaam.
#[wasm_bindgen(js_name = resolveSegment)]
pub fn resolve_segment(raw_name: &str) -> Result<JsValue, JsValue> {
    let resolved = SegmentTable::builtin().resolve(raw_name);
    serde_wasm_bindgen::to_value(&resolved).map_err(|err| JsError::new(&err.to_string()).into())
}

/// Onthullingsplan voor het typemachine-effect.
#[wasm_bindgen(js_name = typewriterPlan)]
pub fn typewriter_plan(text: &str, seed: u64) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&text::reveal_plan(text, seed))
        .map_err(|err| JsError::new(&err.to_string()).into())
}

/// Rapport-id uit een URL-pad, bijvoorbeeld `/reports/42`.
#[wasm_bindgen(js_name = reportIdFromPath)]
pub fn report_id_from_path(path: &str, index: usize) -> Option<u64> {
    config::report_id_from_path(path, index)
}

#[cfg(target_arch = "wasm32")]
fn config_from_js(config: JsValue) -> Result<ViewerConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(ViewerConfig::default());
    }
    let config: ViewerConfig = serde_wasm_bindgen::from_value(config).map_err(to_js_error)?;
    config.validate().map_err(to_js_error)?;
    Ok(config)
}

/// Haal een rapport op bij de API.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = fetchReport)]
pub async fn fetch_report(config: JsValue, report_id: u64) -> Result<LoadedReport, JsValue> {
    use report::client::{FetchTransport, ReportClient};

    let config = config_from_js(config)?;
    let client = ReportClient::new(FetchTransport, &config);
    let report = client.report_detail(report_id).await.map_err(to_js_error)?;
    Ok(LoadedReport::from(report))
}

/// Stel een vraag over een rapport en geef het antwoord terug.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = askQuestion)]
pub async fn ask_question(
    config: JsValue,
    report_id: u64,
    language: String,
    question: String,
) -> Result<String, JsValue> {
    use report::client::{FetchTransport, ReportClient};

    let config = config_from_js(config)?;
    let client = ReportClient::new(FetchTransport, &config);
    client
        .ask_question(report_id, &language, &question)
        .await
        .map_err(to_js_error)
}

/// Spreek tekst uit; doet niets als de browser geen spraaksynthese heeft.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn speak(language: &str, text: &str) -> Result<(), JsValue> {
    speech::SpeechSynthesizer::new()
        .speak(language, text)
        .map_err(to_js_error)
}

/// Eenmalige spraakherkenning zonder mogelijkheid tot afbreken.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn listen() -> Result<String, JsValue> {
    speech::SpeechRecognizer::new()
        .recognize()
        .await
        .map_err(to_js_error)
}

/// Spraakinvoer met één actieve herkenning tegelijk.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct SpeechInput {
    recognizer: std::rc::Rc<speech::SpeechRecognizer>,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl SpeechInput {
    #[wasm_bindgen(constructor)]
    pub fn new() -> SpeechInput {
        SpeechInput {
            recognizer: std::rc::Rc::new(speech::SpeechRecognizer::new()),
        }
    }

    #[wasm_bindgen(js_name = isSupported)]
    pub fn is_supported(&self) -> bool {
        self.recognizer.is_supported()
    }

    /// Luister één keer; de promise levert de samengevoegde transcriptie.
    #[wasm_bindgen]
    pub fn listen(&self) -> js_sys::Promise {
        let recognizer = std::rc::Rc::clone(&self.recognizer);
        wasm_bindgen_futures::future_to_promise(async move {
            recognizer
                .recognize()
                .await
                .map(|transcript| JsValue::from_str(&transcript))
                .map_err(to_js_error)
        })
    }

    #[wasm_bindgen]
    pub fn cancel(&self) {
        self.recognizer.cancel();
    }
}

#[cfg(target_arch = "wasm32")]
impl Default for SpeechInput {
    fn default() -> Self {
        Self::new()
    }
}

fn frame_to_js(frame: &Frame) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(frame).map_err(|err| JsError::new(&err.to_string()).into())
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::AnimationPhase;

    const RESPONSE: &str = r#"{
        "success": true,
        "result": {"report": {
            "report_media_id": "abc",
            "meshes_metadata": {
                "input_volume": {"shape": [512, 512, 300]},
                "meshes": [{"name": "liver", "geometricOrigin": [100, 200, 150]}],
                "segmentsOfInterest": ["liver"]
            },
            "simplified_reports": {"English": "Fine.", "Hindi": "ठीक है।"},
            "report_metadata": {"reportType": "CT", "reportDate": "2024-02-29T10:00:00"}
        }}
    }"#;

    fn viewer() -> Viewer {
        let report = parse_report_response(RESPONSE, 12).expect("report");
        Viewer::with_config(ViewerConfig::default(), report)
    }

    #[test]
    fn viewer_exposes_report_details() {
        let viewer = viewer();
        assert_eq!(
            viewer.model_url(),
            "http://localhost:8000/media/segment-meshes/abc/model.gltf"
        );
        assert_eq!(viewer.languages(), ["English", "Hindi"]);
        assert_eq!(viewer.report_type().as_deref(), Some("CT"));
        assert_eq!(viewer.report_date().as_deref(), Some("2024-02-29"));
        assert_eq!(viewer.model_offset(), [0.0, 512.0, 0.0]);
    }

    #[test]
    fn frames_advance_through_phases() {
        let mut viewer = viewer();
        let mut phases = vec![viewer.animator().phase()];
        for _ in 0..600 {
            let frame = viewer.advance_frame(1.0 / 30.0);
            if phases.last() != Some(&frame.phase) {
                phases.push(frame.phase);
            }
        }
        assert!(phases.len() >= 3);
        assert_eq!(phases[0], AnimationPhase::ZoomIn);
        assert_eq!(phases[1], AnimationPhase::Turntable);
    }

    #[test]
    fn navigation_and_reset_return_to_start() {
        let mut viewer = viewer();
        let frame = viewer.navigate(Direction::Next);
        assert_eq!(frame.roi_name.as_deref(), Some("liver"));
        assert_eq!(frame.phase, AnimationPhase::ZoomIn);

        viewer.reset();
        assert_eq!(viewer.animator().cursor().index(), None);
        assert!(viewer.opacity_for("liver") > 0.99);
    }

    #[test]
    fn default_language_is_shown_instantly() {
        let mut viewer = viewer();
        assert!(matches!(
            viewer.choose_language("English"),
            Some(TextReveal::Instant(_))
        ));
        assert!(matches!(
            viewer.choose_language("Hindi"),
            Some(TextReveal::Animated(_))
        ));
    }

    #[test]
    fn toggling_playback_flips_state() {
        let mut viewer = viewer();
        assert!(!viewer.toggle_playback());
        assert!(viewer.toggle_playback());
    }

    #[test]
    fn report_id_is_read_from_path() {
        assert_eq!(report_id_from_path("/reports/42", 2), Some(42));
    }
}
