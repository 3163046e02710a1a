//! Eenmalige normalisatie van een API-antwoord naar een [`Report`].
//!
//! De API levert een envelop `{ "success": bool, "result": ... }`. Binnen het
//! rapport zijn `meshes_metadata`, `simplified_reports` en `report_metadata`
//! soms JSON-strings en soms al objecten; beide vormen worden hier één keer
//! omgezet. Een kapot genest veld wordt vervangen door een lege waarde zodat
//! de rest van het rapport bruikbaar blijft.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use super::client::ClientError;
use super::{DEFAULT_VOLUME_SHAPE, Report, ReportMetadata, SegmentMesh};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    result: Option<JsonValue>,
    message: Option<String>,
    error: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct DetailResult {
    report: RawReport,
}

#[derive(Debug, Deserialize)]
struct AnswerResult {
    answer: String,
}

#[derive(Debug, Deserialize)]
struct RawReport {
    id: Option<u64>,
    report_media_id: Option<JsonValue>,
    meshes_metadata: Option<JsonValue>,
    simplified_reports: Option<JsonValue>,
    report_metadata: Option<JsonValue>,
}

#[derive(Debug, Default, Deserialize)]
struct MeshesMetadata {
    input_volume: Option<InputVolume>,
    #[serde(default)]
    meshes: Vec<SegmentMesh>,
    #[serde(rename = "segmentsOfInterest", default)]
    segments_of_interest: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct InputVolume {
    shape: Option<[u32; 3]>,
}

/// Zet de ruwe tekst van een detail-antwoord om naar een rapport.
///
/// `requested_id` wordt gebruikt als het rapport zelf geen id meestuurt.
pub fn parse_report_response(text: &str, requested_id: u64) -> Result<Report, ClientError> {
    let result = unwrap_envelope(text)?;
    let detail: DetailResult = serde_json::from_value(result)?;
    Ok(normalize_report(detail.report, requested_id))
}

/// Haalt het antwoord uit een vraag-antwoord envelop.
pub fn parse_answer_response(text: &str) -> Result<String, ClientError> {
    let result = unwrap_envelope(text)?;
    let answer: AnswerResult = serde_json::from_value(result)?;
    Ok(answer.answer)
}

fn unwrap_envelope(text: &str) -> Result<JsonValue, ClientError> {
    let envelope: Envelope = serde_json::from_str(text)?;
    if !envelope.success {
        return Err(ClientError::Unsuccessful(failure_message(&envelope)));
    }
    envelope
        .result
        .ok_or_else(|| ClientError::Unsuccessful("antwoord bevat geen `result`".to_owned()))
}

fn failure_message(envelope: &Envelope) -> String {
    if let Some(message) = envelope.message.as_deref() {
        return message.to_owned();
    }
    match envelope.error.as_ref() {
        Some(JsonValue::String(message)) => message.clone(),
        Some(other) => other.to_string(),
        None => "server meldde geen reden".to_owned(),
    }
}

fn normalize_report(raw: RawReport, requested_id: u64) -> Report {
    let meshes_metadata: MeshesMetadata = decode_nested("meshes_metadata", raw.meshes_metadata);
    let simplified_reports: BTreeMap<String, String> =
        decode_nested("simplified_reports", raw.simplified_reports);
    let metadata: ReportMetadata = decode_nested("report_metadata", raw.report_metadata);

    let volume_shape = meshes_metadata
        .input_volume
        .and_then(|volume| volume.shape)
        .unwrap_or_else(|| {
            log::warn!("rapport bevat geen volumevorm, standaardvorm wordt gebruikt");
            DEFAULT_VOLUME_SHAPE
        });

    let media_id = match raw.report_media_id {
        Some(JsonValue::String(id)) => id,
        Some(JsonValue::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    let report = Report {
        id: raw.id.unwrap_or(requested_id),
        media_id,
        volume_shape,
        segments_of_interest: meshes_metadata.segments_of_interest,
        meshes: meshes_metadata.meshes,
        simplified_reports,
        metadata,
    };

    log::debug!(
        "rapport {} genormaliseerd: {} meshes, {} ROI's, {} talen",
        report.id,
        report.meshes.len(),
        report.segments_of_interest.len(),
        report.simplified_reports.len()
    );

    report
}

/// Decodeert een genest veld dat als JSON-string of als object kan binnenkomen.
fn decode_nested<T: DeserializeOwned + Default>(field: &str, raw: Option<JsonValue>) -> T {
    let decoded = match raw {
        None | Some(JsonValue::Null) => return T::default(),
        Some(JsonValue::String(text)) => serde_json::from_str(&text),
        Some(value) => serde_json::from_value(value),
    };

    decoded.unwrap_or_else(|err| {
        log::warn!("veld `{field}` kon niet gelezen worden, lege waarde gebruikt: {err}");
        T::default()
    })
}
