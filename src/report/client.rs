//! Client voor de rapport-API.
//!
//! Het transport is een trait zodat de normalisatie en de foutafhandeling los
//! van de browser getest kunnen worden. In de wasm-build levert
//! [`FetchTransport`] de echte requests via `gloo-net`.

use serde_json::json;
use thiserror::Error;

use super::Report;
use super::normalize::{parse_answer_response, parse_report_response};
use crate::config::ViewerConfig;

/// Fouten van de rapport-client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Het request kon niet verstuurd worden of kreeg geen antwoord.
    #[error("netwerkfout: {0}")]
    Network(String),
    /// De server antwoordde met een foutstatus.
    #[error("HTTP-fout {status}: {body}")]
    Http { status: u16, body: String },
    /// Het antwoord was geen geldige envelop.
    #[error("ongeldig antwoord: {0}")]
    Decode(#[from] serde_json::Error),
    /// De server meldde `success: false`.
    #[error("server meldt mislukking: {0}")]
    Unsuccessful(String),
}

/// Eén request/response-uitwisseling met een JSON-body.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Verstuurt `body` als JSON naar `url` en geeft de ruwe antwoordtekst terug.
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String, ClientError>;
}

/// Client met de endpoints uit de viewerconfiguratie.
#[derive(Debug, Clone)]
pub struct ReportClient<T> {
    transport: T,
    detail_url: String,
    ask_url: String,
}

impl<T: Transport> ReportClient<T> {
    pub fn new(transport: T, config: &ViewerConfig) -> Self {
        Self {
            transport,
            detail_url: config.report_detail_url(),
            ask_url: config.ask_question_url(),
        }
    }

    /// Haalt rapportdetails op en normaliseert ze in één stap.
    pub async fn report_detail(&self, report_id: u64) -> Result<Report, ClientError> {
        log::debug!("rapport {report_id} ophalen via {}", self.detail_url);
        let body = json!({ "reportId": report_id });
        let text = self.transport.post_json(&self.detail_url, &body).await?;
        parse_report_response(&text, report_id)
    }

    /// Stelt een vraag over het rapport en geeft het antwoord terug.
    pub async fn ask_question(
        &self,
        report_id: u64,
        language: &str,
        question: &str,
    ) -> Result<String, ClientError> {
        log::debug!("vraag over rapport {report_id} in taal {language}");
        let body = json!({
            "reportId": report_id,
            "language": language,
            "question": question,
        });
        let text = self.transport.post_json(&self.ask_url, &body).await?;
        parse_answer_response(&text)
    }

    #[cfg(test)]
    fn transport(&self) -> &T {
        &self.transport
    }
}

/// Transport op basis van de fetch-API van de browser.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchTransport;

#[cfg(target_arch = "wasm32")]
impl Transport for FetchTransport {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<String, ClientError> {
        use gloo_net::http::Request;

        let response = Request::post(url)
            .json(body)
            .map_err(|err| ClientError::Network(err.to_string()))?
            .send()
            .await
            .map_err(|err| ClientError::Network(err.to_string()))?;

        if !response.ok() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Http { status, body });
        }

        response
            .text()
            .await
            .map_err(|err| ClientError::Network(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Transport dat vaste antwoorden teruggeeft en requests bijhoudt.
    struct CannedTransport {
        responses: RefCell<Vec<Result<String, ClientError>>>,
        requests: RefCell<Vec<(String, serde_json::Value)>>,
    }

    impl CannedTransport {
        fn new(responses: Vec<Result<String, ClientError>>) -> Self {
            Self {
                responses: RefCell::new(responses),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for CannedTransport {
        async fn post_json(
            &self,
            url: &str,
            body: &serde_json::Value,
        ) -> Result<String, ClientError> {
            self.requests
                .borrow_mut()
                .push((url.to_owned(), body.clone()));
            self.responses.borrow_mut().remove(0)
        }
    }

    #[tokio::test]
    async fn posts_report_id_to_detail_endpoint() {
        let transport = CannedTransport::new(vec![Ok(
            r#"{"success": true, "result": {"report": {"report_media_id": "x"}}}"#.to_owned(),
        )]);
        let client = ReportClient::new(transport, &ViewerConfig::default());

        let report = client.report_detail(5).await.expect("report");
        assert_eq!(report.id, 5);

        let requests = client.transport().requests.borrow();
        assert_eq!(
            requests[0].0,
            "http://localhost:8000/api/radio-reports/reports/get-detail/"
        );
        assert_eq!(requests[0].1, json!({ "reportId": 5 }));
    }

    #[tokio::test]
    async fn unsuccessful_detail_is_not_a_report() {
        let transport =
            CannedTransport::new(vec![Ok(r#"{"success": false, "message": "nope"}"#.to_owned())]);
        let client = ReportClient::new(transport, &ViewerConfig::default());
        assert!(matches!(
            client.report_detail(1).await,
            Err(ClientError::Unsuccessful(_))
        ));
    }

    #[tokio::test]
    async fn transport_errors_propagate_without_retry() {
        let transport = CannedTransport::new(vec![Err(ClientError::Http {
            status: 502,
            body: "bad gateway".to_owned(),
        })]);
        let client = ReportClient::new(transport, &ViewerConfig::default());
        assert!(matches!(
            client.report_detail(1).await,
            Err(ClientError::Http { status: 502, .. })
        ));
        assert_eq!(client.transport().requests.borrow().len(), 1);
    }

    #[tokio::test]
    async fn asks_question_with_language() {
        let transport = CannedTransport::new(vec![Ok(
            r#"{"success": true, "result": {"answer": "It is small."}}"#.to_owned(),
        )]);
        let client = ReportClient::new(transport, &ViewerConfig::default());

        let answer = client
            .ask_question(7, "Hindi", "How big is it?")
            .await
            .expect("answer");
        assert_eq!(answer, "It is small.");

        let requests = client.transport().requests.borrow();
        assert!(requests[0].0.ends_with("reports/ask-question/"));
        assert_eq!(
            requests[0].1,
            json!({"reportId": 7, "language": "Hindi", "question": "How big is it?"})
        );
    }
}
