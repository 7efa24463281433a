//! Google Cloud Vision `TEXT_DETECTION` over REST (API-key auth).

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::collaborators::{CollaboratorError, OcrEngine};
use crate::config::OcrSection;

pub struct VisionClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl VisionClient {
    pub fn new(section: &OcrSection, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(section.timeout_secs))
            .build()
            .context("build Vision HTTP client")?;
        Ok(Self {
            http,
            endpoint: section.endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[derive(Serialize)]
struct AnnotateRequest {
    requests: Vec<ImageRequest>,
}

#[derive(Serialize)]
struct ImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<ImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageResponse {
    #[serde(default)]
    text_annotations: Vec<TextAnnotation>,
    full_text_annotation: Option<FullText>,
    error: Option<Status>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FullText {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Status {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

/// The first text annotation holds the whole page; fall back to the
/// full-text annotation. Whitespace-only text counts as none.
pub(crate) fn extract_text(resp: AnnotateResponse) -> Result<Option<String>, CollaboratorError> {
    let Some(first) = resp.responses.into_iter().next() else {
        return Err(CollaboratorError::OcrResponse("empty responses array".to_string()));
    };

    if let Some(err) = first.error {
        return Err(CollaboratorError::Ocr(format!("{} {}", err.code, err.message)));
    }

    let text = first
        .text_annotations
        .into_iter()
        .next()
        .and_then(|a| a.description)
        .or_else(|| first.full_text_annotation.and_then(|f| f.text));

    Ok(text.filter(|t| !t.trim().is_empty()))
}

#[async_trait]
impl OcrEngine for VisionClient {
    #[instrument(skip_all, fields(bytes = image.len()))]
    async fn recognize(&self, image: &[u8]) -> Result<Option<String>, CollaboratorError> {
        let body = AnnotateRequest {
            requests: vec![ImageRequest {
                image: ImageContent {
                    content: STANDARD.encode(image),
                },
                features: vec![Feature {
                    kind: "TEXT_DETECTION",
                }],
            }],
        };

        let resp = self
            .http
            .post(format!("{}/v1/images:annotate", self.endpoint))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CollaboratorError::Ocr("timed out".to_string())
                } else {
                    CollaboratorError::Ocr(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(CollaboratorError::Ocr(format!("{status} {txt}")));
        }

        let parsed: AnnotateResponse = resp
            .json()
            .await
            .map_err(|e| CollaboratorError::OcrResponse(e.to_string()))?;

        let text = extract_text(parsed)?;
        debug!(chars = text.as_deref().map(|t| t.chars().count()).unwrap_or(0), "ocr done");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AnnotateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_text_from_first_annotation() {
        let resp = parse(
            r#"{"responses":[{"textAnnotations":[
                {"description":"コーヒー 250円\nパン 130円\n","locale":"ja"},
                {"description":"コーヒー"}
            ]}]}"#,
        );
        assert_eq!(
            extract_text(resp).unwrap().as_deref(),
            Some("コーヒー 250円\nパン 130円\n")
        );
    }

    #[test]
    fn test_falls_back_to_full_text() {
        let resp = parse(r#"{"responses":[{"fullTextAnnotation":{"text":"パン 130円"}}]}"#);
        assert_eq!(extract_text(resp).unwrap().as_deref(), Some("パン 130円"));
    }

    #[test]
    fn test_no_text_is_none() {
        assert_eq!(extract_text(parse(r#"{"responses":[{}]}"#)).unwrap(), None);
        let blank = parse(r#"{"responses":[{"textAnnotations":[{"description":"  \n"}]}]}"#);
        assert_eq!(extract_text(blank).unwrap(), None);
    }

    #[test]
    fn test_error_status() {
        let resp = parse(r#"{"responses":[{"error":{"code":3,"message":"Bad image data."}}]}"#);
        let err = extract_text(resp).unwrap_err();
        assert!(matches!(err, CollaboratorError::Ocr(_)));
        assert!(err.to_string().contains("Bad image data."));
    }

    #[test]
    fn test_missing_responses_is_malformed() {
        let err = extract_text(parse("{}")).unwrap_err();
        assert!(matches!(err, CollaboratorError::OcrResponse(_)));
    }
}
