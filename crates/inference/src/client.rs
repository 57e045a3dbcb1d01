//! REST client for the hosted face-detection API.
//!
//! The endpoint accepts a base64-encoded image as a URL-encoded POST body,
//! authenticated by an API key query parameter, and answers with a JSON
//! object carrying a `predictions` array.

use async_trait::async_trait;
use base64::Engine as _;
use facelens_core::types::Detection;
use serde::Deserialize;

/// Errors from the inference API layer.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The inference service returned a non-2xx status code.
    #[error("Inference API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Seam between the capture pipeline and the inference service.
///
/// The pipeline treats a failed call as "zero detections"; implementations
/// report errors faithfully and leave that substitution to the caller.
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Run face detection over a raw image, returning all predicted
    /// regions in source-image pixel space.
    async fn detect(&self, image: &[u8]) -> Result<Vec<Detection>, InferenceError>;
}

/// Response envelope of the hosted detection endpoint.
#[derive(Debug, Deserialize)]
struct PredictionsResponse {
    predictions: Vec<Detection>,
}

/// HTTP client for the hosted face-detection endpoint.
pub struct HostedDetector {
    client: reqwest::Client,
    api_url: String,
    model_id: String,
    api_key: String,
}

impl HostedDetector {
    /// Create a new client for the given endpoint.
    ///
    /// * `api_url`  - Base HTTP URL of the inference service.
    /// * `model_id` - Model path segment, e.g. `face-detection-mik1i/21`.
    /// * `api_key`  - API key sent as the `api_key` query parameter.
    pub fn new(api_url: String, model_id: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            model_id,
            api_key,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling).
    pub fn with_client(
        client: reqwest::Client,
        api_url: String,
        model_id: String,
        api_key: String,
    ) -> Self {
        Self {
            client,
            api_url,
            model_id,
            api_key,
        }
    }

    /// Assert the response has a success status code. Returns the response
    /// unchanged on success, or an [`InferenceError::Api`] containing the
    /// status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, InferenceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(InferenceError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl FaceDetector for HostedDetector {
    /// Issue a single detection call.
    ///
    /// The image is base64-encoded and sent as the URL-encoded POST body.
    /// No retry and no timeout beyond the client defaults: failure is
    /// terminal for this one capture's detection attempt.
    async fn detect(&self, image: &[u8]) -> Result<Vec<Detection>, InferenceError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);

        let response = self
            .client
            .post(format!("{}/{}", self.api_url, self.model_id))
            .query(&[("api_key", self.api_key.as_str())])
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(encoded)
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        let parsed = response.json::<PredictionsResponse>().await?;

        tracing::debug!(
            predictions = parsed.predictions.len(),
            "Inference call completed"
        );

        Ok(parsed.predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predictions_envelope_deserializes() {
        let json = r#"{
            "predictions": [
                {
                    "x": 320.0, "y": 240.0, "width": 96.0, "height": 112.0,
                    "confidence": 0.92, "class": "face", "class_id": 0,
                    "detection_id": "aa11"
                },
                {
                    "x": 500.0, "y": 180.0, "width": 80.0, "height": 90.0,
                    "confidence": 0.77, "class": "face", "class_id": 0,
                    "detection_id": "bb22"
                }
            ]
        }"#;

        let parsed: PredictionsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.predictions.len(), 2);
        assert_eq!(parsed.predictions[0].confidence, 0.92);
        assert_eq!(parsed.predictions[1].detection_id, "bb22");
    }

    #[test]
    fn empty_predictions_deserialize_to_empty_list() {
        let parsed: PredictionsResponse = serde_json::from_str(r#"{"predictions": []}"#).unwrap();
        assert!(parsed.predictions.is_empty());
    }
}
