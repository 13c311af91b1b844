//! Prediction Upload Module
//!
//! Posts a prediction (base64 image, label, confidence, timestamp, plus
//! any extra fields) to a REST endpoint as JSON. The upload path degrades
//! gracefully: every failure mode comes back as a tagged
//! [`UploadOutcome`], never as an error or panic. One attempt, with a
//! timeout; no retries.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::constants;

/// Result of one upload attempt.
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    /// 2xx response; `body` is the endpoint's JSON, or a synthesized
    /// `{status, message}` when the body was not JSON.
    Accepted { status: u16, body: Value },
    /// The endpoint answered with a non-success status.
    Rejected { status: u16, message: String },
    /// The request ran into the configured timeout.
    TimedOut { message: String },
    /// DNS failure, refused connection, or another transport problem.
    ConnectionFailed { message: String },
    /// The image file to upload does not exist.
    MissingImage { path: PathBuf },
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// The `{status: "ok"|"error", ...}` shape shown to block users.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Accepted { status, body } => json!({
                "status": "ok",
                "http_status": status,
                "response": body,
            }),
            Self::Rejected { status, message } => json!({
                "status": "error",
                "kind": "http_status",
                "http_status": status,
                "message": message,
            }),
            Self::TimedOut { message } => json!({
                "status": "error",
                "kind": "timeout",
                "message": message,
            }),
            Self::ConnectionFailed { message } => json!({
                "status": "error",
                "kind": "connection",
                "message": message,
            }),
            Self::MissingImage { path } => json!({
                "status": "error",
                "kind": "missing_file",
                "message": format!("image file not found: {}", path.display()),
            }),
        }
    }
}

/// Upload one prediction. Always comes back as an [`UploadOutcome`];
/// there is no `Result` to match on.
pub fn send_prediction_data(
    image_path: &Path,
    label: &str,
    confidence: f64,
    endpoint: &str,
    extra_fields: Option<&Map<String, Value>>,
) -> UploadOutcome {
    let bytes = match fs::read(image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Cannot read {}: {e}", image_path.display());
            return UploadOutcome::MissingImage {
                path: image_path.to_path_buf(),
            };
        }
    };

    let mut envelope = json!({
        "image": BASE64.encode(&bytes),
        "label": label,
        "confidence": confidence,
        "timestamp": Utc::now().to_rfc3339(),
    });
    if let (Some(extra), Some(body)) = (extra_fields, envelope.as_object_mut()) {
        for (key, value) in extra {
            body.insert(key.clone(), value.clone());
        }
    }

    log::info!("Posting prediction '{label}' to {endpoint}");

    let agent = ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(constants::http_timeout_secs()))
        .build();

    match agent
        .post(endpoint)
        .set("Content-Type", "application/json")
        .send_string(&envelope.to_string())
    {
        Ok(response) => {
            let status = response.status();
            let text = response.into_string().unwrap_or_default();
            let body = serde_json::from_str(&text)
                .unwrap_or_else(|_| json!({ "status": status, "message": text }));
            log::info!("Endpoint answered {status}");
            UploadOutcome::Accepted { status, body }
        }
        Err(ureq::Error::Status(status, response)) => {
            let message = response.into_string().unwrap_or_default();
            log::warn!("Endpoint rejected upload with status {status}");
            UploadOutcome::Rejected { status, message }
        }
        Err(ureq::Error::Transport(transport)) => classify_transport(transport),
    }
}

/// Map a transport failure onto the outcome taxonomy. Timeout detection
/// is best-effort: ureq reports it as an I/O error.
fn classify_transport(transport: ureq::Transport) -> UploadOutcome {
    let message = transport.to_string();
    log::warn!("Upload failed: {message}");

    match transport.kind() {
        ureq::ErrorKind::Dns | ureq::ErrorKind::ConnectionFailed => {
            UploadOutcome::ConnectionFailed { message }
        }
        ureq::ErrorKind::Io if message.to_lowercase().contains("timed out") => {
            UploadOutcome::TimedOut { message }
        }
        _ => UploadOutcome::ConnectionFailed { message },
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sample_image(dir: &Path) -> PathBuf {
        let path = dir.join("frame.jpg");
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([1, 2, 3]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_missing_image_never_raises() {
        let outcome = send_prediction_data(
            Path::new("/no/such/frame.jpg"),
            "sit",
            0.9,
            "http://127.0.0.1:9/api/predict",
            None,
        );

        assert!(!outcome.is_success());
        let rendered = outcome.to_json();
        assert_eq!(rendered["status"], "error");
        assert_eq!(rendered["kind"], "missing_file");
    }

    #[test]
    fn test_unreachable_endpoint_is_a_tagged_error() {
        let dir = tempdir().unwrap();
        let image = sample_image(dir.path());

        // Port 9 (discard) is not listening; the connection is refused.
        let outcome = send_prediction_data(&image, "sit", 0.9, "http://127.0.0.1:9/api", None);

        assert!(!outcome.is_success());
        assert!(matches!(
            outcome,
            UploadOutcome::ConnectionFailed { .. } | UploadOutcome::TimedOut { .. }
        ));
        assert_eq!(outcome.to_json()["status"], "error");
    }

    #[test]
    fn test_extra_fields_land_in_the_envelope() {
        // Exercised indirectly: the envelope is built before the send, so
        // a refused connection still proves the merge did not panic.
        let dir = tempdir().unwrap();
        let image = sample_image(dir.path());

        let mut extra = Map::new();
        extra.insert("robot".to_string(), json!("bittle"));
        let outcome =
            send_prediction_data(&image, "sit", 0.5, "http://127.0.0.1:9/api", Some(&extra));
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_accepted_rendering_is_ok() {
        let outcome = UploadOutcome::Accepted {
            status: 200,
            body: json!({"saved": true}),
        };
        assert!(outcome.is_success());
        let rendered = outcome.to_json();
        assert_eq!(rendered["status"], "ok");
        assert_eq!(rendered["response"]["saved"], true);
    }

    #[test]
    fn test_base64_payload_round_trips() {
        let dir = tempdir().unwrap();
        let image = sample_image(dir.path());
        let bytes = fs::read(&image).unwrap();

        let encoded = BASE64.encode(&bytes);
        assert_eq!(BASE64.decode(encoded).unwrap(), bytes);
    }
}
