//! Central Configuration Constants
//!
//! Single source of truth for crate-wide defaults. Each default can be
//! overridden through an environment variable via the helpers below.

/// Default REST endpoint for prediction uploads.
pub const DEFAULT_UPLOAD_URL: &str = "https://petoiupload.vercel.app/api/predict";

/// Default HTTP timeout (seconds) for uploads and model downloads.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Square input resolution expected by the bundled image models.
pub const DEFAULT_IMAGE_SIZE: usize = 224;

/// Cache filename used when a model URL has no recognizable filename.
pub const DEFAULT_MODEL_FILENAME: &str = "downloaded_model.onnx";

/// Class names for the stock classroom image model, in output order.
pub const DEFAULT_CLASS_NAMES: &[&str] = &[
    "aqualy",
    "calcolatrice_casio",
    "bicchiere",
    "iphone13",
    "mouse_wireless",
    "pennarello_giotto",
    "persona",
    "webcam_box",
];

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Upload endpoint from environment or default.
pub fn upload_url() -> String {
    std::env::var("PETOI_UPLOAD_URL").unwrap_or_else(|_| DEFAULT_UPLOAD_URL.to_string())
}

/// HTTP timeout in seconds from environment or default.
pub fn http_timeout_secs() -> u64 {
    std::env::var("PETOI_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
}

/// Image input resolution from environment or default.
pub fn image_size() -> usize {
    std::env::var("PETOI_IMAGE_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_IMAGE_SIZE)
}
