use thiserror::Error;

/// Failures surfaced to the operator. None of them are retried.
#[derive(Debug, Error)]
pub enum AppError {
	#[error("request to analysis service failed: {0}")]
	Request(#[from] reqwest::Error),
	#[error("analysis service returned status {status}: {message}")]
	Status { status: u16, message: String },
	#[error("malformed payload: {0}")]
	Decode(#[from] serde_json::Error),
	#[error("analysis service error: {0}")]
	Service(String),
	#[error("browser API failed: {0}")]
	Js(String),
	#[error("page did not provide initial network data")]
	MissingInitialData,
}

impl From<wasm_bindgen::JsValue> for AppError {
	fn from(value: wasm_bindgen::JsValue) -> Self {
		Self::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
	}
}
