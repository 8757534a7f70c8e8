//! Runtime settings, read from an optional `window.APP_CONFIG` object.

use serde::Deserialize;
use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	/// Endpoint of the analysis service.
	pub analyze_url: String,
	/// GeoJSON collection of named region outlines.
	pub borders_url: String,
	/// Window in which repeated simulate triggers collapse into one request.
	pub debounce_ms: u32,
	pub initial_zoom: f64,
	pub min_zoom: f64,
	pub max_zoom: f64,
	pub initial_center: MapCenter,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct MapCenter {
	pub lat: f64,
	pub lon: f64,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			analyze_url: "/analyze".into(),
			borders_url:
				"https://raw.githubusercontent.com/johan/world.geo.json/master/countries.geo.json"
					.into(),
			debounce_ms: 300,
			initial_zoom: 2.0,
			min_zoom: 2.0,
			max_zoom: 10.0,
			initial_center: MapCenter { lat: 20.0, lon: 0.0 },
		}
	}
}

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to parse config: {0}")]
	Parse(#[from] serde_json::Error),
	#[error("invalid zoom range {min}..={max}")]
	ZoomRange { min: f64, max: f64 },
	#[error("failed to read window config: {0}")]
	Window(String),
}

impl AppConfig {
	pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
		let config: Self = serde_json::from_str(json)?;
		config.validated()
	}

	/// Reads `window.APP_CONFIG`, falling back to defaults when absent.
	pub fn from_window() -> Result<Self, ConfigError> {
		match read_window_json("APP_CONFIG").map_err(ConfigError::Window)? {
			Some(json) => Self::from_json_str(&json),
			None => Ok(Self::default()),
		}
	}

	fn validated(mut self) -> Result<Self, ConfigError> {
		if !(self.min_zoom <= self.max_zoom) {
			return Err(ConfigError::ZoomRange {
				min: self.min_zoom,
				max: self.max_zoom,
			});
		}
		self.initial_zoom = self.initial_zoom.clamp(self.min_zoom, self.max_zoom);
		Ok(self)
	}
}

/// JSON text of a global the page host set on `window`, if present.
pub fn read_window_json(key: &str) -> Result<Option<String>, String> {
	let Some(window) = web_sys::window() else {
		return Ok(None);
	};
	let value = js_sys::Reflect::get(&window, &JsValue::from_str(key)).map_err(js_message)?;
	if value.is_undefined() || value.is_null() {
		return Ok(None);
	}
	let text = js_sys::JSON::stringify(&value).map_err(js_message)?;
	Ok(text.as_string())
}

fn js_message(value: JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_service_layout() {
		let config = AppConfig::default();
		assert_eq!(config.analyze_url, "/analyze");
		assert_eq!(config.debounce_ms, 300);
		assert_eq!(config.initial_center, MapCenter { lat: 20.0, lon: 0.0 });
	}

	#[test]
	fn partial_override_keeps_defaults() {
		let config =
			AppConfig::from_json_str(r#"{"analyze_url": "http://localhost:5000/analyze"}"#)
				.unwrap();
		assert_eq!(config.analyze_url, "http://localhost:5000/analyze");
		assert_eq!(config.max_zoom, 10.0);
	}

	#[test]
	fn initial_zoom_is_clamped() {
		let config = AppConfig::from_json_str(r#"{"initial_zoom": 20}"#).unwrap();
		assert_eq!(config.initial_zoom, 10.0);
	}

	#[test]
	fn inverted_zoom_range_is_rejected() {
		let err = AppConfig::from_json_str(r#"{"min_zoom": 8, "max_zoom": 3}"#).unwrap_err();
		assert!(matches!(err, ConfigError::ZoomRange { .. }));
	}
}
