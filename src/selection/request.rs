//! Request payload posted by the browser client.

use serde::{Deserialize, Serialize};

use super::SelectionOptions;

/// Circle in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CirclePayload {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
}

/// `{ "side": "front", "circle": { "cx": .., "cy": .., "radius": .. }, "k": 5, .. }`
///
/// The side stays a string here so an unknown value surfaces as
/// [`super::SelectionError::UnknownSide`] instead of a generic decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub side: String,
    pub circle: CirclePayload,
    #[serde(flatten)]
    pub options: SelectionOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_request() {
        let request: AnalyzeRequest = serde_json::from_str(
            r#"{"side": "back", "circle": {"cx": 0.5, "cy": 0.2, "radius": 0.05}}"#,
        )
        .expect("minimal request");
        assert_eq!(request.side, "back");
        assert_eq!(request.circle, CirclePayload { cx: 0.5, cy: 0.2, radius: 0.05 });
        assert_eq!(request.options, SelectionOptions::default());
    }

    #[test]
    fn parses_flattened_options() {
        let request: AnalyzeRequest = serde_json::from_str(
            r#"{"side": "front", "circle": {"cx": 0.1, "cy": 0.9, "radius": 0.2},
                "k": 3, "sigma_scale": 0.5, "includeDiagnostics": false}"#,
        )
        .expect("request with options");
        assert_eq!(request.options.k, 3);
        assert_eq!(request.options.sigma_scale, 0.5);
        assert!(!request.options.include_diagnostics);
        assert_eq!(request.options.min_pixels, 3);
    }

    #[test]
    fn missing_circle_is_rejected() {
        assert!(serde_json::from_str::<AnalyzeRequest>(r#"{"side": "front"}"#).is_err());
    }
}
