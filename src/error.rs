/// Result alias that carries [`SpawnError`].
pub type Result<T> = std::result::Result<T, SpawnError>;

/// Everything that can go wrong when spawning transient entities.
///
/// Configuration problems are reported up front, before anything touches the
/// surface. Surface failures are confined to the batch that hit them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpawnError {
    #[error("glyph set is empty")]
    EmptyGlyphSet,
    #[error("invalid {field} range [{min}, {max}]")]
    InvalidRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
    #[error("recurring interval must be positive and finite, got {0}ms")]
    InvalidInterval(f64),
    /// The cosmetic transition has to land strictly inside the entity lifetime.
    #[error("transition delay {delay_ms}ms is not below the shortest lifetime {min_duration_ms}ms")]
    TransitionTooLate { delay_ms: f64, min_duration_ms: f64 },
    #[error("surface error: {0}")]
    Surface(String),
    #[error("config error: {0}")]
    Config(String),
}

impl SpawnError {
    pub fn surface<T: Into<String>>(msg: T) -> Self {
        Self::Surface(msg.into())
    }
}

#[cfg(feature = "serde_json")]
impl From<serde_json::Error> for SpawnError {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value.to_string())
    }
}

impl From<SpawnError> for wasm_bindgen::JsValue {
    fn from(value: SpawnError) -> Self {
        wasm_bindgen::JsValue::from_str(&value.to_string())
    }
}
