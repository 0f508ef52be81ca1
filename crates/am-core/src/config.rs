use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::ImageKind;

/// Construction-time constants of a parsing pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParserConfig {
    /// Entries kept in the whole-message result cache.
    pub message_cache_capacity: usize,
    /// Entries kept in the single markdown line cache.
    pub line_cache_capacity: usize,
    /// Gap emitted for a `<br>` without a percent size.
    pub line_break_gap: f32,
    /// Trailing gap hint carried by each markdown section.
    pub markdown_section_gap: f32,
    pub markup_trailing_gap: f32,
    pub markdown_trailing_gap: f32,
    /// Square default size for `image` and `img` tokens.
    pub image_default_size: u32,
    /// Square default size for `logo` tokens.
    pub logo_default_size: u32,
    /// Inline tag nesting beyond this depth is kept as literal text.
    pub max_inline_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            message_cache_capacity: 50,
            line_cache_capacity: 500,
            line_break_gap: 10.0,
            markdown_section_gap: 10.0,
            markup_trailing_gap: 20.0,
            markdown_trailing_gap: 30.0,
            image_default_size: 20,
            logo_default_size: 30,
            max_inline_depth: 50,
        }
    }
}

impl ParserConfig {
    /// Default constants with both caches disabled.
    #[must_use]
    pub fn uncached() -> Self {
        Self {
            message_cache_capacity: 0,
            line_cache_capacity: 0,
            ..Self::default()
        }
    }

    /// Square default size for a token kind without an explicit `|WxH`.
    #[must_use]
    pub const fn default_image_size(&self, kind: ImageKind) -> (u32, u32) {
        let side = match kind {
            ImageKind::Image | ImageKind::Img => self.image_default_size,
            ImageKind::Logo => self.logo_default_size,
        };
        (side, side)
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config root must be a JSON object, got {found}")]
    NotAnObject { found: String },
    #[error("config field '{field}' {message} (got {value})")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },
    #[error("unknown config key '{key}' ignored")]
    UnknownKey { key: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ConfigParse {
    pub config: ParserConfig,
    pub errors: Vec<ConfigError>,
}

impl ConfigParse {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Apply the known keys of a JSON object on top of the defaults.
///
/// Bad entries are collected as errors and leave the default in place.
#[must_use]
pub fn parse_config_value(value: &Value) -> ConfigParse {
    let mut parsed = ConfigParse::default();
    let Some(config_obj) = value.as_object() else {
        parsed.errors.push(ConfigError::NotAnObject {
            found: value.to_string(),
        });
        return parsed;
    };

    for (key, raw_value) in config_obj {
        let config = &mut parsed.config;
        let outcome = match key.as_str() {
            "message_cache_capacity" => {
                read_count(raw_value, 0).map(|count| config.message_cache_capacity = count)
            }
            "line_cache_capacity" => {
                read_count(raw_value, 0).map(|count| config.line_cache_capacity = count)
            }
            "line_break_gap" => read_gap(raw_value).map(|gap| config.line_break_gap = gap),
            "markdown_section_gap" => {
                read_gap(raw_value).map(|gap| config.markdown_section_gap = gap)
            }
            "markup_trailing_gap" => {
                read_gap(raw_value).map(|gap| config.markup_trailing_gap = gap)
            }
            "markdown_trailing_gap" => {
                read_gap(raw_value).map(|gap| config.markdown_trailing_gap = gap)
            }
            "image_default_size" => read_count(raw_value, 1)
                .and_then(to_u32)
                .map(|size| config.image_default_size = size),
            "logo_default_size" => read_count(raw_value, 1)
                .and_then(to_u32)
                .map(|size| config.logo_default_size = size),
            "max_inline_depth" => {
                read_count(raw_value, 1).map(|depth| config.max_inline_depth = depth)
            }
            other => {
                parsed.errors.push(ConfigError::UnknownKey {
                    key: other.to_string(),
                });
                continue;
            }
        };

        if let Err(message) = outcome {
            parsed.errors.push(ConfigError::InvalidValue {
                field: key.clone(),
                value: raw_value.to_string(),
                message: message.to_string(),
            });
        }
    }

    parsed
}

fn read_count(value: &Value, minimum: u64) -> Result<usize, &'static str> {
    let Some(count) = value.as_u64() else {
        return Err("must be a non-negative integer");
    };
    if count < minimum {
        return Err("must be at least 1");
    }
    usize::try_from(count).map_err(|_| "is too large")
}

fn to_u32(value: usize) -> Result<u32, &'static str> {
    u32::try_from(value).map_err(|_| "is too large")
}

fn read_gap(value: &Value) -> Result<f32, &'static str> {
    let Some(gap) = value.as_f64() else {
        return Err("must be a number");
    };
    if !gap.is_finite() || gap < 0.0 {
        return Err("must be a finite, non-negative number");
    }
    #[allow(clippy::cast_possible_truncation)]
    Ok(gap as f32)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ConfigError, ParserConfig, parse_config_value};

    #[test]
    fn defaults_match_reference_constants() {
        let config = ParserConfig::default();
        assert_eq!(config.message_cache_capacity, 50);
        assert_eq!(config.line_cache_capacity, 500);
        assert!((config.line_break_gap - 10.0).abs() < f32::EPSILON);
        assert!((config.markup_trailing_gap - 20.0).abs() < f32::EPSILON);
        assert!((config.markdown_trailing_gap - 30.0).abs() < f32::EPSILON);
        assert_eq!(config.image_default_size, 20);
        assert_eq!(config.logo_default_size, 30);
        assert_eq!(config.max_inline_depth, 50);
    }

    #[test]
    fn requires_object_root() {
        let parsed = parse_config_value(&json!([1, 2]));
        assert_eq!(parsed.config, ParserConfig::default());
        assert!(matches!(
            parsed.errors.as_slice(),
            [ConfigError::NotAnObject { .. }]
        ));
    }

    #[test]
    fn applies_known_keys() {
        let parsed = parse_config_value(&json!({
            "message_cache_capacity": 8,
            "line_break_gap": 12.5,
            "logo_default_size": 40,
        }));
        assert!(parsed.is_clean(), "{:?}", parsed.errors);
        assert_eq!(parsed.config.message_cache_capacity, 8);
        assert!((parsed.config.line_break_gap - 12.5).abs() < f32::EPSILON);
        assert_eq!(parsed.config.logo_default_size, 40);
    }

    #[test]
    fn collects_errors_without_failing() {
        let parsed = parse_config_value(&json!({
            "max_inline_depth": 0,
            "line_break_gap": "wide",
            "theme": "dark",
            "line_cache_capacity": 3,
        }));

        assert_eq!(parsed.config.max_inline_depth, 50);
        assert!((parsed.config.line_break_gap - 10.0).abs() < f32::EPSILON);
        assert_eq!(parsed.config.line_cache_capacity, 3);
        assert_eq!(parsed.errors.len(), 3);
        assert!(
            parsed
                .errors
                .iter()
                .any(|error| matches!(error, ConfigError::UnknownKey { key } if key == "theme"))
        );
    }

    #[test]
    fn error_messages_name_the_field() {
        let parsed = parse_config_value(&json!({"markup_trailing_gap": -1}));
        let message = parsed.errors[0].to_string();
        assert!(message.contains("markup_trailing_gap"), "{message}");
        assert!(message.contains("non-negative"), "{message}");
    }

    #[test]
    fn serde_fills_missing_fields_with_defaults() {
        let config: ParserConfig =
            serde_json::from_value(json!({"line_cache_capacity": 7})).expect("deserialize config");
        assert_eq!(config.line_cache_capacity, 7);
        assert_eq!(config.message_cache_capacity, 50);
    }
}
