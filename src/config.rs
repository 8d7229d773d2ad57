//! Frame sequence configuration.
//!
//! The frame count and asset location are fixed when the page is built; the
//! player never discovers them at runtime. A shorter asset set than
//! `total_frames` simply leaves the tail frames unloaded.

use serde::Deserialize;

use crate::error::{SequenceError, SequenceResult};

pub const DEFAULT_TOTAL_FRAMES: usize = 264;
pub const DEFAULT_BASE_PATH: &str = "/webp-sequence/frame_";
pub const DEFAULT_EXTENSION: &str = "webp";
pub const DEFAULT_INDEX_WIDTH: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SequenceConfig {
    /// Number of frames in the sequence.
    pub total_frames: usize,
    /// URL prefix placed before the padded index, e.g. `/webp-sequence/frame_`.
    pub base_path: String,
    /// File extension without the leading dot.
    pub extension: String,
    /// Width the frame index is zero-padded to.
    pub index_width: usize,
    /// Upper bound on concurrent frame loads. `None` requests every frame at once.
    pub max_in_flight: Option<usize>,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            total_frames: DEFAULT_TOTAL_FRAMES,
            base_path: DEFAULT_BASE_PATH.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            index_width: DEFAULT_INDEX_WIDTH,
            max_in_flight: None,
        }
    }
}

impl SequenceConfig {
    pub fn from_json(json: &str) -> SequenceResult<Self> {
        let config: SequenceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SequenceResult<()> {
        if self.total_frames == 0 {
            return Err(SequenceError::EmptySequence);
        }
        if self.max_in_flight == Some(0) {
            return Err(SequenceError::ZeroConcurrency);
        }
        Ok(())
    }

    /// Stable URL for the frame at `index`.
    pub fn frame_url(&self, index: usize) -> String {
        format!(
            "{}{:0width$}.{}",
            self.base_path,
            index,
            self.extension,
            width = self.index_width
        )
    }

    /// File name of the frame at `index`, without the directory part of `base_path`.
    pub fn frame_file_name(&self, index: usize) -> String {
        let url = self.frame_url(index);
        match url.rsplit_once('/') {
            Some((_, name)) => name.to_string(),
            None => url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url_is_zero_padded() {
        let config = SequenceConfig::default();
        assert_eq!(config.frame_url(7), "/webp-sequence/frame_007.webp");
        assert_eq!(config.frame_url(263), "/webp-sequence/frame_263.webp");
        assert_eq!(config.frame_file_name(42), "frame_042.webp");
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SequenceConfig::from_json(r#"{"totalFrames": 12, "maxInFlight": 4}"#)
            .expect("valid config");
        assert_eq!(config.total_frames, 12);
        assert_eq!(config.max_in_flight, Some(4));
        assert_eq!(config.base_path, DEFAULT_BASE_PATH);
        assert_eq!(config.index_width, 3);
    }

    #[test]
    fn rejects_empty_and_zero_concurrency() {
        assert_eq!(
            SequenceConfig::from_json(r#"{"totalFrames": 0}"#),
            Err(SequenceError::EmptySequence)
        );
        assert_eq!(
            SequenceConfig::from_json(r#"{"maxInFlight": 0}"#),
            Err(SequenceError::ZeroConcurrency)
        );
        assert!(matches!(
            SequenceConfig::from_json("{not json"),
            Err(SequenceError::Config(_))
        ));
    }

    #[test]
    fn index_wider_than_padding_is_not_truncated() {
        let config = SequenceConfig {
            total_frames: 2000,
            ..SequenceConfig::default()
        };
        assert_eq!(config.frame_url(1234), "/webp-sequence/frame_1234.webp");
    }
}
