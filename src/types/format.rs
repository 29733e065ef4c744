//! Output formats and their encode settings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_AVIF_QUALITY, DEFAULT_JPEG_QUALITY, DEFAULT_PNG_QUALITY, DEFAULT_WEBP_QUALITY,
};

/// Encodings a derivative can be written in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Webp,
    Avif,
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [Self::Webp, Self::Avif, Self::Jpeg, Self::Png];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Webp => "webp",
            Self::Avif => "avif",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    /// File extension of generated files. Also the manifest key for the format group.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            other => other.label(),
        }
    }

    #[must_use]
    pub fn default_quality(self) -> u8 {
        match self {
            Self::Webp => DEFAULT_WEBP_QUALITY,
            Self::Avif => DEFAULT_AVIF_QUALITY,
            Self::Jpeg => DEFAULT_JPEG_QUALITY,
            Self::Png => DEFAULT_PNG_QUALITY,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "webp" => Ok(Self::Webp),
            "avif" => Ok(Self::Avif),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            other => Err(format!(
                "unknown output format '{other}' (expected one of webp, avif, jpeg, png)"
            )),
        }
    }
}

/// One requested output format with its encode quality (1..=100).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormatSpec {
    pub format: OutputFormat,
    pub quality: u8,
}

impl FormatSpec {
    #[must_use]
    pub fn new(format: OutputFormat, quality: u8) -> Self {
        Self { format, quality }
    }

    #[must_use]
    pub fn with_default_quality(format: OutputFormat) -> Self {
        Self::new(format, format.default_quality())
    }
}

/// Parses `webp` or `webp:70`.
impl FromStr for FormatSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            None => Ok(Self::with_default_quality(s.parse()?)),
            Some((name, quality)) => {
                let format: OutputFormat = name.parse()?;
                let quality = quality
                    .trim()
                    .parse::<u8>()
                    .map_err(|err| format!("invalid quality '{quality}' for {format}: {err}"))?;
                Ok(Self::new(format, quality))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jpeg_writes_jpg_files() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Jpeg.label(), "jpeg");
        assert_eq!("JPG".parse::<OutputFormat>(), Ok(OutputFormat::Jpeg));
    }

    #[test]
    fn format_spec_parses_optional_quality() {
        let spec: FormatSpec = "avif:50".parse().expect("parse");
        assert_eq!(spec, FormatSpec::new(OutputFormat::Avif, 50));

        let spec: FormatSpec = "webp".parse().expect("parse");
        assert_eq!(spec.quality, DEFAULT_WEBP_QUALITY);

        assert!("tiff:20".parse::<FormatSpec>().is_err());
        assert!("jpeg:high".parse::<FormatSpec>().is_err());
    }

    #[test]
    fn serde_accepts_jpg_alias() {
        let spec: FormatSpec =
            serde_json::from_str(r#"{"format":"jpg","quality":80}"#).expect("deserialize");
        assert_eq!(spec.format, OutputFormat::Jpeg);
        let json = serde_json::to_string(&spec).expect("serialize");
        assert_eq!(json, r#"{"format":"jpeg","quality":80}"#);
    }
}
