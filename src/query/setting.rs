//! Global settings (`[out:json][timeout:25];`).

use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use super::filter::BoundingBox;
use crate::error::BuildError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    /// Output format, see [`OutputFormat`].
    Out,
    /// Maximum runtime in seconds (engine default 180).
    Timeout,
    /// Maximum memory in bytes (engine default 512 MiB).
    Maxsize,
    /// Global bounding box applied to every statement.
    GlobalBoundingBox,
    /// Query attic data as of a point in time.
    Date,
    /// Difference between two points in time.
    Diff,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Out => "out",
            SettingKey::Timeout => "timeout",
            SettingKey::Maxsize => "maxsize",
            SettingKey::GlobalBoundingBox => "bbox",
            SettingKey::Date => "date",
            SettingKey::Diff => "diff",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Xml,
    /// Overpass JSON, not GeoJSON.
    Json,
    /// Requires header options, e.g. `(::id,::lat,::lon;true;",")`.
    Csv,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Xml => "xml",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = BuildError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "xml" => Ok(OutputFormat::Xml),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(BuildError::InvalidOutputFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    key: SettingKey,
    value: String,
    options: String,
}

impl Setting {
    /// Generic constructor. `out` values are checked against the known
    /// formats and csv must carry header options.
    pub fn new(
        key: SettingKey,
        value: impl Into<String>,
        options: Option<&str>,
    ) -> Result<Self, BuildError> {
        let value = value.into();
        let options = options.unwrap_or_default().to_string();
        if key == SettingKey::Out
            && value.parse::<OutputFormat>()? == OutputFormat::Csv
            && options.is_empty()
        {
            return Err(BuildError::MissingCsvOptions);
        }
        Ok(Self {
            key,
            value,
            options,
        })
    }

    pub fn output(format: OutputFormat, options: Option<&str>) -> Result<Self, BuildError> {
        Self::new(SettingKey::Out, format.as_str(), options)
    }

    pub fn timeout(seconds: u32) -> Self {
        Self::unchecked(SettingKey::Timeout, seconds.to_string())
    }

    pub fn maxsize(bytes: u64) -> Self {
        Self::unchecked(SettingKey::Maxsize, bytes.to_string())
    }

    pub fn global_bbox(bbox: &BoundingBox) -> Result<Self, BuildError> {
        bbox.validate()?;
        Ok(Self::unchecked(SettingKey::GlobalBoundingBox, bbox.clause()))
    }

    pub fn date(at: OffsetDateTime) -> Self {
        Self::unchecked(SettingKey::Date, quote_timestamp(at))
    }

    /// Difference between `from` and `to`, or between `from` and now.
    pub fn diff(from: OffsetDateTime, to: Option<OffsetDateTime>) -> Self {
        let mut value = quote_timestamp(from);
        if let Some(to) = to {
            value.push(',');
            value.push_str(&quote_timestamp(to));
        }
        Self::unchecked(SettingKey::Diff, value)
    }

    fn unchecked(key: SettingKey, value: String) -> Self {
        Self {
            key,
            value,
            options: String::new(),
        }
    }

    pub fn key(&self) -> SettingKey {
        self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn options(&self) -> &str {
        &self.options
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}{}]", self.key, self.value, self.options)
    }
}

fn quote_timestamp(at: OffsetDateTime) -> String {
    let formatted = at
        .to_offset(time::UtcOffset::UTC)
        .format(&Rfc3339)
        .unwrap_or_else(|_| at.unix_timestamp().to_string());
    format!("\"{formatted}\"")
}
