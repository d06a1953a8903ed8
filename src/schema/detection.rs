use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key used for deduplication when a detection carries no decoded payload.
pub const UNKNOWN_VALUE_KEY: &str = "unknown";

/// Semantic class of a decoded payload, as reported by the recognizer.
#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Url,
    Phone,
    Email,
    Text,
    Product,
    Wifi,
    Geo,
    CalendarEvent,
    DriverLicense,
    ContactInfo,
    Sms,
    #[default]
    Unknown,
}

impl ValueType {
    pub fn label(self) -> &'static str {
        match self {
            ValueType::Url => "URL",
            ValueType::Phone => "Phone",
            ValueType::Email => "Email",
            ValueType::Text => "Text",
            ValueType::Product => "Product",
            ValueType::Wifi => "WiFi",
            ValueType::Geo => "Geo",
            ValueType::CalendarEvent => "Calendar event",
            ValueType::DriverLicense => "Driver license",
            ValueType::ContactInfo => "Contact info",
            ValueType::Sms => "SMS",
            ValueType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Barcode symbology.
#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeFormat {
    QrCode,
    Code128,
    Code39,
    Code93,
    Codabar,
    DataMatrix,
    Ean13,
    Ean8,
    Itf,
    UpcA,
    UpcE,
    Pdf417,
    Aztec,
    #[default]
    Unknown,
}

impl BarcodeFormat {
    pub fn label(self) -> &'static str {
        match self {
            BarcodeFormat::QrCode => "QR Code",
            BarcodeFormat::Code128 => "Code 128",
            BarcodeFormat::Code39 => "Code 39",
            BarcodeFormat::Code93 => "Code 93",
            BarcodeFormat::Codabar => "Codabar",
            BarcodeFormat::DataMatrix => "Data Matrix",
            BarcodeFormat::Ean13 => "EAN-13",
            BarcodeFormat::Ean8 => "EAN-8",
            BarcodeFormat::Itf => "ITF",
            BarcodeFormat::UpcA => "UPC-A",
            BarcodeFormat::UpcE => "UPC-E",
            BarcodeFormat::Pdf417 => "PDF417",
            BarcodeFormat::Aztec => "Aztec",
            BarcodeFormat::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Axis-aligned rectangle in source-frame pixel coordinates.
#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BoundingBox {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// One decoded code observed in a single frame.
#[derive(Debug, Serialize, Deserialize, JsonSchema, Clone, PartialEq, Eq, Default)]
pub struct Detection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default)]
    pub format: BarcodeFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_points: Option<Vec<Point>>,
}

impl Detection {
    /// Create a detection carrying a decoded payload
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Create a detection the recognizer could locate but not decode
    pub fn without_value() -> Self {
        Self::default()
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn format(mut self, format: BarcodeFormat) -> Self {
        self.format = format;
        self
    }

    pub fn bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    pub fn corner_points(mut self, points: Vec<Point>) -> Self {
        self.corner_points = Some(points);
        self
    }

    /// Deduplication key: the payload, or [`UNKNOWN_VALUE_KEY`] when absent.
    ///
    /// All payload-less detections share one key, so they collapse into a
    /// single aggregated entry.
    pub fn value_key(&self) -> &str {
        self.value.as_deref().unwrap_or(UNKNOWN_VALUE_KEY)
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }
}
