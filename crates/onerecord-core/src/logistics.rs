use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Kinds of logistics objects this server accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogisticsObjectType {
    Airwaybill,
    Housemanifest,
    Housewaybill,
    Booking,
}

impl LogisticsObjectType {
    pub const ALL: [LogisticsObjectType; 4] = [
        LogisticsObjectType::Airwaybill,
        LogisticsObjectType::Housemanifest,
        LogisticsObjectType::Housewaybill,
        LogisticsObjectType::Booking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogisticsObjectType::Airwaybill => "Airwaybill",
            LogisticsObjectType::Housemanifest => "Housemanifest",
            LogisticsObjectType::Housewaybill => "Housewaybill",
            LogisticsObjectType::Booking => "Booking",
        }
    }

    /// Comma-separated list of accepted type names, for error messages.
    pub fn accepted() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for LogisticsObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogisticsObjectType {
    type Err = String;

    /// Accepts a bare type name (case-insensitive) or an IRI whose last
    /// path or fragment segment is a type name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s
            .rsplit(['/', '#'])
            .next()
            .unwrap_or(s)
            .trim()
            .to_lowercase();

        match name.as_str() {
            "airwaybill" => Ok(LogisticsObjectType::Airwaybill),
            "housemanifest" => Ok(LogisticsObjectType::Housemanifest),
            "housewaybill" => Ok(LogisticsObjectType::Housewaybill),
            "booking" => Ok(LogisticsObjectType::Booking),
            _ => Err(format!(
                "Unknown logistics object type '{s}'. Expected one of: {}",
                Self::accepted()
            )),
        }
    }
}

/// Read and validate the `@type` of a logistics object document.
///
/// The document must be a JSON object. `@type` may be a string or, as JSON-LD
/// allows, an array of strings; the first recognised entry wins.
pub fn type_of(document: &serde_json::Value) -> Result<LogisticsObjectType, AppError> {
    let object = document.as_object().ok_or_else(|| {
        AppError::ValidationError("Logistics object must be a JSON object".into())
    })?;

    let missing = || {
        AppError::ValidationError(format!(
            "Logistics object must contain an @type field: {}",
            LogisticsObjectType::accepted()
        ))
    };

    match object.get("@type").ok_or_else(missing)? {
        serde_json::Value::String(raw) => raw
            .parse::<LogisticsObjectType>()
            .map_err(AppError::ValidationError),
        serde_json::Value::Array(entries) => entries
            .iter()
            .filter_map(|v| v.as_str())
            .find_map(|raw| raw.parse::<LogisticsObjectType>().ok())
            .ok_or_else(|| {
                AppError::ValidationError(format!(
                    "No known logistics object type in @type. Expected one of: {}",
                    LogisticsObjectType::accepted()
                ))
            }),
        _ => Err(missing()),
    }
}
