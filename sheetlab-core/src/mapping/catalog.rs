//! The canonical field dictionary.
//!
//! A catalog is immutable configuration owned by the mapper: one spec per
//! canonical field with its known header variations, importance weight, and
//! required flag. The default catalog targets NSE-style daily bhavcopy
//! exports; alternate market conventions load from TOML.

use serde::{Deserialize, Serialize};

/// The fixed set of canonical fields a header can map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Date,
    Series,
    Open,
    High,
    Low,
    PrevClose,
    Ltp,
    Close,
    Vwap,
    High52w,
    Low52w,
    Volume,
    Value,
    Trades,
}

impl CanonicalField {
    /// The contract-boundary name consumers of serialized rows see.
    pub fn contract_name(&self) -> &'static str {
        match self {
            CanonicalField::Date => "Date",
            CanonicalField::Series => "series",
            CanonicalField::Open => "OPEN",
            CanonicalField::High => "HIGH",
            CanonicalField::Low => "LOW",
            CanonicalField::PrevClose => "PREV. CLOSE",
            CanonicalField::Ltp => "ltp",
            CanonicalField::Close => "close",
            CanonicalField::Vwap => "vwap",
            CanonicalField::High52w => "52W H",
            CanonicalField::Low52w => "52W L",
            CanonicalField::Volume => "VOLUME",
            CanonicalField::Value => "VALUE",
            CanonicalField::Trades => "No of trades",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.contract_name())
    }
}

/// One field's matching configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: CanonicalField,
    /// Known header spellings, matched case-insensitively.
    pub variations: Vec<String>,
    pub description: String,
    /// Required fields trigger validation issues when unmapped.
    pub required: bool,
    /// Importance weight used in the overall mapping confidence.
    pub weight: f64,
}

/// Immutable set of field specs handed to the mapper at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldCatalog {
    pub fields: Vec<FieldSpec>,
}

impl FieldCatalog {
    /// Load a catalog from a TOML document (alternate market conventions).
    pub fn from_toml(doc: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(doc)
    }

    pub fn get(&self, field: CanonicalField) -> Option<&FieldSpec> {
        self.fields.iter().find(|s| s.field == field)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = CanonicalField> + '_ {
        self.fields.iter().filter(|s| s.required).map(|s| s.field)
    }
}

fn spec(
    field: CanonicalField,
    variations: &[&str],
    description: &str,
    required: bool,
    weight: f64,
) -> FieldSpec {
    FieldSpec {
        field,
        variations: variations.iter().map(|v| v.to_string()).collect(),
        description: description.to_string(),
        required,
        weight,
    }
}

impl Default for FieldCatalog {
    fn default() -> Self {
        Self {
            fields: vec![
                spec(
                    CanonicalField::Date,
                    &["date", "trade date", "trading date", "timestamp"],
                    "Trading date",
                    true,
                    1.0,
                ),
                spec(
                    CanonicalField::Series,
                    &["series", "segment", "instrument"],
                    "Series / segment code",
                    false,
                    0.3,
                ),
                spec(
                    CanonicalField::Open,
                    &["open", "open price", "opening price"],
                    "Opening price",
                    true,
                    0.9,
                ),
                spec(
                    CanonicalField::High,
                    &["high", "high price", "day high", "intraday high"],
                    "Intraday high price",
                    true,
                    0.9,
                ),
                spec(
                    CanonicalField::Low,
                    &["low", "low price", "day low", "intraday low"],
                    "Intraday low price",
                    true,
                    0.9,
                ),
                spec(
                    CanonicalField::PrevClose,
                    &["prev. close", "prev close", "previous close", "pclose"],
                    "Previous session close",
                    false,
                    0.5,
                ),
                spec(
                    CanonicalField::Ltp,
                    &["ltp", "last traded price", "last price", "last"],
                    "Last traded price",
                    false,
                    0.6,
                ),
                spec(
                    CanonicalField::Close,
                    &["close", "close price", "closing price"],
                    "Closing price",
                    true,
                    1.0,
                ),
                spec(
                    CanonicalField::Vwap,
                    &["vwap", "avg price", "average price", "wap"],
                    "Volume-weighted average price",
                    false,
                    0.5,
                ),
                spec(
                    CanonicalField::High52w,
                    &["52w h", "52w high", "52 week high", "52wk high"],
                    "52-week high",
                    false,
                    0.3,
                ),
                spec(
                    CanonicalField::Low52w,
                    &["52w l", "52w low", "52 week low", "52wk low"],
                    "52-week low",
                    false,
                    0.3,
                ),
                spec(
                    CanonicalField::Volume,
                    &[
                        "volume",
                        "total traded quantity",
                        "traded qty",
                        "qty",
                        "shares traded",
                    ],
                    "Traded share count",
                    true,
                    0.8,
                ),
                spec(
                    CanonicalField::Value,
                    &["value", "turnover", "traded value", "turnover (rs. cr)"],
                    "Turnover value",
                    false,
                    0.4,
                ),
                spec(
                    CanonicalField::Trades,
                    &["no of trades", "no. of trades", "trades", "trade count"],
                    "Number of trades",
                    false,
                    0.4,
                ),
            ],
        }
    }
}
