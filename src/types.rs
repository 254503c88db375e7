//! Order and quote types shared by the loader, form and view
//!
//! The quote endpoint is loosely typed: numeric fields may arrive as JSON
//! numbers, numeric strings or null, so the quote types use lenient
//! deserializers that fall back to zero.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of depth levels kept from a quote
pub const MAX_DEPTH_LEVELS: usize = 5;

// ============================================================================
// Lenient Deserializers
// ============================================================================

/// Deserialize a number that may also be a numeric string or null
fn deserialize_flexible_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleFloat {
        Float(f64),
        Int(i64),
        Str(String),
    }

    let value = match Option::<FlexibleFloat>::deserialize(deserializer)? {
        None => 0.0,
        Some(FlexibleFloat::Float(f)) => f,
        Some(FlexibleFloat::Int(i)) => i as f64,
        Some(FlexibleFloat::Str(s)) if s.trim().is_empty() => 0.0,
        Some(FlexibleFloat::Str(s)) => s.trim().parse().map_err(serde::de::Error::custom)?,
    };
    Ok(finite_or_zero(value))
}

/// NaN and infinities (which `f64::from_str` accepts) become 0
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Deserialize an enum through its case-insensitive `FromStr`
pub(crate) fn deserialize_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

fn deserialize_flexible_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleInt {
        Int(i64),
        Float(f64),
        Str(String),
    }

    match Option::<FlexibleInt>::deserialize(deserializer)? {
        None => Ok(0),
        Some(FlexibleInt::Int(i)) => Ok(i),
        Some(FlexibleInt::Float(f)) => Ok(f as i64),
        Some(FlexibleInt::Str(s)) if s.trim().is_empty() => Ok(0),
        Some(FlexibleInt::Str(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|f| f as i64))
                .map_err(serde::de::Error::custom)
        }
    }
}

/// Deserialize a string field that may be null
fn deserialize_nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_lot_size() -> i64 {
    1
}

/// Error returned when parsing one of the order enums from text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

// ============================================================================
// Order Enums
// ============================================================================

/// Transaction side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    #[default]
    Buy,
    Sell,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Buy, Side::Sell];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl FromStr for Side {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(ParseEnumError {
                kind: "side",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Side {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_from_str(deserializer)
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum OrderType {
    #[default]
    #[serde(rename = "MARKET")]
    Market,
    #[serde(rename = "LIMIT")]
    Limit,
    #[serde(rename = "SL")]
    StopLoss,
    #[serde(rename = "SL-Market")]
    StopLossMarket,
}

impl OrderType {
    /// Tab order as shown in the widget
    pub const ALL: [OrderType; 4] = [
        OrderType::Market,
        OrderType::Limit,
        OrderType::StopLoss,
        OrderType::StopLossMarket,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
            OrderType::StopLoss => "SL",
            OrderType::StopLossMarket => "SL-Market",
        }
    }

    /// The limit price does not apply to market-priced orders
    pub fn price_disabled(&self) -> bool {
        matches!(self, OrderType::Market | OrderType::StopLossMarket)
    }

    /// Only stop-loss orders carry a trigger price
    pub fn trigger_disabled(&self) -> bool {
        !matches!(self, OrderType::StopLoss | OrderType::StopLossMarket)
    }
}

impl FromStr for OrderType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MARKET" => Ok(OrderType::Market),
            "LIMIT" => Ok(OrderType::Limit),
            "SL" => Ok(OrderType::StopLoss),
            "SL-MARKET" | "SL-M" => Ok(OrderType::StopLossMarket),
            _ => Err(ParseEnumError {
                kind: "order type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_from_str(deserializer)
    }
}

/// Product type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductType {
    Intraday,
    #[default]
    Carryforward,
}

impl ProductType {
    pub const ALL: [ProductType; 2] = [ProductType::Intraday, ProductType::Carryforward];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Intraday => "INTRADAY",
            ProductType::Carryforward => "CARRYFORWARD",
        }
    }
}

impl FromStr for ProductType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INTRADAY" => Ok(ProductType::Intraday),
            "CARRYFORWARD" => Ok(ProductType::Carryforward),
            _ => Err(ParseEnumError {
                kind: "product type",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProductType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_from_str(deserializer)
    }
}

// ============================================================================
// Quote Types
// ============================================================================

fn clamp_price(value: f64) -> f64 {
    finite_or_zero(value).max(0.0)
}

/// One best-of-book level; all fields non-negative once normalized
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DepthLevel {
    #[serde(default, deserialize_with = "deserialize_flexible_f64")]
    pub bid_price: f64,
    #[serde(default, deserialize_with = "deserialize_flexible_i64")]
    pub bid_qty: i64,
    #[serde(default, deserialize_with = "deserialize_flexible_f64")]
    pub ask_price: f64,
    #[serde(default, deserialize_with = "deserialize_flexible_i64")]
    pub ask_qty: i64,
}

impl DepthLevel {
    pub fn normalized(self) -> Self {
        Self {
            bid_price: clamp_price(self.bid_price),
            bid_qty: self.bid_qty.max(0),
            ask_price: clamp_price(self.ask_price),
            ask_qty: self.ask_qty.max(0),
        }
    }
}

/// Instrument snapshot shown by the widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentQuote {
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub tradingsymbol: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub exchange: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub instrument: String,
    #[serde(default = "default_lot_size", deserialize_with = "deserialize_flexible_i64")]
    pub lot_size: i64,
    #[serde(default, deserialize_with = "deserialize_flexible_f64")]
    pub ltp: f64,
    #[serde(default, deserialize_with = "deserialize_flexible_f64")]
    pub prev_close: f64,
    #[serde(default)]
    pub depth: Vec<DepthLevel>,
}

impl Default for InstrumentQuote {
    /// The empty quote used before the first load and after a failed load
    fn default() -> Self {
        Self {
            tradingsymbol: String::new(),
            exchange: String::new(),
            instrument: String::new(),
            lot_size: default_lot_size(),
            ltp: 0.0,
            prev_close: 0.0,
            depth: Vec::new(),
        }
    }
}

impl InstrumentQuote {
    /// Clamp a freshly decoded quote into the shape the form relies on
    ///
    /// Lot size is at least 1, prices and quantities are finite and
    /// non-negative, and at most [`MAX_DEPTH_LEVELS`] levels are kept.
    pub fn normalized(mut self) -> Self {
        if self.lot_size < 1 {
            self.lot_size = 1;
        }
        self.ltp = clamp_price(self.ltp);
        self.prev_close = clamp_price(self.prev_close);
        self.depth.truncate(MAX_DEPTH_LEVELS);
        for level in &mut self.depth {
            *level = level.normalized();
        }
        self
    }

    /// Best level, if the book has any depth
    pub fn best_level(&self) -> Option<&DepthLevel> {
        self.depth.first()
    }
}

/// Response envelope of the quote endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteEnvelope {
    pub data: QuoteBody,
}

/// The endpoint has been seen both with and without a nested `data` object
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum QuoteBody {
    Nested { data: InstrumentQuote },
    Flat(InstrumentQuote),
}

impl QuoteEnvelope {
    pub fn into_quote(self) -> InstrumentQuote {
        match self.data {
            QuoteBody::Nested { data } => data,
            QuoteBody::Flat(quote) => quote,
        }
        .normalized()
    }
}

// ============================================================================
// Submission
// ============================================================================

/// Immutable order snapshot produced on submit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayload {
    pub side: Side,
    pub order_type: OrderType,
    pub product_type: ProductType,
    /// Total units, lots multiplied by lot size
    pub quantity: i64,
    pub price: f64,
    pub trigger_price: f64,
}
