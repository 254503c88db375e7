//! Order-entry form state
//!
//! Holds the draft the user edits and derives field availability and the
//! submission payload from it.

use crate::types::{finite_or_zero, InstrumentQuote, OrderPayload, OrderType, ProductType, Side};
use serde::{Deserialize, Serialize};

/// Mutable order draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub side: Side,
    pub order_type: OrderType,
    pub product_type: ProductType,
    /// Lots, at least 1
    pub quantity: i64,
    pub price: f64,
    pub trigger_price: f64,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self {
            side: Side::Buy,
            order_type: OrderType::Market,
            product_type: ProductType::Carryforward,
            quantity: 1,
            price: 0.0,
            trigger_price: 0.0,
        }
    }
}

/// Coerce numeric input text the way a number field does: blank or junk is 0
pub fn coerce_number(input: &str) -> f64 {
    let value = input.trim().parse::<f64>().unwrap_or(0.0);
    sanitize(value)
}

fn sanitize(value: f64) -> f64 {
    finite_or_zero(value)
}

/// Lots below one are raised to one
pub fn coerce_lots(lots: i64) -> i64 {
    lots.max(1)
}

impl OrderDraft {
    pub fn price_disabled(&self) -> bool {
        self.order_type.price_disabled()
    }

    pub fn trigger_disabled(&self) -> bool {
        self.order_type.trigger_disabled()
    }

    pub fn set_order_type(&mut self, order_type: OrderType) {
        self.order_type = order_type;
    }

    pub fn set_product_type(&mut self, product_type: ProductType) {
        self.product_type = product_type;
    }

    pub fn set_quantity(&mut self, lots: i64) {
        self.quantity = coerce_lots(lots);
    }

    /// Lots typed as text; fractional input is truncated
    pub fn set_quantity_input(&mut self, input: &str) {
        self.set_quantity(coerce_number(input) as i64);
    }

    pub fn set_price(&mut self, price: f64) {
        self.price = sanitize(price);
    }

    pub fn set_price_input(&mut self, input: &str) {
        self.price = coerce_number(input);
    }

    pub fn set_trigger_price(&mut self, trigger_price: f64) {
        self.trigger_price = sanitize(trigger_price);
    }

    pub fn set_trigger_price_input(&mut self, input: &str) {
        self.trigger_price = coerce_number(input);
    }

    /// Switch side and reprice from the best opposing level, if any
    pub fn set_side(&mut self, side: Side, quote: &InstrumentQuote) {
        self.side = side;
        self.reprice_from_depth(quote);
    }

    /// Ask for buys, bid for sells; untouched when the book is empty
    pub fn reprice_from_depth(&mut self, quote: &InstrumentQuote) {
        let Some(level) = quote.best_level() else {
            return;
        };
        let reference = match self.side {
            Side::Buy => level.ask_price,
            Side::Sell => level.bid_price,
        };
        self.price = sanitize(reference);
        self.trigger_price = self.price;
    }

    /// Lots converted to traded units
    pub fn total_quantity(&self, lot_size: i64) -> i64 {
        self.quantity.saturating_mul(lot_size.max(1))
    }

    /// Snapshot the draft, zeroing fields the order type does not use
    pub fn to_payload(&self, lot_size: i64) -> OrderPayload {
        OrderPayload {
            side: self.side,
            order_type: self.order_type,
            product_type: self.product_type,
            quantity: self.total_quantity(lot_size),
            price: if self.price_disabled() { 0.0 } else { self.price },
            trigger_price: if self.trigger_disabled() {
                0.0
            } else {
                self.trigger_price
            },
        }
    }
}
