//! Render model
//!
//! Everything a host needs to paint the widget, derived from the quote,
//! the draft and the resolved theme. Colours are concrete values taken
//! from [`ThemeTokens`], never token names.

use crate::form::OrderDraft;
use crate::theme::ThemeTokens;
use crate::types::{InstrumentQuote, OrderType, ProductType, Side};
use serde::Serialize;

pub const FOOTER: &str = "Powered by Cirrus";
pub const DEPTH_TITLE: &str = "Market Depth";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetView {
    pub background: String,
    pub text_color: String,
    pub header: HeaderView,
    pub side_buttons: Vec<ButtonView>,
    pub product_tabs: Vec<TabView>,
    pub order_type_tabs: Vec<TabView>,
    pub lots: LotsView,
    pub price: FieldView,
    pub trigger_price: FieldView,
    pub submit: ButtonView,
    pub footer: &'static str,
    pub depth: DepthView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderView {
    pub tradingsymbol: String,
    pub exchange: String,
    pub exchange_bg: String,
    pub exchange_text: String,
    pub ltp: f64,
    /// `ltp - prev_close`, two decimals
    pub change: String,
    /// Change relative to ltp, two decimals; `0.00` when ltp is zero
    pub change_percent: String,
    pub change_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonView {
    pub label: String,
    pub background: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabView {
    pub label: &'static str,
    pub active: bool,
    pub background: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotsView {
    pub lots: i64,
    pub total_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub label: &'static str,
    /// Empty while the field is disabled
    pub value: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepthView {
    pub title: &'static str,
    pub panel_bg: String,
    pub head_bg: String,
    pub rows: Vec<DepthRowView>,
    pub ask_color: String,
    pub bid_color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepthRowView {
    pub ask_qty: i64,
    pub ask_price: f64,
    pub bid_price: f64,
    pub bid_qty: i64,
}

/// Absolute and percent change, formatted to two decimals
pub fn price_change(ltp: f64, prev_close: f64) -> (String, String) {
    let delta = ltp - prev_close;
    let percent = if ltp == 0.0 { 0.0 } else { delta / ltp * 100.0 };
    (format!("{:.2}", delta), format!("{:.2}", percent))
}

fn field_value(value: f64, disabled: bool) -> String {
    if disabled {
        String::new()
    } else {
        value.to_string()
    }
}

/// Build the view for an open widget
pub fn render(quote: &InstrumentQuote, draft: &OrderDraft, theme: &ThemeTokens) -> WidgetView {
    let (change, change_percent) = price_change(quote.ltp, quote.prev_close);
    let change_color = if quote.ltp >= quote.prev_close {
        &theme.positive_color
    } else {
        &theme.negative_color
    };

    let side_color = |side: Side| match side {
        Side::Buy => theme.buy_color.clone(),
        Side::Sell => theme.sell_color.clone(),
    };

    let side_buttons = Side::ALL
        .iter()
        .map(|&side| {
            let active = draft.side == side;
            ButtonView {
                label: match side {
                    Side::Buy => "Buy".to_string(),
                    Side::Sell => "Sell".to_string(),
                },
                background: if active {
                    side_color(side)
                } else {
                    theme.inactive_button.clone()
                },
                active,
            }
        })
        .collect();

    let tab = |label: &'static str, active: bool| TabView {
        label,
        active,
        background: if active {
            theme.buy_color.clone()
        } else {
            theme.tab_bg.clone()
        },
    };

    let product_tabs = ProductType::ALL
        .iter()
        .map(|p| tab(p.as_str(), draft.product_type == *p))
        .collect();
    let order_type_tabs = OrderType::ALL
        .iter()
        .map(|o| tab(o.as_str(), draft.order_type == *o))
        .collect();

    WidgetView {
        background: match draft.side {
            Side::Buy => theme.buy_bg.clone(),
            Side::Sell => theme.sell_bg.clone(),
        },
        text_color: theme.text_color.clone(),
        header: HeaderView {
            tradingsymbol: quote.tradingsymbol.clone(),
            exchange: quote.exchange.clone(),
            exchange_bg: theme.exchange_bg.clone(),
            exchange_text: theme.exchange_text.clone(),
            ltp: quote.ltp,
            change,
            change_percent,
            change_color: change_color.clone(),
        },
        side_buttons,
        product_tabs,
        order_type_tabs,
        lots: LotsView {
            lots: draft.quantity,
            total_quantity: draft.total_quantity(quote.lot_size),
        },
        price: FieldView {
            label: "Price",
            value: field_value(draft.price, draft.price_disabled()),
            disabled: draft.price_disabled(),
        },
        trigger_price: FieldView {
            label: "Trigger Price",
            value: field_value(draft.trigger_price, draft.trigger_disabled()),
            disabled: draft.trigger_disabled(),
        },
        submit: ButtonView {
            label: draft.side.to_string(),
            background: side_color(draft.side),
            active: true,
        },
        footer: FOOTER,
        depth: DepthView {
            title: DEPTH_TITLE,
            panel_bg: theme.panel_bg.clone(),
            head_bg: theme.table_head_bg.clone(),
            rows: quote
                .depth
                .iter()
                .map(|level| DepthRowView {
                    ask_qty: level.ask_qty,
                    ask_price: level.ask_price,
                    bid_price: level.bid_price,
                    bid_qty: level.bid_qty,
                })
                .collect(),
            ask_color: theme.negative_color.clone(),
            bid_color: theme.positive_color.clone(),
        },
    }
}
