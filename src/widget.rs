//! Widget shell
//!
//! Owns the host-facing properties and drives the pipeline
//! property change -> diff -> recompute -> render. Only `open`, `cirrus_token`,
//! `mode` and `theme` have side effects beyond updating the draft.
//!
//! The first property application is the mount and is diffed against a
//! closed widget, so a widget that starts open with a token loads at once.
//!
//! Loading is returned to the caller as a [`WidgetEffect`]. `run_effects`
//! awaits it inline while borrowing the widget. To keep the widget usable
//! during a pending load, run the effect against a cloned loader with
//! [`WidgetEffect::run`] and hand the result to [`OrderWidget::apply_quote`].
//! There is no cancellation: a response that lands after close, or after a
//! newer open, simply overwrites the quote.

use crate::form::OrderDraft;
use crate::loader::QuoteLoader;
use crate::sink::OrderSink;
use crate::theme::{self, ColorSchemeProvider, ThemeMode, ThemeOverrides, ThemeTokens};
use crate::types::{InstrumentQuote, OrderPayload, OrderType, ProductType, Side};
use crate::view::{self, WidgetView};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Properties the embedding host can set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetProps {
    pub open: bool,
    pub cirrus_token: Option<String>,
    pub quantity: i64,
    pub trigger_price: f64,
    pub price: f64,
    pub side: Side,
    pub mode: ThemeMode,
    pub theme: ThemeOverrides,
}

impl Default for WidgetProps {
    fn default() -> Self {
        Self {
            open: true,
            cirrus_token: None,
            quantity: 1,
            trigger_price: 0.0,
            price: 0.0,
            side: Side::Buy,
            mode: ThemeMode::Auto,
            theme: ThemeOverrides::new(),
        }
    }
}

impl WidgetProps {
    fn token(&self) -> Option<&str> {
        self.cirrus_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Work the host must perform on behalf of the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEffect {
    LoadQuote { token: String },
}

impl WidgetEffect {
    /// Perform the effect without borrowing the widget
    pub async fn run(self, loader: QuoteLoader) -> InstrumentQuote {
        match self {
            WidgetEffect::LoadQuote { token } => loader.fetch(&token).await,
        }
    }
}

pub struct OrderWidget {
    props: WidgetProps,
    draft: OrderDraft,
    quote: InstrumentQuote,
    theme: ThemeTokens,
    loader: QuoteLoader,
    scheme: Arc<dyn ColorSchemeProvider>,
    sink: Arc<dyn OrderSink>,
    mounted: bool,
}

impl OrderWidget {
    /// Create an unmounted widget with default properties; the theme is
    /// resolved immediately. The first `set_props` (or setter) mounts it.
    pub fn new(
        loader: QuoteLoader,
        scheme: Arc<dyn ColorSchemeProvider>,
        sink: Arc<dyn OrderSink>,
    ) -> Self {
        let props = WidgetProps::default();
        let theme = theme::resolve(props.mode, &props.theme, scheme.as_ref());
        let draft = Self::seed_draft(&props);

        Self {
            props,
            draft,
            quote: InstrumentQuote::default(),
            theme,
            loader,
            scheme,
            sink,
            mounted: false,
        }
    }

    /// Create and mount a widget with the host's initial properties
    pub fn mount(
        loader: QuoteLoader,
        scheme: Arc<dyn ColorSchemeProvider>,
        sink: Arc<dyn OrderSink>,
        props: WidgetProps,
    ) -> (Self, Vec<WidgetEffect>) {
        let mut widget = Self::new(loader, scheme, sink);
        let effects = widget.set_props(props);
        (widget, effects)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn props(&self) -> &WidgetProps {
        &self.props
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn quote(&self) -> &InstrumentQuote {
        &self.quote
    }

    pub fn theme(&self) -> &ThemeTokens {
        &self.theme
    }

    pub fn loader(&self) -> &QuoteLoader {
        &self.loader
    }

    pub fn is_open(&self) -> bool {
        self.props.open
    }

    fn seed_draft(props: &WidgetProps) -> OrderDraft {
        let mut draft = OrderDraft {
            side: props.side,
            ..Default::default()
        };
        draft.set_quantity(props.quantity);
        draft.set_price(props.price);
        draft.set_trigger_price(props.trigger_price);
        draft
    }

    // ========================================================================
    // Host properties
    // ========================================================================

    /// Replace all properties, reacting to what changed
    pub fn set_props(&mut self, next: WidgetProps) -> Vec<WidgetEffect> {
        let prev = std::mem::replace(&mut self.props, next);
        let mounting = !std::mem::replace(&mut self.mounted, true);
        let mut effects = Vec::new();

        if mounting || prev.mode != self.props.mode || prev.theme != self.props.theme {
            self.apply_theme();
        }

        // before the mount the widget counts as closed
        let was_open = prev.open && !mounting;
        let opened = !was_open && self.props.open;
        let closed = !self.props.open && (was_open || mounting);

        if opened {
            self.draft = Self::seed_draft(&self.props);
            info!("Widget opened");
            if let Some(token) = self.props.token() {
                effects.push(WidgetEffect::LoadQuote {
                    token: token.to_string(),
                });
            }
        } else if closed {
            self.draft = OrderDraft::default();
            info!("Widget closed");
        } else {
            if prev.quantity != self.props.quantity {
                self.draft.set_quantity(self.props.quantity);
            }
            if prev.price != self.props.price {
                self.draft.set_price(self.props.price);
            }
            if prev.trigger_price != self.props.trigger_price {
                self.draft.set_trigger_price(self.props.trigger_price);
            }
            if prev.side != self.props.side {
                self.draft.side = self.props.side;
            }
        }

        effects
    }

    fn update_props(&mut self, f: impl FnOnce(&mut WidgetProps)) -> Vec<WidgetEffect> {
        let mut next = self.props.clone();
        f(&mut next);
        self.set_props(next)
    }

    pub fn set_open(&mut self, open: bool) -> Vec<WidgetEffect> {
        self.update_props(|p| p.open = open)
    }

    /// Backdrop click
    pub fn close(&mut self) {
        self.set_open(false);
    }

    /// Takes effect on the next open
    pub fn set_token(&mut self, token: impl Into<String>) -> Vec<WidgetEffect> {
        let token = token.into();
        self.update_props(|p| p.cirrus_token = Some(token))
    }

    pub fn set_mode(&mut self, mode: ThemeMode) -> Vec<WidgetEffect> {
        self.update_props(|p| p.mode = mode)
    }

    pub fn set_theme(&mut self, overrides: ThemeOverrides) -> Vec<WidgetEffect> {
        self.update_props(|p| p.theme = overrides)
    }

    /// Re-resolve tokens, e.g. after the ambient colour scheme changed
    pub fn apply_theme(&mut self) {
        self.theme = theme::resolve(self.props.mode, &self.props.theme, self.scheme.as_ref());
        debug!("Theme resolved for mode {}", self.props.mode);
    }

    // ========================================================================
    // Quote loading
    // ========================================================================

    /// Replace the quote wholesale
    pub fn apply_quote(&mut self, quote: InstrumentQuote) {
        self.quote = quote.normalized();
    }

    /// Perform effects in order, awaiting each load
    pub async fn run_effects(&mut self, effects: Vec<WidgetEffect>) {
        for effect in effects {
            let quote = effect.run(self.loader.clone()).await;
            self.apply_quote(quote);
        }
    }

    // ========================================================================
    // User interaction
    // ========================================================================

    pub fn select_side(&mut self, side: Side) {
        self.draft.set_side(side, &self.quote);
    }

    pub fn select_order_type(&mut self, order_type: OrderType) {
        self.draft.set_order_type(order_type);
    }

    pub fn select_product_type(&mut self, product_type: ProductType) {
        self.draft.set_product_type(product_type);
    }

    pub fn input_quantity(&mut self, input: &str) {
        self.draft.set_quantity_input(input);
    }

    pub fn input_price(&mut self, input: &str) {
        self.draft.set_price_input(input);
    }

    pub fn input_trigger_price(&mut self, input: &str) {
        self.draft.set_trigger_price_input(input);
    }

    pub fn total_quantity(&self) -> i64 {
        self.draft.total_quantity(self.quote.lot_size)
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// View for the current state; a closed widget renders nothing
    pub fn render(&self) -> Option<WidgetView> {
        if !self.props.open {
            return None;
        }
        Some(view::render(&self.quote, &self.draft, &self.theme))
    }

    /// Build the payload and hand it to the sink
    pub fn submit(&self) -> Option<OrderPayload> {
        if !self.props.open {
            return None;
        }
        let payload = self.draft.to_payload(self.quote.lot_size);
        self.sink.deliver(&payload);
        Some(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetConfig;
    use crate::loader::testing::{FakeHttp, NIFTY_QUOTE};
    use crate::sink::testing::RecordingSink;
    use crate::theme::FixedColorScheme;

    fn widget_with(http: Arc<FakeHttp>, dark: bool) -> (OrderWidget, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let widget = OrderWidget::new(
            QuoteLoader::new(http, WidgetConfig::default()),
            Arc::new(FixedColorScheme { dark }),
            sink.clone(),
        );
        (widget, sink)
    }

    fn token_props(token: &str) -> WidgetProps {
        WidgetProps {
            cirrus_token: Some(token.to_string()),
            ..Default::default()
        }
    }

    /// Widget mounted open with a token and loaded
    async fn open_loaded(http: Arc<FakeHttp>) -> (OrderWidget, Arc<RecordingSink>) {
        let (mut widget, sink) = widget_with(http, false);
        let effects = widget.set_props(token_props("tok-1"));
        widget.run_effects(effects).await;
        (widget, sink)
    }

    #[test]
    fn test_initial_state() {
        let (widget, _) = widget_with(FakeHttp::ok(NIFTY_QUOTE), true);
        assert!(widget.is_open());
        assert!(!widget.is_mounted());
        assert_eq!(widget.theme(), &ThemeTokens::dark());
        assert_eq!(widget.quote(), &InstrumentQuote::default());
        assert!(widget.render().is_some());
    }

    #[tokio::test]
    async fn test_mounting_open_with_token_loads() {
        let http = FakeHttp::ok(NIFTY_QUOTE);
        let (mut widget, _) = widget_with(http.clone(), false);

        let effects = widget.set_props(token_props("tok-1"));
        assert_eq!(effects, vec![WidgetEffect::LoadQuote { token: "tok-1".to_string() }]);
        assert!(widget.is_mounted());

        widget.run_effects(effects).await;
        assert_eq!(http.request_count(), 1);
        assert_eq!(widget.quote().tradingsymbol, "NIFTY24JUNFUT");
    }

    #[test]
    fn test_mount_constructor_emits_load() {
        let sink = Arc::new(RecordingSink::default());
        let (widget, effects) = OrderWidget::mount(
            QuoteLoader::new(FakeHttp::ok(NIFTY_QUOTE), WidgetConfig::default()),
            Arc::new(FixedColorScheme::default()),
            sink,
            token_props("tok-9"),
        );
        assert!(widget.is_mounted());
        assert_eq!(effects, vec![WidgetEffect::LoadQuote { token: "tok-9".to_string() }]);
    }

    #[test]
    fn test_open_with_token_emits_single_load() {
        let (mut widget, _) = widget_with(FakeHttp::ok(NIFTY_QUOTE), false);
        // mounting open without a token
        assert!(widget.set_mode(ThemeMode::Light).is_empty());

        // already open: setting the token alone does not load
        assert!(widget.set_token("tok-1").is_empty());

        widget.close();
        assert_eq!(
            widget.set_open(true),
            vec![WidgetEffect::LoadQuote { token: "tok-1".to_string() }]
        );
        // no transition, no load
        assert!(widget.set_open(true).is_empty());
    }

    #[test]
    fn test_mounting_closed_does_not_load() {
        let (mut widget, _) = widget_with(FakeHttp::ok(NIFTY_QUOTE), false);
        let effects = widget.set_props(WidgetProps {
            open: false,
            ..token_props("tok-1")
        });
        assert!(effects.is_empty());
        assert!(widget.render().is_none());

        assert_eq!(
            widget.set_open(true),
            vec![WidgetEffect::LoadQuote { token: "tok-1".to_string() }]
        );
    }

    #[test]
    fn test_open_without_token_does_not_load() {
        let (mut widget, _) = widget_with(FakeHttp::ok(NIFTY_QUOTE), false);
        assert!(widget.set_props(WidgetProps::default()).is_empty());

        widget.close();
        assert!(widget.set_open(true).is_empty());

        widget.close();
        widget.set_token("");
        assert!(widget.set_open(true).is_empty());
    }

    #[tokio::test]
    async fn test_load_and_submit_limit_buy() {
        let http = FakeHttp::ok(NIFTY_QUOTE);
        let (mut widget, sink) = open_loaded(http.clone()).await;
        assert_eq!(http.request_count(), 1);
        assert_eq!(widget.quote().lot_size, 50);

        widget.select_order_type(OrderType::Limit);
        widget.select_product_type(ProductType::Intraday);
        widget.select_side(Side::Buy);
        widget.input_quantity("2");

        let payload = widget.submit().unwrap();
        assert_eq!(
            payload,
            OrderPayload {
                side: Side::Buy,
                order_type: OrderType::Limit,
                product_type: ProductType::Intraday,
                quantity: 100,
                price: 22511.25,
                trigger_price: 0.0,
            }
        );
        assert_eq!(sink.payloads.lock().as_slice(), &[payload]);
    }

    #[tokio::test]
    async fn test_sell_stop_loss_market_zeroes_price() {
        let (mut widget, _) = open_loaded(FakeHttp::ok(NIFTY_QUOTE)).await;

        widget.select_side(Side::Sell);
        widget.select_order_type(OrderType::StopLossMarket);

        let payload = widget.submit().unwrap();
        assert_eq!(payload.price, 0.0);
        assert_eq!(payload.trigger_price, 22510.0);
    }

    #[tokio::test]
    async fn test_failed_load_renders_empty_quote() {
        let (widget, _) = open_loaded(FakeHttp::failing(503)).await;

        assert_eq!(widget.quote(), &InstrumentQuote::default());
        let view = widget.render().unwrap();
        assert_eq!(view.header.tradingsymbol, "");
        assert_eq!(view.header.change_percent, "0.00");
        assert!(view.depth.rows.is_empty());
    }

    #[tokio::test]
    async fn test_background_load_keeps_widget_usable() {
        let http = FakeHttp::ok(NIFTY_QUOTE);
        let (mut widget, sink) = widget_with(http, false);

        let mut effects = widget.set_props(token_props("tok-1"));
        let effect = effects.remove(0);
        let pending = tokio::spawn(effect.run(widget.loader().clone()));

        widget.close();
        assert!(widget.render().is_none());
        assert!(widget.submit().is_none());

        // a late response is a harmless overwrite
        widget.apply_quote(pending.await.unwrap());
        assert_eq!(widget.quote().tradingsymbol, "NIFTY24JUNFUT");
        assert!(widget.render().is_none());
        assert!(sink.payloads.lock().is_empty());
    }

    #[test]
    fn test_apply_quote_normalizes() {
        let (mut widget, _) = widget_with(FakeHttp::ok(NIFTY_QUOTE), false);
        widget.apply_quote(InstrumentQuote {
            ltp: f64::INFINITY,
            lot_size: 0,
            ..Default::default()
        });
        assert_eq!(widget.quote().ltp, 0.0);
        assert_eq!(widget.quote().lot_size, 1);
        assert_eq!(widget.render().unwrap().header.change, "0.00");
    }

    #[test]
    fn test_mode_and_theme_changes_reapply() {
        let (mut widget, _) = widget_with(FakeHttp::ok(NIFTY_QUOTE), false);
        assert_eq!(widget.theme(), &ThemeTokens::light());

        widget.set_mode(ThemeMode::Dark);
        assert_eq!(widget.theme(), &ThemeTokens::dark());

        widget.set_theme(ThemeOverrides::from([(
            "--sell-color".to_string(),
            "#ff0000".to_string(),
        )]));
        assert_eq!(widget.theme().sell_color, "#ff0000");
        assert_eq!(widget.theme().background, "#0f172a");

        widget.set_mode(ThemeMode::Light);
        assert_eq!(widget.theme().sell_color, "#ff0000");
        assert_eq!(widget.theme().background, "#ffffff");
    }

    #[test]
    fn test_host_props_seed_draft_on_open() {
        let (mut widget, _) = widget_with(FakeHttp::ok(NIFTY_QUOTE), false);
        widget.set_props(WidgetProps::default());
        widget.select_order_type(OrderType::StopLoss);
        widget.close();
        assert_eq!(widget.draft(), &OrderDraft::default());

        let mut props = widget.props().clone();
        props.open = true;
        props.quantity = 3;
        props.price = 101.0;
        props.trigger_price = 100.0;
        props.side = Side::Sell;
        widget.set_props(props);

        let draft = widget.draft();
        assert_eq!(draft.order_type, OrderType::Market);
        assert_eq!(draft.side, Side::Sell);
        assert_eq!(draft.quantity, 3);
        assert_eq!(draft.price, 101.0);
        assert_eq!(draft.trigger_price, 100.0);
    }

    #[test]
    fn test_host_price_update_while_open() {
        let (mut widget, _) = widget_with(FakeHttp::ok(NIFTY_QUOTE), false);
        widget.set_props(WidgetProps::default());

        let mut props = widget.props().clone();
        props.price = 42.0;
        props.quantity = 0;
        widget.set_props(props);

        assert_eq!(widget.draft().price, 42.0);
        assert_eq!(widget.draft().quantity, 1);
    }

    #[test]
    fn test_props_json_ignores_enum_case() {
        let props: WidgetProps = serde_json::from_str(
            r##"{"side": "sell", "mode": "DARK", "cirrus_token": "tok-1", "theme": {"buy-color": "#0f0"}}"##,
        )
        .unwrap();
        assert_eq!(props.side, Side::Sell);
        assert_eq!(props.mode, ThemeMode::Dark);
        assert!(props.open);

        let props: WidgetProps = serde_json::from_str(r#"{"side": "Buy", "mode": "Light"}"#).unwrap();
        assert_eq!(props.side, Side::Buy);
        assert_eq!(props.mode, ThemeMode::Light);

        assert!(serde_json::from_str::<WidgetProps>(r#"{"mode": "sepia"}"#).is_err());
    }
}
