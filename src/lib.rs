//! Cirrus Order Widget
//!
//! A headless order-entry widget: loads an instrument quote for a
//! `cirrus_token`, keeps the order draft, resolves light/dark theme tokens
//! and derives the render model and submission payload.

pub mod config;
pub mod error;
pub mod form;
pub mod loader;
pub mod sink;
pub mod theme;
pub mod types;
pub mod view;
pub mod widget;

pub use config::WidgetConfig;
pub use error::{AppError, Result};
pub use form::OrderDraft;
pub use loader::{HttpClient, QuoteLoader, ReqwestClient};
pub use sink::{LogSink, OrderSink};
pub use theme::{ColorSchemeProvider, ThemeMode, ThemeOverrides, ThemeTokens};
pub use types::{DepthLevel, InstrumentQuote, OrderPayload, OrderType, ProductType, Side};
pub use view::WidgetView;
pub use widget::{OrderWidget, WidgetEffect, WidgetProps};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging, honouring `RUST_LOG`
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cirrus_order_widget=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
