use anyhow::{anyhow, Result};
use cirrus_order_widget::theme::EnvColorScheme;
use cirrus_order_widget::{
    init_tracing, LogSink, OrderType, OrderWidget, ProductType, QuoteLoader, Side, ThemeMode,
    ThemeOverrides, WidgetConfig, WidgetProps,
};
use clap::Parser;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "cirrus-widget", about = "Open the Cirrus order widget for a token and print its view")]
struct Args {
    /// Instrument token passed as `cirrus_token`
    token: String,
    #[arg(long, default_value = "auto")]
    mode: ThemeMode,
    /// Theme override, `name=value`; repeatable
    #[arg(long = "theme", value_parser = parse_override)]
    overrides: Vec<(String, String)>,
    #[arg(long)]
    side: Option<Side>,
    #[arg(long)]
    order_type: Option<OrderType>,
    #[arg(long)]
    product: Option<ProductType>,
    #[arg(long)]
    lots: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    trigger_price: Option<String>,
    /// Submit after applying the interactions
    #[arg(long, default_value_t = false)]
    submit: bool,
}

fn parse_override(s: &str) -> Result<(String, String)> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("theme override must be name=value, got '{}'", s))?;
    Ok((key.trim().to_string(), value.trim().to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = WidgetConfig::from_env()?;
    let loader = QuoteLoader::from_config(config)?;
    let props = WidgetProps {
        cirrus_token: Some(args.token),
        mode: args.mode,
        theme: args.overrides.into_iter().collect::<ThemeOverrides>(),
        ..Default::default()
    };
    let (mut widget, effects) =
        OrderWidget::mount(loader, Arc::new(EnvColorScheme), Arc::new(LogSink), props);
    widget.run_effects(effects).await;

    if let Some(side) = args.side {
        widget.select_side(side);
    }
    if let Some(order_type) = args.order_type {
        widget.select_order_type(order_type);
    }
    if let Some(product) = args.product {
        widget.select_product_type(product);
    }
    if let Some(lots) = args.lots.as_deref() {
        widget.input_quantity(lots);
    }
    if let Some(price) = args.price.as_deref() {
        widget.input_price(price);
    }
    if let Some(trigger) = args.trigger_price.as_deref() {
        widget.input_trigger_price(trigger);
    }

    if let Some(view) = widget.render() {
        println!("{}", serde_json::to_string_pretty(&view)?);
    }

    if args.submit {
        if let Some(payload) = widget.submit() {
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}
