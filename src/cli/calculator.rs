use super::ui;
use crate::core::calculator::{CalculatorLegs, LegQuotes};
use crate::core::format::{format_currency, format_fixed};
use comfy_table::Cell;

const PLACEHOLDER: &str = "-";

/// Renders the calculator for `amount` pesos against the current leg quotes.
pub fn render_calculator(legs: &CalculatorLegs, quotes: &LegQuotes, amount: Option<f64>) -> String {
    let result = quotes.calculate(amount);
    let buy_ask = quotes.buy.as_ref().and_then(|q| q.px_ask);
    let sell_bid = quotes.sell.as_ref().and_then(|q| q.px_bid);

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Calculadora MEP"), ui::header_cell("")]);

    let placeholder =
        |value: Option<String>| ui::number_cell(value.unwrap_or_else(|| PLACEHOLDER.to_string()));
    let rows = [
        (
            "Monto a invertir (ARS)".to_string(),
            placeholder(amount.map(format_currency)),
        ),
        (
            format!("Precio {} (ARS)", legs.buy_symbol),
            ui::format_optional_cell(buy_ask, format_currency),
        ),
        (
            "Nominales a recibir".to_string(),
            placeholder(result.map(|r| format_fixed(r.nominals, 2))),
        ),
        (
            format!("Precio {} (USD)", legs.sell_symbol),
            ui::format_optional_cell(sell_bid, format_currency),
        ),
        (
            "USD MEP a recibir".to_string(),
            placeholder(result.map(|r| format_fixed(r.usd_received, 2))),
        ),
        (
            "Tipo de cambio MEP resultante".to_string(),
            placeholder(result.map(|r| format_currency(r.implied_rate))),
        ),
    ];

    for (label, value) in rows {
        table.add_row(vec![
            Cell::new(ui::style_text(&label, ui::StyleType::Label)),
            value,
        ]);
    }

    table.to_string()
}
