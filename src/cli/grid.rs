use super::ui;
use crate::core::format::format_number;
use crate::core::instrument::Instrument;
use crate::core::selection::Selection;
use crate::core::view::Tab;
use comfy_table::{Cell, Color};

fn quantity_headers(tab: Tab) -> (&'static str, &'static str) {
    match tab {
        Tab::Mep => ("Volumen ARS", "Volumen USD"),
        Tab::Favorites | Tab::Comparison => ("Cant. Compra / Vol. ARS", "Cant. Venta / Vol. USD"),
        _ => ("Cantidad Compra", "Cantidad Venta"),
    }
}

/// Renders one row per instrument, marking favorites and compared entries.
pub fn render_instruments(
    items: &[Instrument],
    tab: Tab,
    favorites: &Selection,
    comparison: &Selection,
) -> String {
    if items.is_empty() {
        let hint = match tab {
            Tab::Favorites => "Sin favoritos. Usá `fav SIMBOLO` para agregar uno.",
            _ => "Sin datos para mostrar.",
        };
        return ui::style_text(hint, ui::StyleType::Subtle);
    }

    let (bid_qty, ask_qty) = quantity_headers(tab);
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("♥"),
        ui::header_cell("⇄"),
        ui::header_cell("Símbolo"),
        ui::header_cell("Variación"),
        ui::header_cell("Compra"),
        ui::header_cell("Venta"),
        ui::header_cell(bid_qty),
        ui::header_cell(ask_qty),
    ]);

    for item in items {
        let key = item.key();
        let (change, qty_bid, qty_ask) = match item {
            Instrument::Equity(q) => (
                q.pct_change
                    .filter(|c| *c != 0.0)
                    .map_or_else(|| Cell::new(""), ui::change_cell),
                q.q_bid.unwrap_or_default(),
                q.q_ask.unwrap_or_default(),
            ),
            Instrument::Mep(q) => (
                Cell::new(""),
                q.v_ars.unwrap_or_default(),
                q.v_usd.unwrap_or_default(),
            ),
        };

        table.add_row(vec![
            ui::marker_cell("♥", favorites.contains(key), Color::Red),
            ui::marker_cell("⇄", comparison.contains(key), Color::Blue),
            Cell::new(key),
            change,
            ui::number_cell(format_number(item.bid().unwrap_or_default())),
            ui::number_cell(format_number(item.ask().unwrap_or_default())),
            ui::number_cell(format_number(qty_bid)),
            ui::number_cell(format_number(qty_ask)),
        ]);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instrument::tests::{equity, mep};

    #[test]
    fn test_render_instruments() {
        let mut stock = equity("GGAL", 6100.0, 6120.5);
        stock.pct_change = Some(-0.8);
        stock.q_bid = Some(300.0);
        let items = vec![Instrument::Equity(stock), Instrument::Mep(mep("AL30", 1180.0, 1190.0))];
        let mut favorites = Selection::new();
        favorites.toggle(items[1].clone());

        let output = render_instruments(&items, Tab::Favorites, &favorites, &Selection::new());

        assert!(output.contains("GGAL"));
        assert!(output.contains("AL30"));
        assert!(output.contains("-0.80%"));
        assert!(output.contains("6.120,5"));
        assert!(output.contains("1.190"));
        assert!(output.contains("Cant. Compra / Vol. ARS"));
    }

    #[test]
    fn test_render_empty_favorites_shows_hint() {
        let output = render_instruments(&[], Tab::Favorites, &Selection::new(), &Selection::new());
        assert!(output.contains("Sin favoritos"));
    }
}
