use super::ui;
use crate::core::instrument::Instrument;
use crate::core::selection::COMPARISON_CAPACITY;
use crate::core::view::comparison_grid;
use comfy_table::Cell;

/// Renders the selected instruments side by side, one metric per row.
pub fn render_comparison(items: &[Instrument]) -> String {
    if items.is_empty() {
        return ui::style_text(
            &format!(
                "Seleccioná hasta {COMPARISON_CAPACITY} instrumentos para comparar con `cmp SIMBOLO`."
            ),
            ui::StyleType::Subtle,
        );
    }

    let (names, rows) = comparison_grid(items);

    let mut table = ui::new_styled_table();
    let mut header = vec![ui::header_cell("Métrica")];
    header.extend(names.iter().map(|name| ui::header_cell(name)));
    table.set_header(header);

    for row in rows {
        let mut cells = row.into_iter();
        let mut table_row = Vec::new();
        if let Some(label) = cells.next() {
            table_row.push(Cell::new(ui::style_text(&label, ui::StyleType::Subtle)));
        }
        table_row.extend(cells.map(ui::number_cell));
        table.add_row(table_row);
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instrument::tests::{equity, mep};

    #[test]
    fn test_render_comparison() {
        let items = vec![
            Instrument::Equity(equity("YPFD", 38000.0, 38100.0)),
            Instrument::Mep(mep("GD30", 1200.0, 1210.0)),
        ];

        let output = render_comparison(&items);

        assert!(output.contains("Métrica"));
        assert!(output.contains("YPFD"));
        assert!(output.contains("GD30"));
        assert!(output.contains("38.100"));
        assert!(output.contains("MEP Implícito"));
        assert!(output.contains("1.210"));
    }

    #[test]
    fn test_render_empty_comparison() {
        let output = render_comparison(&[]);
        assert!(output.contains("hasta 4 instrumentos"));
    }
}
