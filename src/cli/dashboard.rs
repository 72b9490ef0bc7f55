//! Interactive dashboard session driven by line commands on stdin.

use super::{calculator, compare, grid, ui};
use crate::core::calculator::{CalculatorFeed, CalculatorLegs, LegQuotes, parse_amount};
use crate::core::config::AppConfig;
use crate::core::format::format_time_ago;
use crate::core::market::MarketDataProvider;
use crate::core::refresh::RefreshController;
use crate::core::selection::{COMPARISON_CAPACITY, Toggle};
use crate::core::state::{DashboardState, Store};
use crate::core::view::{self, Tab};
use anyhow::{Result, anyhow};
use chrono::Local;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

const HELP: &str = "Comandos:
  tab NOMBRE     cambiar de pestaña (stocks, bonds, ons, mep, favorites, comparison, calculator)
  search TEXTO   filtrar por símbolo (vacío para limpiar)
  fav SIMBOLO    agregar/quitar de favoritos
  cmp SIMBOLO    agregar/quitar de la comparación
  calc MONTO     calcular MEP para un monto en pesos
  refresh        actualizar ahora
  help           mostrar esta ayuda
  quit           salir";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Tab(Tab),
    Search(String),
    Favorite(String),
    Compare(String),
    Calc(Option<f64>),
    Refresh,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (name, arg) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(n, a)| (n, a.trim()));

        let require_arg = |what: &str| -> Result<String> {
            if arg.is_empty() {
                Err(anyhow!("Missing {} for `{}`", what, name))
            } else {
                Ok(arg.to_string())
            }
        };

        match name.to_lowercase().as_str() {
            "tab" | "t" => Ok(Command::Tab(require_arg("tab name")?.parse()?)),
            "search" | "s" | "/" => Ok(Command::Search(arg.to_string())),
            "fav" | "f" => Ok(Command::Favorite(require_arg("symbol")?)),
            "cmp" | "c" => Ok(Command::Compare(require_arg("symbol")?)),
            "calc" => Ok(Command::Calc(parse_amount(arg))),
            "refresh" | "r" => Ok(Command::Refresh),
            "help" | "h" | "?" => Ok(Command::Help),
            "quit" | "q" | "exit" => Ok(Command::Quit),
            // A bare tab name switches to it
            other => other
                .parse::<Tab>()
                .map(Command::Tab)
                .map_err(|_| anyhow!("Unknown command: {}. Type `help`.", line)),
        }
    }
}

/// Refresh controller status shown in the header.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshStatus {
    pub refreshing: bool,
    pub cooldown_remaining: Duration,
}

impl RefreshStatus {
    fn of(controller: &RefreshController) -> Self {
        Self {
            refreshing: controller.is_refreshing(),
            cooldown_remaining: controller.cooldown_remaining(),
        }
    }
}

/// Per-session view state, owned by the input loop.
#[derive(Debug, Default)]
pub struct Session {
    pub tab: Tab,
    pub search: String,
    pub amount: Option<f64>,
    pub message: Option<String>,
}

impl Session {
    /// Applies a command. Returns false when the session should end. A
    /// refresh is started in the background; the store notifies on completion.
    pub fn execute(&mut self, command: Command, controller: &Arc<RefreshController>) -> bool {
        debug!(?command, "Executing command");
        self.message = None;
        match command {
            Command::Tab(tab) => self.tab = tab,
            Command::Search(term) => self.search = term,
            Command::Favorite(key) => {
                let tab = self.tab;
                let outcome = controller.store().update(|state| {
                    view::resolve(state, tab, &key)
                        .map(|item| (item.key().to_string(), state.favorites.toggle(item)))
                });
                self.message = Some(match outcome {
                    Some((key, Toggle::Added)) => format!("{key} agregado a favoritos"),
                    Some((key, _)) => format!("{key} quitado de favoritos"),
                    None => format!("Instrumento no encontrado: {key}"),
                });
            }
            Command::Compare(key) => {
                let tab = self.tab;
                let outcome = controller.store().update(|state| {
                    view::resolve(state, tab, &key)
                        .map(|item| (item.key().to_string(), state.comparison.toggle(item)))
                });
                self.message = Some(match outcome {
                    Some((key, Toggle::Added)) => format!("{key} agregado a la comparación"),
                    Some((key, Toggle::Removed)) => format!("{key} quitado de la comparación"),
                    Some((_, Toggle::Rejected)) => {
                        format!("Se pueden comparar hasta {COMPARISON_CAPACITY} instrumentos")
                    }
                    None => format!("Instrumento no encontrado: {key}"),
                });
            }
            Command::Calc(amount) => {
                self.amount = amount;
                self.tab = Tab::Calculator;
            }
            Command::Refresh => {
                if !controller.trigger_manual() {
                    self.message = Some(if controller.is_refreshing() {
                        "Actualización en curso".to_string()
                    } else {
                        format!(
                            "Actualización no disponible todavía ({}s)",
                            controller.cooldown_remaining().as_secs()
                        )
                    });
                }
            }
            Command::Help => self.message = Some(HELP.to_string()),
            Command::Quit => return false,
        }
        true
    }
}

fn render_tab_bar(active: Tab) -> String {
    Tab::ALL
        .iter()
        .map(|tab| {
            if *tab == active {
                ui::style_text(&format!(" {} ", tab.title()), ui::StyleType::ActiveTab)
            } else {
                format!(" {} ", tab.title())
            }
        })
        .collect::<Vec<_>>()
        .join("│")
}

/// Last update, refresh activity and the last error, if any.
pub fn render_status(state: &DashboardState, status: RefreshStatus) -> String {
    let updated = state.last_update.map_or("sin datos".to_string(), |t| {
        format_time_ago(t, Local::now())
    });
    let mut line = format!(
        "{} {}",
        ui::style_text("Última actualización:", ui::StyleType::Subtle),
        updated
    );

    if status.refreshing {
        line.push_str(&format!("  {}", ui::style_text("⟳ actualizando", ui::StyleType::Value)));
    } else if !status.cooldown_remaining.is_zero() {
        line.push_str(&format!(
            "  {}",
            ui::style_text(
                &format!("refresh en {}s", status.cooldown_remaining.as_secs()),
                ui::StyleType::Subtle
            )
        ));
    }

    if let Some(error) = &state.last_error {
        line.push_str(&format!(
            "\n{}",
            ui::style_text(&format!("Error al actualizar: {error}"), ui::StyleType::Error)
        ));
    }
    line
}

/// Renders the body of one tab.
pub fn render_tab(
    state: &DashboardState,
    tab: Tab,
    search: &str,
    legs: &CalculatorLegs,
    quotes: &LegQuotes,
    amount: Option<f64>,
) -> String {
    match tab {
        Tab::Calculator => calculator::render_calculator(legs, quotes, amount),
        Tab::Comparison => compare::render_comparison(state.comparison.items()),
        _ => {
            let items = view::tab_items(state, tab, search);
            grid::render_instruments(&items, tab, &state.favorites, &state.comparison)
        }
    }
}

pub fn render_screen(
    state: &DashboardState,
    session: &Session,
    status: RefreshStatus,
    legs: &CalculatorLegs,
    quotes: &LegQuotes,
) -> String {
    let mut output = render_tab_bar(session.tab);
    output.push('\n');
    if session.tab.is_searchable() && !session.search.is_empty() {
        output.push_str(&format!(
            "{} {}\n",
            ui::style_text("Buscar por símbolo:", ui::StyleType::Subtle),
            session.search
        ));
    }
    output.push_str(&render_status(state, status));
    output.push_str("\n\n");
    output.push_str(&render_tab(
        state,
        session.tab,
        &session.search,
        legs,
        quotes,
        session.amount,
    ));
    if let Some(message) = &session.message {
        output.push_str(&format!("\n\n{message}"));
    }
    output.push_str(&format!(
        "\n\n{}",
        ui::style_text("`help` para ver los comandos", ui::StyleType::Subtle)
    ));
    output
}

fn draw(store: &Store, session: &Session, controller: &RefreshController, feed: &CalculatorFeed) {
    let screen = store.read(|state| {
        render_screen(
            state,
            session,
            RefreshStatus::of(controller),
            feed.legs(),
            &feed.quotes(),
        )
    });
    let term = console::Term::stdout();
    let _ = term.clear_screen();
    println!("{screen}");
    print!("> ");
    let _ = std::io::Write::flush(&mut std::io::stdout());
}

pub async fn run(provider: Arc<dyn MarketDataProvider>, config: &AppConfig) -> Result<()> {
    let store = Store::new();
    let controller = Arc::new(RefreshController::new(
        Arc::clone(&provider),
        store.clone(),
        config.refresh_interval(),
    ));
    let feed = Arc::new(CalculatorFeed::new(provider, config.calculator.clone()));

    let refresh_handle = controller.spawn();
    let feed_handle = feed.spawn(config.refresh_interval());
    info!(interval = ?controller.interval(), "Dashboard started");

    let mut state_rx = store.subscribe();
    let mut quotes_rx = feed.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session = Session::default();

    draw(&store, &session, &controller, &feed);
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    session.message = None;
                } else {
                    match line.parse::<Command>() {
                        Ok(command) => {
                            if !session.execute(command, &controller) {
                                break;
                            }
                        }
                        Err(e) => session.message = Some(e.to_string()),
                    }
                }
            }
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = quotes_rx.changed(), if session.tab == Tab::Calculator => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
        draw(&store, &session, &controller, &feed);
    }

    refresh_handle.stop();
    feed_handle.stop();
    info!("Dashboard stopped");
    Ok(())
}
