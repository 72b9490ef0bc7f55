//! es-AR number and time formatting

use chrono::{DateTime, Local};

/// Formats with `.` thousands grouping and `,` decimals, keeping between
/// `min_fraction` and `max_fraction` fraction digits.
fn format_grouped(value: f64, min_fraction: usize, max_fraction: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.*}", max_fraction, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((&fixed, ""));

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < min_fraction {
        frac.push('0');
    }

    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*ch);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac.chars().all(|c| c == '0');
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped},{frac}")
    }
}

/// Plain number, up to three decimals: `1234567.891` -> `1.234.567,891`.
pub fn format_number(value: f64) -> String {
    format_grouped(value, 0, 3)
}

/// Number with exactly `decimals` fraction digits.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    format_grouped(value, decimals, decimals)
}

/// Signed percentage with two decimals: `1.5` -> `+1.50%`.
pub fn format_percentage(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{sign}{value:.2}%")
}

/// Peso amount: `1234.5` -> `$ 1.234,50`.
pub fn format_currency(value: f64) -> String {
    let amount = format_fixed(value.abs(), 2);
    if value < 0.0 && amount != "0,00" {
        format!("-$ {amount}")
    } else {
        format!("$ {amount}")
    }
}

/// Relative time in Spanish, falling back to the date after a day.
pub fn format_time_ago(then: DateTime<Local>, now: DateTime<Local>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    if seconds < 60 {
        return format!("hace {seconds} segundos");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("hace {minutes} minutos");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("hace {hours} horas");
    }
    then.format("%d/%m/%Y").to_string()
}
