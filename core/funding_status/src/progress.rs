//! Funding progress and amount formatting.

/// Percentage of the goal collected, clamped to `[0, 100]`.
///
/// A goal of zero or less yields `0` instead of dividing, as does any input
/// whose ratio is undefined (NaN, or infinity over infinity).
/// The value is not rounded; see [`format_percentage`] for display.
pub fn calculate_funding_progress(current_amount: f64, target_amount: f64) -> f64 {
    if !(target_amount > 0.0) {
        return 0.0;
    }
    let ratio = current_amount / target_amount * 100.0;
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, 100.0)
}

/// Amount still missing to reach the goal. Never negative.
pub fn remaining_amount(current_amount: f64, target_amount: f64) -> f64 {
    let remaining = target_amount - current_amount;
    if remaining.is_nan() {
        0.0
    } else {
        remaining.max(0.0)
    }
}

/// `50.4` → `"50%"`. Non-finite input renders as a dash.
pub fn format_percentage(progress: f64) -> String {
    if !progress.is_finite() {
        return "-".to_string();
    }
    format!("{}%", progress.round() as i64)
}

/// Whole currency units with thousands separators: `1234567.4` → `"1,234,567"`.
pub fn format_amount(amount: f64) -> String {
    if !amount.is_finite() {
        return "-".to_string();
    }

    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
