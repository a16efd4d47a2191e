//! Number formatting for currency and resource displays.

/// Suffixes per thousand-step tier: K, M, B, T, then quadrillion onward.
const SUFFIXES: [&str; 12] = [
    "", "K", "M", "B", "T", "Qa", "Qi", "Sx", "Sp", "Oc", "No", "Dc",
];

/// Format a quantity with two decimals and a thousand-step suffix.
/// Values beyond the suffix table stay in the last tier rather than
/// overflowing into scientific notation.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }

    // Truncate toward zero: values below 1 stay in the bare tier.
    let tier = (value.abs().log10() / 3.0) as i32;
    if tier <= 0 {
        return format!("{value:.2}");
    }

    let tier = (tier as usize).min(SUFFIXES.len() - 1);
    let scaled = value / 1000f64.powi(tier as i32);
    format!("{scaled:.2}{}", SUFFIXES[tier])
}
