/// Formats an obligation amount as `$1,234,567.89`.
///
/// Obligations can go negative (deobligation modifications); the sign goes
/// before the dollar sign.
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u128;
    let dollars = cents / 100;
    let fraction = cents % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        fraction
    )
}
