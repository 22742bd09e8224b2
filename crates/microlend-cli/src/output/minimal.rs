use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;

use super::table::format_value;

/// Money fields that answer "how much", in order of preference.
const MONEY_KEYS: [&str; 4] = [
    "current_due",
    "amount_due_with_penalty",
    "penalty_amount",
    "total",
];

/// Print just the key answer from the output: the headline money figure in
/// cents, or the standing of a borrower. Falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in MONEY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                println!("{}", to_cents(val));
                return;
            }
        }

        if let Some(standing) = map.get("standing").and_then(Value::as_str) {
            println!("{}", standing);
            return;
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_value(val));
            return;
        }
    }

    println!("{}", format_value(result_obj));
}

fn to_cents(value: &Value) -> String {
    let text = format_value(value);
    match Decimal::from_str(&text) {
        Ok(d) => d
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .to_string(),
        Err(_) => text,
    }
}
