use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Print the envelope as tables: scalar result fields first, then one table
/// per list in the result (installments, loans, borrowers).
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => {
                print_result(result);
                print_footer(map);
            }
            _ => print_fields(map.iter()),
        },
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Map<String, Value>) {
    let (lists, scalars): (Vec<_>, Vec<_>) = result
        .iter()
        .partition(|(_, v)| matches!(v, Value::Array(items) if items.iter().all(Value::is_object)));

    if !scalars.is_empty() {
        print_fields(scalars.into_iter());
    }

    for (name, list) in lists {
        if let Value::Array(rows) = list {
            println!("\n{}:", title(name));
            print_rows(rows);
        }
    }
}

fn print_footer(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_fields<'a>(fields: impl Iterator<Item = (&'a String, &'a Value)>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(_)) = rows.first() else {
        if rows.is_empty() {
            println!("(none)");
        }
        for item in rows {
            println!("{}", format_value(item));
        }
        return;
    };

    let headers = row_columns(rows);
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows.iter().filter_map(Value::as_object) {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h).map(format_value).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}

/// Column names across all rows, in first-seen order. Rows may omit fields.
pub(crate) fn row_columns(rows: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows.iter().filter_map(Value::as_object) {
        for key in row.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn title(key: &str) -> String {
    let mut chars = key.replace('_', " ").chars().collect::<Vec<_>>();
    if let Some(c) = chars.first_mut() {
        *c = c.to_ascii_uppercase();
    }
    chars.into_iter().collect()
}

pub(crate) fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_title_from_key() {
        assert_eq!(title("installments"), "Installments");
        assert_eq!(title("borrowers"), "Borrowers");
    }

    #[test]
    fn test_row_columns_include_fields_missing_from_first_row() {
        let rows = vec![
            json!({"id": 1, "status": "active"}),
            json!({"id": 2, "status": "repaid", "rating": 5}),
        ];
        assert_eq!(row_columns(&rows), vec!["id", "status", "rating"]);
    }

    #[test]
    fn test_format_value_flattens_arrays() {
        assert_eq!(format_value(&json!(["a", 1, null])), "a, 1, -");
    }
}
