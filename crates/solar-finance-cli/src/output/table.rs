use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use tabled::{builder::Builder, Table};

use solar_finance_core::display::format_vnd_signed;

/// Field-name fragments that mark a VND amount.
const MONEY_MARKERS: [&str; 12] = [
    "bill",
    "payment",
    "investment",
    "savings",
    "interest",
    "cost",
    "amount",
    "balance",
    "principal",
    "debt_service",
    "capital",
    "cash_flow",
];

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_object(map);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    if let Value::Object(res_map) = result {
        print_object(res_map);

        // Schedules and yearly projections get a table each
        for (key, val) in res_map {
            if let Value::Array(rows) = val {
                if rows.first().is_some_and(Value::is_object) {
                    println!("\n{}:", key);
                    print_array_table(rows);
                }
            }
        }
        for (key, val) in res_map {
            if let Value::Object(nested) = val {
                for (inner, rows) in nested {
                    if let Value::Array(rows) = rows {
                        if rows.first().is_some_and(Value::is_object) {
                            println!("\n{}.{}:", key, inner);
                            print_array_table(rows);
                        }
                    }
                }
            }
        }
    } else {
        println!("{}", format_value("", result));
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

/// Two-column field/value table. Nested objects are flattened one level
/// (`metrics.irr`); arrays of objects are left for their own table.
fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        match val {
            Value::Object(nested) => {
                for (inner, v) in nested {
                    if !is_row_array(v) {
                        builder.push_record([format!("{}.{}", key, inner), format_value(inner, v)]);
                    }
                }
            }
            v if is_row_array(v) => {}
            v => builder.push_record([key.clone(), format_value(key, v)]),
        }
    }
    println!("{}", Table::from(builder));
}

fn is_row_array(value: &Value) -> bool {
    matches!(value, Value::Array(rows) if rows.first().is_some_and(Value::is_object))
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(|v| format_value(h, v)).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value("", item));
        }
    }
}

fn is_money_field(key: &str) -> bool {
    !key.ends_with("_pct") && MONEY_MARKERS.iter().any(|m| key.contains(m))
}

fn format_value(key: &str, value: &Value) -> String {
    match value {
        Value::String(s) if is_money_field(key) => match Decimal::from_str(s) {
            Ok(amount) => format_vnd_signed(amount),
            Err(_) => s.clone(),
        },
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(|v| format_value(key, v)).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
