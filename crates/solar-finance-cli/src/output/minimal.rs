use serde_json::Value;

/// Key answer fields, most specific first.
const PRIORITY_KEYS: [&str; 9] = [
    "payback_years",
    "irr",
    "roi_pct",
    "monthly_payment",
    "recommended_capacity_kwp",
    "total_lifetime_savings",
    "bill_with_vat",
    "monthly_kwh",
    "annual_yield_per_kwp",
];

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in order of priority, then in the
/// nested `metrics` of an analysis, then falls back to the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        let nested = map.get("metrics").and_then(Value::as_object);
        for key in &PRIORITY_KEYS {
            let found = map
                .get(*key)
                .filter(|v| !v.is_null())
                .or_else(|| nested.and_then(|m| m.get(*key)).filter(|v| !v.is_null()));
            if let Some(val) = found {
                println!("{}", format_minimal(val));
                return;
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
