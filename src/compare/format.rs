use crate::compare::registry::FormatRule;
use serde_json::Value;

/// Format one raw stat value for display.
pub fn format_value(rule: FormatRule, value: Option<&Value>) -> String {
    match rule {
        FormatRule::Tenths => truthy_number(value).map_or_else(|| "0.0".to_string(), |n| to_fixed(n, 1)),
        FormatRule::Hundredths => {
            truthy_number(value).map_or_else(|| "0.00".to_string(), |n| to_fixed(n, 2))
        }
        FormatRule::Rate => truthy_number(value)
            .map_or_else(|| ".000".to_string(), |n| strip_leading_zero(to_fixed(n, 3))),
        FormatRule::Thousandths => {
            truthy_number(value).map_or_else(|| "0.000".to_string(), |n| to_fixed(n, 3))
        }
        FormatRule::WholeNumber => truthy_number(value)
            .map_or_else(|| "0".to_string(), |n| format!("{}", (n + 0.5).floor() as i64)),
        FormatRule::Raw => raw_display(value),
    }
}

/// Fixed-point formatting where an exact tie rounds away from zero.
/// `format!` alone would send `0.3125` to `.312`.
fn to_fixed(n: f64, places: usize) -> String {
    let step = 10f64.powi(places as i32);
    let scaled = n * step;
    // The product is exact only when the fused remainder is zero.
    let exact_tie = scaled.fract().abs() == 0.5 && n.mul_add(step, -scaled) == 0.0;
    if exact_tie {
        format!("{:.places$}", scaled.round() / step)
    } else {
        format!("{n:.places$}")
    }
}

/// The value as a number, or None when it is absent, zero, or not numeric.
fn truthy_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok()?,
        Value::Bool(true) => 1.0,
        _ => return None,
    };
    (n != 0.0 && n.is_finite()).then_some(n)
}

/// `0.287` → `.287`; `1.000` is left alone.
fn strip_leading_zero(formatted: String) -> String {
    match formatted.strip_prefix('0') {
        Some(rest) => rest.to_string(),
        None => formatted,
    }
}

fn raw_display(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "0".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fmt(rule: FormatRule, value: Value) -> String {
        format_value(rule, Some(&value))
    }

    #[test]
    fn falsy_values_format_to_zero_strings() {
        for empty in [json!(0), json!(null), json!(""), json!(false), json!("n/a")] {
            assert_eq!(fmt(FormatRule::Rate, empty.clone()), ".000");
            assert_eq!(fmt(FormatRule::Hundredths, empty.clone()), "0.00");
            assert_eq!(fmt(FormatRule::Tenths, empty.clone()), "0.0");
            assert_eq!(fmt(FormatRule::WholeNumber, empty), "0");
        }
        assert_eq!(format_value(FormatRule::Rate, None), ".000");
        assert_eq!(format_value(FormatRule::Thousandths, None), "0.000");
    }

    #[test]
    fn rate_stats_drop_only_a_leading_zero() {
        assert_eq!(fmt(FormatRule::Rate, json!(0.2874)), ".287");
        assert_eq!(fmt(FormatRule::Rate, json!(1)), "1.000");
        assert_eq!(fmt(FormatRule::Rate, json!(1.0467)), "1.047");
        assert_eq!(fmt(FormatRule::Rate, json!("0.301")), ".301");
    }

    #[test]
    fn decimal_stats_use_fixed_places() {
        assert_eq!(fmt(FormatRule::Tenths, json!(85.34)), "85.3");
        assert_eq!(fmt(FormatRule::Tenths, json!(-1.26)), "-1.3");
        assert_eq!(fmt(FormatRule::Hundredths, json!(2.1)), "2.10");
        assert_eq!(fmt(FormatRule::Thousandths, json!(0.8123)), "0.812");
    }

    #[test]
    fn exact_ties_round_away_from_zero() {
        assert_eq!(fmt(FormatRule::Rate, json!(0.3125)), ".313");
        assert_eq!(fmt(FormatRule::Tenths, json!(2.25)), "2.3");
        assert_eq!(fmt(FormatRule::Hundredths, json!(2.125)), "2.13");
        assert_eq!(fmt(FormatRule::Thousandths, json!(1.0625)), "1.063");
        assert_eq!(fmt(FormatRule::Tenths, json!(-1.25)), "-1.3");
    }

    #[test]
    fn near_ties_keep_their_binary_value() {
        // 1.005 is stored just below the tie.
        assert_eq!(fmt(FormatRule::Hundredths, json!(1.005)), "1.00");
        assert_eq!(fmt(FormatRule::Tenths, json!(0.35)), "0.3");
    }

    #[test]
    fn ops_plus_rounds_half_up() {
        assert_eq!(fmt(FormatRule::WholeNumber, json!(172.5)), "173");
        assert_eq!(fmt(FormatRule::WholeNumber, json!(99.4)), "99");
    }

    #[test]
    fn raw_values_pass_through_and_default_to_zero() {
        assert_eq!(fmt(FormatRule::Raw, json!(1648)), "1648");
        assert_eq!(fmt(FormatRule::Raw, json!("LAA")), "LAA");
        assert_eq!(fmt(FormatRule::Raw, json!(null)), "0");
        assert_eq!(format_value(FormatRule::Raw, None), "0");
    }
}
