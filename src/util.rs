use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub fn format_scientific(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let raw = format!("{value:.2e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    let exponent = exponent.parse::<i32>().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.abs())
}

pub fn format_grouped(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }

    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

pub fn stable_pair(id: &str) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scientific_pads_exponent() {
        assert_eq!(format_scientific(1.08e-9), "1.08e-09");
        assert_eq!(format_scientific(2.5e12), "2.50e+12");
        assert_eq!(format_scientific(0.0), "0.00e+00");
        assert_eq!(format_scientific(-3.4e-7), "-3.40e-07");
    }

    #[test]
    fn grouped_inserts_separators() {
        assert_eq!(format_grouped(0), "0");
        assert_eq!(format_grouped(999), "999");
        assert_eq!(format_grouped(1000), "1,000");
        assert_eq!(format_grouped(227070450), "227,070,450");
        assert_eq!(format_grouped(-1234567), "-1,234,567");
    }

    #[test]
    fn stable_pair_is_deterministic_and_bounded() {
        let first = stable_pair("chr1:100");
        let second = stable_pair("chr1:100");
        assert_eq!(first, second);
        assert!((-1.0..=1.0).contains(&first.0));
        assert!((-1.0..=1.0).contains(&first.1));
    }
}
