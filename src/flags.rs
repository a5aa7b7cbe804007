/// Values accepted as "on" for boolean switches such as `--svgopt`
const TRUTHY: [&str; 3] = ["1", "true", "yes"];

/// Case-insensitive check of `value` against `1`, `true` and `yes`.
/// Anything else, including an empty string, is off.
pub fn parse_bool_flag(value: &str) -> bool {
    let value = value.trim();
    TRUTHY.iter().any(|truthy| truthy.eq_ignore_ascii_case(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_truthy_values_in_any_case() {
        for value in ["1", "true", "TRUE", "True", "yes", "YeS", " yes "] {
            assert!(parse_bool_flag(value), "{value:?} should be on");
        }
    }

    #[test]
    fn rejects_everything_else() {
        for value in ["", "0", "false", "no", "on", "y", "2", "truthy", "yes please"] {
            assert!(!parse_bool_flag(value), "{value:?} should be off");
        }
    }
}
