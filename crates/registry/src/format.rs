//! Display formatting for registry addresses and phone numbers.

/// Render a 10-digit number as `(AAA) BBB-CCCC`; anything else is returned unchanged.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..])
    } else {
        raw.to_string()
    }
}

/// Join the non-empty components with `", "`.
pub fn format_address<'a>(components: impl IntoIterator<Item = Option<&'a str>>) -> String {
    components
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_digits_are_grouped() {
        assert_eq!(format_phone("5551234567"), "(555) 123-4567");
        assert_eq!(format_phone("555-123-4567"), "(555) 123-4567");
        assert_eq!(format_phone("555.123.4567"), "(555) 123-4567");
    }

    #[test]
    fn other_lengths_pass_through() {
        assert_eq!(format_phone("5551234"), "5551234");
        assert_eq!(format_phone("+1 555 123 4567"), "+1 555 123 4567");
        assert_eq!(format_phone(""), "");
    }

    #[test]
    fn address_skips_missing_and_blank_parts() {
        let address = format_address([
            Some("123 Main St"),
            None,
            Some(""),
            Some("Springfield"),
            Some("IL"),
            Some("62701"),
        ]);
        assert_eq!(address, "123 Main St, Springfield, IL, 62701");
    }
}
