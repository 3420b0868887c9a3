//! Small helpers shared by the server and the client.

use chrono::NaiveDate;

/// Parse a book id taken from a URL path segment.
///
/// Surrounding whitespace is ignored. Numeric forms that denote a whole
/// number (`1.0`, `1e0`) name the same id as `1`; anything else yields
/// `None`, which callers treat as "no such book".
pub fn parse_id(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<i64>() {
        return Some(id);
    }

    let value = raw.parse::<f64>().ok()?;
    let integral = value.is_finite() && value.fract() == 0.0;
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (integral && in_range).then_some(value as i64)
}

/// Count of books in Portuguese, e.g. `1 livro`, `3 livros`.
pub fn livros_label(count: usize) -> String {
    if count == 1 {
        "1 livro".to_string()
    } else {
        format!("{count} livros")
    }
}

/// `dd/mm/yyyy`, the way dates are shown to users.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Price in reais with two decimals.
pub fn format_price(preco: f64) -> String {
    format!("R$ {:.2}", preco)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_fractions_and_text() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id(" 7 "), Some(7));
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("1.5"), None);
        assert_eq!(parse_id("inf"), None);
        assert_eq!(parse_id("NaN"), None);
        assert_eq!(parse_id(""), None);
    }

    #[test]
    fn parse_id_accepts_whole_number_float_forms() {
        assert_eq!(parse_id("1.0"), Some(1));
        assert_eq!(parse_id("1e0"), Some(1));
        assert_eq!(parse_id("2.5e1"), Some(25));
        assert_eq!(parse_id("-0.0"), Some(0));
        assert_eq!(parse_id("1e300"), None);
    }

    #[test]
    fn book_counts_are_pluralized() {
        assert_eq!(livros_label(0), "0 livros");
        assert_eq!(livros_label(1), "1 livro");
        assert_eq!(livros_label(2), "2 livros");
    }

    #[test]
    fn formats_for_display() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(format_date(date), "09/03/2024");
        assert_eq!(format_price(9.5), "R$ 9.50");
    }
}
