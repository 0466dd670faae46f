use once_cell::sync::Lazy;
use regex::Regex;

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n]+").unwrap());

/// Collapse line breaks to a single space, then upper-case and trim.
pub fn normalize_text(raw: &str) -> String {
    LINE_BREAKS
        .replace_all(raw, " ")
        .to_uppercase()
        .trim()
        .to_string()
}

/// Drop the `.0` a float-typed zip code picks up on the way through JSON.
pub fn clean_zip(raw: &str) -> String {
    raw.strip_suffix(".0").unwrap_or(raw).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_upper_trimmed_single_line() {
        assert_eq!(normalize_text("des moines\n"), "DES MOINES");
        assert_eq!(normalize_text("  123 main st\r\n\r\napt 4 "), "123 MAIN ST APT 4");
        assert_eq!(normalize_text("ALREADY CLEAN"), "ALREADY CLEAN");
    }

    #[test]
    fn zip_suffix_stripped_once() {
        assert_eq!(clean_zip("50309.0"), "50309");
        assert_eq!(clean_zip("50309"), "50309");
        assert_eq!(clean_zip("50309.01"), "50309.01");
    }
}
