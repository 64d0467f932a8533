use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Result, ToolkitError};

lazy_static! {
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

/// Lowercases `s` and collapses every run of characters outside `[a-z0-9]` into `-`.
pub fn slugify(s: &str) -> Result<String> {
    if s.is_empty() {
        return Err(ToolkitError::EmptySlugInput);
    }

    let lowered = s.to_lowercase();
    let slug = NON_SLUG_CHARS
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string();

    if slug.is_empty() {
        return Err(ToolkitError::EmptySlug);
    }

    Ok(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        let cases = [
            ("hello there", Some("hello-there")),
            ("", None),
            ("hello there 123 $%^!&&*&!%^!", Some("hello-there-123")),
            ("こんにちは", None),
            ("hello there こんにちは 1234", Some("hello-there-1234")),
            ("  Already-Slugged  ", Some("already-slugged")),
        ];

        for (input, expected) in cases {
            match expected {
                Some(slug) => assert_eq!(slugify(input).unwrap(), slug, "input: {:?}", input),
                None => assert!(slugify(input).is_err(), "input: {:?}", input),
            }
        }
    }

    #[test]
    fn test_slugify_error_kinds() {
        assert!(matches!(slugify(""), Err(ToolkitError::EmptySlugInput)));
        assert!(matches!(slugify("!!!"), Err(ToolkitError::EmptySlug)));
    }
}
