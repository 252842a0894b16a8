use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Parses a BI-RADS assessment from a dataset value
///
/// Accepts "BI-RADS 4", "birads4", "BI-RADS 4A", and bare digits. Only
/// categories 0 through 6 exist.
///
/// # Examples
///
/// ```
/// use mammotriage_core::parse_bi_rads;
///
/// assert_eq!(parse_bi_rads("BI-RADS 4"), Some(4));
/// assert_eq!(parse_bi_rads("3"), Some(3));
/// assert_eq!(parse_bi_rads("DENSITY C"), None);
/// ```
pub fn parse_bi_rads(value: &str) -> Option<u8> {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = REGEX.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:bi[\s_-]*rads[\s_-]*)?([0-6])[a-c]?\s*$")
            .expect("Failed to compile regex")
    });

    regex
        .captures(value)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Extracts the first label from a finding category list
///
/// The finding table stores categories as a list literal such as
/// `['Mass', 'Suspicious Calcification']`; a plain label is returned as is.
pub fn first_finding_category(value: &str) -> Option<String> {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = REGEX.get_or_init(|| {
        Regex::new(r#"['"]([^'"]+)['"]"#).expect("Failed to compile regex")
    });

    let label = match regex.captures(value).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => value.trim().trim_start_matches('[').trim_end_matches(']'),
    }
    .trim();

    if label.is_empty() {
        None
    } else {
        Some(label.to_string())
    }
}

/// Derives an annotation key from an image file path
///
/// Reference dataset images are named after their 32-character hexadecimal
/// identifier; any other file stem yields `None`.
///
/// # Examples
///
/// ```
/// use mammotriage_core::source_id_from_path;
/// use std::path::Path;
///
/// let path = Path::new("/data/images/4e3a578fe535ea4f5258d3f7f4419db8.png");
/// assert_eq!(
///     source_id_from_path(path).as_deref(),
///     Some("4e3a578fe535ea4f5258d3f7f4419db8")
/// );
/// assert_eq!(source_id_from_path(Path::new("scan.png")), None);
/// ```
pub fn source_id_from_path(path: &Path) -> Option<String> {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let regex =
        REGEX.get_or_init(|| Regex::new(r"^[0-9a-fA-F]{32}$").expect("Failed to compile regex"));

    let stem = path.file_stem()?.to_str()?;
    if regex.is_match(stem) {
        Some(stem.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("BI-RADS 1", Some(1))]
    #[case("BI-RADS 5", Some(5))]
    #[case("bi-rads 3", Some(3))]
    #[case("BIRADS4", Some(4))]
    #[case("BI-RADS 4A", Some(4))]
    #[case(" 2 ", Some(2))]
    #[case("BI-RADS 7", None)]
    #[case("BI-RADS", None)]
    #[case("", None)]
    #[case("DENSITY A", None)]
    fn test_parse_bi_rads(#[case] value: &str, #[case] expected: Option<u8>) {
        assert_eq!(parse_bi_rads(value), expected);
    }

    #[rstest]
    #[case("['Mass']", Some("Mass"))]
    #[case("['Suspicious Calcification', 'Mass']", Some("Suspicious Calcification"))]
    #[case("[\"Focal Asymmetry\"]", Some("Focal Asymmetry"))]
    #[case("Architectural Distortion", Some("Architectural Distortion"))]
    #[case("[Mass]", Some("Mass"))]
    #[case("[]", None)]
    #[case("  ", None)]
    fn test_first_finding_category(#[case] value: &str, #[case] expected: Option<&str>) {
        assert_eq!(first_finding_category(value).as_deref(), expected);
    }

    #[test]
    fn test_source_id_requires_hex_stem() {
        let id = "0123456789abcdefABCDEF0123456789";
        assert_eq!(
            source_id_from_path(Path::new(&format!("{}.dcm", id))).as_deref(),
            Some(id)
        );
        assert_eq!(source_id_from_path(Path::new("abc123.png")), None);
        assert_eq!(
            source_id_from_path(Path::new("0123456789abcdef0123456789abcdeg.png")),
            None
        );
        assert_eq!(source_id_from_path(Path::new("")), None);
    }
}
