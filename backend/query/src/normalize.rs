use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Lowercase, decompose, drop combining marks and trim.
///
/// `"  Câmera "` and `"CAMERA"` both fold to `"camera"`.
pub fn fold(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    match folded.trim() {
        trimmed if trimmed.len() == folded.len() => folded,
        trimmed => trimmed.to_string(),
    }
}

/// Folded needle against a raw field.
pub fn matches(field: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }

    fold(field).contains(needle)
}

#[cfg(test)]
mod tests {
    use super::{fold, matches};

    #[test]
    fn test_accents() {
        assert_eq!(fold("Câmera"), "camera");
        assert_eq!(fold("AÇÃO"), "acao");
        assert_eq!(fold("José Antônio"), "jose antonio");
    }

    #[test]
    fn test_trim() {
        assert_eq!(fold("   notebook   "), "notebook");
        assert_eq!(fold(" \t\n"), "");
    }

    #[test]
    fn test_inner_whitespace_kept() {
        assert_eq!(fold("Notebook  Dell"), "notebook  dell");
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(fold(""), "");
    }

    #[test]
    fn test_matches() {
        assert!(matches("Câmera Fotográfica", "fotografica"));
        assert!(matches("anything", ""));
        assert!(!matches("Projetor", "camera"));
    }
}
