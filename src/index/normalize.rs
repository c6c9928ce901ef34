//! Name normalization for comparison.
//!
//! Search keys are derived from file names by case-folding and stripping
//! diacritics, so "Canción.mp3" and "cancion.MP3" compare equal.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a string for name comparison.
///
/// Lower-cases, applies NFKD decomposition, drops combining marks and trims
/// surrounding whitespace. Idempotent: normalizing twice yields the same
/// result as normalizing once.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_and_diacritics_fold_together() {
        assert_eq!(normalize("Café"), "cafe");
        assert_eq!(normalize("CAFÉ"), normalize("cafe"));
        assert_eq!(normalize("Canción de Cuna"), "cancion de cuna");
    }

    #[test]
    fn test_idempotent() {
        for s in ["Café", "  Árbol.mp3 ", "ñandú", "plain", ""] {
            assert_eq!(normalize(&normalize(s)), normalize(s));
        }
    }

    #[test]
    fn test_trims_surrounding_whitespace() {
        assert_eq!(normalize("  sonido.mp3  "), "sonido.mp3");
    }

    #[test]
    fn test_compatibility_decomposition() {
        // NFKD unfolds compatibility characters like the fi ligature
        assert_eq!(normalize("ﬁnal.mp4"), "final.mp4");
    }

    #[test]
    fn test_plain_ascii_unchanged() {
        assert_eq!(normalize("background.mp3"), "background.mp3");
    }
}
