//! Plausible-prose gate run before any AI call
//!
//! A heuristic, not a format sniffer. It should let every real plain-text
//! document through and catch the common cases of a binary file being read
//! as text.

use crate::error::ValidationFailure;

/// Control characters above this share of the text mean binary content
const MAX_CONTROL_RATIO: f64 = 0.10;

/// Characters outside the prose allow-list above this share mean mojibake
const MAX_ABNORMAL_RATIO: f64 = 0.30;

/// Substrings that only appear in binary document containers
const CONTAINER_MARKERS: &[&str] = &[
    "PK\u{3}\u{4}",
    "%PDF-",
    "[Content_Types].xml",
    "word/document.xml",
    "xl/workbook.xml",
    "ppt/presentation.xml",
];

/// Leading byte signatures that lossy UTF-8 decoding would erase
const BYTE_SIGNATURES: &[(&[u8], &str)] = &[(
    b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1",
    "OLE compound document",
)];

/// Turn raw file bytes into text for validation
///
/// Invalid UTF-8 becomes U+FFFD, which the prose check counts as abnormal,
/// so binary files reach `validate_content` instead of failing to decode.
pub fn decode_document(bytes: &[u8]) -> Result<String, ValidationFailure> {
    if let Some((_, name)) = BYTE_SIGNATURES.iter().find(|(sig, _)| bytes.starts_with(sig)) {
        return Err(ValidationFailure::UnsupportedContainer(*name));
    }
    Ok(String::from_utf8_lossy(bytes).into_owned())
}

/// Check that `text` looks like prose
pub fn validate_content(text: &str, min_chars: usize) -> Result<(), ValidationFailure> {
    let length = text.chars().count();
    if length == 0 || length < min_chars {
        return Err(ValidationFailure::TooShort {
            length,
            min: min_chars,
        });
    }

    if let Some(marker) = CONTAINER_MARKERS.iter().find(|m| text.contains(**m)) {
        return Err(ValidationFailure::UnsupportedContainer(*marker));
    }

    let control = text.chars().filter(|c| is_binary_control(*c)).count();
    if control as f64 / length as f64 > MAX_CONTROL_RATIO {
        return Err(ValidationFailure::BinaryOrCorrupt);
    }

    let abnormal = text.chars().filter(|c| !is_prose_char(*c)).count();
    if abnormal as f64 / length as f64 > MAX_ABNORMAL_RATIO {
        return Err(ValidationFailure::EncodingProblem);
    }

    Ok(())
}

/// C0 controls other than tab/newline/carriage return, plus DEL
fn is_binary_control(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{7F}')
}

fn is_prose_char(c: char) -> bool {
    c.is_alphanumeric()
        || c.is_whitespace()
        || c.is_ascii_punctuation()
        || matches!(c,
            '\u{3000}'..='\u{303F}'   // CJK symbols and punctuation
            | '\u{3040}'..='\u{30FF}' // Hiragana, Katakana
            | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
            | '\u{AC00}'..='\u{D7AF}' // Hangul syllables
            | '\u{FF00}'..='\u{FFEF}' // Half/full-width forms
            | '\u{2010}'..='\u{2027}' // Dashes, quotes, bullets
            | '\u{00B7}' | '\u{00A0}'
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROSE: &str = "The onboarding procedure starts with an orientation \
        session run by the personnel department on the first Monday.";

    #[test]
    fn test_accepts_plain_prose() {
        assert_eq!(validate_content(PROSE, 50), Ok(()));
    }

    #[test]
    fn test_accepts_japanese_prose() {
        let text = "就業規則の第一章では、勤務時間と休憩について定めています。\
            社員は毎日午前九時までに出社し、所定の手続きに従って勤怠を記録すること。";
        assert_eq!(validate_content(text, 50), Ok(()));
    }

    #[test]
    fn test_rejects_empty_and_short() {
        assert!(matches!(
            validate_content("", 50),
            Err(ValidationFailure::TooShort { length: 0, .. })
        ));
        assert!(matches!(
            validate_content("hello", 50),
            Err(ValidationFailure::TooShort { length: 5, min: 50 })
        ));
    }

    #[test]
    fn test_rejects_control_characters() {
        let text = format!("{}{}", PROSE, "\u{1}\u{2}\u{3}".repeat(10));
        assert_eq!(
            validate_content(&text, 50),
            Err(ValidationFailure::BinaryOrCorrupt)
        );
    }

    #[test]
    fn test_tabs_and_newlines_are_not_control() {
        let text = format!("{}\n\t\r\n{}", PROSE, PROSE);
        assert_eq!(validate_content(&text, 50), Ok(()));
    }

    #[test]
    fn test_rejects_mojibake() {
        let text = format!("{}{}", "Report ", "\u{FFFD}\u{25A1}\u{2592}".repeat(20));
        assert_eq!(
            validate_content(&text, 50),
            Err(ValidationFailure::EncodingProblem)
        );
    }

    #[test]
    fn test_rejects_container_markers() {
        let text = format!("{} word/document.xml {}", PROSE, PROSE);
        assert_eq!(
            validate_content(&text, 50),
            Err(ValidationFailure::UnsupportedContainer("word/document.xml"))
        );

        let pdf = format!("%PDF-1.7 {}", PROSE);
        assert_eq!(
            validate_content(&pdf, 50),
            Err(ValidationFailure::UnsupportedContainer("%PDF-"))
        );
    }

    #[test]
    fn test_decode_keeps_utf8_text() {
        assert_eq!(decode_document(PROSE.as_bytes()).as_deref(), Ok(PROSE));
    }

    #[test]
    fn test_decode_rejects_ole_signature() {
        let mut bytes = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1".to_vec();
        bytes.extend_from_slice(PROSE.as_bytes());
        assert_eq!(
            decode_document(&bytes),
            Err(ValidationFailure::UnsupportedContainer("OLE compound document"))
        );
    }

    #[test]
    fn test_decoded_binary_fails_validation() {
        let bytes: Vec<u8> = (0x80..=0xFF).cycle().take(400).collect();
        let text = decode_document(&bytes).unwrap();
        assert_eq!(
            validate_content(&text, 50),
            Err(ValidationFailure::EncodingProblem)
        );
    }
}
