//! Hiragana ↔ katakana mapping.
//!
//! The two syllabaries are laid out in parallel, 0x60 code points apart.
//! Characters outside the mapped ranges pass through unchanged.

use kanascribe_settings::KanaTarget;

const SHIFT: u32 = 0x60;

fn is_mappable_hiragana(c: char) -> bool {
    matches!(c, '\u{3041}'..='\u{3096}' | '\u{309D}'..='\u{309E}')
}

fn is_mappable_katakana(c: char) -> bool {
    matches!(c, '\u{30A1}'..='\u{30F6}' | '\u{30FD}'..='\u{30FE}')
}

/// `カタカナ` → `かたかな`.
pub fn katakana_to_hiragana(text: &str) -> String {
    text.chars()
        .map(|c| {
            if is_mappable_katakana(c) {
                char::from_u32(c as u32 - SHIFT).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// `ひらがな` → `ヒラガナ`.
pub fn hiragana_to_katakana(text: &str) -> String {
    text.chars()
        .map(|c| {
            if is_mappable_hiragana(c) {
                char::from_u32(c as u32 + SHIFT).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Render `text` in the `target` syllabary.
pub fn render(text: &str, target: KanaTarget) -> String {
    match target {
        KanaTarget::Hiragana => katakana_to_hiragana(text),
        KanaTarget::Katakana => hiragana_to_katakana(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn katakana_to_hiragana_basic() {
        assert_eq!(katakana_to_hiragana("コンニチハ"), "こんにちは");
        assert_eq!(katakana_to_hiragana("ヴァイオリン"), "ゔぁいおりん");
    }

    #[test]
    fn long_vowel_mark_is_kept() {
        assert_eq!(katakana_to_hiragana("コーヒー"), "こーひー");
    }

    #[test]
    fn hiragana_to_katakana_basic() {
        assert_eq!(hiragana_to_katakana("きょうは"), "キョウハ");
    }

    #[test]
    fn iteration_marks_map() {
        assert_eq!(katakana_to_hiragana("ヽヾ"), "ゝゞ");
        assert_eq!(hiragana_to_katakana("ゝゞ"), "ヽヾ");
    }

    #[test]
    fn other_characters_pass_through() {
        assert_eq!(katakana_to_hiragana("ABC 123、漢字。"), "ABC 123、漢字。");
        assert_eq!(hiragana_to_katakana("ABC 123、漢字。"), "ABC 123、漢字。");
    }

    #[test]
    fn render_targets() {
        assert_eq!(render("カナ", KanaTarget::Hiragana), "かな");
        assert_eq!(render("かな", KanaTarget::Katakana), "カナ");
        assert_eq!(render("かな", KanaTarget::Hiragana), "かな");
    }
}
