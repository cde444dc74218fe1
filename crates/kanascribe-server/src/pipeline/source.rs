//! Opaque file id → downloadable URL.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use kanascribe_settings::FILE_ID_PLACEHOLDER;

/// Everything except RFC 3986 unreserved characters.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Substitute the percent-encoded `file_id` into `template`.
pub fn source_url(template: &str, file_id: &str) -> String {
    let encoded = utf8_percent_encode(file_id, COMPONENT).to_string();
    template.replace(FILE_ID_PLACEHOLDER, &encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRIVE: &str = "https://drive.google.com/uc?export=download&id={fileId}";

    #[test]
    fn plain_id_is_inserted() {
        assert_eq!(
            source_url(DRIVE, "abc123"),
            "https://drive.google.com/uc?export=download&id=abc123"
        );
    }

    #[test]
    fn unreserved_characters_survive() {
        assert_eq!(source_url("x/{fileId}", "1a-B_c.d~"), "x/1a-B_c.d~");
    }

    #[test]
    fn query_metacharacters_are_encoded() {
        assert_eq!(
            source_url(DRIVE, "a&b=c d"),
            "https://drive.google.com/uc?export=download&id=a%26b%3Dc%20d"
        );
    }

    #[test]
    fn non_ascii_is_utf8_encoded() {
        assert_eq!(source_url("x/{fileId}", "音"), "x/%E9%9F%B3");
    }
}
