use chardetng::EncodingDetector;
use encoding_rs::{CoderResult, Decoder, Encoding, UTF_8};

/// Pick the input encoding from the first window: BOM first, UTF-8 for pure
/// ASCII, then a chardetng guess.
pub fn detect_encoding(head: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(head) {
        return encoding;
    }
    if head.is_ascii() {
        return UTF_8;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(head, false);
    detector.guess(None, true)
}

/// Incremental decoder for fixed-size byte windows.
///
/// Multi-byte sequences split across a window boundary are held by the
/// underlying decoder and completed by the next call. Malformed sequences are
/// replaced with U+FFFD rather than failing the run.
#[derive(Default)]
pub struct WindowDecoder {
    decoder: Option<Decoder>,
    had_errors: bool,
}

impl WindowDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode with a fixed encoding instead of sniffing the first window.
    pub fn with_encoding(encoding: &'static Encoding) -> Self {
        Self {
            decoder: Some(encoding.new_decoder()),
            had_errors: false,
        }
    }

    /// Decode the next window. Pass `last = true` once, after the final
    /// window, to flush any buffered partial sequence.
    pub fn decode(&mut self, window: &[u8], last: bool) -> String {
        let decoder = self
            .decoder
            .get_or_insert_with(|| detect_encoding(window).new_decoder());

        let capacity = decoder
            .max_utf8_buffer_length(window.len())
            .unwrap_or(window.len().saturating_mul(3));
        let mut out = String::with_capacity(capacity);
        let mut consumed = 0;
        loop {
            let (result, read, had_errors) =
                decoder.decode_to_string(&window[consumed..], &mut out, last);
            consumed += read;
            self.had_errors |= had_errors;
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => out.reserve(window.len() - consumed + 16),
            }
        }
        out
    }

    /// Whether any replacement characters were produced so far.
    pub fn had_errors(&self) -> bool {
        self.had_errors
    }

    pub fn encoding_name(&self) -> Option<&'static str> {
        self.decoder.as_ref().map(|d| d.encoding().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_multibyte_sequence_is_reassembled() {
        let text = "caf\u{e9}\n";
        let bytes = text.as_bytes();
        let mut decoder = WindowDecoder::with_encoding(UTF_8);

        let mut out = decoder.decode(&bytes[..4], false);
        out.push_str(&decoder.decode(&bytes[4..], false));
        out.push_str(&decoder.decode(&[], true));

        assert_eq!(out, text);
        assert!(!decoder.had_errors());
    }

    #[test]
    fn utf16_bom_is_detected_and_stripped() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "0xab\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let mut decoder = WindowDecoder::new();
        let mut out = decoder.decode(&bytes, false);
        out.push_str(&decoder.decode(&[], true));

        assert_eq!(out, "0xab\n");
        assert_eq!(decoder.encoding_name(), Some("UTF-16LE"));
    }

    #[test]
    fn invalid_bytes_are_replaced_not_fatal() {
        let mut decoder = WindowDecoder::with_encoding(UTF_8);
        let mut out = decoder.decode(b"ok\n\xFF\n", false);
        out.push_str(&decoder.decode(&[], true));

        assert_eq!(out, "ok\n\u{FFFD}\n");
        assert!(decoder.had_errors());
    }
}
