//! Sentence reassembly for the positioning receiver
//!
//! The receiver emits line-oriented sentences: a `$` start byte, a
//! comma-delimited body, and a `\r\n` terminator. Reads from the UART
//! arrive in arbitrary chunks, so the assembler is fed one byte at a time
//! and holds at most one in-progress sentence. A start byte always resets
//! the buffer - a lost terminator must never let the buffer grow past one
//! sentence, because memory on this hardware is fixed.
//!
//! Only sentences carrying the expected type tag are decoded. The receiver
//! on this vehicle emits a GGA-shaped sentence with ground speed spliced in
//! at comma-field 8; the tag and index are fixed properties of that unit.

use heapless::{String, Vec};

/// Sentence start byte
pub const SENTENCE_START: u8 = b'$';

/// Two-byte sentence terminator
pub const SENTENCE_TERMINATOR: &[u8; 2] = b"\r\n";

/// Type tag of the one sentence kind we consume
pub const SENTENCE_TAG: &str = "$GPGGA";

/// Field delimiter within a sentence
pub const FIELD_DELIMITER: char = ',';

/// Comma-delimited index of the ground-speed field, counting the tag as 0
pub const GROUND_SPEED_FIELD: usize = 8;

/// Maximum sentence length the assembler will buffer
pub const MAX_SENTENCE_LEN: usize = 100;

/// Maximum length of an extracted field value
pub const MAX_FIELD_LEN: usize = 16;

/// Errors that can occur while assembling or decoding a sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SentenceError {
    /// Sentence exceeded the buffer without a terminator
    Overflow,
    /// Sentence body is not valid UTF-8
    NotUtf8,
    /// Sentence type tag does not match the expected prefix
    WrongTag,
    /// Sentence has fewer fields than the extraction index
    MissingField,
    /// Target field exceeds the field capacity
    FieldTooLong,
}

/// A decoded positioning record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionSentence {
    /// Ground speed as reported by the receiver, verbatim text
    pub ground_speed: String<MAX_FIELD_LEN>,
}

/// Accumulates bytes into complete sentences
///
/// Feed bytes as they arrive; a decoded sentence is returned on the byte
/// that completes its terminator. The buffer is cleared on completion, on
/// any decode failure, and whenever a new start byte arrives.
#[derive(Debug, Clone, Default)]
pub struct SentenceAssembler {
    buf: Vec<u8, MAX_SENTENCE_LEN>,
}

impl SentenceAssembler {
    /// Create a new, empty assembler
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Discard any partially-accumulated sentence
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Number of bytes currently buffered
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Feed a single byte to the assembler
    ///
    /// Returns `Ok(Some(sentence))` when a complete valid sentence is
    /// decoded, `Ok(None)` when more bytes are needed, or `Err` when a
    /// completed or overlong sentence had to be discarded.
    pub fn feed(&mut self, byte: u8) -> Result<Option<PositionSentence>, SentenceError> {
        if byte == SENTENCE_START {
            // A start byte always wins, even mid-sentence: the previous
            // fragment can never complete once its stream was interrupted.
            self.buf.clear();
            let _ = self.buf.push(byte);
            return Ok(None);
        }

        if self.buf.is_empty() {
            // Noise between sentences; wait for the next start byte.
            return Ok(None);
        }

        if self.buf.push(byte).is_err() {
            self.reset();
            return Err(SentenceError::Overflow);
        }

        if self.buf.ends_with(SENTENCE_TERMINATOR) {
            let body_len = self.buf.len() - SENTENCE_TERMINATOR.len();
            let result = Self::decode(&self.buf[..body_len]);
            self.reset();
            return result.map(Some);
        }

        Ok(None)
    }

    /// Decode a terminator-stripped sentence body
    fn decode(body: &[u8]) -> Result<PositionSentence, SentenceError> {
        let text = core::str::from_utf8(body).map_err(|_| SentenceError::NotUtf8)?;

        let mut fields = text.split(FIELD_DELIMITER);
        if fields.next() != Some(SENTENCE_TAG) {
            return Err(SentenceError::WrongTag);
        }

        let value = fields
            .nth(GROUND_SPEED_FIELD - 1)
            .ok_or(SentenceError::MissingField)?;

        let mut ground_speed = String::new();
        ground_speed
            .push_str(value)
            .map_err(|_| SentenceError::FieldTooLong)?;

        Ok(PositionSentence { ground_speed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTENCE: &[u8] = b"$GPGGA,1,2,3,4,5,6,7,36.4\r\n";

    /// Feed a chunk and collect every outcome
    fn feed_bytes(
        assembler: &mut SentenceAssembler,
        bytes: &[u8],
    ) -> (std::vec::Vec<PositionSentence>, std::vec::Vec<SentenceError>) {
        let mut sentences = std::vec::Vec::new();
        let mut errors = std::vec::Vec::new();
        for &byte in bytes {
            match assembler.feed(byte) {
                Ok(Some(sentence)) => sentences.push(sentence),
                Ok(None) => {}
                Err(e) => errors.push(e),
            }
        }
        (sentences, errors)
    }

    #[test]
    fn test_single_chunk_sentence() {
        let mut assembler = SentenceAssembler::new();
        let (sentences, errors) = feed_bytes(&mut assembler, SENTENCE);

        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].ground_speed.as_str(), "36.4");
        assert!(errors.is_empty());
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn test_split_across_three_chunks() {
        // Scenario from the field: the UART hands the sentence over in
        // three arbitrary pieces.
        let mut assembler = SentenceAssembler::new();
        let mut sentences = std::vec::Vec::new();
        for chunk in [&SENTENCE[..5], &SENTENCE[5..19], &SENTENCE[19..]] {
            let (mut s, errors) = feed_bytes(&mut assembler, chunk);
            sentences.append(&mut s);
            assert!(errors.is_empty());
        }

        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].ground_speed.as_str(), "36.4");
    }

    #[test]
    fn test_start_byte_discards_partial_sentence() {
        let mut assembler = SentenceAssembler::new();
        let (sentences, _) = feed_bytes(&mut assembler, b"$GPGGA,1,2,3");
        assert!(sentences.is_empty());

        // New start byte: the stale fragment is dropped entirely.
        let fresh = b"$GPG";
        let (sentences, errors) = feed_bytes(&mut assembler, fresh);
        assert!(sentences.is_empty());
        assert!(errors.is_empty());
        assert_eq!(assembler.pending(), fresh.len());

        // And the fresh sentence still completes normally.
        let (sentences, _) = feed_bytes(&mut assembler, b"GA,1,2,3,4,5,6,7,9.9\r\n");
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].ground_speed.as_str(), "9.9");
    }

    #[test]
    fn test_wrong_tag_rejected() {
        let mut assembler = SentenceAssembler::new();
        let (sentences, errors) =
            feed_bytes(&mut assembler, b"$GPRMC,1,2,3,4,5,6,7,36.4\r\n");
        assert!(sentences.is_empty());
        assert_eq!(errors, [SentenceError::WrongTag]);
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn test_tag_match_is_exact() {
        // A longer tag sharing the prefix must not pass.
        let mut assembler = SentenceAssembler::new();
        let (sentences, errors) =
            feed_bytes(&mut assembler, b"$GPGGAX,1,2,3,4,5,6,7,36.4\r\n");
        assert!(sentences.is_empty());
        assert_eq!(errors, [SentenceError::WrongTag]);
    }

    #[test]
    fn test_short_sentence_missing_field() {
        let mut assembler = SentenceAssembler::new();
        let (sentences, errors) = feed_bytes(&mut assembler, b"$GPGGA,1,2\r\n");
        assert!(sentences.is_empty());
        assert_eq!(errors, [SentenceError::MissingField]);
    }

    #[test]
    fn test_invalid_utf8_discarded() {
        let mut assembler = SentenceAssembler::new();
        let mut bytes = std::vec::Vec::from(&SENTENCE[..10]);
        bytes.push(0xFF);
        bytes.extend_from_slice(&SENTENCE[10..]);

        let (sentences, errors) = feed_bytes(&mut assembler, &bytes);
        assert!(sentences.is_empty());
        assert_eq!(errors, [SentenceError::NotUtf8]);
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn test_overflow_resets_buffer() {
        let mut assembler = SentenceAssembler::new();
        let _ = assembler.feed(SENTENCE_START);
        let mut errors = std::vec::Vec::new();
        for _ in 0..MAX_SENTENCE_LEN + 10 {
            if let Err(e) = assembler.feed(b'x') {
                errors.push(e);
            }
        }
        assert_eq!(errors, [SentenceError::Overflow]);
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn test_noise_before_start_byte_ignored() {
        let mut assembler = SentenceAssembler::new();
        let mut bytes = std::vec::Vec::from(&b"\x00\xFFgarbage\r\n"[..]);
        bytes.extend_from_slice(SENTENCE);

        let (sentences, errors) = feed_bytes(&mut assembler, &bytes);
        assert_eq!(sentences.len(), 1);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_two_sentences_back_to_back() {
        let mut assembler = SentenceAssembler::new();
        let mut bytes = std::vec::Vec::from(SENTENCE);
        bytes.extend_from_slice(b"$GPGGA,1,2,3,4,5,6,7,37.1\r\n");

        let (sentences, errors) = feed_bytes(&mut assembler, &bytes);
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].ground_speed.as_str(), "36.4");
        assert_eq!(sentences[1].ground_speed.as_str(), "37.1");
        assert!(errors.is_empty());
    }

    mod chunking {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Reassembly must not depend on where the UART splits the
            /// byte stream.
            #[test]
            fn reconstruction_is_chunk_boundary_independent(
                splits in proptest::collection::vec(0..SENTENCE.len(), 0..6)
            ) {
                let mut boundaries = splits;
                boundaries.push(0);
                boundaries.push(SENTENCE.len());
                boundaries.sort_unstable();

                let mut chunked = SentenceAssembler::new();
                let mut sentences = std::vec::Vec::new();
                for pair in boundaries.windows(2) {
                    let (mut s, errors) =
                        feed_bytes(&mut chunked, &SENTENCE[pair[0]..pair[1]]);
                    sentences.append(&mut s);
                    prop_assert!(errors.is_empty());
                }

                let mut whole = SentenceAssembler::new();
                let (expected, _) = feed_bytes(&mut whole, SENTENCE);
                prop_assert_eq!(sentences, expected);
            }
        }
    }
}
