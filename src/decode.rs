//! Text decoding for followed lines.

use crate::error::{Error, Result};
use encoding_rs::{DecoderResult, Encoding};

/// How malformed byte sequences are handled when decoding a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Fail the line with [`Error::Decode`].
    #[default]
    Strict,
    /// Substitute U+FFFD for each malformed sequence.
    Replace,
    /// Drop malformed sequences.
    Ignore,
}

/// Decodes terminator-stripped lines with a fixed encoding and policy.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    encoding: &'static Encoding,
    policy: DecodePolicy,
}

impl Decoder {
    pub fn new(encoding: &'static Encoding, policy: DecodePolicy) -> Self {
        Self { encoding, policy }
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self.policy {
            DecodePolicy::Strict => self
                .encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned())
                .ok_or_else(|| Error::Decode {
                    encoding: self.encoding.name(),
                    bytes: bytes.to_vec(),
                }),
            DecodePolicy::Replace => Ok(self
                .encoding
                .decode_without_bom_handling(bytes)
                .0
                .into_owned()),
            DecodePolicy::Ignore => Ok(self.decode_skipping_malformed(bytes)),
        }
    }

    fn decode_skipping_malformed(&self, bytes: &[u8]) -> String {
        let mut decoder = self.encoding.new_decoder_without_bom_handling();
        let capacity = decoder
            .max_utf8_buffer_length_without_replacement(bytes.len())
            .unwrap_or(bytes.len());
        let mut text = String::with_capacity(capacity);
        let mut remaining = bytes;

        loop {
            let (result, read) = decoder.decode_to_string_without_replacement(remaining, &mut text, true);
            remaining = &remaining[read..];
            match result {
                DecoderResult::InputEmpty => return text,
                DecoderResult::OutputFull => text.reserve(remaining.len().max(4) * 3),
                DecoderResult::Malformed(_, _) => {}
            }
        }
    }
}
