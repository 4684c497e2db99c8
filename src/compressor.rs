//! DP compressor (§4.5): chooses the minimum-bit encoding of the payload as
//! a sequence of literal and back-reference tokens, with a raw-UTF-8
//! fallback when dictionary mode doesn't pay for itself (§4.5 "mode
//! fallback").

use crate::bits::{byte_length, encode_int, to_bits, width, BitBuf};
use crate::config::EncoderConfig;
use crate::error::CodecError;
use crate::match_index::{build_match_index, Candidate};

/// The two bitstream modes (§3's "mode flag").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Mode bit `0`: the raw UTF-8 bits of the payload, untouched.
    Standard,
    /// Mode bit `1`: a concatenation of literal/reference tokens.
    Dictionary,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Standard => "standard",
            Mode::Dictionary => "dictionary",
        }
    }
}

/// A single token emitted by the DP compressor's chosen path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal { start: usize, len: usize },
    Reference { doc_index: usize, offset: usize, length: usize },
}

/// The result of compressing one payload against one dictionary.
#[derive(Debug, Clone)]
pub struct CompressResult {
    pub mode: Mode,
    /// The full bitstream, mode flag included.
    pub bits: Vec<bool>,
    /// The token sequence chosen by the DP walk; empty in standard mode.
    pub tokens: Vec<Token>,
    pub compressed_length: usize,
    pub original_length: usize,
}

#[derive(Debug, Clone, Copy)]
enum Choice {
    Literal { len: usize },
    Reference(Candidate),
}

/// Runs the DP compressor over `payload` against `dictionary` (§4.5) and
/// returns the mode-selected bitstream.
///
/// Fails with [`CodecError::Invariant`] if the DP table has no solution at a
/// reachable payload position (§7) — this can only happen when
/// `config.max_literal_len` is `0`, since no literal token can ever cover the
/// gap between two back-references.
pub fn compress(
    payload: &str,
    dictionary: &[String],
    config: &EncoderConfig,
) -> Result<CompressResult, CodecError> {
    let chars: Vec<char> = payload.chars().collect();
    let n = chars.len();
    let original_length = 1 + 8 * byte_length(payload);

    let dict_chars: Vec<Vec<char>> = dictionary.iter().map(|d| d.chars().collect()).collect();
    let m_global = dict_chars.iter().map(|d| d.len()).max().unwrap_or(0);

    let dictionary_result = if dictionary.is_empty() || m_global == 0 {
        None
    } else {
        Some(compress_dictionary(
            &chars,
            dictionary,
            &dict_chars,
            m_global,
            config,
        )?)
    };

    Ok(match dictionary_result {
        Some((bits, tokens)) if 1 + bits.len() < original_length => {
            let mut full = BitBuf::new();
            full.push_bit(true);
            full.extend(&bits);
            let full = full.into_vec();
            CompressResult {
                mode: Mode::Dictionary,
                compressed_length: full.len(),
                bits: full,
                tokens,
                original_length,
            }
        }
        _ => {
            let mut full = BitBuf::new();
            full.push_bit(false);
            full.extend(&to_bits(payload));
            let full = full.into_vec();
            CompressResult {
                mode: Mode::Standard,
                compressed_length: full.len(),
                bits: full,
                tokens: Vec::new(),
                original_length,
            }
        }
    })
}

/// Builds the dictionary-mode token stream (excluding the mode flag) and
/// returns its bits alongside the chosen tokens, for diagnostic reporting.
fn compress_dictionary(
    chars: &[char],
    dictionary: &[String],
    dict_chars: &[Vec<char>],
    m_global: usize,
    config: &EncoderConfig,
) -> Result<(Vec<bool>, Vec<Token>), CodecError> {
    let n = chars.len();
    let match_index = build_match_index(chars, dict_chars, m_global, config);

    // Byte-length prefix sums let us cost an arbitrary literal run in O(1).
    let mut byte_prefix = vec![0usize; n + 1];
    for (i, ch) in chars.iter().enumerate() {
        byte_prefix[i + 1] = byte_prefix[i] + ch.len_utf8();
    }
    let literal_bytes = |start: usize, len: usize| byte_prefix[start + len] - byte_prefix[start];

    let w_lit_len = width(config.max_literal_len as u64);
    let w_doc_index = width(dictionary.len() as u64);
    let w_max_len = width(m_global as u64);

    let mut dp = vec![u64::MAX; n + 1];
    let mut choice: Vec<Option<Choice>> = vec![None; n + 1];
    dp[n] = 0;

    for i in (0..n).rev() {
        let mut best_cost = u64::MAX;
        let mut best_choice = None;

        let max_lit = config.max_literal_len.min(n - i);
        for len in 1..=max_lit {
            if dp[i + len] == u64::MAX {
                continue;
            }
            let cost = 1
                + w_lit_len as u64
                + 8 * literal_bytes(i, len) as u64
                + dp[i + len];
            if cost < best_cost {
                best_cost = cost;
                best_choice = Some(Choice::Literal { len });
            }
        }

        for &cand in &match_index[i] {
            if dp[i + cand.length] == u64::MAX {
                continue;
            }
            let w_offset = width(dict_chars[cand.doc_index].len() as u64);
            let cost = 1 + w_doc_index as u64 + w_offset as u64 + w_max_len as u64 + dp[i + cand.length];
            if cost < best_cost {
                best_cost = cost;
                best_choice = Some(Choice::Reference(cand));
            }
        }

        dp[i] = best_cost;
        choice[i] = best_choice;
    }

    let mut bits = BitBuf::new();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < n {
        let chosen = choice[i].ok_or_else(|| {
            CodecError::Invariant(format!(
                "DP table has no solution at payload position {i}; \
                 check that EncoderConfig::max_literal_len is at least 1"
            ))
        })?;
        match chosen {
            Choice::Literal { len } => {
                bits.push_bit(false);
                bits.push_int(len as u64, config.max_literal_len as u64);
                let text: String = chars[i..i + len].iter().collect();
                bits.extend(&to_bits(&text));
                tokens.push(Token::Literal { start: i, len });
                i += len;
            }
            Choice::Reference(cand) => {
                bits.push_bit(true);
                bits.extend(&encode_int(cand.doc_index as u64, dictionary.len() as u64));
                bits.extend(&encode_int(
                    cand.offset as u64,
                    dict_chars[cand.doc_index].len() as u64,
                ));
                bits.extend(&encode_int(cand.length as u64, m_global as u64));
                tokens.push(Token::Reference {
                    doc_index: cand.doc_index,
                    offset: cand.offset,
                    length: cand.length,
                });
                i += cand.length;
            }
        }
    }

    Ok((bits.into_vec(), tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dictionary_falls_back_to_standard() {
        let config = EncoderConfig::default();
        let result = compress("A", &[], &config).unwrap();
        assert_eq!(result.mode, Mode::Standard);
        assert!(result.bits.iter().take(1).eq([false].iter().copied()));
    }

    #[test]
    fn payload_equal_to_post_body_becomes_single_reference() {
        let config = EncoderConfig::default();
        let dict = vec!["the quick brown fox".to_string()];
        let result = compress("the quick brown fox", &dict, &config).unwrap();
        assert_eq!(result.mode, Mode::Dictionary);
        assert_eq!(result.tokens.len(), 1);
        assert!(matches!(
            result.tokens[0],
            Token::Reference { doc_index: 0, offset: 0, length: 19 }
        ));
    }

    #[test]
    fn mode_is_never_worse_than_standard() {
        let config = EncoderConfig::default();
        // Random-ish payload sharing nothing with the dictionary.
        let dict = vec!["abc def ghi".to_string()];
        let payload = "zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz";
        let result = compress(payload, &dict, &config).unwrap();
        let standard_len = 1 + 8 * byte_length(payload);
        assert!(result.compressed_length <= standard_len);
    }

    #[test]
    fn zero_max_literal_len_is_a_controlled_error_not_a_panic() {
        let config = EncoderConfig {
            max_literal_len: 0,
            ..EncoderConfig::default()
        };
        let dict = vec!["xyz".to_string()];
        let err = compress("no matching text", &dict, &config).unwrap_err();
        assert!(matches!(err, CodecError::Invariant(_)));
    }
}
