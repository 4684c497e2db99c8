//! Match index (§4.4): for each payload position, the set of dictionary
//! back-references worth handing to the DP compressor.

use crate::config::EncoderConfig;

/// One candidate back-reference starting at some payload position: copy
/// `length` code points from `dictionary[doc_index]` starting at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub doc_index: usize,
    pub offset: usize,
    pub length: usize,
}

/// `candidates[i]` holds every back-reference worth considering at payload
/// position `i`, longest-kept-length first is not guaranteed — the DP
/// compressor evaluates all of them and keeps the cheapest (§4.5 tie-break).
pub type MatchIndex = Vec<Vec<Candidate>>;

/// Builds the match index over `payload`'s Unicode scalar values against
/// `dictionary`.
///
/// For each payload position `i` and each dictionary entry, every offset at
/// which the character matches is extended in both payload and dictionary
/// until a mismatch or a bound is hit: `min(m_global, |payload| - i, |entry|
/// - offset)`. Only extensions longer than `config.min_match_len` are kept
/// (the spec's `L > 2` rule), since anything at or below that threshold
/// cannot beat a literal under the cost model. Candidate lists are capped at
/// `config.max_candidates_per_position` to bound memory on degenerate,
/// highly-repetitive carriers (§5).
pub fn build_match_index(
    payload: &[char],
    dictionary: &[Vec<char>],
    m_global: usize,
    config: &EncoderConfig,
) -> MatchIndex {
    let n = payload.len();
    let mut index: MatchIndex = vec![Vec::new(); n];

    for i in 0..n {
        let max_len_from_payload = (n - i).min(m_global);
        if max_len_from_payload == 0 {
            continue;
        }

        'docs: for (doc_index, entry) in dictionary.iter().enumerate() {
            for offset in 0..entry.len() {
                if entry[offset] != payload[i] {
                    continue;
                }
                let max_len = max_len_from_payload.min(entry.len() - offset);
                let mut length = 0;
                while length < max_len && entry[offset + length] == payload[i + length] {
                    length += 1;
                }
                if length > config.min_match_len {
                    index[i].push(Candidate {
                        doc_index,
                        offset,
                        length,
                    });
                    if index[i].len() >= config.max_candidates_per_position {
                        break 'docs;
                    }
                }
            }
        }
    }

    index
}
