/// Global knobs for an encoder invocation (§6, §9).
///
/// Passed explicitly through the coordinator rather than read from
/// module-level constants, so that two encoders running in the same process
/// with different policies never interfere with each other.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Longest run of payload characters a single literal token may cover.
    pub max_literal_len: usize,

    /// A candidate back-reference is only kept if its match length is
    /// strictly greater than this value (the spec's "L > 2" rule). Encoder
    /// side only — it never affects decodability.
    pub min_match_len: usize,

    /// Endpoint of the optional external document-similarity finder.
    pub finder_endpoint: Option<String>,

    /// Scores below this threshold are treated as a non-match
    /// (`Warning::FinderLowScore`). `None` accepts any score >= 0.
    pub finder_low_score_threshold: Option<f64>,

    /// Soft cap on how many back-reference candidates are kept per payload
    /// position, guarding against degenerate highly-repetitive carriers
    /// blowing up match-index memory (§5).
    pub max_candidates_per_position: usize,
}

pub const DEFAULT_MAX_LITERAL_LEN: usize = 250;
pub const DEFAULT_MIN_MATCH_LEN: usize = 2;
pub const DEFAULT_MAX_CANDIDATES_PER_POSITION: usize = 64;

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            max_literal_len: DEFAULT_MAX_LITERAL_LEN,
            min_match_len: DEFAULT_MIN_MATCH_LEN,
            finder_endpoint: None,
            finder_low_score_threshold: None,
            max_candidates_per_position: DEFAULT_MAX_CANDIDATES_PER_POSITION,
        }
    }
}
