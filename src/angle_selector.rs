//! Angle selector (§4.8): iteratively consumes bits to pick an ordered
//! subset of angles from the pooled, document-major list.

use crate::bits::{ceil_log2, decode_int, take_bits, to_bit_string};
use crate::carrier::Angle;

#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AngleSelection {
    pub bits_used: String,
    pub bits_count: usize,
    pub remaining_bits: String,
    pub selected_angles: Vec<Angle>,
    pub unselected_angles: Vec<Angle>,
    pub insufficient_bits: bool,
}

/// Selects up to `target_count` angles (0 or `None` ⇒ fill the whole pool)
/// from `angle_groups`, document-major order, consuming bits off the front
/// of `bitstream` one pool-shrink step at a time (§4.8).
pub fn select(bitstream: &[bool], angle_groups: &[Vec<Angle>], target_count: Option<usize>) -> AngleSelection {
    let mut pool: Vec<Angle> = angle_groups.iter().flatten().cloned().collect();
    let target = match target_count {
        None | Some(0) => pool.len(),
        Some(t) => t.min(pool.len()),
    };

    let mut selected = Vec::with_capacity(target);
    let mut consumed = Vec::new();
    let mut remaining = bitstream;
    let mut insufficient = false;

    while selected.len() < target && !pool.is_empty() {
        let r = pool.len() as u64;
        let bits_needed = ceil_log2(r) as usize;
        let (used, rest, padded) = take_bits(remaining, bits_needed);
        if padded {
            insufficient = true;
        }
        remaining = rest;
        consumed.extend_from_slice(&used);

        let idx = if r == 1 { 0 } else { (decode_int(&used) % r) as usize };
        selected.push(pool.remove(idx));
    }

    AngleSelection {
        bits_used: to_bit_string(&consumed),
        bits_count: consumed.len(),
        remaining_bits: to_bit_string(remaining),
        selected_angles: selected,
        unselected_angles: pool,
        insufficient_bits: insufficient,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn angle(quote: &str) -> Angle {
        Angle {
            source_quote: quote.to_string(),
            tangent: format!("tangent of {quote}"),
            category: "cat".to_string(),
            source_document: None,
        }
    }

    #[test]
    fn s4_two_groups_target_two() {
        // Angles = [[x,y],[z]], target_count=2, bitstream="10".
        let groups = vec![vec![angle("x"), angle("y")], vec![angle("z")]];
        let bits = crate::bits::from_bit_string("10");
        let result = select(&bits, &groups, Some(2));
        let picked: Vec<_> = result
            .selected_angles
            .iter()
            .map(|a| a.source_quote.as_str())
            .collect();
        assert_eq!(picked, vec!["z", "x"]);
    }

    #[test]
    fn no_duplicates_and_subsequence_of_pool() {
        let groups = vec![vec![angle("a"), angle("b"), angle("c")]];
        let bits = crate::bits::from_bit_string("1011");
        let result = select(&bits, &groups, None);
        assert_eq!(result.selected_angles.len(), 3);
        assert!(result.unselected_angles.is_empty());
        let mut seen = std::collections::HashSet::new();
        for a in &result.selected_angles {
            assert!(seen.insert(a.source_quote.clone()));
        }
    }

    #[test]
    fn underflow_pads_with_zero_and_flags() {
        let groups = vec![vec![angle("a"), angle("b")]];
        let bits: Vec<bool> = Vec::new();
        let result = select(&bits, &groups, Some(1));
        assert!(result.insufficient_bits);
        assert_eq!(result.selected_angles.len(), 1);
        assert_eq!(result.selected_angles[0].source_quote, "a");
    }

    #[test]
    fn empty_pool_selects_nothing() {
        let groups: Vec<Vec<Angle>> = vec![];
        let bits = crate::bits::from_bit_string("1010");
        let result = select(&bits, &groups, None);
        assert!(result.selected_angles.is_empty());
        assert_eq!(result.remaining_bits, "1010"); // no bits consumed, pool was empty
    }
}
