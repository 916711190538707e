use smallvec::SmallVec;

use crate::format::{LONG_OFFSET_LIMIT, MAX_LONG_SIZE, SHORT_OFFSET_LIMIT};

/// Configure the back-reference search that underlies PRS compression
///
/// Both knobs default to the values SEGA's encoder used, and both can be
/// opened up to the full reach of the wire format without changing what the
/// decoder accepts:
///
/// | Parameter    | Field          | Default | Maximum |
/// | ------------ | -------------- | :-----: | :-----: |
/// | Window floor | `window_floor` | 0x1FF0  | 8191    |
/// | Match cap    | `max_match`    | 256     | 265     |
///
/// `window_floor` is how far behind the current position candidate matches
/// are retained; the stock value is slightly tighter than the 8192-byte
/// long-reference reach, and the search clamps it to stay one byte inside
/// that reach (a copy from exactly 8192 bytes back with an extended size
/// would encode as the stream terminator). `max_match` caps how far a
/// single match is extended; the stock value is the short-reference offset
/// window, while the long form can express sizes up to 265. Values beyond
/// the maxima are clamped during the search.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SearchSettings {
    /// how far back candidate positions stay reachable
    pub window_floor: usize,
    /// cap on the length of a single match
    pub max_match: usize,
}

impl SearchSettings {
    pub const fn new(window_floor: usize, max_match: usize) -> Self {
        Self {
            window_floor,
            max_match,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            window_floor: 0x1FF0,
            max_match: SHORT_OFFSET_LIMIT,
        }
    }
}

/// A found back-reference: `size` bytes at input position `src` equal the
/// bytes at the current position.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct BackRef {
    pub size: usize,
    pub src: usize,
}

type PositionList = SmallVec<[u32; 4]>;

/// Where each byte value occurs in the input, in increasing order, with a
/// per-value cursor that slides forward as encoding advances.
///
/// The cursor is monotone: positions that have fallen out of the reach
/// window are skipped once and never revisited, so the whole encode pass
/// walks each list at most once.
#[derive(Debug)]
pub(crate) struct MatchIndex {
    positions: Vec<PositionList>,
    cursors: [usize; 256],
}

impl MatchIndex {
    pub(crate) fn new(input: &[u8]) -> Self {
        let mut positions = vec![PositionList::new(); 256];
        for (i, &byte) in input.iter().enumerate() {
            positions[byte as usize].push(i as u32);
        }

        Self {
            positions,
            cursors: [0; 256],
        }
    }

    /// All recorded positions of `byte` at or after `pos - floor`, oldest
    /// first. Advances the cursor past anything older.
    fn reachable(&mut self, byte: u8, pos: usize, floor: usize) -> &[u32] {
        let list = &self.positions[byte as usize];
        let cursor = &mut self.cursors[byte as usize];
        let oldest = pos.saturating_sub(floor) as u32;

        while *cursor < list.len() && list[*cursor] < oldest {
            *cursor += 1;
        }

        &list[*cursor..]
    }
}

/// Find the best permitted back-reference for `input[pos..]`.
///
/// Candidates are every earlier occurrence of `input[pos]` still inside the
/// window. Each is extended byte-by-byte (matches may run past `pos` into
/// the region they will reproduce; the decoder's forward copy unrolls the
/// overlap). A two-byte match is only usable inside short-reference reach,
/// since the long form starts at size 3. Ties prefer the more recent
/// candidate, which keeps offsets small and the short form applicable.
pub(crate) fn find_match(
    input: &[u8],
    pos: usize,
    index: &mut MatchIndex,
    settings: &SearchSettings,
) -> Option<BackRef> {
    // a displacement of exactly -8192 with an extended size would encode
    // as the terminator word, so the search stays one byte inside the
    // long-form reach; sizes past the extended length byte are not
    // expressible
    let floor = settings.window_floor.min(LONG_OFFSET_LIMIT - 1);
    let cap = settings.max_match.min(MAX_LONG_SIZE).min(input.len() - pos);

    let mut best: Option<BackRef> = None;
    for &src in index.reachable(input[pos], pos, floor) {
        let src = src as usize;
        if src >= pos {
            break;
        }

        let size = matched_size(input, src, pos, cap);
        if size < 2 || (size == 2 && pos - src >= SHORT_OFFSET_LIMIT) {
            continue;
        }

        let better = match best {
            Some(b) => size > b.size || (size == b.size && src > b.src),
            None => true,
        };
        if better {
            best = Some(BackRef { size, src });
        }
    }

    best
}

/// How many bytes starting at `src` equal the bytes starting at `pos`,
/// capped at `cap`.
fn matched_size(input: &[u8], src: usize, pos: usize, cap: usize) -> usize {
    input[src..]
        .iter()
        .zip(&input[pos..])
        .take(cap)
        .take_while(|(a, b)| a == b)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, RngCore, SeedableRng};

    fn best_at(input: &[u8], pos: usize) -> Option<BackRef> {
        let mut index = MatchIndex::new(input);
        find_match(input, pos, &mut index, &SearchSettings::default())
    }

    #[test]
    fn finds_overlapping_run() {
        let input = [7u8; 10];
        // both earlier sevens match; the more recent one wins the tie
        assert_eq!(best_at(&input, 2), Some(BackRef { size: 8, src: 1 }));
    }

    #[test]
    fn no_match_in_fresh_data() {
        let input = [0, 1, 2, 3, 4, 5, 6, 7];
        assert_eq!(best_at(&input, 2), None);
    }

    #[test]
    fn two_byte_match_needs_short_reach() {
        let mut input = vec![0xEEu8; 2];
        input.extend((0..300).map(|i| (i % 251) as u8 + 1));
        input.extend_from_slice(&[0xEE, 0xEE]);
        // the only earlier 0xEE pair sits 302 bytes back, past short reach
        assert_eq!(best_at(&input, 302), None);

        let mut near = vec![0xEEu8; 2];
        near.extend((0..100).map(|i| (i % 251) as u8 + 1));
        near.extend_from_slice(&[0xEE, 0xEE]);
        assert_eq!(best_at(&near, 102), Some(BackRef { size: 2, src: 0 }));
    }

    #[test]
    fn cursor_drops_positions_out_of_window() {
        let mut input = vec![0x55u8, 0x55, 0x55];
        input.extend((0..9000).map(|i| (i % 255) as u8));
        input.extend_from_slice(&[0x55, 0x55, 0x55]);
        let pos = 9003;

        let mut index = MatchIndex::new(&input);
        let found = find_match(&input, pos, &mut index, &SearchSettings::default());
        // the leading 0x55 run is 9000 bytes back, far outside the window,
        // and must not be reported even though the byte value matches
        if let Some(m) = found {
            assert!(pos - m.src <= 0x1FF0, "unreachable source {}", m.src);
        }
        assert!(index.cursors[0x55] >= 3);
    }

    #[test]
    fn distant_repeat_is_found_in_full() {
        let mut rng = StdRng::seed_from_u64(0x5E6A);
        let mut input = vec![0u8; 4096];
        rng.fill_bytes(&mut input);
        let head = input[..10].to_vec();
        input.extend_from_slice(&head);

        assert_eq!(best_at(&input, 4096), Some(BackRef { size: 10, src: 0 }));
    }

    #[test]
    fn match_cap_bounds_extension() {
        let input = [3u8; 600];
        let mut index = MatchIndex::new(&input);

        let stock = find_match(&input, 2, &mut index, &SearchSettings::default()).unwrap();
        assert_eq!(stock.size, 256);

        let mut index = MatchIndex::new(&input);
        let wide = SearchSettings::new(0x1FF0, 4096);
        let found = find_match(&input, 2, &mut index, &wide).unwrap();
        // clamped to the largest expressible size
        assert_eq!(found.size, MAX_LONG_SIZE);
    }
}
