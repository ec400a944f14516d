//! Text segmentation with structure awareness
//!
//! Splits raw document text into overlapping segments while:
//! - Preferring paragraph, then sentence, then word boundaries
//! - Never splitting inside a UTF-8 character
//! - Providing stable, deterministic segment boundaries
//!
//! Segments are exact substrings of the input: concatenating them in index
//! order with each segment's overlap prefix stripped reconstructs the
//! original text.

use crate::config::ChunkConfig;
use crate::error::{Error, Result};

/// A text segment produced by [`segment`]
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Segment index (0-based, contiguous)
    pub index: usize,

    /// The segment text, an exact substring of the input
    pub text: String,

    /// Byte start position in the original text
    pub char_start: usize,

    /// Byte end position in the original text
    pub char_end: usize,
}

/// Natural boundary kinds, in ascending preference order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum BreakPriority {
    Sentence = 1,
    Paragraph = 2,
}

#[derive(Debug, Clone, Copy)]
struct BreakPoint {
    position: usize,
    priority: BreakPriority,
}

/// Split text into overlapping segments
///
/// `config.chunk_size` is the target segment length in characters;
/// `config.overlap` trailing characters are repeated at the start of the
/// next segment so context survives a boundary. Any non-empty input yields
/// at least one segment.
pub fn segment(text: &str, config: &ChunkConfig) -> Result<Vec<Segment>> {
    if text.trim().is_empty() {
        return Err(Error::EmptyInput);
    }

    if config.overlap >= config.chunk_size {
        return Err(Error::Config(
            "chunk.overlap must be < chunk.chunk_size".to_string(),
        ));
    }

    let break_points = find_break_points(text);

    let mut segments = Vec::new();
    let mut current_start = 0;
    let mut index = 0;

    while current_start < text.len() {
        let start = ensure_char_boundary(text, current_start);
        let target = start + config.chunk_size;

        let end = if target >= text.len() {
            text.len()
        } else {
            find_best_break(text, start, target, &break_points, config)
        };
        let end = ensure_char_boundary(text, end);

        // Forward progress even for degenerate inputs
        let end = if end <= start {
            next_char_boundary(text, start + 1)
        } else {
            end
        };

        segments.push(Segment {
            index,
            text: text[start..end].to_string(),
            char_start: start,
            char_end: end,
        });
        index += 1;

        if end >= text.len() {
            break;
        }

        let overlapped = ensure_char_boundary(text, end.saturating_sub(config.overlap));
        current_start = if overlapped > start { overlapped } else { end };
    }

    Ok(segments)
}

/// Reassemble the original text from segments, stripping overlap duplication
///
/// Inverse of [`segment`]; used to verify the reconstruction invariant.
pub fn reassemble(segments: &[Segment]) -> String {
    let mut out = String::new();
    let mut covered = 0;

    for seg in segments {
        if seg.char_end <= covered {
            continue;
        }
        let skip = covered.saturating_sub(seg.char_start);
        out.push_str(&seg.text[skip..]);
        covered = seg.char_end;
    }

    out
}

/// Find paragraph and sentence break positions in the text
fn find_break_points(text: &str) -> Vec<BreakPoint> {
    let mut points = Vec::new();

    // Paragraph breaks: position just after a blank line
    for (i, _) in text.match_indices("\n\n") {
        let pos = i + 2;
        if text.is_char_boundary(pos) {
            points.push(BreakPoint {
                position: pos,
                priority: BreakPriority::Paragraph,
            });
        }
    }

    // Sentence boundaries
    for pattern in [". ", ".\n", "? ", "?\n", "! ", "!\n"] {
        for (i, _) in text.match_indices(pattern) {
            let pos = i + 2;
            if text.is_char_boundary(pos) {
                points.push(BreakPoint {
                    position: pos,
                    priority: BreakPriority::Sentence,
                });
            }
        }
    }

    points.sort_by_key(|p| (p.position, std::cmp::Reverse(p.priority)));
    points.dedup_by_key(|p| p.position);

    points
}

/// Find the best break point near the target position
///
/// Searches a window of 80% to 120% of the target segment size for the
/// highest-priority natural boundary, falling back to a word boundary near
/// the target, then to a hard character cut.
fn find_best_break(
    text: &str,
    start: usize,
    target: usize,
    break_points: &[BreakPoint],
    config: &ChunkConfig,
) -> usize {
    let min_pos = ensure_char_boundary(text, start + (config.chunk_size * 4 / 5));
    let max_pos = ensure_char_boundary(
        text,
        std::cmp::min(start + (config.chunk_size * 6 / 5), text.len()),
    );

    let best = break_points
        .iter()
        .filter(|p| p.position >= min_pos && p.position <= max_pos)
        .max_by_key(|p| (p.priority, p.position));

    if let Some(point) = best {
        return point.position;
    }

    // Fall back to a word boundary near the target
    let search_start = ensure_char_boundary(text, target.saturating_sub(50).max(start));
    let search_end = ensure_char_boundary(text, std::cmp::min(target + 50, text.len()));

    if search_start < search_end {
        for (i, _) in text[search_start..search_end].rmatch_indices(' ') {
            let pos = search_start + i + 1;
            if pos >= min_pos && pos <= max_pos && text.is_char_boundary(pos) {
                return pos;
            }
        }
    }

    // Hard character cut
    ensure_char_boundary(text, std::cmp::min(target, text.len()))
}

/// Adjust a position backwards onto a valid UTF-8 character boundary
fn ensure_char_boundary(text: &str, pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    let mut adjusted = pos;
    while adjusted > 0 && !text.is_char_boundary(adjusted) {
        adjusted -= 1;
    }
    adjusted
}

/// Adjust a position forwards onto a valid UTF-8 character boundary
fn next_char_boundary(text: &str, pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    let mut adjusted = pos;
    while adjusted < text.len() && !text.is_char_boundary(adjusted) {
        adjusted += 1;
    }
    adjusted
}
