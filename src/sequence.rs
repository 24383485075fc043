//! Enumeration of glyph-class sequences and their aggregate rise.
//!
//! A sequence is one final-position bin followed by zero or more
//! medial-position bins, read here in generation order (final first) and
//! emitted in reading order (final last). Lengths are walked from the
//! maximum down to zero so that longer, more specific contexts are
//! registered before shorter ones; a longest-match-first layout engine
//! depends on that order.

use crate::binning::{quantize, RiseBin};
use crate::types::GlyphSet;

/// One enumerated context and its quantized aggregate rise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// Glyph groups in reading order; the final/isolate glyph of the
    /// preceding word is the last element.
    pub context: Vec<GlyphSet>,
    pub rise: i32,
    /// Number of medial positions in the sequence (the final is not
    /// counted, and stays counted even when dropped from the context).
    pub length: usize,
}

/// Lazy walk of every bin combination, longest first.
///
/// The walk is a plain odometer over `[finals] + [medials; length]`, with
/// the rightmost position advancing fastest, matching the Cartesian product
/// order. Reconstructing the iterator from the same bins restarts it.
pub struct SequenceIter<'a> {
    finals: &'a [RiseBin],
    medials: &'a [RiseBin],
    quantization: i32,
    /// `Some(cap)` clamps aggregate rise to `cap` and, at the maximum
    /// length only, drops the final bin from the context so the rule
    /// matches any tail that tall.
    clamp: Option<i32>,
    max_length: usize,
    /// Medial count of the sequence currently being walked; `None` once
    /// exhausted.
    length: Option<usize>,
    /// `indices[0]` indexes `finals`, the rest index `medials`.
    indices: Vec<usize>,
}

impl<'a> SequenceIter<'a> {
    /// The enumeration used by the main kerning compiler: negative rises
    /// are discarded and tall rises are clamped to `maximum_rise`.
    pub fn new(
        finals: &'a [RiseBin],
        medials: &'a [RiseBin],
        max_length: usize,
        quantization: i32,
        maximum_rise: i32,
    ) -> Self {
        Self::build(finals, medials, max_length, quantization, Some(maximum_rise))
    }

    /// The enumeration used by the height-band router: every sequence is
    /// emitted with its raw quantized rise, unclamped.
    pub fn unclamped(
        finals: &'a [RiseBin],
        medials: &'a [RiseBin],
        max_length: usize,
        quantization: i32,
    ) -> Self {
        Self::build(finals, medials, max_length, quantization, None)
    }

    fn build(
        finals: &'a [RiseBin],
        medials: &'a [RiseBin],
        max_length: usize,
        quantization: i32,
        clamp: Option<i32>,
    ) -> Self {
        let mut iter = SequenceIter {
            finals,
            medials,
            quantization,
            clamp,
            max_length,
            length: None,
            indices: Vec::new(),
        };
        iter.descend_to(Some(max_length));
        iter
    }

    /// Position at the longest non-empty length at or below `from`.
    fn descend_to(&mut self, from: Option<usize>) {
        self.length = None;
        let Some(mut len) = from else { return };
        if self.finals.is_empty() {
            return;
        }
        if self.medials.is_empty() {
            len = 0;
        }
        self.length = Some(len);
        self.indices = vec![0; len + 1];
    }

    /// Advance the odometer; on overflow, move down one length.
    fn advance(&mut self) {
        for pos in (0..self.indices.len()).rev() {
            let dim = if pos == 0 {
                self.finals.len()
            } else {
                self.medials.len()
            };
            self.indices[pos] += 1;
            if self.indices[pos] < dim {
                return;
            }
            self.indices[pos] = 0;
        }
        let shorter = self.length.and_then(|len| len.checked_sub(1));
        self.descend_to(shorter);
    }

    fn current(&self) -> Option<Sequence> {
        let length = self.length?;
        let bins = self.indices.iter().enumerate().map(|(pos, &idx)| {
            if pos == 0 {
                &self.finals[idx]
            } else {
                &self.medials[idx]
            }
        });
        let raw_rise: i32 = bins.clone().map(|bin| bin.rise).sum();
        let mut rise = quantize(raw_rise as f64, self.quantization);
        let mut context: Vec<GlyphSet> = bins.map(|bin| bin.glyphs.clone()).collect();
        context.reverse();
        if let Some(cap) = self.clamp {
            if rise < 0 {
                return None;
            }
            if rise >= cap {
                rise = cap;
                if length == self.max_length {
                    // Drop the final so the rule matches every sequence
                    // with this tall tail, keeping the plateau bounded.
                    context.pop();
                }
            }
        }
        Some(Sequence {
            context,
            rise,
            length,
        })
    }
}

impl Iterator for SequenceIter<'_> {
    type Item = Sequence;

    fn next(&mut self) -> Option<Self::Item> {
        while self.length.is_some() {
            let item = self.current();
            self.advance();
            if item.is_some() {
                return item;
            }
        }
        None
    }
}
