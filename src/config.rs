//! Compiler tunables.

use crate::types::{GlyphName, GlyphSet};

/// Names of the glyph classes the host font must expose.
pub mod classes {
    pub const INITIALS: &str = "inits";
    pub const MEDIALS: &str = "medis";
    pub const ISOLATES: &str = "isols";
    pub const FINALS: &str = "finas";
    pub const BARI_YE: &str = "bariye";
    pub const ABOVE_MARKS: &str = "all_above_marks";
}

/// Parameters controlling rule generation.
///
/// The defaults are the values tuned for Gulzar; only the two
/// per-invocation arguments (`target_closeness`, `max_tuck`) have no
/// sensible universal value and are set by [`KernConfig::new`].
#[derive(Debug, Clone)]
pub struct KernConfig {
    /// Bring adjacent glyphs to within this many units of one another.
    pub target_closeness: i32,
    /// Allowed proportional overlap of the two glyphs' geometry (0.0–1.0).
    pub max_tuck: f64,
    /// Number of rise clusters per glyph class. The rule count is O(n^2)
    /// in this; 4 or more overflows the binary lookup format. 3 is accurate
    /// enough in practice.
    pub bin_count: usize,
    /// Sequence heights are rounded to this step, so one kern table serves
    /// heights of 0, 100, 200, ... units.
    pub rise_quantization: i32,
    /// Heights at or above this are all kerned alike.
    pub maximum_rise: i32,
    /// Kern values are rounded to this step for binary-format compactness.
    pub kern_quantization: i32,
    /// Longest enumerated sequence, counted in medial/final glyphs.
    pub max_sequence_length: usize,
    /// At or above this rise, kern unconditionally; below it, branch on the
    /// presence of a word-separating space.
    pub always_kern_threshold: i32,
    /// Only record an adjustment more negative than this; anything milder
    /// means the pair already sits acceptably and no rule is emitted.
    pub min_adjustment: i32,
    /// Glyphs whose geometry interferes with clean kerning; split out of
    /// their context group into dedicated rules.
    pub blockers: GlyphSet,
    /// The tall medial needing a narrowed context at high rise and long
    /// sequence length.
    pub tall_medial: GlyphName,
    /// The word-separating space glyph.
    pub word_separator: GlyphName,
}

impl KernConfig {
    pub fn new(target_closeness: i32, max_tuck: f64) -> Self {
        KernConfig {
            target_closeness,
            max_tuck,
            bin_count: 3,
            rise_quantization: 100,
            maximum_rise: 600,
            kern_quantization: 10,
            max_sequence_length: 5,
            always_kern_threshold: 400,
            min_adjustment: -10,
            // TODO: read these from a glyph class instead of hard coding
            blockers: vec![GlyphName::from("AINf1"), GlyphName::from("JIMf1")].into(),
            tall_medial: GlyphName::from("BARI_YEf1"),
            word_separator: GlyphName::from("space.urdu"),
        }
    }
}
