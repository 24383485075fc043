//! Basic types shared across the compiler.
//!
//! Glyphs are opaque names; metrics and class membership come from the host
//! font via [`MetricsProvider`].

use std::fmt::{Debug, Display};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::SolverError;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GlyphName(SmolStr);

impl GlyphName {
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(SmolStr::new(s))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn into_inner(self) -> SmolStr {
        self.0
    }
}

impl From<String> for GlyphName {
    fn from(value: String) -> Self {
        GlyphName(value.into())
    }
}

impl From<&str> for GlyphName {
    fn from(value: &str) -> Self {
        GlyphName(value.into())
    }
}

impl From<SmolStr> for GlyphName {
    fn from(value: SmolStr) -> Self {
        GlyphName(value)
    }
}

impl Debug for GlyphName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for GlyphName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for GlyphName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// lets a HashSet<GlyphName> be probed with &str
impl std::borrow::Borrow<str> for GlyphName {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq<&str> for GlyphName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// An ordered set of glyphs, cheap to clone.
///
/// Order is meaningful: rules iterate members in the order the host font
/// declared them, and two sets compare equal only if their members and order
/// match.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlyphSet(Arc<[GlyphName]>);

impl GlyphSet {
    pub fn empty() -> Self {
        GlyphSet(Arc::new([]))
    }

    pub fn items(&self) -> &[GlyphName] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlyphName> + '_ {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, glyph: &GlyphName) -> bool {
        self.0.contains(glyph)
    }

    /// Members not present in `other`, preserving this set's order.
    pub fn without(&self, other: &GlyphSet) -> GlyphSet {
        self.iter()
            .filter(|g| !other.contains(g))
            .cloned()
            .collect()
    }

    /// Members also present in `other`, preserving this set's order.
    pub fn intersect(&self, other: &GlyphSet) -> GlyphSet {
        self.iter().filter(|g| other.contains(g)).cloned().collect()
    }

    /// The union of the two sets, deduplicated, preserving first-seen order.
    pub fn union(&self, other: &GlyphSet) -> GlyphSet {
        self.iter()
            .chain(other.iter().filter(|g| !self.contains(g)))
            .cloned()
            .collect()
    }

    /// A copy sorted by glyph name.
    pub fn sorted(&self) -> GlyphSet {
        let mut vec: Vec<_> = self.0.to_vec();
        vec.sort_unstable();
        GlyphSet(vec.into())
    }
}

impl Debug for GlyphSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl FromIterator<GlyphName> for GlyphSet {
    fn from_iter<T: IntoIterator<Item = GlyphName>>(iter: T) -> Self {
        GlyphSet(iter.into_iter().collect())
    }
}

impl From<Vec<GlyphName>> for GlyphSet {
    fn from(src: Vec<GlyphName>) -> GlyphSet {
        GlyphSet(src.into())
    }
}

impl From<GlyphName> for GlyphSet {
    fn from(src: GlyphName) -> GlyphSet {
        let slice: &[_] = &[src];
        GlyphSet(slice.into())
    }
}

impl<'a> IntoIterator for &'a GlyphSet {
    type Item = &'a GlyphName;
    type IntoIter = std::slice::Iter<'a, GlyphName>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Per-glyph metrics and named classes, supplied by the host font.
pub trait MetricsProvider {
    /// The vertical displacement this glyph contributes to a joined sequence.
    fn rise(&self, glyph: &GlyphName) -> f64;

    fn left_side_bearing(&self, glyph: &GlyphName) -> f64;

    fn right_side_bearing(&self, glyph: &GlyphName) -> f64;

    /// A named glyph class, in the font's declaration order.
    fn glyph_class(&self, name: &str) -> Option<GlyphSet>;
}

/// The external pairwise kern-distance solver.
///
/// Implementations are expected to be deterministic for a given font state;
/// results are memoized persistently and never invalidated.
pub trait KernSolver {
    /// Signed advance adjustment bringing `left` and `right` to
    /// `target_closeness` units apart when the sequence after `left` sits
    /// `height` units above the baseline, allowing the glyphs to tuck into
    /// each other by at most `max_tuck` of their width.
    fn solve(
        &self,
        left: &GlyphName,
        right: &GlyphName,
        target_closeness: i32,
        height: i32,
        max_tuck: f64,
    ) -> Result<i32, SolverError>;
}
