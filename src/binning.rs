//! Clustering glyphs into rise bins.

use crate::error::Error;
use crate::types::{GlyphSet, MetricsProvider};

/// Round `value` to the nearest multiple of `step`.
pub fn quantize(value: f64, step: i32) -> i32 {
    debug_assert!(step > 0);
    step * (value / step as f64).round() as i32
}

/// A cluster of glyphs with contiguous rise values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiseBin {
    pub glyphs: GlyphSet,
    /// The median rise of the members, used as the whole bin's height
    /// contribution when summing a sequence.
    pub rise: i32,
}

/// Partition `class` into at most `bin_count` bins of ascending rise.
///
/// Glyphs are sorted by (rise, name) and split into contiguous chunks, so
/// the result is a true partition and is stable across runs even when many
/// glyphs share a rise. Returns fewer bins only when the class has fewer
/// glyphs than `bin_count`.
pub fn bin_glyphs_by_rise(
    metrics: &impl MetricsProvider,
    class_name: &str,
    class: &GlyphSet,
    bin_count: usize,
) -> Result<Vec<RiseBin>, Error> {
    if class.is_empty() || bin_count == 0 {
        return Err(Error::EmptyGlyphClass(class_name.to_string()));
    }
    let mut by_rise: Vec<_> = class
        .iter()
        .map(|g| (metrics.rise(g), g.clone()))
        .collect();
    by_rise.sort_by(|(ra, ga), (rb, gb)| ra.total_cmp(rb).then_with(|| ga.cmp(gb)));

    let bin_count = bin_count.min(by_rise.len());
    let mut bins = Vec::with_capacity(bin_count);
    for i in 0..bin_count {
        let chunk = &by_rise[i * by_rise.len() / bin_count..(i + 1) * by_rise.len() / bin_count];
        let median = chunk[chunk.len() / 2].0;
        bins.push(RiseBin {
            glyphs: chunk.iter().map(|(_, g)| g.clone()).collect(),
            rise: median.round() as i32,
        });
    }
    Ok(bins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GlyphName;
    use std::collections::HashMap;

    struct FakeMetrics(HashMap<GlyphName, f64>);

    impl MetricsProvider for FakeMetrics {
        fn rise(&self, glyph: &GlyphName) -> f64 {
            self.0[glyph]
        }
        fn left_side_bearing(&self, _: &GlyphName) -> f64 {
            0.0
        }
        fn right_side_bearing(&self, _: &GlyphName) -> f64 {
            0.0
        }
        fn glyph_class(&self, _: &str) -> Option<GlyphSet> {
            None
        }
    }

    fn fixture(rises: &[(&str, f64)]) -> (FakeMetrics, GlyphSet) {
        let metrics = FakeMetrics(
            rises
                .iter()
                .map(|(name, rise)| (GlyphName::from(*name), *rise))
                .collect(),
        );
        let class = rises.iter().map(|(name, _)| GlyphName::from(*name)).collect();
        (metrics, class)
    }

    #[test]
    fn quantize_rounds_to_step() {
        assert_eq!(quantize(0.0, 100), 0);
        assert_eq!(quantize(149.0, 100), 100);
        assert_eq!(quantize(150.0, 100), 200);
        assert_eq!(quantize(-149.0, 100), -100);
        assert_eq!(quantize(-15.0, 10), -20);
    }

    #[test]
    fn quantize_is_idempotent() {
        for x in -1000..1000 {
            for step in [1, 7, 10, 100] {
                let once = quantize(x as f64, step);
                assert_eq!(quantize(once as f64, step), once);
            }
        }
    }

    #[test]
    fn bins_partition_the_class() {
        let (metrics, class) = fixture(&[
            ("a", 0.0),
            ("b", 50.0),
            ("c", 120.0),
            ("d", 300.0),
            ("e", 310.0),
            ("f", 700.0),
        ]);
        let bins = bin_glyphs_by_rise(&metrics, "medis", &class, 3).unwrap();
        assert_eq!(bins.len(), 3);
        let mut seen = Vec::new();
        for bin in &bins {
            assert!(!bin.glyphs.is_empty());
            seen.extend(bin.glyphs.iter().cloned());
        }
        let mut expected: Vec<GlyphName> = class.iter().cloned().collect();
        expected.sort();
        seen.sort();
        assert_eq!(seen, expected);
        // ascending rise
        assert!(bins.windows(2).all(|w| w[0].rise <= w[1].rise));
    }

    #[test]
    fn equal_rises_bin_deterministically() {
        let (metrics, class) = fixture(&[("z", 100.0), ("y", 100.0), ("x", 100.0), ("w", 0.0)]);
        let first = bin_glyphs_by_rise(&metrics, "medis", &class, 2).unwrap();
        let second = bin_glyphs_by_rise(&metrics, "medis", &class, 2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_class_is_an_error() {
        let (metrics, _) = fixture(&[("a", 0.0)]);
        let result = bin_glyphs_by_rise(&metrics, "finas", &GlyphSet::empty(), 3);
        assert!(matches!(result, Err(Error::EmptyGlyphClass(name)) if name == "finas"));
    }

    #[test]
    fn more_bins_than_glyphs() {
        let (metrics, class) = fixture(&[("a", 0.0), ("b", 200.0)]);
        let bins = bin_glyphs_by_rise(&metrics, "finas", &class, 5).unwrap();
        assert_eq!(bins.len(), 2);
    }
}
