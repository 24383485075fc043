//! The rule structures handed to the binary-format compiler.
//!
//! These mirror the shape of GPOS lookups without committing to a binary
//! layout: a [`Routine`] is a named, ordered list of rules plus the lookup
//! flags it will carry. Routines are shared by reference ([`RoutineRef`]);
//! many chain rules pointing at one kern table must resolve to one lookup
//! in the compiled font or the lookup format overflows.

use std::collections::HashMap;
use std::sync::Arc;

use write_fonts::tables::layout::LookupFlag;

use crate::types::GlyphSet;

pub type RoutineRef = Arc<Routine>;

/// An x-advance adjustment on one glyph of a positioned pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueAdjustment {
    pub x_advance: i16,
}

impl ValueAdjustment {
    pub fn x_advance(value: i16) -> Self {
        ValueAdjustment { x_advance: value }
    }
}

/// Adjacent-pair positioning; the adjustment applies to the second glyph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairRule {
    pub first: GlyphSet,
    pub second: GlyphSet,
    pub adjustment: ValueAdjustment,
}

/// Contextual chain: when `targets` are seen preceded by `preceded_by`,
/// apply `lookups[i]` (if any) at target position `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainRule {
    pub targets: Vec<GlyphSet>,
    pub preceded_by: Vec<GlyphSet>,
    pub lookups: Vec<Option<RoutineRef>>,
}

impl ChainRule {
    /// The common case: one lookup applied at the first target position.
    pub fn applying(targets: Vec<GlyphSet>, preceded_by: Vec<GlyphSet>, lookup: RoutineRef) -> Self {
        let mut lookups: Vec<Option<RoutineRef>> = vec![None; targets.len()];
        lookups[0] = Some(lookup);
        ChainRule {
            targets,
            preceded_by,
            lookups,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Pair(PairRule),
    Chain(ChainRule),
}

/// A named, ordered rule list; the unit the binary compiler consumes.
///
/// Rules are append-only and emitted in generation order; the order is
/// significant for longest-match-first resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    pub name: String,
    pub rules: Vec<Rule>,
    pub flags: LookupFlag,
    /// When set, only these (mark) glyphs participate in match filtering.
    pub mark_filter_set: Option<GlyphSet>,
}

impl Routine {
    pub fn new(name: impl Into<String>, flags: LookupFlag) -> Self {
        Routine {
            name: name.into(),
            rules: Vec::new(),
            flags,
            mark_filter_set: None,
        }
    }
}

/// Host-owned namespace of routines.
///
/// Injected into the compiler rather than global: `reference` is the
/// dedup/sharing point for generated tables, `routine_named` resolves the
/// externally-built routines the height-band router dispatches to.
pub trait RuleRegistry {
    fn routine_named(&self, name: &str) -> Option<RoutineRef>;

    /// Register `routine`, returning the shared reference every rule that
    /// uses it must hold. Registering a name twice returns the first
    /// registration unchanged.
    fn reference(&mut self, routine: Routine) -> RoutineRef;
}

/// A plain map-backed registry, enough for hosts without their own.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    routines: HashMap<String, RoutineRef>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RuleRegistry for InMemoryRegistry {
    fn routine_named(&self, name: &str) -> Option<RoutineRef> {
        self.routines.get(name).cloned()
    }

    fn reference(&mut self, routine: Routine) -> RoutineRef {
        self.routines
            .entry(routine.name.clone())
            .or_insert_with(|| Arc::new(routine))
            .clone()
    }
}
