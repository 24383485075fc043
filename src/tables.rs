//! Building and sharing the per-rise kern tables.
//!
//! One table is built per quantized rise value and shared, by reference,
//! between every rule that targets that rise. Below the always-kern
//! threshold the table is wrapped in a two-branch dispatcher that prefers
//! an ink-to-ink spacing table when a word-separating space is present.

use std::collections::BTreeMap;

use log::debug;
use write_fonts::tables::layout::LookupFlag;

use crate::binning::quantize;
use crate::cache::{KernCache, KernKey};
use crate::config::KernConfig;
use crate::error::Error;
use crate::rules::{
    ChainRule, PairRule, Routine, RoutineRef, Rule, RuleRegistry, ValueAdjustment,
};
use crate::types::{GlyphSet, KernSolver, MetricsProvider};

/// The resolved glyph classes a compilation works over.
#[derive(Debug, Clone)]
pub struct KernClasses {
    /// Initial forms; candidate left glyphs of every boundary pair.
    pub initials: GlyphSet,
    /// Isolated forms, bari-ye excluded.
    pub isolates: GlyphSet,
    /// Everything a word can end with: isolates, finals and bari-ye.
    pub isolates_finals: GlyphSet,
    /// Marks ignored when matching; base contours drive this kerning.
    pub above_marks: GlyphSet,
}

pub struct TableBuilder<'a, M, S> {
    metrics: &'a M,
    solver: &'a S,
    cache: &'a mut KernCache,
    registry: &'a mut dyn RuleRegistry,
    config: &'a KernConfig,
    classes: &'a KernClasses,
    kern_at_rise: BTreeMap<i32, RoutineRef>,
    dispatch_at_rise: BTreeMap<i32, RoutineRef>,
    ink_to_ink: BTreeMap<i32, RoutineRef>,
}

impl<'a, M: MetricsProvider, S: KernSolver> TableBuilder<'a, M, S> {
    pub fn new(
        metrics: &'a M,
        solver: &'a S,
        cache: &'a mut KernCache,
        registry: &'a mut dyn RuleRegistry,
        config: &'a KernConfig,
        classes: &'a KernClasses,
    ) -> Self {
        TableBuilder {
            metrics,
            solver,
            cache,
            registry,
            config,
            classes,
            kern_at_rise: BTreeMap::new(),
            dispatch_at_rise: BTreeMap::new(),
            ink_to_ink: BTreeMap::new(),
        }
    }

    /// The routine to apply at a boundary whose word tail rises `r` units.
    ///
    /// At or above the always-kern threshold this is the kern table itself;
    /// below it, a dispatcher that matches a word-separating space first.
    /// Idempotent per quantized rise: equal rises share one routine.
    pub fn table_for_rise(&mut self, r: i32) -> Result<RoutineRef, Error> {
        let quantized = quantize(r as f64, self.config.rise_quantization);
        if r >= self.config.always_kern_threshold {
            return self.kern_routine_at(quantized);
        }
        if let Some(dispatch) = self.dispatch_at_rise.get(&quantized) {
            return Ok(dispatch.clone());
        }
        let kern = self.kern_routine_at(quantized)?;
        let ink_to_ink = self.ink_to_ink_at(quantized);
        let ends = self.left_candidates(quantized);
        let mut dispatch = Routine::new(format!("dispatch_{quantized}"), LookupFlag::IGNORE_MARKS);
        // space branch first: the more specific match must win
        dispatch.rules.push(Rule::Chain(ChainRule::applying(
            vec![
                self.classes.isolates_finals.clone(),
                self.config.word_separator.clone().into(),
                ends.clone(),
            ],
            Vec::new(),
            ink_to_ink,
        )));
        dispatch.rules.push(Rule::Chain(ChainRule::applying(
            vec![self.classes.isolates_finals.clone(), ends],
            Vec::new(),
            kern,
        )));
        let dispatch = self.registry.reference(dispatch);
        self.dispatch_at_rise.insert(quantized, dispatch.clone());
        Ok(dispatch)
    }

    /// Left glyphs that can open the following word at this rise. Any
    /// positive rise means a medial or final was already consumed, so only
    /// true initials qualify; at the baseline isolates do too.
    fn left_candidates(&self, rise: i32) -> GlyphSet {
        if rise > 0 {
            self.classes.initials.clone()
        } else {
            self.classes.initials.union(&self.classes.isolates)
        }
    }

    fn kern_routine_at(&mut self, quantized: i32) -> Result<RoutineRef, Error> {
        if let Some(table) = self.kern_at_rise.get(&quantized) {
            return Ok(table.clone());
        }
        debug!("Generating kern table for rise {quantized}");
        let ends = self.left_candidates(quantized).sorted();
        let mut flags = LookupFlag::IGNORE_MARKS | LookupFlag::IGNORE_LIGATURES;
        flags |= LookupFlag::USE_MARK_FILTERING_SET;
        let mut routine = Routine::new(format!("kern_at_{quantized}"), flags);
        routine.mark_filter_set = Some(self.classes.above_marks.clone());
        for boundary in &self.classes.isolates_finals {
            for initial in &ends {
                let kern = self.cache.lookup_or_compute(
                    KernKey::new(
                        initial.clone(),
                        boundary.clone(),
                        self.config.target_closeness,
                        quantized,
                        self.config.max_tuck,
                    ),
                    self.solver,
                )?;
                // only record kerns that actually pull the pair closer
                if kern < self.config.min_adjustment {
                    let value = quantize(kern as f64, self.config.kern_quantization);
                    routine.rules.push(Rule::Pair(PairRule {
                        first: boundary.clone().into(),
                        second: initial.clone().into(),
                        adjustment: ValueAdjustment::x_advance(value as i16),
                    }));
                }
            }
        }
        debug!(
            "Rise {quantized}: {} of {} pairs kerned",
            routine.rules.len(),
            self.classes.isolates_finals.len() * ends.len()
        );
        let routine = self.registry.reference(routine);
        self.kern_at_rise.insert(quantized, routine.clone());
        Ok(routine)
    }

    /// The side-bearing based fallback applied across a word separator.
    /// Built once per rise band; the base distance tapers with height to
    /// keep the visual gap proportionate.
    fn ink_to_ink_at(&mut self, quantized: i32) -> RoutineRef {
        if let Some(routine) = self.ink_to_ink.get(&quantized) {
            return routine.clone();
        }
        let taper = match quantized {
            100 => 0.5,
            200 | 300 => 0.2,
            _ => 1.0,
        };
        let distance = self.config.target_closeness as f64 * taper;
        let lefts = self.classes.initials.union(&self.classes.isolates);
        let mut routine = Routine::new(
            format!("ink_to_ink_{quantized}"),
            LookupFlag::IGNORE_MARKS | LookupFlag::IGNORE_LIGATURES,
        );
        for boundary in &self.classes.isolates_finals {
            for left in &lefts {
                let gap = self.metrics.right_side_bearing(left).max(0.0)
                    + self.metrics.left_side_bearing(boundary).max(0.0);
                let adjustment = (distance - gap) as i32;
                if adjustment == 0 {
                    continue;
                }
                routine.rules.push(Rule::Pair(PairRule {
                    first: boundary.clone().into(),
                    second: left.clone().into(),
                    adjustment: ValueAdjustment::x_advance(adjustment as i16),
                }));
            }
        }
        let routine = self.registry.reference(routine);
        self.ink_to_ink.insert(quantized, routine.clone());
        routine
    }
}
