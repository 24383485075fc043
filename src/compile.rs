//! The two compiler entry points.
//!
//! [`compile_kerning`] walks every enumerated word-tail sequence, builds
//! (or reuses) the kern table for its height, and emits one chain rule per
//! sequence, longest first. [`compile_at_height`] reuses the same
//! height classification to dispatch to an externally supplied routine
//! instead of building tables; the dot-avoidance rules ride on this.

use log::debug;
use write_fonts::tables::layout::LookupFlag;

use crate::binning::bin_glyphs_by_rise;
use crate::cache::KernCache;
use crate::config::{classes, KernConfig};
use crate::error::Error;
use crate::rules::{ChainRule, Routine, Rule, RuleRegistry};
use crate::sequence::SequenceIter;
use crate::tables::{KernClasses, TableBuilder};
use crate::types::{GlyphSet, KernSolver, MetricsProvider};

/// Tall sequences longer than this get the extra bari-ye context rule.
const TALL_CONTEXT_MIN_LENGTH: usize = 4;

fn class_named(metrics: &impl MetricsProvider, name: &str) -> Result<GlyphSet, Error> {
    metrics
        .glyph_class(name)
        .ok_or_else(|| Error::MissingGlyphClass(name.to_string()))
}

fn required_class(metrics: &impl MetricsProvider, name: &str) -> Result<GlyphSet, Error> {
    let class = class_named(metrics, name)?;
    if class.is_empty() {
        return Err(Error::EmptyGlyphClass(name.to_string()));
    }
    Ok(class)
}

fn with_initials(initials: &GlyphSet, context: &[GlyphSet]) -> Vec<GlyphSet> {
    std::iter::once(initials.clone())
        .chain(context.iter().cloned())
        .collect()
}

/// Compile the full contextual kerning feature.
///
/// Returns the generated routines in emission order; the kern tables and
/// dispatchers they reference have been registered with `registry`. The
/// cache is flushed before returning successfully (and again on drop, so a
/// failed run loses nothing it already paid for).
pub fn compile_kerning<M: MetricsProvider, S: KernSolver>(
    metrics: &M,
    solver: &S,
    cache: &mut KernCache,
    registry: &mut dyn RuleRegistry,
    config: &KernConfig,
) -> Result<Vec<Routine>, Error> {
    let initials = required_class(metrics, classes::INITIALS)?;
    let medials = required_class(metrics, classes::MEDIALS)?;
    let bari_ye = class_named(metrics, classes::BARI_YE)?;
    // bari-ye is kerned as part of the target class but binned separately;
    // its rise dwarfs the rest of the finals
    let isolates = required_class(metrics, classes::ISOLATES)?.without(&bari_ye);
    let finals = required_class(metrics, classes::FINALS)?.without(&bari_ye);
    let above_marks = class_named(metrics, classes::ABOVE_MARKS)?;
    let isolates_finals = isolates.union(&finals).union(&bari_ye);

    let binned_medials = bin_glyphs_by_rise(metrics, classes::MEDIALS, &medials, config.bin_count)?;
    let binned_finals = bin_glyphs_by_rise(metrics, classes::FINALS, &finals, config.bin_count)?;

    let kern_classes = KernClasses {
        initials: initials.clone(),
        isolates: isolates.clone(),
        isolates_finals: isolates_finals.clone(),
        above_marks,
    };
    let mut builder = TableBuilder::new(metrics, solver, cache, registry, config, &kern_classes);

    let mut routine = Routine::new(
        "NastaliqKerning",
        LookupFlag::IGNORE_MARKS | LookupFlag::IGNORE_LIGATURES,
    );
    let targets = vec![isolates_finals.clone()];

    for seq in SequenceIter::new(
        &binned_finals,
        &binned_medials,
        config.max_sequence_length,
        config.rise_quantization,
        config.maximum_rise,
    ) {
        debug!("Sequence of {} medials at rise {}", seq.length, seq.rise);
        let lookup = builder.table_for_rise(seq.rise)?;
        let mut context = seq.context;

        // Blocking finals are pulled out of the innermost group into their
        // own rule; keeping the groups constant across the lookup lets it
        // compile to the class-based (format 2) representation.
        let mut split_blockers = None;
        if let Some(innermost) = context.last_mut() {
            if innermost.iter().any(|g| config.blockers.contains(g)) {
                split_blockers = Some(innermost.intersect(&config.blockers));
                *innermost = innermost.without(&config.blockers);
            }
        }

        if context.last().map_or(true, |innermost| !innermost.is_empty()) {
            routine.rules.push(Rule::Chain(ChainRule::applying(
                targets.clone(),
                with_initials(&initials, &context),
                lookup.clone(),
            )));
        }

        // A lone final next to its initial needs no blocker rule; the pair
        // table already sees the exact glyphs.
        if context.len() > 1 {
            if let (Some(blockers), Some(innermost)) = (split_blockers, context.last_mut()) {
                *innermost = blockers;
                routine.rules.push(Rule::Chain(ChainRule::applying(
                    targets.clone(),
                    with_initials(&initials, &context),
                    lookup.clone(),
                )));
            }
        }

        if seq.rise >= config.always_kern_threshold && seq.length > TALL_CONTEXT_MIN_LENGTH {
            // Narrow the innermost group to the tall medial so this long,
            // tall combination keeps a consistent class assignment.
            if let Some(innermost) = context.last_mut() {
                *innermost = config.tall_medial.clone().into();
                routine.rules.push(Rule::Chain(ChainRule::applying(
                    targets.clone(),
                    with_initials(&initials, &context),
                    lookup,
                )));
            }
        }
    }

    // Isolates kern against each other at the baseline, outside the
    // sequence enumeration.
    let baseline = builder.table_for_rise(0)?;
    routine.rules.push(Rule::Chain(ChainRule::applying(
        targets,
        vec![isolates],
        baseline,
    )));

    cache.flush()?;
    Ok(vec![routine])
}

/// Dispatch arbitrary per-height behavior to an existing routine.
///
/// Emits, for every enumerated sequence whose quantized rise falls within
/// `low..=high`, a chain rule applying the registry routine named
/// `routine_name` at the boundary. No tables are built and no adjustment
/// filtering happens here; the supplied routine is trusted as-is.
pub fn compile_at_height(
    metrics: &impl MetricsProvider,
    registry: &dyn RuleRegistry,
    config: &KernConfig,
    low: i32,
    high: i32,
    routine_name: &str,
) -> Result<Routine, Error> {
    let target_routine = registry
        .routine_named(routine_name)
        .ok_or_else(|| Error::UnknownRoutine(routine_name.to_string()))?;
    let initials = required_class(metrics, classes::INITIALS)?;
    let medials = required_class(metrics, classes::MEDIALS)?;
    let isolates = required_class(metrics, classes::ISOLATES)?;
    let finals = required_class(metrics, classes::FINALS)?;
    let isolates_finals = isolates.union(&finals);

    let binned_medials = bin_glyphs_by_rise(metrics, classes::MEDIALS, &medials, config.bin_count)?;
    let binned_finals = bin_glyphs_by_rise(metrics, classes::FINALS, &finals, config.bin_count)?;

    let mut routine = Routine::new(
        format!("At_{low}_{high}_{routine_name}"),
        LookupFlag::IGNORE_MARKS | LookupFlag::IGNORE_LIGATURES,
    );

    for seq in SequenceIter::unclamped(
        &binned_finals,
        &binned_medials,
        config.max_sequence_length,
        config.rise_quantization,
    ) {
        if seq.rise < low || seq.rise > high {
            continue;
        }
        routine.rules.push(Rule::Chain(ChainRule::applying(
            vec![isolates_finals.clone(), initials.clone()],
            seq.context,
            target_routine.clone(),
        )));
    }
    Ok(routine)
}
