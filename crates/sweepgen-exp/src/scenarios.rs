//! Lazy two-level enumeration of explicit combinations and free sweep products.

use std::iter::FusedIterator;

use sweepgen_core::SweepError;
use tracing::{debug, trace, warn};

use crate::apply::apply_combination;
use crate::experiment::ExperimentDescription;
use crate::model::CombinationBlock;
use crate::odometer::Odometer;

/// Forward-only iterator over the expanded documents of an experiment.
///
/// Created by [`ExperimentDescription::scenarios`]. Blocks are visited in
/// order; within a block each explicit row is applied to the base template,
/// then every tuple of the free sweeps' arms is applied to that partial
/// scenario. Free sweeps and their arms are enumerated in name order.
pub struct Scenarios<'a> {
    experiment: &'a ExperimentDescription,
    blocks: Vec<&'a CombinationBlock>,
    next_block: usize,
    cursor: Option<BlockCursor<'a>>,
    finished: bool,
}

struct BlockCursor<'a> {
    pinned: &'a [String],
    rows: &'a [Vec<String>],
    next_row: usize,
    free_sweeps: Vec<&'a str>,
    free_arms: Vec<Vec<&'a str>>,
    odometer: Odometer,
    scenario: Option<String>,
}

impl<'a> Scenarios<'a> {
    pub(crate) fn new(experiment: &'a ExperimentDescription) -> Self {
        Self {
            experiment,
            blocks: experiment.combinations().blocks(),
            next_block: 0,
            cursor: None,
            finished: false,
        }
    }

    fn step(&mut self) -> Result<Option<String>, SweepError> {
        let experiment = self.experiment;
        loop {
            if self.cursor.is_none() {
                let Some(block) = self.blocks.get(self.next_block).copied() else {
                    return Ok(None);
                };
                self.next_block += 1;
                self.cursor = Some(BlockCursor::new(experiment, block)?);
            }
            if let Some(cursor) = self.cursor.as_mut() {
                if let Some(document) = cursor.next_document(experiment)? {
                    return Ok(Some(document));
                }
            }
            self.cursor = None;
        }
    }
}

impl<'a> BlockCursor<'a> {
    fn new(
        experiment: &'a ExperimentDescription,
        block: &'a CombinationBlock,
    ) -> Result<Self, SweepError> {
        let pinned = block.pinned();
        if let Some(missing) = pinned
            .iter()
            .find(|sweep| !experiment.sweeps().contains_key(sweep.as_str()))
        {
            return Err(SweepError::unknown_sweep(missing));
        }
        let (free_sweeps, free_arms): (Vec<&'a str>, Vec<Vec<&'a str>>) = experiment
            .free_sweeps(pinned)
            .map(|(name, arms)| (name, arms.keys().map(String::as_str).collect()))
            .unzip();
        for (name, arms) in free_sweeps.iter().zip(&free_arms) {
            if arms.is_empty() {
                warn!(sweep = %name, "free sweep has no arms; block yields no scenarios");
            }
        }
        if !pinned.is_empty() && block.rows().is_empty() {
            warn!(?pinned, "pinned sweeps without combination rows are left unsubstituted");
        }
        let odometer = Odometer::new(free_arms.iter().map(Vec::len).collect());
        debug!(
            pinned = pinned.len(),
            rows = block.rows().len(),
            free = ?free_sweeps,
            product = odometer.len(),
            "entering combination block"
        );
        Ok(Self {
            pinned,
            rows: block.rows(),
            next_row: 0,
            free_sweeps,
            free_arms,
            odometer,
            scenario: None,
        })
    }

    /// Partial scenario for the next explicit row, or the untouched base once
    /// when the block has no rows.
    fn next_partial(
        &mut self,
        experiment: &ExperimentDescription,
    ) -> Result<Option<String>, SweepError> {
        if self.rows.is_empty() {
            if self.next_row > 0 {
                return Ok(None);
            }
            self.next_row = 1;
            return Ok(Some(experiment.base().to_owned()));
        }
        let Some(row) = self.rows.get(self.next_row) else {
            return Ok(None);
        };
        self.next_row += 1;
        apply_combination(experiment.sweeps(), experiment.base(), self.pinned, row).map(Some)
    }

    fn next_document(
        &mut self,
        experiment: &ExperimentDescription,
    ) -> Result<Option<String>, SweepError> {
        loop {
            if self.scenario.is_none() {
                match self.next_partial(experiment)? {
                    Some(partial) => {
                        self.scenario = Some(partial);
                        self.odometer.reset();
                    }
                    None => return Ok(None),
                }
            }
            if let (Some(digits), Some(scenario)) = (self.odometer.advance(), &self.scenario) {
                let arms: Vec<&str> = digits
                    .iter()
                    .zip(&self.free_arms)
                    .map(|(&digit, arms)| arms[digit])
                    .collect();
                let document =
                    apply_combination(experiment.sweeps(), scenario, &self.free_sweeps, &arms)?;
                trace!(row = self.next_row, free = ?arms, "scenario ready");
                return Ok(Some(document));
            }
            self.scenario = None;
        }
    }
}

impl Iterator for Scenarios<'_> {
    type Item = Result<String, SweepError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.step() {
            Ok(Some(document)) => Some(Ok(document)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Scenarios<'_> {}
