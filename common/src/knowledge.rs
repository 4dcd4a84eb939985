use std::collections::HashSet;

use itertools::Itertools;
use rand::Rng;
use rand::prelude::IndexedRandom;

use crate::constraint::Constraint;
use crate::error::{KnowledgeError, Result};
use crate::point::Point;

/// Everything proven so far about the hidden board.
///
/// `dangerous`, `safe` and `played` only grow and `dangerous` never meets
/// `safe`. Constraints are never removed; they shrink in place as their
/// cells become known and retire once empty. Every stored constraint is
/// already reduced by everything in `dangerous` and `safe`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct KnowledgeBase {
    dangerous: HashSet<Point>,
    safe: HashSet<Point>,
    played: HashSet<Point>,
    constraints: Vec<Constraint>,
}

/// What a run of the fixpoint loop did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Saturation {
    /// Extraction/resolution rounds, including the final one that found nothing.
    pub passes: usize,
    /// Cells newly classified as safe or dangerous.
    pub marked: usize,
    /// Constraints added by the subset rule.
    pub derived: usize,
}

impl Saturation {
    pub fn changed(&self) -> bool {
        self.marked > 0 || self.derived > 0
    }
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dangerous(&self) -> &HashSet<Point> {
        &self.dangerous
    }

    pub fn safe(&self) -> &HashSet<Point> {
        &self.safe
    }

    pub fn played(&self) -> &HashSet<Point> {
        &self.played
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_dangerous(&self, cell: &Point) -> bool {
        self.dangerous.contains(cell)
    }

    pub fn is_safe(&self, cell: &Point) -> bool {
        self.safe.contains(cell)
    }

    pub fn is_played(&self, cell: &Point) -> bool {
        self.played.contains(cell)
    }

    /// Records `cell` as dangerous and reduces every constraint containing it.
    ///
    /// Idempotent. Does not run the fixpoint loop. Fails without changing
    /// anything if `cell` is known safe or some constraint has no dangerous
    /// cells left to give.
    pub fn mark_dangerous(&mut self, cell: Point) -> Result<bool> {
        if self.safe.contains(&cell) {
            return Err(KnowledgeError::SafeDangerousOverlap { cell });
        }
        if self.dangerous.contains(&cell) {
            return Ok(false);
        }
        if let Some(exhausted) = self
            .constraints
            .iter()
            .find(|c| c.contains(&cell) && c.count() == 0)
        {
            return Err(KnowledgeError::NegativeCount {
                cell,
                constraint: exhausted.to_string(),
            });
        }

        self.dangerous.insert(cell);
        for constraint in &mut self.constraints {
            constraint.resolve_dangerous(cell)?;
        }
        Ok(true)
    }

    /// Records `cell` as safe and removes it from every constraint.
    ///
    /// Idempotent. Does not run the fixpoint loop. Fails without changing
    /// anything if `cell` is known dangerous or some constraint needs every
    /// one of its cells to be dangerous.
    pub fn mark_safe(&mut self, cell: Point) -> Result<bool> {
        if self.dangerous.contains(&cell) {
            return Err(KnowledgeError::SafeDangerousOverlap { cell });
        }
        if self.safe.contains(&cell) {
            return Ok(false);
        }
        if let Some(full) = self
            .constraints
            .iter()
            .find(|c| c.contains(&cell) && c.count() == c.cells().len())
        {
            return Err(KnowledgeError::Overcommitted(full.to_string()));
        }

        self.safe.insert(cell);
        for constraint in &mut self.constraints {
            constraint.resolve_safe(cell)?;
        }
        Ok(true)
    }

    /// Learns that `cell` was revealed safely and has `count` dangerous cells
    /// among `neighbors`, then saturates.
    ///
    /// Atomic: on a contradiction the knowledge base is left exactly as it
    /// was before the call.
    pub fn observe(
        &mut self,
        cell: Point,
        count: usize,
        neighbors: impl IntoIterator<Item = Point>,
    ) -> Result<Saturation> {
        self.transaction(|kb| {
            kb.played.insert(cell);
            kb.mark_safe(cell)?;

            let mut constraint =
                Constraint::new(neighbors.into_iter().filter(|n| !kb.played.contains(n)), count)?;
            let members: Vec<Point> = constraint.cells().iter().copied().collect();
            for member in members {
                if kb.dangerous.contains(&member) {
                    constraint.resolve_dangerous(member)?;
                } else if kb.safe.contains(&member) {
                    constraint.resolve_safe(member)?;
                }
            }
            kb.insert(constraint);

            kb.saturate_in_place()
        })
    }

    /// Runs the fixpoint loop until neither rule produces anything new.
    ///
    /// Atomic in the same way as [`KnowledgeBase::observe`].
    pub fn saturate(&mut self) -> Result<Saturation> {
        self.transaction(Self::saturate_in_place)
    }

    /// Adds a constraint (reduced by current knowledge) without saturating.
    /// Returns `false` if a structurally equal constraint is already stored.
    pub fn add_constraint(&mut self, mut constraint: Constraint) -> Result<bool> {
        constraint.validate()?;
        for cell in self.dangerous.iter() {
            constraint.resolve_dangerous(*cell)?;
        }
        for cell in self.safe.iter() {
            constraint.resolve_safe(*cell)?;
        }
        Ok(self.insert(constraint))
    }

    /// Any cell proven safe that has not been played yet.
    pub fn safe_unplayed_cell(&self) -> Option<Point> {
        self.safe.difference(&self.played).min().copied()
    }

    /// A uniformly random cell of `all_cells` that is neither played nor
    /// known dangerous.
    pub fn unconstrained_cell<R: Rng + ?Sized>(
        &self,
        all_cells: impl IntoIterator<Item = Point>,
        rng: &mut R,
    ) -> Option<Point> {
        let candidates: Vec<Point> = all_cells
            .into_iter()
            .filter(|cell| !self.played.contains(cell) && !self.dangerous.contains(cell))
            .collect();
        candidates.choose(rng).copied()
    }

    /// True once every dangerous cell on the board has been identified.
    pub fn won(&self, total_dangerous: usize) -> bool {
        self.dangerous.len() == total_dangerous
    }

    /// Checks every invariant the knowledge base maintains.
    pub fn check_invariants(&self) -> Result<()> {
        if let Some(&cell) = self.safe.intersection(&self.dangerous).next() {
            return Err(KnowledgeError::SafeDangerousOverlap { cell });
        }
        self.constraints.iter().try_for_each(Constraint::validate)
    }

    fn insert(&mut self, constraint: Constraint) -> bool {
        if self.constraints.contains(&constraint) {
            return false;
        }
        self.constraints.push(constraint);
        true
    }

    fn transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.clone();
        match f(self).and_then(|value| self.check_invariants().map(|()| value)) {
            Ok(value) => Ok(value),
            Err(err) => {
                log::warn!("contradiction, discarding update: {err}");
                *self = snapshot;
                Err(err)
            }
        }
    }

    fn saturate_in_place(&mut self) -> Result<Saturation> {
        let mut report = Saturation::default();
        loop {
            report.passes += 1;

            let marked = self.extract_known()?;
            report.marked += marked;
            if marked > 0 {
                continue;
            }

            let derived = self.resolve_subsets()?;
            report.derived += derived;
            if derived == 0 {
                break;
            }
        }
        log::debug!(
            "saturated after {} passes: {} marked, {} derived, {} constraints",
            report.passes,
            report.marked,
            report.derived,
            self.constraints.len()
        );
        Ok(report)
    }

    /// Marks every cell some constraint proves on its own.
    fn extract_known(&mut self) -> Result<usize> {
        let mut marked = 0;
        for i in 0..self.constraints.len() {
            let (mines, safes) = {
                let constraint = &self.constraints[i];
                (constraint.known_dangerous(), constraint.known_safe())
            };
            for cell in mines {
                if self.mark_dangerous(cell)? {
                    log::trace!("{cell} is dangerous");
                    marked += 1;
                }
            }
            for cell in safes {
                if self.mark_safe(cell)? {
                    log::trace!("{cell} is safe");
                    marked += 1;
                }
            }
        }
        Ok(marked)
    }

    /// Applies the subset rule to every ordered pair of live constraints.
    fn resolve_subsets(&mut self) -> Result<usize> {
        let live: Vec<usize> = (0..self.constraints.len())
            .filter(|&i| !self.constraints[i].is_retired())
            .collect();

        let mut derived: Vec<Constraint> = Vec::new();
        for (&i, &j) in live.iter().cartesian_product(&live) {
            let (subset, superset) = (&self.constraints[i], &self.constraints[j]);
            if i == j || subset == superset || !subset.is_subset_of(superset) {
                continue;
            }
            let candidate = superset.subtract(subset)?;
            if !self.constraints.contains(&candidate) && !derived.contains(&candidate) {
                log::trace!("{superset} minus {subset} gives {candidate}");
                derived.push(candidate);
            }
        }

        let count = derived.len();
        self.constraints.extend(derived);
        Ok(count)
    }
}
