use std::collections::HashSet;
use std::fmt;

use itertools::Itertools;

use crate::error::{KnowledgeError, Result};
use crate::point::Point;

/// "Exactly `count` of these cells are dangerous."
///
/// The shape is fixed at construction; the content shrinks as member cells
/// become known. `0 <= count <= cells.len()` holds after every mutation, and
/// a mutation that would break it is rejected before anything changes.
/// Equality is structural: same cell set, same count.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Constraint {
    cells: HashSet<Point>,
    count: usize,
}

impl Constraint {
    pub fn new(cells: impl IntoIterator<Item = Point>, count: usize) -> Result<Self> {
        let constraint = Constraint {
            cells: cells.into_iter().collect(),
            count,
        };
        constraint.validate()?;
        Ok(constraint)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cells.is_empty() && self.count != 0 {
            return Err(KnowledgeError::EmptyWithCount { count: self.count });
        }
        if self.count > self.cells.len() {
            return Err(KnowledgeError::Overcommitted(self.to_string()));
        }
        Ok(())
    }

    pub fn cells(&self) -> &HashSet<Point> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn contains(&self, cell: &Point) -> bool {
        self.cells.contains(cell)
    }

    /// A retired constraint has no cells left and can never yield anything.
    pub fn is_retired(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every cell, when the count equals the number of cells.
    pub fn known_dangerous(&self) -> HashSet<Point> {
        if self.cells.len() == self.count {
            self.cells.clone()
        } else {
            HashSet::new()
        }
    }

    /// Every cell, when the count is zero.
    pub fn known_safe(&self) -> HashSet<Point> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            HashSet::new()
        }
    }

    /// Accounts for `cell` being dangerous. Returns whether the constraint changed.
    pub fn resolve_dangerous(&mut self, cell: Point) -> Result<bool> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        if self.count == 0 {
            return Err(KnowledgeError::NegativeCount {
                cell,
                constraint: self.to_string(),
            });
        }
        self.cells.remove(&cell);
        self.count -= 1;
        Ok(true)
    }

    /// Accounts for `cell` being safe. Returns whether the constraint changed.
    pub fn resolve_safe(&mut self, cell: Point) -> Result<bool> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        // Removing a cell from an all-dangerous constraint leaves more
        // dangerous cells than members.
        if self.count == self.cells.len() {
            return Err(KnowledgeError::Overcommitted(self.to_string()));
        }
        self.cells.remove(&cell);
        Ok(true)
    }

    pub fn is_subset_of(&self, other: &Constraint) -> bool {
        self.cells.len() <= other.cells.len() && self.cells.is_subset(&other.cells)
    }

    /// The subset rule: given `subset` whose cells all lie in `self`, the
    /// cells only `self` covers hold the remaining dangerous cells.
    pub fn subtract(&self, subset: &Constraint) -> Result<Constraint> {
        debug_assert!(subset.is_subset_of(self));
        let count = self
            .count
            .checked_sub(subset.count)
            .ok_or_else(|| KnowledgeError::Overcommitted(subset.to_string()))?;
        Constraint::new(self.cells.difference(&subset.cells).copied(), count)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}} = {}",
            self.cells.iter().sorted().join(", "),
            self.count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: usize, y: usize) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_known_dangerous_when_count_matches_size() {
        let all_mines = Constraint::new([p(0, 0), p(0, 1)], 2).unwrap();
        assert_eq!(all_mines.known_dangerous(), HashSet::from([p(0, 0), p(0, 1)]));
        assert!(all_mines.known_safe().is_empty());

        let undecided = Constraint::new([p(0, 0), p(0, 1)], 1).unwrap();
        assert!(undecided.known_dangerous().is_empty());
        assert!(undecided.known_safe().is_empty());
    }

    #[test]
    fn test_known_safe_when_count_is_zero() {
        let clear = Constraint::new([p(1, 1), p(2, 2)], 0).unwrap();
        assert_eq!(clear.known_safe(), HashSet::from([p(1, 1), p(2, 2)]));
        assert!(clear.known_dangerous().is_empty());
    }

    #[test]
    fn test_construction_rejects_impossible_counts() {
        assert_eq!(
            Constraint::new(std::iter::empty(), 1),
            Err(KnowledgeError::EmptyWithCount { count: 1 })
        );
        assert!(matches!(
            Constraint::new([p(0, 0)], 2),
            Err(KnowledgeError::Overcommitted(_))
        ));
        // Duplicate points collapse into one cell.
        assert!(Constraint::new([p(0, 0), p(0, 0)], 2).is_err());
    }

    #[test]
    fn test_resolve_dangerous_removes_cell_and_decrements() {
        let mut c = Constraint::new([p(0, 0), p(0, 1), p(0, 2)], 2).unwrap();
        assert!(c.resolve_dangerous(p(0, 1)).unwrap());
        assert_eq!(c, Constraint::new([p(0, 0), p(0, 2)], 1).unwrap());

        // Absent cells are a no-op.
        assert!(!c.resolve_dangerous(p(5, 5)).unwrap());
        assert_eq!(c.count(), 1);
    }

    #[test]
    fn test_resolve_dangerous_rejects_negative_count() {
        let mut c = Constraint::new([p(0, 0), p(0, 1)], 0).unwrap();
        let err = c.resolve_dangerous(p(0, 0)).unwrap_err();
        assert!(matches!(err, KnowledgeError::NegativeCount { cell, .. } if cell == p(0, 0)));
        // Nothing changed.
        assert_eq!(c.cells().len(), 2);
    }

    #[test]
    fn test_resolve_safe_keeps_count() {
        let mut c = Constraint::new([p(0, 0), p(0, 1)], 1).unwrap();
        assert!(c.resolve_safe(p(0, 0)).unwrap());
        assert_eq!(c, Constraint::new([p(0, 1)], 1).unwrap());
        assert!(!c.resolve_safe(p(0, 0)).unwrap());
    }

    #[test]
    fn test_resolve_safe_rejects_overcommitted() {
        let mut c = Constraint::new([p(3, 3)], 1).unwrap();
        assert!(matches!(
            c.resolve_safe(p(3, 3)),
            Err(KnowledgeError::Overcommitted(_))
        ));
        assert_eq!(c.count(), 1);
        assert!(c.contains(&p(3, 3)));
    }

    #[test]
    fn test_retired_after_all_cells_resolved() {
        let mut c = Constraint::new([p(0, 0), p(1, 0)], 1).unwrap();
        c.resolve_dangerous(p(0, 0)).unwrap();
        c.resolve_safe(p(1, 0)).unwrap();
        assert!(c.is_retired());
        assert_eq!(c.count(), 0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_structural_equality_ignores_insertion_order() {
        let a = Constraint::new([p(0, 0), p(1, 1), p(2, 2)], 1).unwrap();
        let b = Constraint::new([p(2, 2), p(0, 0), p(1, 1)], 1).unwrap();
        assert_eq!(a, b);
        let c = Constraint::new([p(2, 2), p(0, 0), p(1, 1)], 2).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_subtract_subset() {
        let big = Constraint::new([p(0, 0), p(0, 1), p(0, 2)], 1).unwrap();
        let small = Constraint::new([p(0, 0), p(0, 1)], 1).unwrap();
        assert!(small.is_subset_of(&big));
        assert!(!big.is_subset_of(&small));
        assert_eq!(
            big.subtract(&small).unwrap(),
            Constraint::new([p(0, 2)], 0).unwrap()
        );
    }

    #[test]
    fn test_subtract_detects_contradiction() {
        let big = Constraint::new([p(0, 0), p(0, 1), p(0, 2)], 3).unwrap();
        let small = Constraint::new([p(0, 0), p(0, 1)], 0).unwrap();
        // {(0, 2)} = 3 is impossible.
        assert!(matches!(
            big.subtract(&small),
            Err(KnowledgeError::Overcommitted(_))
        ));

        let same_cells = Constraint::new([p(0, 0), p(0, 1)], 2).unwrap();
        let fewer = Constraint::new([p(0, 0), p(0, 1)], 1).unwrap();
        assert_eq!(
            same_cells.subtract(&fewer),
            Err(KnowledgeError::EmptyWithCount { count: 1 })
        );
    }

    #[test]
    fn test_display_is_sorted() {
        let c = Constraint::new([p(1, 0), p(0, 1)], 1).unwrap();
        assert_eq!(c.to_string(), "{(0, 1), (1, 0)} = 1");
    }
}
