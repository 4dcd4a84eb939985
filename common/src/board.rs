use std::collections::HashSet;

use rand::Rng;

use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::point::Point;

/// The hidden mine layout. Only the game loop looks inside; the knowledge
/// base learns about it through neighbor counts.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Board {
    width: usize,
    height: usize,
    mines: HashSet<Point>,
}

impl Board {
    /// Places `config.mines` mines uniformly at random.
    pub fn new<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut mines = HashSet::with_capacity(config.mines);
        while mines.len() != config.mines {
            mines.insert(Point {
                x: rng.random_range(0..config.width),
                y: rng.random_range(0..config.height),
            });
        }
        Ok(Board {
            width: config.width,
            height: config.height,
            mines,
        })
    }

    /// A board with a fixed mine layout.
    pub fn from_mines(
        width: usize,
        height: usize,
        mines: impl IntoIterator<Item = Point>,
    ) -> Result<Self, ConfigError> {
        let mines: HashSet<Point> = mines.into_iter().collect();
        GameConfig::new(width, height, mines.len())?;
        if let Some(&outside) = mines.iter().find(|p| p.x >= width || p.y >= height) {
            return Err(ConfigError::MineOutOfBounds(outside));
        }
        Ok(Board {
            width,
            height,
            mines,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn total_mines(&self) -> usize {
        self.mines.len()
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    pub fn is_mine(&self, point: Point) -> bool {
        self.mines.contains(&point)
    }

    /// Every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Point> + use<> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Point { x, y }))
    }

    /// The up to eight cells touching `point`, clipped to the board.
    pub fn neighbors(&self, point: Point) -> impl Iterator<Item = Point> + use<> {
        let width = self.width;
        let height = self.height;

        (-1..=1).flat_map(move |dy| {
            (-1..=1).filter_map(move |dx| {
                if dx == 0 && dy == 0 {
                    return None;
                }

                let nx = point.x as isize + dx;
                let ny = point.y as isize + dy;

                if nx >= 0 && nx < width as isize && ny >= 0 && ny < height as isize {
                    Some(Point {
                        x: nx as usize,
                        y: ny as usize,
                    })
                } else {
                    None
                }
            })
        })
    }

    /// Number of mines among the neighbors of `point`, not counting itself.
    pub fn nearby_mines(&self, point: Point) -> usize {
        self.neighbors(point).filter(|n| self.is_mine(*n)).count()
    }

    /// True iff `found` is exactly the set of mines.
    pub fn won(&self, found: &HashSet<Point>) -> bool {
        *found == self.mines
    }
}
