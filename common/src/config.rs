use crate::error::ConfigError;

/// Board dimensions and mine count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub mines: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            width: 8,
            height: 8,
            mines: 8,
        }
    }
}

impl GameConfig {
    pub fn new(width: usize, height: usize, mines: usize) -> Result<Self, ConfigError> {
        let config = GameConfig {
            width,
            height,
            mines,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    /// At least one cell must stay free of mines.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        if self.mines >= self.cell_count() {
            return Err(ConfigError::TooManyMines {
                mines: self.mines,
                cells: self.cell_count(),
            });
        }
        Ok(())
    }
}
