//! The four fixed seasons used to partition dispatch and error files.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Season, numbered 1..=4 in file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    pub const ALL: [Season; 4] = [Self::Winter, Self::Spring, Self::Summer, Self::Fall];

    /// Positional index used in file names (1-based).
    pub fn index(self) -> usize {
        match self {
            Self::Winter => 1,
            Self::Spring => 2,
            Self::Summer => 3,
            Self::Fall => 4,
        }
    }

    /// Season for a 1-based file index.
    ///
    /// # Examples
    ///
    /// ```
    /// use autarky_viewer::season::Season;
    ///
    /// assert_eq!(Season::from_index(3), Some(Season::Summer));
    /// assert_eq!(Season::from_index(0), None);
    /// ```
    pub fn from_index(index: usize) -> Option<Self> {
        index
            .checked_sub(1)
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Winter => "Winter",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
