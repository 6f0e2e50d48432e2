use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::names;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    /// Minimum seasons played for level 1.
    pub fn starting_min_seasons(self) -> i32 {
        match self {
            Difficulty::Easy => 17,
            Difficulty::Normal => 14,
            Difficulty::Hard => 10,
        }
    }

    /// Reveals available for a whole run.
    pub fn reveals(self) -> u32 {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Normal => 2,
            Difficulty::Hard => 1,
        }
    }

    /// Threshold for `level` (1-based), dropping by one season per level.
    pub fn min_seasons(self, level: u8) -> i32 {
        self.starting_min_seasons() + 1 - i32::from(level)
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn final_min_seasons(self) -> i32 {
        self.min_seasons(names::LEVEL_COUNT)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct UnknownDifficulty(pub String);

impl fmt::Display for UnknownDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown difficulty '{}'", self.0)
    }
}

impl std::error::Error for UnknownDifficulty {}

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownDifficulty(s.to_string()))
    }
}

/// Clubs a player represented in the competition and how many seasons they played.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerRecord {
    pub teams: BTreeSet<String>,
    pub number_of_seasons: i32,
}

/// Most frequent value in `counts`. Ties go to the smallest value.
pub fn season_mode(counts: impl IntoIterator<Item = i32>) -> Option<i32> {
    let mut frequencies: HashMap<i32, usize> = HashMap::new();
    for count in counts {
        *frequencies.entry(count).or_default() += 1;
    }
    frequencies
        .into_iter()
        .max_by(|(a, fa), (b, fb)| fa.cmp(fb).then(b.cmp(a)))
        .map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_drop_by_one_per_level() {
        for difficulty in Difficulty::ALL {
            let start = difficulty.starting_min_seasons();
            assert_eq!(difficulty.min_seasons(1), start);
            for level in 1..names::LEVEL_COUNT {
                assert_eq!(
                    difficulty.min_seasons(level) - difficulty.min_seasons(level + 1),
                    1
                );
            }
            assert_eq!(difficulty.final_min_seasons(), start - 9);
        }
    }

    #[test]
    fn difficulty_table_matches_game_rules() {
        assert_eq!(Difficulty::Easy.min_seasons(10), 8);
        assert_eq!(Difficulty::Normal.min_seasons(10), 5);
        assert_eq!(Difficulty::Hard.min_seasons(10), 1);
        assert_eq!(Difficulty::Easy.reveals(), 3);
        assert_eq!(Difficulty::Normal.reveals(), 2);
        assert_eq!(Difficulty::Hard.reveals(), 1);
    }

    #[test]
    fn difficulty_parses_from_key() {
        assert_eq!("hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" Easy ".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert!("impossible".parse::<Difficulty>().is_err());
        assert!("".parse::<Difficulty>().is_err());
    }

    #[test]
    fn season_mode_prefers_most_frequent() {
        assert_eq!(season_mode([3, 5, 5, 2]), Some(5));
        assert_eq!(season_mode([12]), Some(12));
    }

    #[test]
    fn season_mode_breaks_ties_with_smallest() {
        assert_eq!(season_mode([7, 4, 7, 4]), Some(4));
        assert_eq!(season_mode([9, 2, 6]), Some(2));
    }

    #[test]
    fn season_mode_of_nothing_is_none() {
        assert_eq!(season_mode(Vec::new()), None);
    }
}
