//! Read-only creature snapshots as decoded by the game-state bridge.

use serde::{Deserialize, Serialize};

/// Gender of an individual creature.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Individual values, one per stat (0–31 each).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ivs {
    pub hp: u8,
    pub attack: u8,
    pub defence: u8,
    pub speed: u8,
    pub special_attack: u8,
    pub special_defence: u8,
}

impl Ivs {
    pub fn sum(&self) -> u16 {
        [
            self.hp,
            self.attack,
            self.defence,
            self.speed,
            self.special_attack,
            self.special_defence,
        ]
        .iter()
        .map(|v| u16::from(*v))
        .sum()
    }

    /// Number of stats at the maximum value of 31.
    pub fn perfect_count(&self) -> usize {
        [
            self.hp,
            self.attack,
            self.defence,
            self.speed,
            self.special_attack,
            self.special_defence,
        ]
        .iter()
        .filter(|v| **v == 31)
        .count()
    }
}

/// A point-in-time view of one creature.
///
/// Snapshots are produced by the bridge and never mutated by the bot.
/// `personality_value` is the per-individual identity used to deduplicate
/// encounters.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CreatureSnapshot {
    pub species_id: u16,
    pub species_name: String,
    /// Name used for statistics and block lists. Differs from
    /// `species_name` for forms (e.g. `"Unown (B)"`).
    #[serde(default)]
    pub species_name_for_stats: String,
    pub personality_value: u32,
    pub is_shiny: bool,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub held_item: Option<String>,
    pub ability: String,
    pub nature: String,
    #[serde(default)]
    pub ivs: Ivs,
    pub shiny_value: u32,
    #[serde(default)]
    pub friendship: u8,
    #[serde(default)]
    pub is_egg: bool,
    #[serde(default)]
    pub unown_letter: Option<char>,
    #[serde(default)]
    pub wurmple_evolution: Option<String>,
}

impl CreatureSnapshot {
    /// Stats name, falling back to the species name when the decoder left it
    /// empty.
    pub fn stats_name(&self) -> &str {
        if self.species_name_for_stats.is_empty() {
            &self.species_name
        } else {
            &self.species_name_for_stats
        }
    }

    /// Display name used in operator messages: `Shiny ` prefix, gender
    /// symbol and Unown letter.
    pub fn display_name(&self) -> String {
        let mut name = if self.is_shiny {
            format!("Shiny {}", self.species_name)
        } else {
            self.species_name.clone()
        };
        match self.gender {
            Some(Gender::Male) => name.push_str(" ♂"),
            Some(Gender::Female) => name.push_str(" ♀"),
            None => {}
        }
        if self.species_name == "Unown"
            && let Some(letter) = self.unown_letter
        {
            name.push_str(&format!(" ({letter})"));
        }
        name
    }
}

/// Replace every character that is unsafe in a file name with `_`.
pub fn make_string_safe_for_file_name(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) fn sample(species: &str, personality_value: u32) -> CreatureSnapshot {
    CreatureSnapshot {
        species_id: 1,
        species_name: species.into(),
        species_name_for_stats: species.into(),
        personality_value,
        is_shiny: false,
        gender: None,
        held_item: None,
        ability: "Overgrow".into(),
        nature: "Hardy".into(),
        ivs: Ivs::default(),
        shiny_value: 40_000,
        friendship: 70,
        is_egg: false,
        unown_letter: None,
        wurmple_evolution: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iv_sum_and_perfect_count() {
        let ivs = Ivs {
            hp: 31,
            attack: 31,
            defence: 10,
            speed: 0,
            special_attack: 31,
            special_defence: 5,
        };
        assert_eq!(ivs.sum(), 108);
        assert_eq!(ivs.perfect_count(), 3);
    }

    #[test]
    fn display_name_decorations() {
        let mut unown = sample("Unown", 1);
        unown.is_shiny = true;
        unown.gender = Some(Gender::Female);
        unown.unown_letter = Some('B');
        assert_eq!(unown.display_name(), "Shiny Unown ♀ (B)");

        let plain = sample("Zigzagoon", 2);
        assert_eq!(plain.display_name(), "Zigzagoon");
    }

    #[test]
    fn stats_name_falls_back_to_species() {
        let mut c = sample("Castform", 3);
        c.species_name_for_stats.clear();
        assert_eq!(c.stats_name(), "Castform");
    }

    #[test]
    fn file_name_sanitizer() {
        assert_eq!(make_string_safe_for_file_name("Nidoran♀"), "Nidoran_");
        assert_eq!(make_string_safe_for_file_name("Mr. Mime"), "Mr. Mime");
        assert_eq!(make_string_safe_for_file_name("a/b:c"), "a_b_c");
    }
}
