//! Gift tiles the mode knows how to reset for.

use huntbot::bridge::{GameStateBridge, GameVersion, MapLocation};

/// A creature handed out by an NPC or picked up from a fixed tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiftTarget {
    Lapras,
    Hitmonlee,
    Hitmonchan,
    KantoFossils,
    Eevee,
    Magikarp,
    Togepi,
    Castform,
    HoennFossils,
    Beldum,
    Wynaut,
}

impl GiftTarget {
    pub fn name(self) -> &'static str {
        match self {
            GiftTarget::Lapras => "Lapras",
            GiftTarget::Hitmonlee => "Hitmonlee",
            GiftTarget::Hitmonchan => "Hitmonchan",
            GiftTarget::KantoFossils => "Kanto Fossils",
            GiftTarget::Eevee => "Eevee",
            GiftTarget::Magikarp => "Magikarp",
            GiftTarget::Togepi => "Togepi",
            GiftTarget::Castform => "Castform",
            GiftTarget::HoennFossils => "Hoenn Fossils",
            GiftTarget::Beldum => "Beldum",
            GiftTarget::Wynaut => "Wynaut",
        }
    }

    /// Handed out as an egg that has to be hatched before it can be judged.
    pub fn is_egg(self) -> bool {
        matches!(self, GiftTarget::Wynaut | GiftTarget::Togepi)
    }

    pub fn is_fossil(self) -> bool {
        matches!(self, GiftTarget::KantoFossils | GiftTarget::HoennFossils)
    }

    /// The gift is offered with a yes/no prompt that has to be accepted.
    pub fn asks_yes_no(self) -> bool {
        matches!(
            self,
            GiftTarget::Beldum
                | GiftTarget::Hitmonchan
                | GiftTarget::Hitmonlee
                | GiftTarget::Magikarp
                | GiftTarget::Wynaut
        )
    }

    /// Two tiles to cycle between while an egg hatches.
    pub fn hatching_route(self) -> Option<(MapLocation, MapLocation)> {
        match self {
            GiftTarget::Wynaut => Some((
                MapLocation::new("LAVARIDGE_TOWN", 4, 9),
                MapLocation::new("LAVARIDGE_TOWN", 19, 10),
            )),
            GiftTarget::Togepi => Some((
                MapLocation::new("FIVE_ISLAND_WATER_LABYRINTH", 11, 9),
                MapLocation::new("FIVE_ISLAND_WATER_LABYRINTH", 17, 13),
            )),
            _ => None,
        }
    }
}

impl std::fmt::Display for GiftTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const FRLG_TARGETS: &[(&str, i32, i32, GiftTarget)] = &[
    ("SILPH_CO_7F", 0, 7, GiftTarget::Lapras),
    ("SAFFRON_CITY_DOJO", 5, 3, GiftTarget::Hitmonlee),
    ("SAFFRON_CITY_DOJO", 7, 3, GiftTarget::Hitmonchan),
    ("CINNABAR_ISLAND_POKEMON_LAB_EXPERIMENT_ROOM", 11, 2, GiftTarget::KantoFossils),
    ("CINNABAR_ISLAND_POKEMON_LAB_EXPERIMENT_ROOM", 13, 4, GiftTarget::KantoFossils),
    ("CELADON_CITY_CONDOMINIUMS_ROOF_ROOM", 7, 3, GiftTarget::Eevee),
    ("ROUTE4_POKEMON_CENTER_1F", 1, 3, GiftTarget::Magikarp),
    ("FIVE_ISLAND_WATER_LABYRINTH", 14, 11, GiftTarget::Togepi),
];

const RSE_TARGETS: &[(&str, i32, i32, GiftTarget)] = &[
    ("ROUTE119_WEATHER_INSTITUTE_2F", 2, 2, GiftTarget::Castform),
    ("ROUTE119_WEATHER_INSTITUTE_2F", 18, 6, GiftTarget::Castform),
    ("ROUTE119_WEATHER_INSTITUTE_2F", 4, 6, GiftTarget::Castform),
    ("RUSTBORO_CITY_DEVON_CORP_2F", 14, 8, GiftTarget::HoennFossils),
    ("MOSSDEEP_CITY_STEVENS_HOUSE", 4, 3, GiftTarget::Beldum),
    ("LAVARIDGE_TOWN", 4, 7, GiftTarget::Wynaut),
];

/// Look up the gift on `tile` for `version`.
pub fn target_at(version: GameVersion, tile: &MapLocation) -> Option<GiftTarget> {
    let table = if version.is_frlg() {
        FRLG_TARGETS
    } else {
        RSE_TARGETS
    };
    table
        .iter()
        .find(|(map, x, y, _)| *map == tile.map && *x == tile.x && *y == tile.y)
        .map(|(_, _, _, target)| *target)
}

/// The gift on the tile the player is facing, with that tile's map.
pub fn targeted_gift<G: GameStateBridge + ?Sized>(game: &G) -> Option<(GiftTarget, String)> {
    let tile = game.player()?.facing_tile()?;
    let target = target_at(game.game_version(), &tile)?;
    Some((target, tile.map))
}

/// Task that draws overworld message boxes.
pub fn message_box_task(version: GameVersion) -> &'static str {
    match version {
        GameVersion::FireRedLeafGreen => "Task_DrawFieldMessageBox",
        GameVersion::Emerald => "Task_DrawFieldMessage",
        GameVersion::RubySapphire => "Task_FieldMessageBox",
    }
}

/// Event variable tracking the fossil scientist's revival progress.
pub fn fossil_state_var(version: GameVersion) -> &'static str {
    if version.is_rse() {
        "FOSSIL_RESURRECTION_STATE"
    } else {
        "MAP_SCENE_CINNABAR_ISLAND_POKEMON_LAB_EXPERIMENT_ROOM_REVIVE_STATE"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_respects_version() {
        let tile = MapLocation::new("LAVARIDGE_TOWN", 4, 7);
        assert_eq!(
            target_at(GameVersion::Emerald, &tile),
            Some(GiftTarget::Wynaut)
        );
        assert_eq!(
            target_at(GameVersion::RubySapphire, &tile),
            Some(GiftTarget::Wynaut)
        );
        assert_eq!(target_at(GameVersion::FireRedLeafGreen, &tile), None);
    }

    #[test]
    fn every_castform_tile_resolves() {
        for (x, y) in [(2, 2), (18, 6), (4, 6)] {
            let tile = MapLocation::new("ROUTE119_WEATHER_INSTITUTE_2F", x, y);
            assert_eq!(
                target_at(GameVersion::Emerald, &tile),
                Some(GiftTarget::Castform)
            );
        }
    }

    #[test]
    fn only_eggs_have_a_hatching_route() {
        assert!(GiftTarget::Togepi.hatching_route().is_some());
        assert!(GiftTarget::Wynaut.hatching_route().is_some());
        assert!(GiftTarget::Beldum.hatching_route().is_none());
        assert_eq!(GiftTarget::KantoFossils.to_string(), "Kanto Fossils");
    }
}
