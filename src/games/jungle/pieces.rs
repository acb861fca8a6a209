//! Species capabilities: ranks, movement chains and capture resolution.
//!
//! A species is plain data. Its movement chain is an ordered list of
//! [`MoveStep`]s; the first step that allows the move wins, a step may also
//! deny it outright or defer to the next one. This is an OR-chain and is kept
//! apart from the AND-composite in [`super::rules`].

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::GameError;

use super::board::Board;
use super::types::{Occupant, Position, Species};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStep {
    /// Single orthogonal step. Terminal.
    AdjacencyRange,
    /// Never into the mover's own den.
    TerritoryRestriction,
    /// No water unless the species is amphibious.
    WaterBlock,
    /// Straight jump over a run of water free of swimmers.
    LeapOverWater,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny,
    Defer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesSpec {
    pub species: Species,
    pub rank: u8,
    pub chain: Vec<MoveStep>,
    #[serde(default)]
    pub amphibious: bool,
}

impl SpeciesSpec {
    pub fn leaps(&self) -> bool {
        self.chain.contains(&MoveStep::LeapOverWater)
    }
}

/// Lookup table from species to capabilities, validated on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesTable {
    specs: BTreeMap<Species, SpeciesSpec>,
    top_rank: u8,
}

const GROUND: &[MoveStep] = &[
    MoveStep::TerritoryRestriction,
    MoveStep::WaterBlock,
    MoveStep::AdjacencyRange,
];
const JUMPER: &[MoveStep] = &[
    MoveStep::TerritoryRestriction,
    MoveStep::WaterBlock,
    MoveStep::LeapOverWater,
    MoveStep::AdjacencyRange,
];
const SWIMMER: &[MoveStep] = &[MoveStep::TerritoryRestriction, MoveStep::AdjacencyRange];

fn standard_specs() -> Vec<SpeciesSpec> {
    let spec = |species, rank, chain: &[MoveStep], amphibious| SpeciesSpec {
        species,
        rank,
        chain: chain.to_vec(),
        amphibious,
    };
    vec![
        spec(Species::Rat, 1, SWIMMER, true),
        spec(Species::Cat, 2, GROUND, false),
        spec(Species::Wolf, 3, GROUND, false),
        spec(Species::Dog, 4, GROUND, false),
        spec(Species::Leopard, 5, GROUND, false),
        spec(Species::Tiger, 6, JUMPER, false),
        spec(Species::Lion, 7, JUMPER, false),
        spec(Species::Elephant, 8, GROUND, false),
    ]
}

static STANDARD: Lazy<SpeciesTable> = Lazy::new(|| SpeciesTable::from_valid(standard_specs()));

impl SpeciesTable {
    pub fn standard() -> &'static SpeciesTable {
        &STANDARD
    }

    pub fn standard_specs() -> Vec<SpeciesSpec> {
        standard_specs()
    }

    /// Build a table, rejecting chains that are empty, do not end with
    /// [`MoveStep::AdjacencyRange`], or use it anywhere else.
    pub fn new(specs: Vec<SpeciesSpec>) -> Result<Self, GameError> {
        if specs.is_empty() {
            return Err(GameError::config("species table is empty"));
        }
        let mut seen = BTreeMap::new();
        for spec in &specs {
            match spec.chain.iter().position(|s| *s == MoveStep::AdjacencyRange) {
                Some(i) if i + 1 == spec.chain.len() => {}
                _ => {
                    return Err(GameError::config(format!(
                        "movement chain for {} must end with a single adjacency_range step",
                        spec.species
                    )))
                }
            }
            if seen.insert(spec.species, ()).is_some() {
                return Err(GameError::config(format!("species {} listed twice", spec.species)));
            }
        }
        Ok(Self::from_valid(specs))
    }

    fn from_valid(specs: Vec<SpeciesSpec>) -> Self {
        let top_rank = specs.iter().map(|s| s.rank).max().unwrap_or(0);
        Self {
            specs: specs.into_iter().map(|s| (s.species, s)).collect(),
            top_rank,
        }
    }

    pub fn get(&self, species: Species) -> Option<&SpeciesSpec> {
        self.specs.get(&species)
    }

    pub fn contains(&self, species: Species) -> bool {
        self.specs.contains_key(&species)
    }

    pub fn rank(&self, species: Species) -> u8 {
        self.get(species).map(|s| s.rank).unwrap_or(0)
    }

    pub fn is_amphibious(&self, species: Species) -> bool {
        self.get(species).map(|s| s.amphibious).unwrap_or(false)
    }

    pub fn is_top_rank(&self, species: Species) -> bool {
        self.get(species).map(|s| s.rank == self.top_rank).unwrap_or(false)
    }

    pub fn specs(&self) -> impl Iterator<Item = &SpeciesSpec> {
        self.specs.values()
    }

    /// Run the mover's movement chain. Off-board endpoints are refused.
    pub fn permits_movement(&self, board: &Board, mover: Occupant, from: Position, to: Position) -> bool {
        if !board.contains(from) || !board.contains(to) || from == to {
            return false;
        }
        let Some(spec) = self.get(mover.species) else {
            return false;
        };
        for step in &spec.chain {
            match self.evaluate_step(*step, board, mover, from, to) {
                Verdict::Allow => return true,
                Verdict::Deny => return false,
                Verdict::Defer => continue,
            }
        }
        false
    }

    fn evaluate_step(
        &self,
        step: MoveStep,
        board: &Board,
        mover: Occupant,
        from: Position,
        to: Position,
    ) -> Verdict {
        match step {
            MoveStep::AdjacencyRange => {
                if from.manhattan(to) == 1 {
                    Verdict::Allow
                } else {
                    Verdict::Deny
                }
            }
            MoveStep::TerritoryRestriction => match board.terrain(to) {
                Ok(t) if t.den_owner() == Some(mover.owner) => Verdict::Deny,
                Ok(_) => Verdict::Defer,
                Err(_) => Verdict::Deny,
            },
            MoveStep::WaterBlock => match board.terrain(to) {
                Ok(t) if t.is_water() && !self.is_amphibious(mover.species) => Verdict::Deny,
                Ok(_) => Verdict::Defer,
                Err(_) => Verdict::Deny,
            },
            MoveStep::LeapOverWater => {
                if self.has_leap_path(board, from, to) {
                    Verdict::Allow
                } else {
                    Verdict::Defer
                }
            }
        }
    }

    /// Straight line over at least one water cell, every intermediate cell is
    /// water with no swimmer in it, and the landing cell is dry.
    pub fn has_leap_path(&self, board: &Board, from: Position, to: Position) -> bool {
        let Some(path) = board.straight_path(from, to) else {
            return false;
        };
        if path.is_empty() {
            return false;
        }
        let run_clear = path.iter().all(|&p| match board.cell(p) {
            Ok(cell) => {
                cell.terrain.is_water()
                    && !cell
                        .occupant
                        .map(|o| self.is_amphibious(o.species))
                        .unwrap_or(false)
            }
            Err(_) => false,
        });
        run_clear && matches!(board.terrain(to), Ok(t) if !t.is_water())
    }

    /// Rank part of capture resolution: own pieces are off limits, trapped
    /// targets are always capturable, the swimmer takes the top rank, the top
    /// rank never takes the swimmer, otherwise higher-or-equal rank wins.
    pub fn rank_permits_capture(&self, board: &Board, attacker: Occupant, target: Occupant, to: Position) -> bool {
        if attacker.owner == target.owner {
            return false;
        }
        if let Ok(terrain) = board.terrain(to) {
            if terrain.trap_owner().is_some_and(|owner| owner != target.owner) {
                return true;
            }
        }
        if self.is_amphibious(attacker.species) && self.is_top_rank(target.species) {
            return true;
        }
        if self.is_top_rank(attacker.species) && self.is_amphibious(target.species) {
            return false;
        }
        self.rank(attacker.species) >= self.rank(target.species)
    }

    /// Terrain part of capture resolution: no capture across the water line,
    /// in either direction.
    pub fn terrain_permits_capture(&self, board: &Board, from: Position, to: Position) -> bool {
        match (board.terrain(from), board.terrain(to)) {
            (Ok(a), Ok(b)) => a.is_water() == b.is_water(),
            _ => false,
        }
    }

    /// Both halves of capture resolution in one check.
    pub fn can_capture(
        &self,
        board: &Board,
        attacker: Occupant,
        from: Position,
        target: Occupant,
        to: Position,
    ) -> bool {
        self.terrain_permits_capture(board, from, to) && self.rank_permits_capture(board, attacker, target, to)
    }
}
