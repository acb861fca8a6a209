//! Rule engine: an ordered AND-composite of move validators.
//!
//! Validation never errors; a move that touches cells off the board is simply
//! refused.

use crate::engine::models::Seat;

use super::board::Board;
use super::pieces::SpeciesTable;
use super::session::Move;

/// Everything a rule may look at besides the move itself.
pub struct RuleContext<'a> {
    pub board: &'a Board,
    pub species: &'a SpeciesTable,
    pub to_move: Seat,
}

pub trait Rule: Send + Sync {
    fn name(&self) -> &'static str;

    fn validate(&self, mv: &Move, ctx: &RuleContext<'_>) -> bool;

    /// Name of the first failing rule, if any.
    fn explain(&self, mv: &Move, ctx: &RuleContext<'_>) -> Option<&'static str> {
        if self.validate(mv, ctx) {
            None
        } else {
            Some(self.name())
        }
    }
}

/// Passes iff every child passes, checked in insertion order.
pub struct CompositeRule {
    name: &'static str,
    rules: Vec<Box<dyn Rule>>,
}

impl CompositeRule {
    pub fn new(name: &'static str) -> Self {
        Self { name, rules: Vec::new() }
    }

    pub fn with(mut self, rule: impl Rule + 'static) -> Self {
        self.add_rule(Box::new(rule));
        self
    }

    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

impl Rule for CompositeRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn validate(&self, mv: &Move, ctx: &RuleContext<'_>) -> bool {
        self.rules.iter().all(|r| r.validate(mv, ctx))
    }

    fn explain(&self, mv: &Move, ctx: &RuleContext<'_>) -> Option<&'static str> {
        self.rules.iter().find_map(|r| r.explain(mv, ctx))
    }
}

/// The mover must belong to the seat whose turn it is.
pub struct TurnOwnership;

impl Rule for TurnOwnership {
    fn name(&self) -> &'static str {
        "turn_ownership"
    }

    fn validate(&self, mv: &Move, ctx: &RuleContext<'_>) -> bool {
        mv.piece.owner == ctx.to_move
    }
}

/// Orthogonal step or river leap, as allowed by the species' movement chain.
pub struct AdjacentOrLeapMovement;

impl Rule for AdjacentOrLeapMovement {
    fn name(&self) -> &'static str {
        "adjacent_or_leap_movement"
    }

    fn validate(&self, mv: &Move, ctx: &RuleContext<'_>) -> bool {
        ctx.species.permits_movement(ctx.board, mv.piece, mv.from, mv.to)
    }
}

pub struct RankBasedCapture;

impl Rule for RankBasedCapture {
    fn name(&self) -> &'static str {
        "rank_based_capture"
    }

    fn validate(&self, mv: &Move, ctx: &RuleContext<'_>) -> bool {
        match ctx.board.occupant(mv.to) {
            Ok(None) => true,
            Ok(Some(target)) => ctx.species.rank_permits_capture(ctx.board, mv.piece, target, mv.to),
            Err(_) => false,
        }
    }
}

/// Swimmers cannot capture out of the water nor be captured from land.
pub struct SpecialCaptureExceptions;

impl Rule for SpecialCaptureExceptions {
    fn name(&self) -> &'static str {
        "special_capture_exceptions"
    }

    fn validate(&self, mv: &Move, ctx: &RuleContext<'_>) -> bool {
        match ctx.board.occupant(mv.to) {
            Ok(None) => true,
            Ok(Some(_)) => ctx.species.terrain_permits_capture(ctx.board, mv.from, mv.to),
            Err(_) => false,
        }
    }
}

pub struct WaterMovementRule;

impl Rule for WaterMovementRule {
    fn name(&self) -> &'static str {
        "water_movement"
    }

    fn validate(&self, mv: &Move, ctx: &RuleContext<'_>) -> bool {
        match ctx.board.terrain(mv.to) {
            Ok(t) => !t.is_water() || ctx.species.is_amphibious(mv.piece.species),
            Err(_) => false,
        }
    }
}

/// Traps only matter for capture resolution; movement onto them is free.
pub struct TrapRule;

impl Rule for TrapRule {
    fn name(&self) -> &'static str {
        "trap"
    }

    fn validate(&self, _mv: &Move, _ctx: &RuleContext<'_>) -> bool {
        true
    }
}

/// A piece never enters its own den. Entering another seat's den is legal.
pub struct DenRule;

impl Rule for DenRule {
    fn name(&self) -> &'static str {
        "den"
    }

    fn validate(&self, mv: &Move, ctx: &RuleContext<'_>) -> bool {
        match ctx.board.terrain(mv.to) {
            Ok(t) => t.den_owner() != Some(mv.piece.owner),
            Err(_) => false,
        }
    }
}

/// The standard Jungle rule set.
pub fn standard_rule_engine() -> CompositeRule {
    let capture = CompositeRule::new("capture_rules")
        .with(RankBasedCapture)
        .with(SpecialCaptureExceptions);

    CompositeRule::new("jungle_rules")
        .with(TurnOwnership)
        .with(AdjacentOrLeapMovement)
        .with(capture)
        .with(WaterMovementRule)
        .with(TrapRule)
        .with(DenRule)
}
