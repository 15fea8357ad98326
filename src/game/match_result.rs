//! Round result and ranking
//!
//! Computes the player's final rank when a round ends.

use serde::{Deserialize, Serialize};

use crate::game::state::{Arena, FighterId};

/// Reason why a round ended
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Only one fighter remaining
    LastStanding,
    /// Round time budget ran out
    Timeout,
    /// The player fell off the platform
    PlayerEliminated,
}

/// Round result information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundResult {
    pub reason: EndReason,
    /// 1-based player rank
    pub rank: usize,
    pub score: u32,
    /// Fighters still standing when the round ended
    pub survivors: usize,
    /// Seconds of play
    pub duration: f32,
    pub player_mass: f32,
}

/// Rank at timeout: one plus the number of live fighters strictly heavier than the player
pub fn timeout_rank(arena: &Arena, player: FighterId) -> usize {
    let Some(player_mass) = arena.live_fighter(player).map(|p| p.mass()) else {
        return arena.live_count().max(1);
    };
    1 + arena
        .live_fighters()
        .filter(|f| f.id != player && f.mass() > player_mass)
        .count()
}

/// Rank when the player is eliminated: everyone standing at the fall, the player included
#[inline]
pub fn elimination_rank(standing_before_fall: usize) -> usize {
    standing_before_fall.max(1)
}

/// Check if the round should end after a population change
pub fn check_last_standing(arena: &Arena) -> Option<EndReason> {
    (arena.live_count() == 1).then_some(EndReason::LastStanding)
}
