//! Trigger dispatch. Abilities only ever run through here.
//!
//! Phase-wide triggers alternate between the teams by slot order so neither
//! side always resolves first. Faint triggers run in discovery order. A summon
//! does not call back into dispatch; it returns a follow-up that is queued and
//! drained before the next top-level trigger runs.

use crate::abilities::{self, Ability, Followup};
use crate::battle::{BattleEvent, GameState, Side};
use crate::error::{Result, SimError};
use crate::model::{Pet, PetId, Team, TriggerType};
use log::debug;
use rand::rngs::SmallRng;
use std::collections::VecDeque;

/// Upper bound on abilities resolved from a single top-level trigger.
const MAX_CASCADE: usize = 256;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PendingTrigger {
    pub side: Side,
    pub source: PetId,
    pub trigger: TriggerType,
    pub ability: Ability,
    pub summoned: Option<PetId>,
}

impl PendingTrigger {
    pub(crate) fn for_pet(side: Side, pet: &Pet, trigger: TriggerType) -> Option<Self> {
        pet.ability_for(trigger).map(|ability| PendingTrigger {
            side,
            source: pet.id(),
            trigger,
            ability,
            summoned: None,
        })
    }
}

fn eligible<'a>(
    pets: impl Iterator<Item = (usize, &'a Pet)>,
    side: Side,
    trigger: TriggerType,
) -> Vec<PendingTrigger> {
    pets.filter_map(|(_, pet)| PendingTrigger::for_pet(side, pet, trigger))
        .collect()
}

/// Merges two ordered sequences as `a[0], b[0], a[1], b[1], ...`, continuing
/// with whichever side is longer once the other runs out.
pub fn interleave<T>(first: Vec<T>, second: Vec<T>) -> Vec<T> {
    let mut merged = Vec::with_capacity(first.len() + second.len());
    let mut first = first.into_iter();
    let mut second = second.into_iter();
    loop {
        match (first.next(), second.next()) {
            (None, None) => break,
            (a, b) => {
                merged.extend(a);
                merged.extend(b);
            }
        }
    }
    merged
}

pub(crate) fn dispatch_phase(
    state: &mut GameState,
    rng: &mut SmallRng,
    trigger: TriggerType,
) -> Result<()> {
    let first = eligible(state.team1.alive_pets(), Side::One, trigger);
    let second = eligible(state.team2.alive_pets(), Side::Two, trigger);
    for pending in interleave(first, second) {
        resolve(state, rng, pending)?;
    }
    Ok(())
}

/// `fainted` is already in discovery order: team 1 front to back, then team 2.
pub(crate) fn dispatch_faints(
    state: &mut GameState,
    rng: &mut SmallRng,
    fainted: Vec<PendingTrigger>,
) -> Result<()> {
    for pending in fainted {
        resolve(state, rng, pending)?;
    }
    Ok(())
}

/// Pets behind `attacker` that react to it attacking. Nothing in the catalog
/// binds this trigger, so today this finds no work.
pub(crate) fn dispatch_friend_ahead_attacks(
    state: &mut GameState,
    rng: &mut SmallRng,
    side: Side,
    attacker: PetId,
) -> Result<()> {
    let team = state.team(side);
    let Some(attacker_pos) = team.position_of(attacker) else {
        return Ok(());
    };
    let behind = eligible(
        team.alive_pets().filter(|(pos, _)| *pos > attacker_pos),
        side,
        TriggerType::FriendAheadAttacks,
    );
    for pending in behind {
        resolve(state, rng, pending)?;
    }
    Ok(())
}

fn friend_summoned(team: &Team, side: Side, summoned: PetId) -> Vec<PendingTrigger> {
    team.alive_pets()
        .filter(|(_, pet)| pet.id() != summoned)
        .filter_map(|(_, pet)| PendingTrigger::for_pet(side, pet, TriggerType::FriendSummoned))
        .map(|pending| PendingTrigger {
            summoned: Some(summoned),
            ..pending
        })
        .collect()
}

fn resolve(state: &mut GameState, rng: &mut SmallRng, first: PendingTrigger) -> Result<()> {
    let mut queue = VecDeque::from([first]);
    let mut resolved = 0usize;
    while let Some(pending) = queue.pop_front() {
        resolved += 1;
        if resolved > MAX_CASCADE {
            return Err(SimError::InvariantViolation(format!(
                "trigger cascade exceeded {MAX_CASCADE} abilities"
            )));
        }
        announce(state, &pending);
        if let Some(Followup::Summoned { side, pet }) = abilities::execute(state, rng, &pending)? {
            queue.extend(friend_summoned(state.team(side), side, pet));
        }
    }
    Ok(())
}

fn announce(state: &mut GameState, pending: &PendingTrigger) {
    let name = state
        .team(pending.side)
        .pet(pending.source)
        .map(|p| p.name.clone())
        .unwrap_or_default();
    debug!(
        "{:?} {} fires {:?} ({:?})",
        pending.side, name, pending.ability, pending.trigger
    );
    state.record(BattleEvent::AbilityTriggered {
        side: pending.side,
        pet: name,
        trigger: pending.trigger,
    });
}
