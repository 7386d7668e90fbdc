use crate::battle::{BattleEvent, GameState, Side};
use crate::error::{Result, SimError};
use crate::model::{Pet, PetId};
use crate::triggers::PendingTrigger;
use log::debug;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

/// Every effect a pet can carry. Parameters live in the variant; the behaviour
/// lives in [`execute`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Ability {
    /// Buff one random alive friend other than the source.
    BuffRandomFriend { attack: u32, health: u32 },
    /// Vacate the source's slot and summon a token into the first empty slot.
    SummonToken {
        name: &'static str,
        attack: u32,
        health: u32,
    },
    /// Damage one random alive enemy.
    DamageRandomEnemy { damage: u32 },
    /// Buff the friend whose summon fired this trigger.
    BuffSummonedFriend { attack: u32, health: u32 },
}

/// Work an ability hands back to the dispatcher instead of recursing into it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Followup {
    Summoned { side: Side, pet: PetId },
}

pub(crate) fn execute(
    state: &mut GameState,
    rng: &mut SmallRng,
    pending: &PendingTrigger,
) -> Result<Option<Followup>> {
    let side = pending.side;
    match pending.ability {
        Ability::BuffRandomFriend { attack, health } => {
            let team = state.team_mut(side);
            let friends: Vec<PetId> = team
                .alive_pets()
                .map(|(_, p)| p.id())
                .filter(|id| *id != pending.source)
                .collect();
            if let Some(pet) = friends.choose(rng).and_then(|id| team.pet_mut(*id)) {
                pet.buff(attack, health);
                debug!("{} gains +{attack}/+{health}", pet.name);
            }
            Ok(None)
        }
        Ability::DamageRandomEnemy { damage } => {
            let enemies = state.team_mut(side.opponent());
            // Pets at zero health stay targetable until the faint pass marks them.
            let targets: Vec<PetId> = enemies.alive_pets().map(|(_, p)| p.id()).collect();
            if let Some(pet) = targets.choose(rng).and_then(|id| enemies.pet_mut(*id)) {
                let dealt = pet.take_damage(damage);
                debug!("{} takes {dealt} ability damage", pet.name);
            }
            Ok(None)
        }
        Ability::SummonToken {
            name,
            attack,
            health,
        } => {
            let team = state.team_mut(side);
            team.remove(pending.source);
            let position = match team.add(Pet::new(name, attack, health), None) {
                Ok(position) => position,
                Err(err) if !err.is_fatal() => {
                    debug!("summon of {name} skipped: {err}");
                    return Ok(None);
                }
                Err(err) => return Err(err),
            };
            let summoned = team.pet_at(position).ok_or_else(|| {
                SimError::InvariantViolation(format!("summoned {name} missing from slot {position}"))
            })?;
            let pet = summoned.id();
            let pet_name = summoned.name.clone();
            debug!("{pet_name} summoned into slot {position}");
            state.record(BattleEvent::Summoned {
                side,
                pet: pet_name,
                position,
            });
            Ok(Some(Followup::Summoned { side, pet }))
        }
        Ability::BuffSummonedFriend { attack, health } => {
            let summoned = pending.summoned.ok_or_else(|| {
                SimError::InvariantViolation(
                    "friend-summoned ability fired without a summoned pet".to_string(),
                )
            })?;
            if let Some(pet) = state.team_mut(side).pet_mut(summoned) {
                pet.buff(attack, health);
                debug!("{} gains +{attack}/+{health}", pet.name);
            }
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Team, TriggerType};
    use rand::SeedableRng;

    fn pending(state: &GameState, side: Side, position: usize) -> PendingTrigger {
        let pet = state.team(side).pet_at(position).unwrap();
        PendingTrigger {
            side,
            source: pet.id(),
            trigger: pet.trigger.unwrap(),
            ability: pet.ability.unwrap(),
            summoned: None,
        }
    }

    #[test]
    fn random_friend_buff_never_targets_source() {
        let team1 = Team::new().add_pets(&["ant", "fish"]).unwrap();
        let team2 = Team::new().add_pets(&["fish"]).unwrap();
        let mut state = GameState::new(team1, team2);
        let trigger = pending(&state, Side::One, 0);
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..5 {
            execute(&mut state, &mut rng, &trigger).unwrap();
        }
        let ant = state.team1.pet_at(0).unwrap();
        let fish = state.team1.pet_at(1).unwrap();
        assert_eq!((ant.attack, ant.health), (2, 2));
        assert_eq!((fish.attack, fish.health), (7, 8));
    }

    #[test]
    fn random_friend_buff_without_friends_is_noop() {
        let team1 = Team::new().add_pets(&["ant"]).unwrap();
        let mut state = GameState::new(team1, Team::new());
        let trigger = pending(&state, Side::One, 0);
        let mut rng = SmallRng::seed_from_u64(3);
        assert_eq!(execute(&mut state, &mut rng, &trigger), Ok(None));
        let ant = state.team1.pet_at(0).unwrap();
        assert_eq!((ant.attack, ant.health), (2, 2));
    }

    #[test]
    fn enemy_damage_hits_the_opposing_team() {
        let team1 = Team::new().add_pets(&["mosquito"]).unwrap();
        let team2 = Team::new().add_pets(&["fish"]).unwrap();
        let mut state = GameState::new(team1, team2);
        let trigger = pending(&state, Side::One, 0);
        let mut rng = SmallRng::seed_from_u64(9);
        execute(&mut state, &mut rng, &trigger).unwrap();
        assert_eq!(state.team2.pet_at(0).unwrap().health, 2);
        assert_eq!(state.team1.pet_at(0).unwrap().health, 2);
    }

    #[test]
    fn summon_replaces_source_and_reports_followup() {
        let team1 = Team::new().add_pets(&["cricket", "fish"]).unwrap();
        let mut state = GameState::new(team1, Team::new());
        let trigger = pending(&state, Side::One, 0);
        let mut rng = SmallRng::seed_from_u64(1);
        let followup = execute(&mut state, &mut rng, &trigger).unwrap();
        let zombie = state.team1.pet_at(0).unwrap();
        assert_eq!(zombie.name, "Zombie Cricket");
        assert_eq!((zombie.attack, zombie.health), (1, 1));
        assert_eq!(
            followup,
            Some(Followup::Summoned {
                side: Side::One,
                pet: zombie.id()
            })
        );
        assert!(state.team1.pet(trigger.source).is_none());
    }

    #[test]
    fn summon_into_full_team_is_skipped() {
        let mut team1 = Team::with_capacity(1);
        team1.add(Pet::new("Fish", 2, 3), None).unwrap();
        let mut state = GameState::new(team1, Team::new());
        let cricket = crate::pets::create_pet("cricket").unwrap();
        // The source is not on the team, so nothing frees up.
        let trigger = PendingTrigger {
            side: Side::One,
            source: cricket.id(),
            trigger: TriggerType::Faint,
            ability: cricket.ability.unwrap(),
            summoned: None,
        };
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(execute(&mut state, &mut rng, &trigger), Ok(None));
        assert_eq!(state.team1.pet_at(0).unwrap().name, "Fish");
    }

    #[test]
    fn summoned_buff_requires_context() {
        let team1 = Team::new().add_pets(&["horse"]).unwrap();
        let mut state = GameState::new(team1, Team::new());
        let trigger = pending(&state, Side::One, 0);
        let mut rng = SmallRng::seed_from_u64(1);
        let err = execute(&mut state, &mut rng, &trigger).unwrap_err();
        assert!(err.is_fatal());
    }
}
