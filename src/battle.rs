use crate::error::Result;
use crate::model::{Pet, PetId, Team, TriggerType};
use crate::triggers::{self, PendingTrigger};
use log::{debug, trace, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    StartOfBattle,
    BeforeAttack,
    Attack,
    AfterAttack,
    Faint,
    EndOfBattle,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum Winner {
    Draw,
    Team1,
    Team2,
}

impl Winner {
    /// 0 = draw, 1 = team 1, 2 = team 2.
    pub fn code(self) -> u8 {
        match self {
            Winner::Draw => 0,
            Winner::Team1 => 1,
            Winner::Team2 => 2,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BattleEvent {
    PhaseStarted {
        phase: Phase,
        turn: u32,
    },
    AbilityTriggered {
        side: Side,
        pet: String,
        trigger: TriggerType,
    },
    Attack {
        pet1: String,
        pet2: String,
        damage_to_pet1: u32,
        damage_to_pet2: u32,
    },
    Fainted {
        side: Side,
        pet: String,
    },
    Summoned {
        side: Side,
        pet: String,
        position: usize,
    },
    BattleEnded {
        winner: Winner,
        turns: u32,
    },
}

#[derive(Clone, Debug)]
pub struct BattleOptions {
    /// Safety cap; a battle still running after this many turns is a draw.
    pub max_turns: u32,
    pub record_events: bool,
}

impl Default for BattleOptions {
    fn default() -> Self {
        Self {
            max_turns: 500,
            record_events: false,
        }
    }
}

/// One battle's mutable context. Owns its teams outright.
#[derive(Clone, Debug)]
pub struct GameState {
    pub team1: Team,
    pub team2: Team,
    pub phase: Phase,
    pub turn: u32,
    winner: Option<Winner>,
    terminal: bool,
    record_events: bool,
    events: Vec<BattleEvent>,
}

impl GameState {
    pub fn new(team1: Team, team2: Team) -> Self {
        GameState {
            team1,
            team2,
            phase: Phase::StartOfBattle,
            turn: 0,
            winner: None,
            terminal: false,
            record_events: false,
            events: Vec::new(),
        }
    }

    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::One => &self.team1,
            Side::Two => &self.team2,
        }
    }

    pub fn team_mut(&mut self, side: Side) -> &mut Team {
        match side {
            Side::One => &mut self.team1,
            Side::Two => &mut self.team2,
        }
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub(crate) fn set_recording(&mut self, on: bool) {
        self.record_events = on;
    }

    pub(crate) fn record(&mut self, event: BattleEvent) {
        if self.record_events {
            self.events.push(event);
        }
    }

    fn enter_phase(&mut self, phase: Phase) {
        self.phase = phase;
        debug!("turn {}: {:?}", self.turn, phase);
        self.record(BattleEvent::PhaseStarted {
            phase,
            turn: self.turn,
        });
    }

    pub fn check_winner(&self) -> Option<Winner> {
        match (self.team1.alive_count() > 0, self.team2.alive_count() > 0) {
            (false, false) => Some(Winner::Draw),
            (true, false) => Some(Winner::Team1),
            (false, true) => Some(Winner::Team2),
            (true, true) => None,
        }
    }

    /// Sets the outcome once; later calls are ignored.
    fn finish(&mut self, winner: Winner) {
        if self.terminal {
            return;
        }
        self.winner = Some(winner);
        self.terminal = true;
        self.phase = Phase::EndOfBattle;
        debug!("battle over after {} turns: {:?}", self.turn, winner);
        self.record(BattleEvent::BattleEnded {
            winner,
            turns: self.turn,
        });
    }
}

fn board_cell(pet: Option<&Pet>, left: bool) -> String {
    let Some(pet) = pet else {
        return if left {
            format!("{:>12} {:>6}", "---", "")
        } else {
            format!("{:>6} {:<12}", "", "---")
        };
    };
    let name: String = pet.name.chars().take(12).collect();
    let stats = if pet.is_fainted() {
        "X".to_string()
    } else {
        format!("({},{})", pet.attack, pet.health)
    };
    if left {
        format!("{name:>12} {stats:>6}")
    } else {
        format!("{stats:<6} {name:<12}")
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(10);
        writeln!(f, "{rule}")?;
        writeln!(f, "{:^28} vs {:^28}", "TEAM 1", "TEAM 2")?;
        writeln!(f, "{rule}")?;
        let rows = self.team1.capacity().max(self.team2.capacity());
        for i in 0..rows {
            let marker = if i == 0 { "->".to_string() } else { i.to_string() };
            writeln!(
                f,
                "[{marker}] {}  |  {}",
                board_cell(self.team1.pet_at(i), true),
                board_cell(self.team2.pet_at(i), false)
            )?;
        }
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "Turn: {}  |  Alive: Team1={}  Team2={}",
            self.turn,
            self.team1.alive_count(),
            self.team2.alive_count()
        )?;
        match self.winner {
            Some(Winner::Draw) => writeln!(f, "draw")?,
            Some(Winner::Team1) => writeln!(f, "team 1 victory")?,
            Some(Winner::Team2) => writeln!(f, "team 2 victory")?,
            None => {}
        }
        write!(f, "{rule}")
    }
}

/// Runs battles. Owns the random source every ability draws from, so one
/// simulator per worker keeps parallel runs independent.
pub struct BattleSimulator {
    rng: SmallRng,
    options: BattleOptions,
}

impl BattleSimulator {
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_options(seed, BattleOptions::default())
    }

    pub fn with_options(seed: Option<u64>, options: BattleOptions) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        BattleSimulator { rng, options }
    }

    pub fn options(&self) -> &BattleOptions {
        &self.options
    }

    /// Resolves one battle on copies of the given teams.
    pub fn simulate_battle(&mut self, team1: &Team, team2: &Team) -> Result<GameState> {
        let mut state = GameState::new(team1.clone(), team2.clone());
        state.set_recording(self.options.record_events);

        state.enter_phase(Phase::StartOfBattle);
        triggers::dispatch_phase(&mut state, &mut self.rng, TriggerType::StartOfBattle)?;
        self.process_faints(&mut state)?;

        while !state.is_terminal() {
            if state.turn >= self.options.max_turns {
                warn!(
                    "battle hit the {} turn cap, scoring it as a draw",
                    self.options.max_turns
                );
                state.finish(Winner::Draw);
                break;
            }
            self.battle_turn(&mut state)?;
            if let Some(winner) = state.check_winner() {
                state.finish(winner);
            }
        }
        Ok(state)
    }

    fn battle_turn(&mut self, state: &mut GameState) -> Result<()> {
        state.turn += 1;
        let (Some(pet1), Some(pet2)) = (
            state.team1.front_pet().map(Pet::id),
            state.team2.front_pet().map(Pet::id),
        ) else {
            return Ok(());
        };

        state.enter_phase(Phase::BeforeAttack);
        triggers::dispatch_phase(state, &mut self.rng, TriggerType::BeforeAttack)?;

        state.enter_phase(Phase::Attack);
        self.execute_attack(state, pet1, pet2)?;

        state.enter_phase(Phase::AfterAttack);
        triggers::dispatch_phase(state, &mut self.rng, TriggerType::AfterAttack)?;

        self.process_faints(state)
    }

    /// Both pets strike at once with the attack they had before the exchange.
    fn execute_attack(&mut self, state: &mut GameState, pet1: PetId, pet2: PetId) -> Result<()> {
        let (Some(attack1), Some(attack2)) = (
            state.team1.pet(pet1).map(|p| p.attack),
            state.team2.pet(pet2).map(|p| p.attack),
        ) else {
            return Ok(());
        };

        triggers::dispatch_friend_ahead_attacks(state, &mut self.rng, Side::One, pet1)?;
        triggers::dispatch_friend_ahead_attacks(state, &mut self.rng, Side::Two, pet2)?;

        let (name1, dealt_to_1) = match state.team1.pet_mut(pet1) {
            Some(pet) => (pet.name.clone(), pet.take_damage(attack2)),
            None => (String::new(), 0),
        };
        let (name2, dealt_to_2) = match state.team2.pet_mut(pet2) {
            Some(pet) => (pet.name.clone(), pet.take_damage(attack1)),
            None => (String::new(), 0),
        };
        trace!("{name1} takes {dealt_to_1}, {name2} takes {dealt_to_2}");
        state.record(BattleEvent::Attack {
            pet1: name1,
            pet2: name2,
            damage_to_pet1: dealt_to_1,
            damage_to_pet2: dealt_to_2,
        });
        Ok(())
    }

    /// Marks every unmarked pet at zero health as fainted, team 1 first, then
    /// fires their faint abilities in that order.
    fn process_faints(&mut self, state: &mut GameState) -> Result<()> {
        state.phase = Phase::Faint;
        let mut newly_fainted = Vec::new();
        let mut queued = Vec::new();
        for side in [Side::One, Side::Two] {
            for pet in state.team_mut(side).pets_mut() {
                if pet.health == 0 && !pet.is_fainted() {
                    pet.mark_fainted();
                    newly_fainted.push((side, pet.name.clone()));
                    queued.extend(PendingTrigger::for_pet(side, pet, TriggerType::Faint));
                }
            }
        }
        for (side, pet) in newly_fainted {
            debug!("{side:?} {pet} faints");
            state.record(BattleEvent::Fainted { side, pet });
        }
        triggers::dispatch_faints(state, &mut self.rng, queued)
    }
}

/// Single seeded battle with default options.
pub fn simulate_battle(team1: &Team, team2: &Team, seed: u64) -> Result<GameState> {
    BattleSimulator::new(Some(seed)).simulate_battle(team1, team2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorded() -> BattleSimulator {
        BattleSimulator::with_options(
            Some(7),
            BattleOptions {
                record_events: true,
                ..BattleOptions::default()
            },
        )
    }

    #[test]
    fn exchange_uses_pre_attack_values() {
        let team1 = Team::new().add_pets(&["pig"]).unwrap();
        let team2 = Team::new().add_pets(&["pig"]).unwrap();
        let state = recorded().simulate_battle(&team1, &team2).unwrap();
        assert_eq!(state.winner(), Some(Winner::Draw));
        assert_eq!(state.turn, 1);
        assert!(state.events().contains(&BattleEvent::Attack {
            pet1: "Pig".to_string(),
            pet2: "Pig".to_string(),
            damage_to_pet1: 1,
            damage_to_pet2: 1,
        }));
    }

    #[test]
    fn health_hits_zero_before_faint_is_marked() {
        let mut state = GameState::new(
            Team::new().add_pets(&["fish"]).unwrap(),
            Team::new().add_pets(&["fish"]).unwrap(),
        );
        state.team1.pet_at_mut(0).unwrap().take_damage(3);
        assert_eq!(state.team1.alive_count(), 1);
        let mut sim = recorded();
        sim.process_faints(&mut state).unwrap();
        assert_eq!(state.team1.alive_count(), 0);
        assert!(state.team1.pet_at(0).unwrap().is_fainted());
        assert_eq!(state.check_winner(), Some(Winner::Team2));
    }

    #[test]
    fn faints_fire_team1_before_team2() {
        let mut state = GameState::new(
            Team::new().add_pets(&["fish", "ant", "ant"]).unwrap(),
            Team::new().add_pets(&["ant", "fish"]).unwrap(),
        );
        state.set_recording(true);
        state.team2.pet_at_mut(0).unwrap().health = 0;
        state.team1.pet_at_mut(2).unwrap().health = 0;
        state.team1.pet_at_mut(1).unwrap().health = 0;
        recorded().process_faints(&mut state).unwrap();
        let order: Vec<(Side, String)> = state
            .events()
            .iter()
            .filter_map(|e| match e {
                BattleEvent::AbilityTriggered { side, pet, .. } => Some((*side, pet.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(
            order,
            vec![
                (Side::One, "Ant".to_string()),
                (Side::One, "Ant2".to_string()),
                (Side::Two, "Ant".to_string()),
            ]
        );
        // Both team 1 ants buff the only alive friend, the fish.
        let fish = state.team1.pet_at(0).unwrap();
        assert_eq!((fish.attack, fish.health), (4, 5));
    }

    #[test]
    fn winner_is_set_only_once() {
        let mut state = GameState::new(Team::new(), Team::new());
        state.finish(Winner::Team1);
        state.finish(Winner::Draw);
        assert_eq!(state.winner(), Some(Winner::Team1));
        assert_eq!(state.phase, Phase::EndOfBattle);
    }

    #[test]
    fn turn_cap_ends_in_a_draw() {
        let mut sim = BattleSimulator::with_options(
            Some(1),
            BattleOptions {
                max_turns: 2,
                record_events: false,
            },
        );
        let mut team1 = Team::new();
        team1.add(Pet::new("Wall", 1, 100), None).unwrap();
        let mut team2 = Team::new();
        team2.add(Pet::new("Wall", 1, 100), None).unwrap();
        let state = sim.simulate_battle(&team1, &team2).unwrap();
        assert!(state.is_terminal());
        assert_eq!(state.turn, 2);
        assert_eq!(state.winner(), Some(Winner::Draw));
    }

    #[test]
    fn empty_teams_draw_on_first_turn() {
        let state = simulate_battle(&Team::new(), &Team::new(), 0).unwrap();
        assert_eq!(state.turn, 1);
        assert_eq!(state.winner().map(Winner::code), Some(0));
    }

    #[test]
    fn board_marks_fainted_and_empty_slots() {
        let team1 = Team::new().add_pets(&["ant", "ant"]).unwrap();
        let team2 = Team::new().add_pets(&["fish"]).unwrap();
        let state = simulate_battle(&team1, &team2, 3).unwrap();
        let board = state.to_string();
        assert!(board.contains("team 1 victory"));
        assert!(board.contains("X"));
        assert!(board.contains("---"));
        assert!(board.contains("Turn: 2"));
    }
}
