use crate::abilities::Ability;
use crate::error::{Result, SimError};
use crate::pets::create_pet;
use std::fmt;

pub const DEFAULT_TEAM_SIZE: usize = 5;

/// Identity of a pet within its team. Assigned on placement and never reused,
/// so a pet keeps its id when it moves between battles via a cloned team.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct PetId(u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TriggerType {
    StartOfBattle,
    BeforeAttack,
    AfterAttack,
    Faint,
    FriendSummoned,
    /// Dispatched for pets behind the attacker before each exchange. No
    /// catalog entry binds it yet.
    FriendAheadAttacks,
}

#[derive(Clone, Debug)]
pub struct Pet {
    pub name: String,
    pub attack: u32,
    pub health: u32,
    pub level: u32,
    pub experience: u32,
    pub trigger: Option<TriggerType>,
    pub ability: Option<Ability>,
    fainted: bool,
    id: PetId,
}

impl Pet {
    pub fn new(name: impl Into<String>, attack: u32, health: u32) -> Self {
        Pet {
            name: name.into(),
            attack,
            health,
            level: 1,
            experience: 0,
            trigger: None,
            ability: None,
            fainted: false,
            id: PetId(0),
        }
    }

    pub fn with_ability(mut self, trigger: TriggerType, ability: Ability) -> Self {
        self.trigger = Some(trigger);
        self.ability = Some(ability);
        self
    }

    pub fn id(&self) -> PetId {
        self.id
    }

    pub fn is_fainted(&self) -> bool {
        self.fainted
    }

    /// One-way: a fainted pet never comes back.
    pub(crate) fn mark_fainted(&mut self) {
        self.fainted = true;
    }

    /// The bound ability, if this pet reacts to `trigger`.
    pub fn ability_for(&self, trigger: TriggerType) -> Option<Ability> {
        match (self.trigger, self.ability) {
            (Some(bound), Some(ability)) if bound == trigger => Some(ability),
            _ => None,
        }
    }

    /// Health is clamped at zero; returns the damage actually applied.
    pub fn take_damage(&mut self, damage: u32) -> u32 {
        let actual = damage.min(self.health);
        self.health -= actual;
        actual
    }

    pub fn buff(&mut self, attack: u32, health: u32) {
        self.attack = self.attack.saturating_add(attack);
        self.health = self.health.saturating_add(health);
    }
}

impl fmt::Display for Pet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}/{})", self.name, self.attack, self.health)?;
        if self.fainted {
            write!(f, "X")?;
        }
        Ok(())
    }
}

/// Fixed-capacity line-up. Slot index is the only source of a pet's position.
#[derive(Clone, Debug)]
pub struct Team {
    slots: Vec<Option<Pet>>,
    next_id: u32,
}

impl Default for Team {
    fn default() -> Self {
        Team::with_capacity(DEFAULT_TEAM_SIZE)
    }
}

impl Team {
    pub fn new() -> Self {
        Team::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Team {
            slots: vec![None; capacity],
            next_id: 1,
        }
    }

    /// Builder over catalog names, e.g. `Team::new().add_pets(&["ant", "fish"])`.
    pub fn add_pets(mut self, names: &[&str]) -> Result<Self> {
        for name in names {
            self.add(create_pet(name)?, None)?;
        }
        Ok(self)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Option<Pet>] {
        &self.slots
    }

    /// Places `pet` at `position` (must be an empty slot) or in the first empty
    /// slot. A pet sharing its name with an alive teammate gets a numeric
    /// suffix. Returns the slot used; on error the team is unchanged.
    pub fn add(&mut self, mut pet: Pet, position: Option<usize>) -> Result<usize> {
        let slot = match position {
            Some(pos) if pos >= self.capacity() => {
                return Err(SimError::SlotOutOfRange {
                    position: pos,
                    capacity: self.capacity(),
                })
            }
            Some(pos) if self.slots[pos].is_some() => {
                return Err(SimError::SlotOccupied { position: pos })
            }
            Some(pos) => pos,
            None => self
                .slots
                .iter()
                .position(Option::is_none)
                .ok_or(SimError::SlotFull {
                    capacity: self.capacity(),
                })?,
        };
        pet.name = self.unique_name(&pet.name);
        pet.id = PetId(self.next_id);
        self.next_id += 1;
        self.slots[slot] = Some(pet);
        Ok(slot)
    }

    fn unique_name(&self, base: &str) -> String {
        let taken: Vec<&str> = self.alive_pets().map(|(_, p)| p.name.as_str()).collect();
        if !taken.contains(&base) {
            return base.to_string();
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{base}{counter}");
            if !taken.contains(&candidate.as_str()) {
                return candidate;
            }
            counter += 1;
        }
    }

    /// Clears the slot holding the pet with this id.
    pub fn remove(&mut self, id: PetId) -> Option<Pet> {
        let pos = self.position_of(id)?;
        self.slots[pos].take()
    }

    pub fn position_of(&self, id: PetId) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|p| p.id == id))
    }

    pub fn pet(&self, id: PetId) -> Option<&Pet> {
        self.slots.iter().flatten().find(|p| p.id == id)
    }

    pub fn pet_mut(&mut self, id: PetId) -> Option<&mut Pet> {
        self.slots.iter_mut().flatten().find(|p| p.id == id)
    }

    pub fn pet_at(&self, position: usize) -> Option<&Pet> {
        self.slots.get(position).and_then(Option::as_ref)
    }

    pub fn pet_at_mut(&mut self, position: usize) -> Option<&mut Pet> {
        self.slots.get_mut(position).and_then(Option::as_mut)
    }

    pub fn set_stats_at(&mut self, position: usize, attack: u32, health: u32) -> bool {
        match self.pet_at_mut(position) {
            Some(pet) => {
                pet.attack = attack;
                pet.health = health;
                true
            }
            None => false,
        }
    }

    /// Non-fainted pets with their slot index, front to back.
    pub fn alive_pets(&self) -> impl Iterator<Item = (usize, &Pet)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|p| (idx, p)))
            .filter(|(_, p)| !p.is_fainted())
    }

    pub fn alive_count(&self) -> usize {
        self.alive_pets().count()
    }

    pub fn front_pet(&self) -> Option<&Pet> {
        self.alive_pets().next().map(|(_, p)| p)
    }

    pub fn front_position(&self) -> Option<usize> {
        self.alive_pets().next().map(|(idx, _)| idx)
    }

    pub(crate) fn pets_mut(&mut self) -> impl Iterator<Item = &mut Pet> {
        self.slots.iter_mut().flatten()
    }

    /// Alive names joined with ", ", as written to tournament files.
    pub fn composition(&self) -> String {
        self.alive_pets()
            .map(|(_, p)| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pets: Vec<String> = self.slots.iter().flatten().map(Pet::to_string).collect();
        write!(f, "Team([{}])", pets.join(", "))
    }
}
