use crate::abilities::Ability;
use crate::error::{Result, SimError};
use crate::model::{Pet, TriggerType};

#[derive(Clone, Copy, Debug)]
pub struct PetTemplate {
    pub name: &'static str,
    pub attack: u32,
    pub health: u32,
    pub binding: Option<(TriggerType, Ability)>,
}

impl PetTemplate {
    pub fn instantiate(&self) -> Pet {
        let pet = Pet::new(self.name, self.attack, self.health);
        match self.binding {
            Some((trigger, ability)) => pet.with_ability(trigger, ability),
            None => pet,
        }
    }
}

// Iteration order is the roster order used when generating line-ups.
static CATALOG: phf::OrderedMap<&'static str, PetTemplate> = phf::phf_ordered_map! {
    // faint: give a random friend +1/+1
    "ant" => PetTemplate {
        name: "Ant",
        attack: 2,
        health: 2,
        binding: Some((
            TriggerType::Faint,
            Ability::BuffRandomFriend { attack: 1, health: 1 },
        )),
    },
    "beaver" => PetTemplate { name: "Beaver", attack: 3, health: 2, binding: None },
    // faint: summon a 1/1 zombie cricket
    "cricket" => PetTemplate {
        name: "Cricket",
        attack: 1,
        health: 2,
        binding: Some((
            TriggerType::Faint,
            Ability::SummonToken { name: "Zombie Cricket", attack: 1, health: 1 },
        )),
    },
    "fish" => PetTemplate { name: "Fish", attack: 2, health: 3, binding: None },
    // friend summoned: give it +1 attack
    "horse" => PetTemplate {
        name: "Horse",
        attack: 2,
        health: 1,
        binding: Some((
            TriggerType::FriendSummoned,
            Ability::BuffSummonedFriend { attack: 1, health: 0 },
        )),
    },
    // start of battle: 1 damage to a random enemy
    "mosquito" => PetTemplate {
        name: "Mosquito",
        attack: 2,
        health: 2,
        binding: Some((
            TriggerType::StartOfBattle,
            Ability::DamageRandomEnemy { damage: 1 },
        )),
    },
    "mouse" => PetTemplate { name: "Mouse", attack: 1, health: 2, binding: None },
    "otter" => PetTemplate { name: "Otter", attack: 1, health: 3, binding: None },
    "pig" => PetTemplate { name: "Pig", attack: 4, health: 1, binding: None },
};

pub fn template(name: &str) -> Option<&'static PetTemplate> {
    CATALOG.get(name.to_ascii_lowercase().as_str())
}

pub fn create_pet(name: &str) -> Result<Pet> {
    template(name)
        .map(PetTemplate::instantiate)
        .ok_or_else(|| SimError::UnknownCreature {
            name: name.to_string(),
            available: list_available_pets().join(", "),
        })
}

pub fn list_available_pets() -> Vec<&'static str> {
    CATALOG.keys().copied().collect()
}
