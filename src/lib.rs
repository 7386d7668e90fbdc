pub mod abilities;
pub mod batch;
pub mod battle;
pub mod error;
pub mod model;
pub mod pets;
pub mod tournament;
pub mod triggers;

pub use crate::batch::{k_battles, BattleStats};
pub use crate::battle::{simulate_battle, BattleOptions, BattleSimulator, GameState, Winner};
pub use crate::error::{Result, SimError};
pub use crate::model::{Pet, Team};
pub use crate::pets::create_pet;

use crate::model::DEFAULT_TEAM_SIZE;
use crate::tournament::{generate_all_team_sequences, write_tournament_file};
use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    /// Mosquito x3 against Pig x5, statistics printed as JSON.
    Example,
    /// Every generated line-up against every other.
    Tournament,
    /// Built-in or file-supplied line-ups against each other.
    Custom,
}

#[derive(Debug, Clone)]
pub struct CliOptions {
    pub mode: Mode,
    pub battles: Option<usize>,
    pub seed: Option<u64>,
    pub team_length: usize,
    pub output_path: Option<PathBuf>,
    pub chunk_size: usize,
    pub teams_path: Option<PathBuf>,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Example,
            battles: None,
            seed: None,
            team_length: 3,
            output_path: None,
            chunk_size: 10_000,
            teams_path: None,
        }
    }
}

/// Roster file: `{ "teams": [["ant", "fish"], ["pig"]] }`.
#[derive(Debug, Deserialize)]
pub struct RosterFile {
    pub teams: Vec<Vec<String>>,
}

const CUSTOM_TEAMS: [[&str; 3]; 10] = [
    ["Fish", "Ant", "Fish"],
    ["Ant", "Ant", "Fish"],
    ["Fish", "Fish", "Fish"],
    ["Fish", "Ant", "Cricket"],
    ["Fish", "Fish", "Beaver"],
    ["Ant", "Ant", "Otter"],
    ["Fish", "Ant", "Beaver"],
    ["Fish", "Ant", "Mosquito"],
    ["Fish", "Ant", "Ant"],
    ["Ant", "Fish", "Fish"],
];

pub fn custom_teams() -> Result<Vec<Team>> {
    CUSTOM_TEAMS
        .iter()
        .map(|names| Team::new().add_pets(names))
        .collect()
}

pub fn load_teams(path: &Path) -> anyhow::Result<Vec<Team>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read teams file at {}", path.display()))?;
    let parsed: RosterFile = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
    validate_roster(&parsed)?;
    parsed
        .teams
        .iter()
        .enumerate()
        .map(|(idx, names)| {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            Team::new()
                .add_pets(&names)
                .with_context(|| format!("Invalid team #{idx} in {}", path.display()))
        })
        .collect()
}

pub fn validate_roster(roster: &RosterFile) -> anyhow::Result<()> {
    if roster.teams.is_empty() {
        anyhow::bail!("Expected at least one team");
    }
    if let Some((idx, team)) = roster
        .teams
        .iter()
        .enumerate()
        .find(|(_, team)| team.is_empty() || team.len() > DEFAULT_TEAM_SIZE)
    {
        anyhow::bail!(
            "Team #{idx} has {} pets, expected 1 to {DEFAULT_TEAM_SIZE}",
            team.len()
        );
    }
    Ok(())
}

pub fn run(opts: CliOptions) -> anyhow::Result<()> {
    if opts.battles == Some(0) {
        anyhow::bail!("--battles must be > 0");
    }
    match opts.mode {
        Mode::Example => {
            let team1 = Team::new().add_pets(&["mosquito", "mosquito", "mosquito"])?;
            let team2 = Team::new().add_pets(&["pig", "pig", "pig", "pig", "pig"])?;
            let stats = k_battles(&team1, &team2, opts.battles.unwrap_or(10), opts.seed)?;
            println!("{team1} vs {team2}");
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Mode::Tournament => {
            let teams = generate_all_team_sequences(opts.team_length)?;
            write_grid(&teams, opts.battles.unwrap_or(1), &opts)?;
        }
        Mode::Custom => {
            let teams = match &opts.teams_path {
                Some(path) => load_teams(path)?,
                None => custom_teams()?,
            };
            write_grid(&teams, opts.battles.unwrap_or(10_000), &opts)?;
        }
    }
    Ok(())
}

fn write_grid(teams: &[Team], battles: usize, opts: &CliOptions) -> anyhow::Result<()> {
    let seed = opts.seed.unwrap_or_else(rand::random);
    let path = write_tournament_file(
        teams,
        battles,
        seed,
        opts.output_path.as_deref(),
        opts.chunk_size,
    )?;
    println!(
        "Wrote {}x{} tournament to {}",
        teams.len(),
        teams.len(),
        path.display()
    );
    Ok(())
}
