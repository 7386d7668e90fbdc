use crate::batch::BattleStats;
use crate::battle::BattleSimulator;
use crate::model::Team;
use crate::pets::list_available_pets;
use anyhow::Context;
use log::info;
use rayon::prelude::*;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const CSV_HEADER: [&str; 8] = [
    "Team1_ID",
    "Team1_Composition",
    "Team2_ID",
    "Team2_Composition",
    "Team1_Wins",
    "Team2_Wins",
    "Draws",
    "Total_Battles",
];

const LINE_END: &str = "\r\n";

/// Every ordered line-up of `team_length` catalog pets, repeats allowed, in
/// roster order.
pub fn generate_all_team_sequences(team_length: usize) -> crate::Result<Vec<Team>> {
    let roster = list_available_pets();
    let mut sequences: Vec<Vec<&str>> = vec![Vec::new()];
    for _ in 0..team_length {
        sequences = sequences
            .into_iter()
            .flat_map(|prefix| {
                roster.iter().map(move |name| {
                    let mut next = prefix.clone();
                    next.push(*name);
                    next
                })
            })
            .collect();
    }
    sequences
        .iter()
        .map(|names| Team::new().add_pets(names))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchupRow {
    pub team1_id: usize,
    pub team1_composition: String,
    pub team2_id: usize,
    pub team2_composition: String,
    pub stats: BattleStats,
}

impl MatchupRow {
    fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let fields = [
            Cow::Owned(self.team1_id.to_string()),
            csv_field(&self.team1_composition),
            Cow::Owned(self.team2_id.to_string()),
            csv_field(&self.team2_composition),
            Cow::Owned(self.stats.team1_wins.to_string()),
            Cow::Owned(self.stats.team2_wins.to_string()),
            Cow::Owned(self.stats.draws.to_string()),
            Cow::Owned(self.stats.total_simulations.to_string()),
        ];
        write!(out, "{}{LINE_END}", fields.join(","))
    }
}

fn csv_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn cell_seed(seed: u64, row: usize, col: usize) -> u64 {
    seed ^ ((row as u64) << 32) ^ (col as u64)
}

/// Plays every team against every team (self-pairings included) and streams
/// one CSV row per ordered pair. Rows are computed in parallel and written in
/// `(row, col)` order. Returns the number of matchups written.
pub fn run_tournament<W: Write>(
    teams: &[Team],
    battles_per_matchup: usize,
    seed: u64,
    out: &mut W,
    chunk_size: usize,
) -> anyhow::Result<usize> {
    let total = teams.len() * teams.len();
    let chunk_size = chunk_size.max(1);
    info!(
        "full grid tournament: {} teams, {total} matchups, {battles_per_matchup} battles each, {} simulations",
        teams.len(),
        total * battles_per_matchup
    );
    write!(out, "{}{LINE_END}", CSV_HEADER.join(","))?;

    let compositions: Vec<String> = teams.iter().map(Team::composition).collect();
    let mut written = 0usize;
    for (row, team1) in teams.iter().enumerate() {
        info!(
            "progress: {written}/{total} matchups ({:.1}%)",
            100.0 * written as f64 / total as f64
        );
        let cells: Vec<MatchupRow> = teams
            .par_iter()
            .enumerate()
            .map(|(col, team2)| {
                let mut sim = BattleSimulator::new(Some(cell_seed(seed, row, col)));
                let stats = sim.k_battles(team1, team2, battles_per_matchup)?;
                Ok(MatchupRow {
                    team1_id: row,
                    team1_composition: compositions[row].clone(),
                    team2_id: col,
                    team2_composition: compositions[col].clone(),
                    stats,
                })
            })
            .collect::<crate::Result<_>>()
            .with_context(|| format!("tournament aborted in row {row}"))?;

        for cell in &cells {
            cell.write_to(out)?;
            written += 1;
            if written % chunk_size == 0 {
                out.flush()?;
                info!("flushed {written}/{total} matchups");
            }
        }
    }
    out.flush()?;
    info!("processed {written} matchups");
    Ok(written)
}

/// Runs the tournament into `output` or a timestamped `tr_<secs>.csv`.
pub fn write_tournament_file(
    teams: &[Team],
    battles_per_matchup: usize,
    seed: u64,
    output: Option<&Path>,
    chunk_size: usize,
) -> anyhow::Result<PathBuf> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let secs = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default();
            PathBuf::from(format!("tr_{secs}.csv"))
        }
    };
    let file = File::create(&path)
        .with_context(|| format!("Failed to create results file at {}", path.display()))?;
    let mut out = BufWriter::new(file);
    run_tournament(teams, battles_per_matchup, seed, &mut out, chunk_size)?;
    info!("results saved to {}", path.display());
    Ok(path)
}
