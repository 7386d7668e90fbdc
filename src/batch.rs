use crate::battle::{BattleSimulator, Winner};
use crate::error::{Result, SimError};
use crate::model::Team;
use serde::Serialize;

/// Aggregate of repeated battles between the same two line-ups. Rates are
/// percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BattleStats {
    pub team1_wins: u64,
    pub team2_wins: u64,
    pub draws: u64,
    pub team1_win_rate: f64,
    pub team2_win_rate: f64,
    pub draw_rate: f64,
    pub total_simulations: u64,
}

impl BattleStats {
    fn tally(&mut self, winner: Winner) {
        match winner {
            Winner::Team1 => self.team1_wins += 1,
            Winner::Team2 => self.team2_wins += 1,
            Winner::Draw => self.draws += 1,
        }
    }

    fn finish_rates(&mut self) {
        if self.total_simulations == 0 {
            return;
        }
        let total = self.total_simulations as f64;
        self.team1_win_rate = self.team1_wins as f64 / total * 100.0;
        self.team2_win_rate = self.team2_wins as f64 / total * 100.0;
        self.draw_rate = self.draws as f64 / total * 100.0;
    }
}

impl BattleSimulator {
    /// Runs `num_simulations` independent battles; the templates are never
    /// mutated. A battle that ends without an outcome aborts the batch.
    pub fn k_battles(
        &mut self,
        team1: &Team,
        team2: &Team,
        num_simulations: usize,
    ) -> Result<BattleStats> {
        let mut stats = BattleStats {
            total_simulations: num_simulations as u64,
            ..BattleStats::default()
        };
        for _ in 0..num_simulations {
            let state = self.simulate_battle(team1, team2)?;
            let winner = state.winner().ok_or_else(|| {
                SimError::InvariantViolation(format!(
                    "battle finished on turn {} without a winner code",
                    state.turn
                ))
            })?;
            stats.tally(winner);
        }
        stats.finish_rates();
        Ok(stats)
    }
}

pub fn k_battles(
    team1: &Team,
    team2: &Team,
    num_simulations: usize,
    seed: Option<u64>,
) -> Result<BattleStats> {
    BattleSimulator::new(seed).k_battles(team1, team2, num_simulations)
}
