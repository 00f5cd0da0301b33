use rand::Rng;
use thiserror::Error;

/// The two groups produced by a shuffle-and-bisect over a voice channel roster.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSplit {
    pub team_a: Vec<String>,
    pub team_b: Vec<String>,
}

impl TeamSplit {
    pub fn total(&self) -> usize {
        self.team_a.len() + self.team_b.len()
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ShuffleError {
    #[error("need at least 2 players to form teams, found {found}")]
    InsufficientPlayers { found: usize },
}

/// Shuffles the roster and splits it into two teams.
///
/// The roster itself is never mutated - a reroll feeds the same recorded
/// roster back through here. Works on a copy, permuted with a Fisher-Yates
/// shuffle so every ordering is equally likely. When the player count is
/// odd, team A gets the extra player.
pub fn split_teams<R: Rng + ?Sized>(
    roster: &[String],
    rng: &mut R,
) -> Result<TeamSplit, ShuffleError> {
    if roster.len() < 2 {
        return Err(ShuffleError::InsufficientPlayers {
            found: roster.len(),
        });
    }

    let mut pool = roster.to_vec();

    // Fisher-Yates: walk from the back, swap each slot with a uniformly
    // chosen slot at or below it.
    for i in (1..pool.len()).rev() {
        let j = rng.gen_range(0..=i);
        pool.swap(i, j);
    }

    // Team A takes the first half, rounded up on odd counts.
    let half = (pool.len() + 1) / 2;
    let team_b = pool.split_off(half);

    Ok(TeamSplit {
        team_a: pool,
        team_b,
    })
}
