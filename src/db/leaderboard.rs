use std::cmp::Reverse;

use serde::Serialize;

use crate::db::{Score, UserId};
use crate::error::AppError;
use crate::util::format_thousands;
use crate::AppState;

/// Sentinel game name selecting every score.
pub const GLOBAL_GAME: &str = "Global";

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub name: String,
    /// Total, formatted with thousands separators for display.
    pub score: String,
    pub game: String,
    /// Rank-delta tracking is not implemented; this is a stable
    /// placeholder, always "same".
    pub change: String,
}

struct Group {
    user_id: UserId,
    name: String,
    total: i64,
    game: String,
}

/// Ranks players by summed numeric score, one group per user, for one game
/// or for every game under the "Global" sentinel.
///
/// Groups form in first-seen order and the sort is stable, so equal totals
/// keep their submission order; ranks are plain 1-based positions even on
/// ties.
pub fn aggregate(scores: &[Score], game: &str) -> Vec<LeaderboardRow> {
    let mut groups: Vec<Group> = Vec::new();
    for score in scores {
        if game != GLOBAL_GAME && score.game != game {
            continue;
        }
        match groups.iter_mut().find(|group| group.user_id == score.user_id) {
            Some(group) => group.total += score.numeric_score,
            None => groups.push(Group {
                user_id: score.user_id,
                name: score.username.clone(),
                total: score.numeric_score,
                game: if game == GLOBAL_GAME {
                    GLOBAL_GAME.to_string()
                } else {
                    score.game.clone()
                },
            }),
        }
    }

    groups.sort_by_key(|group| Reverse(group.total));
    groups
        .into_iter()
        .enumerate()
        .map(|(index, group)| LeaderboardRow {
            rank: index + 1,
            name: group.name,
            score: format_thousands(group.total),
            game: group.game,
            change: "same".to_string(),
        })
        .collect()
}

impl AppState {
    pub fn leaderboard(&self, game: &str) -> Result<Vec<LeaderboardRow>, AppError> {
        let _guard = self.store.lock();
        let db = self.store.load()?;
        Ok(aggregate(&db.scores, game))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::db::score::numeric_score;
    use crate::db::ScoreId;

    fn score(user_id: UserId, username: &str, game: &str, raw: &str) -> Score {
        Score {
            id: ScoreId::random(),
            user_id,
            username: username.to_string(),
            game: game.to_string(),
            score: raw.to_string(),
            numeric_score: numeric_score(raw),
            date: Utc::now(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn ranks_by_summed_score_per_game() {
        let a = UserId::random();
        let b = UserId::random();
        let scores = vec![
            score(a, "nova", "Valorant", "1,200"),
            score(b, "lin", "Valorant", "Platinum"),
            score(a, "nova", "Chess", "9000"),
        ];

        let rows = aggregate(&scores, "Valorant");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].name, "nova");
        assert_eq!(rows[0].score, "1,200");
        assert_eq!(rows[0].game, "Valorant");
        assert_eq!(rows[1].rank, 2);
        assert_eq!(rows[1].name, "lin");
        assert_eq!(rows[1].score, "0");
    }

    #[test]
    fn global_sums_across_games_and_relabels() {
        let a = UserId::random();
        let scores = vec![
            score(a, "nova", "Valorant", "1000"),
            score(a, "nova", "Chess", "500"),
        ];

        let rows = aggregate(&scores, GLOBAL_GAME);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score, "1,500");
        assert_eq!(rows[0].game, "Global");
    }

    #[test]
    fn ties_get_strictly_increasing_ranks_in_input_order() {
        let a = UserId::random();
        let b = UserId::random();
        let scores = vec![
            score(a, "nova", "Valorant", "100"),
            score(b, "lin", "Valorant", "100"),
        ];

        let rows = aggregate(&scores, "Valorant");
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].name, "nova");
        assert_eq!(rows[1].rank, 2);
        assert_eq!(rows[1].name, "lin");
    }

    #[test]
    fn aggregation_is_idempotent() {
        let a = UserId::random();
        let b = UserId::random();
        let scores = vec![
            score(a, "nova", "Valorant", "300"),
            score(b, "lin", "Valorant", "700"),
            score(a, "nova", "Valorant", "250"),
        ];

        let first = aggregate(&scores, "Valorant");
        let second = aggregate(&scores, "Valorant");
        assert_eq!(first, second);
    }

    #[test]
    fn display_name_is_first_seen() {
        let a = UserId::random();
        let scores = vec![
            score(a, "nova", "Valorant", "100"),
            score(a, "NovaPrime", "Valorant", "200"),
        ];

        let rows = aggregate(&scores, "Valorant");
        assert_eq!(rows[0].name, "nova");
        assert_eq!(rows[0].score, "300");
    }

    #[test]
    fn change_is_a_stable_placeholder() {
        let a = UserId::random();
        let rows = aggregate(&[score(a, "nova", "Valorant", "100")], "Valorant");
        assert_eq!(rows[0].change, "same");
    }
}
