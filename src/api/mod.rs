pub mod achievements;
pub mod auth;
pub mod feed;
pub mod leaderboard;
pub mod scores;
pub mod stats;
pub mod tournaments;
pub mod users;
pub mod verifications;
