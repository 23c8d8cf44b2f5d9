pub mod leaderboard;
pub mod maps;
pub mod players;
pub mod update;
