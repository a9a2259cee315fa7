//! Rank a folder of pictures by repeated head-to-head duels.
//!
//! Each round pairs the pictures at random, a human picks the better one
//! of every pair, winners gain and losers lose a point. Scores are written
//! to a timestamped `.ptsave` checkpoint after every round so a tournament
//! can be resumed later.

pub mod config;
pub mod core;
pub mod services;
