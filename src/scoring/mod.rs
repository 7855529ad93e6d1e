//! Excitement scoring.
//!
//! A message's score is the number of characters removed when every
//! excitement pattern is stripped from its body.

pub mod scorer;

pub use scorer::excitement_score;
