//! Deterministic simulation core: fixed-point arcade shooter state machines
//! synchronized to an external tick source. Everything in here is pure
//! state-in, capability-calls-out; the terminal never shows through.

pub mod angles;
pub mod attackers;
pub mod collision;
pub mod formation;
pub mod missiles;
pub mod player;
pub mod rng;
pub mod round;
pub mod score;

pub use round::{Round, RoundStatus};
