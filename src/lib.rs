//! # cardtable-rs
//!
//! A turn-based card game engine with pluggable rule modules. Two variants
//! ship out of the box: a Daifugo-style shedding game (beat the table, dodge
//! revolutions) and an Old Maid-style elimination game (strip pairs, draw
//! blind, avoid the marked card).
//!
//! ## Quick start
//!
//! ```
//! use cardtable_rs::session::{GameSession, SessionConfig};
//!
//! let mut session = GameSession::create(
//!     SessionConfig::shedding(4).with_seed(42),
//! ).expect("valid config");
//! let ranking = session.run_to_completion().expect("session runs to the end");
//! assert_eq!(ranking.len(), 4);
//! ```
//!
//! The layers, bottom up: [`cards`] and [`deck`] are the primitives, [`hand`]
//! the per-seat container, [`rules`] the variant behavior, [`engine`] the
//! turn state machine, [`strategy`] the bots, and [`session`] the facade a
//! UI drives.

pub mod cards;
pub mod deck;
pub mod engine;
pub mod hand;
pub mod rules;
pub mod session;
pub mod strategy;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
