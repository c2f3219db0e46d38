//! Screen controllers: intent in, state and one-shot effects out.
//!
//! # Responsibility
//! - Own exactly one screen state per controller instance.
//! - Catch every failure at the controller boundary and turn it into state
//!   or an effect.
//!
//! # Invariants
//! - Controllers share no mutable state with each other.
//! - Dropping a controller cancels its subscriptions and in-flight work.

pub mod archive;
pub mod detail;
pub mod effects;
pub mod list;
pub mod scope;

pub use archive::{ArchiveController, ArchiveEffect, ArchiveIntent, ArchiveState, ArchiveUseCases};
pub use detail::{DetailController, DetailEffect, DetailIntent, DetailState, DetailUseCases};
pub use effects::{EffectReceiver, EffectSender};
pub use list::{ListController, ListEffect, ListIntent, ListState, ListUseCases};
