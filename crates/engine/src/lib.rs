//! Batched notification dispatch.
//!
//! - `relevance`: decides whether a game is notable for a user
//! - `content`: resolves the schedule against teams and standings
//! - `message`: batches relevant games into flex or text push messages
//! - `concurrency`: bounded concurrent execution of per-user tasks
//! - `users`: cursor pagination over registered users
//! - `dispatch`: the run orchestrator

pub mod concurrency;
pub mod content;
pub mod dispatch;
pub mod message;
pub mod relevance;
pub mod users;

pub use dispatch::{DispatchError, DispatchOutcome, Dispatcher, RunSummary};
pub use users::{PgUserRepository, UserSource};
