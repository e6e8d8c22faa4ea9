//! In-memory layer/group tree.
//!
//! Follows an Elm-style architecture: `MapState` holds the data, `Msg`
//! describes every mutation, and `update` applies one message and reports
//! whether anything changed. Nothing outside `update` mutates the tree, which
//! keeps the group visibility cascade and classification testable on their own.
//!
//! Load cycles are tagged with a generation number: `Msg::BeginLoad` starts a
//! new cycle and `Msg::LayersLoaded` results from an older cycle are dropped.

mod messages;
mod search;
mod state;
mod update;

pub use messages::Msg;
pub use search::{search, SearchResult};
pub use state::MapState;
pub use update::update;
