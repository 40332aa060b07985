//! Session state machine
//!
//! Elm-style: a pure `transition` maps (state, event) to a new state plus
//! effects, and the runtime performs the effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::{Effect, Reply};
pub use event::{Command, Event};
pub use state::{Action, ErrorKind, Phase, SessionContext, SessionState};
pub use transition::transition;
