//! Turn flow: the state machine, turn-scoped context, and the
//! orchestrator that drives every other component.

mod context;
mod orchestrator;
mod state;

pub use context::TurnContext;
pub use orchestrator::{Game, ScorePreview};
pub use state::{TurnPhase, TurnStateMachine};
