//! The finite state machine: actions, the transition table and [`Fsm`] itself.

pub mod action;
pub mod machine;
pub mod table;

pub use action::{Action, ActionType, Binding, EventContext};
pub use machine::{Fsm, RegionId};
pub use table::{StateId, Transition, TransitionTable};
