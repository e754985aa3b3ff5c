pub mod client;
pub mod error;
pub mod protocol;
pub mod scripted;

pub use client::{GameClient, GameService};
pub use error::TransportError;
pub use protocol::{CpuMoveReply, Endpoint, MoveKind, MoveReply, SolveReply, Strategy, UndoReply};
pub use scripted::{Call, ScriptedService};
