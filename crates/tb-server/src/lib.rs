//! Command bridge server
//!
//! Serves a line-oriented JSON command protocol over any buffered reader and
//! writer pair, normally stdin/stdout. Incoming commands are looked up in a
//! static registry, validated, and routed to provider strategies or answered
//! locally; every request gets exactly one response with its id echoed back.

pub mod dispatch;
pub mod protocol;
pub mod registry;
pub mod transport;
pub mod validation;

pub use dispatch::Dispatcher;
pub use protocol::{CommandRequest, ErrorBody, ResponseEnvelope};
pub use registry::{
    default_registry, CommandRegistry, CommandSpec, CommandTarget, Constraint, DuplicateCommand,
    ParamSpec, ParamType, SystemCommand,
};
pub use transport::Transport;
pub use validation::ValidationChain;
