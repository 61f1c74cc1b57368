// Library crate: the pose editing core. The host panel, file pickers and
// upload transport live outside and call in through `state::EditorSession`,
// the `host` adapter traits, and the JSON `command` protocol.

pub mod command;
pub mod error;
pub mod fixtures;
pub mod host;
pub mod interchange;
pub mod render;
pub mod state;
pub mod transform;
pub mod validation;

pub use error::{EditorError, FormatError, Result, StateError};
pub use state::EditorSession;
