pub mod access;
pub mod error;
pub mod favorites;
pub mod leads;
pub mod listings;

pub use access::{ActorContext, Role, UserId};
pub use error::{AuthorizationError, PreconditionError, ValidationError, WorkflowError};
