pub mod exception;
pub mod host;
pub mod ids;
pub mod raw;
pub mod scope;
pub mod value;

pub use exception::*;
pub use host::*;
pub use ids::*;
pub use raw::*;
pub use scope::*;
pub use value::{ArrayRef, FailureValue, NodeId, ObjectRef};
