//! Object types exposed at the call surface.

mod hello_object;
mod hello_object_async;
mod hello_world;

pub use hello_object::HelloObject;
pub use hello_object_async::{HelloObjectAsync, DEFAULT_NAME};
pub use hello_world::{HelloWorld, MethodResult};
