mod advice;
mod context;
mod emotion;
mod job;
mod memory;
mod note;
mod quote;
mod user;

pub use advice::*;
pub use context::*;
pub use emotion::*;
pub use job::*;
pub use memory::*;
pub use note::*;
pub use quote::*;
pub use user::*;
