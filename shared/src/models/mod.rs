//! Domain models for Stockroom

mod movement;
mod product;
mod report;
mod user;

pub use movement::*;
pub use product::*;
pub use report::*;
pub use user::*;
