pub mod companion;
pub mod errors;
pub mod movement;

pub use companion::*;
pub use errors::*;
pub use movement::*;
