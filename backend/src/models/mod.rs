pub mod macros;
pub mod sensor;
pub mod time;

pub use sensor::*;
pub use time::*;
