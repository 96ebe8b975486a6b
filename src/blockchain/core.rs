pub mod chain;
pub mod pool;
pub mod validation;

pub use chain::*;
pub use pool::*;
pub use validation::*;
