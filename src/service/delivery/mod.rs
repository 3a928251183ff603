mod plan;
mod sender;

pub use plan::*;
pub use sender::*;
