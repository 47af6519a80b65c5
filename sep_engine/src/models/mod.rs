pub mod energy;
pub mod event;
pub mod fluence;
pub mod flux;
pub mod threshold;
pub mod time;

pub use energy::*;
pub use event::*;
pub use fluence::*;
pub use flux::*;
pub use threshold::*;
pub use time::*;
