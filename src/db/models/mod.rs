mod group_block;
mod guest;
mod guest_capture;
mod ledger;
mod reservation;
mod room_stay;

pub use group_block::*;
pub use guest::*;
pub use guest_capture::*;
pub use ledger::*;
pub use reservation::*;
pub use room_stay::*;
