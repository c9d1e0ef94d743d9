mod group_block_repository;
mod guest_repository;
mod ledger_repository;
mod reservation_repository;
mod room_stay_repository;

pub use group_block_repository::GroupBlockRepository;
pub use guest_repository::GuestRepository;
pub use ledger_repository::LedgerRepository;
pub use reservation_repository::{ReservationFilter, ReservationRepository};
pub use room_stay_repository::RoomStayRepository;
