pub mod groups;
pub mod reservations;
