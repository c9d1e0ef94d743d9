//! Group blocks: an optional reporting grouping over reservations with its
//! own flat status lifecycle, decoupled from member reservations.

pub mod handlers;
pub mod routes;

pub use routes::group_routes;
