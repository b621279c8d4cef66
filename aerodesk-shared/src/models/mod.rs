pub mod airport;
pub mod booking;
pub mod fleet;
pub mod flight;
