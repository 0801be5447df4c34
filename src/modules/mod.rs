pub mod bookings;
pub mod public;
pub mod rooms;
pub mod tenants;
pub mod visitors;
