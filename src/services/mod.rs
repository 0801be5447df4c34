pub mod booking;
pub mod otp;
pub mod room;
pub mod room_sync;
pub mod subscription;
pub mod tenant;
pub mod visitor;
