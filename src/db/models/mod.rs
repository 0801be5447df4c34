mod booking;
mod otp;
mod room;
mod tenant;
mod visitor;

pub use booking::*;
pub use otp::*;
pub use room::*;
pub use tenant::*;
pub use visitor::*;
