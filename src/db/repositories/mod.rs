mod booking_repository;
mod otp_repository;
mod room_repository;
mod tenant_repository;
mod visitor_repository;

pub use booking_repository::BookingRepository;
pub use otp_repository::OtpRepository;
pub use room_repository::RoomRepository;
pub use tenant_repository::TenantRepository;
pub use visitor_repository::VisitorRepository;
