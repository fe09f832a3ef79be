//! Database entities module

pub mod booking;
pub mod issued_reference;
pub mod payment;
pub mod room;
pub mod room_night;

pub use booking::Entity as Booking;
pub use issued_reference::Entity as IssuedReference;
pub use payment::Entity as Payment;
pub use room::Entity as Room;
pub use room_night::Entity as RoomNight;
