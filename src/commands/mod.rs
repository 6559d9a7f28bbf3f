pub mod checkin;
pub mod reminder;
