pub mod analyze;
pub mod review;
pub mod verify;
