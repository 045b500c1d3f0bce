// handler/mod.rs
pub mod cases;
pub mod consultations;
pub mod escrow;
pub mod wallet;
