pub mod currency;
pub mod schedule;
