pub mod background_jobs;
pub mod bid_service;
pub mod case_service;
pub mod consultation_service;
pub mod earnings_service;
pub mod error;
pub mod escrow_service;
pub mod notification_service;
