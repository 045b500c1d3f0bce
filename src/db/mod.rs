pub mod casedb;
pub mod consultationdb;
pub mod conversationdb;
pub mod db;
pub mod earningdb;
pub mod escrowdb;
