pub mod casemodel;
pub mod consultationmodel;
pub mod earningmodel;
pub mod escrowmodel;
