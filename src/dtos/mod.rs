// dtos/mod.rs
use serde::Serialize;

pub mod casedtos;
pub mod consultationdtos;
pub mod earningdtos;
pub mod escrowdtos;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}
