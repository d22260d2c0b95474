//! Data Transfer Objects for REST request/response serialization.
//!
//! Response entities deserialize straight into [`crate::domain`] types;
//! only request bodies and the error envelope live here.

pub mod deal_dto;

pub use deal_dto::*;
