pub mod error;
pub mod extract;
pub mod pagination;
pub mod serde_utils;
