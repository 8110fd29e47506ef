pub mod auth;
pub mod category;
pub mod certificate;
pub mod company;
pub mod membership;
pub mod opinion;
pub mod role;
pub mod statistics;
pub mod user;
