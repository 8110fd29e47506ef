pub mod categories;
pub mod certificates;
pub mod companies;
pub mod membership_types;
pub mod opinions;
pub mod roles;
pub mod statistics;
pub mod users;
