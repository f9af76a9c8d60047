// Business domains
pub mod auth;
pub mod category;
pub mod dish;
pub mod member;
