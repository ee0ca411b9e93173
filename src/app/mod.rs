//! 应用层

pub mod health;
pub mod products;
pub mod uploads;
