pub mod factory;
pub mod memory;
pub mod observer;
pub mod runner;
pub mod services;

pub use services::{build_services, Services};
