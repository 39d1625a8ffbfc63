pub mod archive;
pub mod auth;
pub mod clients;
pub mod convert;
pub mod inspections;
pub mod notifications;
pub mod products;
pub mod schedules;
pub mod services;
pub mod stations;
pub mod users;
