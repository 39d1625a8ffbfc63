pub mod client;
pub mod enums;
pub mod inspection;
pub mod notification;
pub mod product;
pub mod schedule;
pub mod service;
pub mod station;
pub mod user;

pub use client::Client;
pub use inspection::Inspection;
pub use notification::Notification;
pub use product::Product;
pub use schedule::Schedule;
pub use service::Service;
pub use station::Station;
pub use user::User;
