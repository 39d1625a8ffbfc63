//! Fumigo: pest-control service-management backend.
//!
//! REST API over SQLite for the operational entities (users, clients,
//! services, products, inspections, stations, schedules, notifications),
//! with multipart photo uploads, inspection findings reconciliation,
//! document-to-PDF conversion, an S3-compatible archive, and real-time
//! notification delivery over WebSocket.

pub mod api;
pub mod config;
pub mod convert;
pub mod db;
pub mod findings;
pub mod models;
pub mod notify;
pub mod storage;
pub mod uploads;
