//! VendorHub API Library
//!
//! Vendor document normalization and idempotent import pipeline: turns
//! heterogeneous partner purchase-order, inventory, and sales files into one
//! canonical representation and persists each document exactly once.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod assemble;
pub mod classify;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod extract;
pub mod migrator;
pub mod models;
pub mod normalize;
pub mod services;
pub mod sheet;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub services: services::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: Option<Arc<events::EventSender>>,
    ) -> Self {
        let services = services::AppServices::new(db.clone(), config.import_policy(), event_sender);
        Self {
            db,
            config,
            services,
        }
    }
}
