#![doc = "The `boardforge` library crate."]
#![doc = ""]
#![doc = "This crate contains the core business logic for the BoardForge service:"]
#![doc = "the identity directory, the membership guard, the board/column/task"]
#![doc = "hierarchy store with its comment lifecycle, plus the routing"]
#![doc = "configuration, authentication mechanisms and error handling."]
#![doc = "It is used by the main binary (`main.rs`) to construct and run the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
