// app/src/lib.rs

//! Order service for a prepared-meal (bento) delivery shop.
//!
//! Storefront callables accept orders and serve the catalog; a
//! document-created trigger numbers each order and sends its emails; staff
//! manage orders, products and settings through the `/admin` routes; a daily
//! job exports the whole database.

pub mod config;
pub mod errors;
pub mod lifecycle;
pub mod models;
pub mod pipelines;
pub mod scheduler;
pub mod sequencer;
pub mod services;
pub mod state;
pub mod store;
pub mod templates;
pub mod triggers;
pub mod validation;
pub mod web;
