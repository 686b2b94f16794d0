// app/src/web/handlers/mod.rs

pub mod callable_handlers;
pub mod catalog_handlers;
pub mod order_handlers;
pub mod settings_handlers;
