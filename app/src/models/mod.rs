// app/src/models/mod.rs

//! Document shapes stored in the collections of the order database.

pub mod options;
pub mod order;
pub mod order_item;
pub mod product;
pub mod settings;
pub mod submission;

pub use options::NamedOption;
pub use order::{Order, OrderStatus};
pub use order_item::{compute_total, OrderItem};
pub use product::{resolve_price, Product};
pub use settings::{EmailTemplates, StoreInfo, DEFAULT_DELIVERY_AREA_TEXT};
pub use submission::{ItemSelection, OrderSubmission};
