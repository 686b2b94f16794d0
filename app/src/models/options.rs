// app/src/models/options.rs

use serde::{Deserialize, Serialize};

/// Entry of the serving-style and payment-method lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedOption {
  pub name: String,
}
