// app/src/services/attestation.rs

//! App-attestation check for storefront callables.

use std::collections::HashSet;

/// Accepts requests carrying one of a configured set of attestation tokens.
///
/// An empty set rejects everything, so an unconfigured deployment cannot be
/// called by unattested clients.
#[derive(Debug, Clone, Default)]
pub struct AttestationVerifier {
  accepted: HashSet<String>,
}

impl AttestationVerifier {
  pub fn new<I, S>(tokens: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      accepted: tokens.into_iter().map(Into::into).collect(),
    }
  }

  pub fn verify(&self, token: Option<&str>) -> bool {
    match token.map(str::trim) {
      Some(t) if !t.is_empty() => self.accepted.contains(t),
      _ => false,
    }
  }
}
