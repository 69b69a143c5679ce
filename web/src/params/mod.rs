//! This module holds typed parameters for various endpoint inputs.
//!
//! By using typed parameters, inputs are validated (by type) before they reach
//! the OAuth state logic. The `state` query value itself is never part of these
//! structs; the verifier reads it straight from the request.

pub(crate) mod oauth;
