//! Purpose: Library crate for decoding configuration nodes into `TextContainer` values.
//! Exports: `core` (container model, alias table, decoder, errors) and `json` (cursor, serde bridge).
//! Role: Backs the `textspec` CLI and any loader that embeds containers in its config tree.
//! Invariants: Decoding performs no I/O; it only consumes a token cursor.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod core;
pub mod json;
