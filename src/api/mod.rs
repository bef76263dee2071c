//! Remote API boundary: endpoint names and wire payloads.

pub mod dto;
pub mod endpoints;
