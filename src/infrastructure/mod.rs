//! Infrastructure layer: the network side of the client.

pub mod http;
