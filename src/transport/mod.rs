// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Engine transports.
//!
//! - [`HttpTransport`]: the engine's REST API over `reqwest`
//! - [`InMemoryTransport`]: in-process engine for tests

pub mod http;
pub mod memory;
pub mod traits;

pub use http::{HttpTransport, HttpTransportFactory};
pub use memory::InMemoryTransport;
pub use traits::{SearchTransport, SharedTransport, TransportError, TransportFactory};
