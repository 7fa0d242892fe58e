//! Response envelope for inspection and acknowledgement handlers.
//!
//! Reads and acks wrap their payload as `{ "data": ... }`. The
//! batch-advance and regenerate-day handlers return their payloads
//! bare: their field layout is itself the cross-service contract.

use serde::Serialize;

/// The `{ "data": T }` wrapper.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
