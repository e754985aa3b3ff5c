use thiserror::Error;

use crate::net::protocol::Endpoint;

/// The call could not be completed or its answer could not be understood.
/// Never carries a state; the caller keeps what it had.
#[derive(Error, Debug)]
pub enum TransportError {
	#[error("{endpoint}: request failed: {source}")]
	Http {
		endpoint: Endpoint,
		#[source]
		source: reqwest::Error,
	},
	#[error("{endpoint}: server answered {status} without a readable body")]
	Status { endpoint: Endpoint, status: u16 },
	#[error("{endpoint}: could not decode reply: {source}")]
	Decode {
		endpoint: Endpoint,
		#[source]
		source: serde_json::Error,
	},
	#[error("{endpoint}: malformed reply: {reason}")]
	Malformed { endpoint: Endpoint, reason: String },
}
