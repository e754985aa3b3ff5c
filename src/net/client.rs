use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::logging;
use crate::net::error::TransportError;
use crate::net::protocol::*;
use crate::state::{CellCoord, GameState};

/// One remote operation per method; a single request and a single reply,
/// with no retry and no coalescing.
#[async_trait]
pub trait GameService: Send + Sync {
	async fn new_game(&self, size: usize) -> Result<GameState, TransportError>;

	async fn submit_move(&self, cell: CellCoord, kind: MoveKind) -> Result<MoveReply, TransportError>;

	async fn cpu_move(&self) -> Result<CpuMoveReply, TransportError>;

	async fn undo(&self) -> Result<UndoReply, TransportError>;

	async fn solve(&self) -> Result<SolveReply, TransportError>;

	/// `Ok(true)` when the service accepted the strategy.
	async fn set_strategy(&self, strategy: Strategy) -> Result<bool, TransportError>;
}

pub struct GameClient {
	base_url: String,
	http: reqwest::Client,
}

impl GameClient {
	pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
		let http = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.unwrap_or_else(|_| reqwest::Client::new());
		Self {
			base_url: base_url.into().trim_end_matches('/').to_string(),
			http,
		}
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	fn url(&self, endpoint: Endpoint) -> String {
		format!("{}/{}", self.base_url, endpoint.path())
	}

	async fn post_json<B, R>(&self, endpoint: Endpoint, body: &B) -> Result<R, TransportError>
	where
		B: Serialize + ?Sized + Sync,
		R: DeserializeOwned,
	{
		let request = self.http.post(self.url(endpoint)).json(body);
		self.exchange(endpoint, request).await
	}

	async fn post_empty<R: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<R, TransportError> {
		let request = self.http.post(self.url(endpoint));
		self.exchange(endpoint, request).await
	}

	/// Rejections come back with 4xx codes and a JSON body, so the body is
	/// decoded whatever the status. A body that will not decode is only
	/// blamed on the status when the status is itself an error.
	async fn exchange<R: DeserializeOwned>(
		&self,
		endpoint: Endpoint,
		request: reqwest::RequestBuilder,
	) -> Result<R, TransportError> {
		logging::client::request(endpoint);

		let result = async {
			let response = request
				.send()
				.await
				.map_err(|source| TransportError::Http { endpoint, source })?;
			let status = response.status();
			let bytes = response
				.bytes()
				.await
				.map_err(|source| TransportError::Http { endpoint, source })?;

			match serde_json::from_slice::<R>(&bytes) {
				Ok(body) => {
					logging::client::response(endpoint, status.as_u16());
					Ok(body)
				}
				Err(_) if !status.is_success() => Err(TransportError::Status {
					endpoint,
					status: status.as_u16(),
				}),
				Err(source) => Err(TransportError::Decode { endpoint, source }),
			}
		}
		.await;

		if let Err(ref e) = result {
			logging::client::transport(endpoint, &e.to_string());
		}
		result
	}
}

#[async_trait]
impl GameService for GameClient {
	async fn new_game(&self, size: usize) -> Result<GameState, TransportError> {
		self.post_json(Endpoint::NewGame, &NewGameRequest { size }).await
	}

	async fn submit_move(&self, cell: CellCoord, kind: MoveKind) -> Result<MoveReply, TransportError> {
		let body: MoveBody = self.post_json(Endpoint::Move, &MoveRequest::new(cell, kind)).await?;
		MoveReply::try_from(body)
	}

	async fn cpu_move(&self) -> Result<CpuMoveReply, TransportError> {
		let body: CpuMoveBody = self.post_empty(Endpoint::CpuMove).await?;
		CpuMoveReply::try_from(body)
	}

	async fn undo(&self) -> Result<UndoReply, TransportError> {
		let body: UndoBody = self.post_empty(Endpoint::Undo).await?;
		UndoReply::try_from(body)
	}

	async fn solve(&self) -> Result<SolveReply, TransportError> {
		let body: SolveBody = self.post_empty(Endpoint::Solve).await?;
		SolveReply::try_from(body)
	}

	async fn set_strategy(&self, strategy: Strategy) -> Result<bool, TransportError> {
		let body: StrategyBody = self.post_json(Endpoint::SetStrategy, &StrategyRequest { strategy }).await?;
		Ok(body.success)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_base_url_trailing_slash_trimmed() {
		let client = GameClient::new("http://localhost:5000/api/", Duration::from_secs(1));
		assert_eq!(client.base_url(), "http://localhost:5000/api");
		assert_eq!(client.url(Endpoint::CpuMove), "http://localhost:5000/api/cpu_move");
	}
}
