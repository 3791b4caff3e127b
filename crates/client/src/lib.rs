//! Controller network API over HTTP.
//!
//! [`HttpNetworkApi`] implements [`NetworkApi`] by posting the save payload
//! as JSON to `{base_url}/network/{networkId}`.

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;
use zeroui_rules::{ApiConfig, ApiError, NetworkApi, NetworkId, SaveAck, SavePayload};

/// Errors constructing an [`HttpNetworkApi`].
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("invalid base URL {url:?}: {error}")]
	BaseUrl { url: String, error: url::ParseError },
	#[error("base URL {0:?} must be http or https")]
	Scheme(String),
	#[error("failed to build HTTP client: {0}")]
	Build(#[from] reqwest::Error),
}

/// Network configuration writes against a controller's REST API.
#[derive(Debug, Clone)]
pub struct HttpNetworkApi {
	client: Client,
	base_url: Url,
	token: Option<String>,
}

impl HttpNetworkApi {
	pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
		let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|error| ClientError::BaseUrl {
			url: config.base_url.clone(),
			error,
		})?;
		if !matches!(base_url.scheme(), "http" | "https") {
			return Err(ClientError::Scheme(config.base_url.clone()));
		}
		let client = Client::builder().timeout(config.timeout()).build()?;
		Ok(Self {
			client,
			base_url,
			token: config.token.clone().filter(|t| !t.is_empty()),
		})
	}

	/// `{base_url}/network/{id}` with the id as a single escaped path segment.
	pub fn network_url(&self, network_id: &NetworkId) -> Url {
		let mut url = self.base_url.clone();
		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().push("network").push(network_id.as_str());
		}
		url
	}
}

#[async_trait]
impl NetworkApi for HttpNetworkApi {
	async fn save(&self, network_id: &NetworkId, payload: &SavePayload) -> Result<SaveAck, ApiError> {
		let url = self.network_url(network_id);
		let mut request = self.client.post(url.clone()).json(payload);
		if let Some(token) = &self.token {
			request = request.bearer_auth(token);
		}

		let response = request.send().await.map_err(|err| {
			warn!(%url, error = %err, "client.network.save_transport");
			ApiError::Transport(err.to_string())
		})?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			warn!(%url, status = status.as_u16(), "client.network.save_rejected");
			return Err(ApiError::Status {
				status: status.as_u16(),
				body,
			});
		}

		debug!(%url, status = status.as_u16(), "client.network.save_ok");
		Ok(SaveAck {
			network_id: network_id.clone(),
		})
	}
}
