//! REST move-submission gateway.
//!
//! The command channel of the game: joining the lobby and submitting,
//! exchanging or passing a turn are POST requests; the resulting state
//! comes back over the STOMP topic, never in the response body. The
//! gateway performs no legality checks of its own — a rejected move is
//! whatever the server says it is.
//!
//! ehttp's callback API is bridged into async with a oneshot channel so the
//! same gateway code runs on native and in the browser.

use futures::channel::oneshot;
use lexiwire_core::PendingPlacement;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::error::GatewayError;

/// Response from the lobby join endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    /// Id of the game the player was matched into.
    pub game_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinRequest<'a> {
    player_name: &'a str,
}

#[derive(Debug, Serialize)]
struct MoveRequest<'a> {
    placements: &'a [PendingPlacement],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExchangeRequest<'a> {
    tile_ids: &'a [String],
}

/// Client for the game server's REST command endpoints.
#[derive(Debug, Clone)]
pub struct MoveGateway {
    base_url: String,
}

impl MoveGateway {
    /// Gateway against a server base URL (e.g. `http://localhost:8080`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Join the matchmaking lobby under a display name.
    pub async fn join_lobby(&self, player_name: &str) -> Result<JoinResponse, GatewayError> {
        let body = serde_json::to_vec(&JoinRequest { player_name })?;
        let response = self.post("/lobby/join", Some(body)).await?;
        parse_json(&response)
    }

    /// Submit the buffered placements as a move.
    ///
    /// On success the caller resets its placement engine; on any failure
    /// the pending buffer must be left intact so the user can retry or
    /// cancel explicitly.
    pub async fn submit_move(
        &self,
        game_id: &str,
        placements: &[PendingPlacement],
    ) -> Result<(), GatewayError> {
        let body = serde_json::to_vec(&MoveRequest { placements })?;
        self.post(&format!("/game/{game_id}/move"), Some(body)).await?;
        Ok(())
    }

    /// Request a tile exchange.
    ///
    /// An empty id set is rejected locally; no request is issued.
    pub async fn exchange(&self, game_id: &str, tile_ids: &[String]) -> Result<(), GatewayError> {
        if tile_ids.is_empty() {
            return Err(GatewayError::EmptyExchange);
        }
        let body = serde_json::to_vec(&ExchangeRequest { tile_ids })?;
        self.post(&format!("/game/{game_id}/exchange"), Some(body)).await?;
        Ok(())
    }

    /// Pass the turn. No payload.
    pub async fn pass(&self, game_id: &str) -> Result<(), GatewayError> {
        self.post(&format!("/game/{game_id}/pass"), None).await?;
        Ok(())
    }

    async fn post(
        &self,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<ehttp::Response, GatewayError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "POST");
        let mut request = ehttp::Request::post(url, body.unwrap_or_default());
        request.headers.insert("Content-Type".to_string(), "application/json".to_string());

        let response = fetch(request).await?;
        if !response.ok {
            return Err(GatewayError::Status {
                status: response.status,
                body: response.text().unwrap_or_default().to_string(),
            });
        }
        Ok(response)
    }
}

/// Wrap ehttp's callback API into a future.
async fn fetch(request: ehttp::Request) -> Result<ehttp::Response, GatewayError> {
    let (tx, rx) = oneshot::channel();
    ehttp::fetch(request, move |result| {
        let _ = tx.send(result);
    });
    rx.await
        .map_err(|_| GatewayError::Transport("request cancelled".to_string()))?
        .map_err(GatewayError::Transport)
}

fn parse_json<T: DeserializeOwned>(response: &ehttp::Response) -> Result<T, GatewayError> {
    Ok(serde_json::from_slice(&response.bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_exchange_never_touches_the_network() {
        // Unroutable base URL: if a request were issued this would hang or
        // error differently.
        let gateway = MoveGateway::new("http://invalid.invalid");
        let err = gateway.exchange("g1", &[]).await.unwrap_err();
        assert!(matches!(err, GatewayError::EmptyExchange));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let gateway = MoveGateway::new("http://localhost:8080/");
        assert_eq!(gateway.base_url, "http://localhost:8080");
    }

    #[test]
    fn move_request_uses_server_field_names() {
        let placements = vec![PendingPlacement {
            row: 7,
            col: 7,
            tile_id: "t-1".to_string(),
            letter: Some('A'),
        }];
        let value = serde_json::to_value(MoveRequest { placements: &placements }).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "placements": [{"row": 7, "col": 7, "tileId": "t-1", "letter": "A"}]
            })
        );
    }

    #[test]
    fn exchange_request_uses_server_field_names() {
        let ids = vec!["t-1".to_string(), "t-2".to_string()];
        let value = serde_json::to_value(ExchangeRequest { tile_ids: &ids }).unwrap();
        assert_eq!(value, serde_json::json!({"tileIds": ["t-1", "t-2"]}));
    }

    #[test]
    fn join_response_parses_game_id() {
        let response: JoinResponse = serde_json::from_str(r#"{"gameId": "g42"}"#).unwrap();
        assert_eq!(response.game_id, "g42");
    }
}
