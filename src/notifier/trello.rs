//! Trello REST client implementing [`IssueNotifier`].
//!
//! Authentication uses the static `key` + `token` query parameters. Requests
//! are blocking; the batch is sequential and waits for each ticket anyway.

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{IssueNotifier, TrackerError};

pub const TRELLO_API_BASE: &str = "https://api.trello.com/1";

/// Connection settings for the Trello API.
#[derive(Debug, Clone)]
pub struct TrelloConfig {
    /// Base URL including the API version, e.g. `https://api.trello.com/1`.
    pub api_base: String,
    pub api_key: String,
    pub token: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TrelloConfig {
    fn default() -> Self {
        Self {
            api_base: TRELLO_API_BASE.to_string(),
            api_key: String::new(),
            token: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Board or list as returned by the listing endpoints.
#[derive(Debug, Clone, Deserialize)]
struct Named {
    id: String,
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct IdOnly {
    id: String,
}

#[derive(Debug, Clone)]
pub struct TrelloClient {
    client: Client,
    config: TrelloConfig,
}

impl TrelloClient {
    pub fn new(config: TrelloConfig) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TrackerError::Http {
                endpoint: config.api_base.clone(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, config })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    fn auth(&self) -> [(&'static str, &str); 2] {
        [("key", self.config.api_key.as_str()), ("token", self.config.token.as_str())]
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, TrackerError> {
        let url = self.api_url(path);
        debug!(endpoint = path, "GET");
        let response = self
            .client
            .get(&url)
            .query(&self.auth())
            .send()
            .map_err(|e| transport_error(path, e))?;
        handle_response(response, path)
    }
}

/// Never echo the request URL: it carries the credentials.
fn transport_error(endpoint: &str, e: reqwest::Error) -> TrackerError {
    TrackerError::Http {
        endpoint: endpoint.to_string(),
        message: e.without_url().to_string(),
    }
}

fn handle_response<T: DeserializeOwned>(response: Response, endpoint: &str) -> Result<T, TrackerError> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().map_err(|e| TrackerError::Decode {
            endpoint: endpoint.to_string(),
            message: e.without_url().to_string(),
        });
    }

    let body = response.text().unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        return Err(TrackerError::Auth(error_text(&body, status)));
    }
    Err(TrackerError::Api {
        status: status.as_u16(),
        endpoint: endpoint.to_string(),
        message: error_text(&body, status),
    })
}

/// Trello answers errors either as plain text or as `{"message": "..."}`.
fn error_text(body: &str, status: StatusCode) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));
    match from_json {
        Some(msg) => msg,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => format!("request failed with status {status}"),
    }
}

fn pick_by_name<'a>(items: &'a [Named], name: &str) -> Option<&'a str> {
    items.iter().find(|i| i.name == name).map(|i| i.id.as_str())
}

/// Query parameters for `POST /cards`; new cards go on top of the list.
fn card_params(
    list_id: &str,
    title: &str,
    description: &str,
    member_ids: &[String],
) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("name", title.to_string()),
        ("desc", description.to_string()),
        ("pos", "top".to_string()),
        ("idList", list_id.to_string()),
    ];
    if !member_ids.is_empty() {
        params.push(("idMembers", member_ids.join(",")));
    }
    params
}

impl IssueNotifier for TrelloClient {
    fn find_board_id(&self, name: &str) -> Result<String, TrackerError> {
        info!("Searching for board '{name}'...");
        let boards: Vec<Named> = self.get("/members/me/boards")?;
        pick_by_name(&boards, name)
            .map(str::to_string)
            .ok_or_else(|| TrackerError::not_found("board", name))
    }

    fn find_list_id(&self, board_id: &str, name: &str) -> Result<String, TrackerError> {
        info!("Searching for list '{name}'...");
        let lists: Vec<Named> = self.get(&format!("/boards/{board_id}/lists"))?;
        pick_by_name(&lists, name)
            .map(str::to_string)
            .ok_or_else(|| TrackerError::not_found("list", name))
    }

    fn find_member_ids(&self, names: &[String]) -> Result<Vec<String>, TrackerError> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            info!("Searching for member '{name}'...");
            match self.get::<IdOnly>(&format!("/members/{name}")) {
                Ok(member) => ids.push(member.id),
                Err(TrackerError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                    return Err(TrackerError::not_found("member", name.as_str()));
                }
                Err(e) => return Err(e),
            }
        }
        Ok(ids)
    }

    fn create_ticket(
        &self,
        list_id: &str,
        title: &str,
        description: &str,
        member_ids: &[String],
    ) -> Result<String, TrackerError> {
        info!("Creating card '{title}'...");
        let endpoint = "/cards";
        let response = self
            .client
            .post(self.api_url(endpoint))
            .query(&self.auth())
            .query(&card_params(list_id, title, description, member_ids))
            .send()
            .map_err(|e| transport_error(endpoint, e))?;
        match handle_response::<IdOnly>(response, endpoint) {
            Ok(card) => {
                info!(card = %card.id, "Card created");
                Ok(card.id)
            }
            Err(e) => {
                warn!(error = %e, "Card not created");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(id: &str, name: &str) -> Named {
        Named {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn api_url_construction() {
        let client = TrelloClient::new(TrelloConfig {
            api_base: "https://api.trello.com/1/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            client.api_url("/members/me/boards"),
            "https://api.trello.com/1/members/me/boards"
        );
    }

    #[test]
    fn picks_exact_name() {
        let items = vec![named("1", "Issues"), named("2", "Issues Archive")];
        assert_eq!(pick_by_name(&items, "Issues"), Some("1"));
        assert_eq!(pick_by_name(&items, "issues"), None);
    }

    #[test]
    fn card_params_join_members_and_pin_to_top() {
        let params = card_params("L1", "Duplicate: a in b", "same as c", &["m1".into(), "m2".into()]);
        assert!(params.contains(&("pos", "top".to_string())));
        assert!(params.contains(&("idList", "L1".to_string())));
        assert!(params.contains(&("idMembers", "m1,m2".to_string())));
        assert!(params.contains(&("desc", "same as c".to_string())));

        let no_members = card_params("L1", "t", "", &[]);
        assert!(no_members.iter().all(|(k, _)| *k != "idMembers"));
    }

    #[test]
    fn error_text_prefers_json_message() {
        assert_eq!(error_text(r#"{"message":"invalid id"}"#, StatusCode::BAD_REQUEST), "invalid id");
        assert_eq!(error_text("invalid key\n", StatusCode::BAD_REQUEST), "invalid key");
        assert!(error_text("", StatusCode::BAD_GATEWAY).contains("502"));
    }
}
