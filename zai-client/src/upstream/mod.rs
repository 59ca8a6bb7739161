//! Chat completion call against the Z.ai API.
//!
//! [`ZaiClient::call_upstream`] shapes one request the way the web frontend
//! does: forged browser headers with the chat as referer, a bearer token,
//! fresh request/user ids, and a current-scheme signature over the request
//! descriptor and the newest user text. The raw response is returned for the
//! caller to read or stream.

mod types;

use reqwest::Url;
use tracing::debug;
use uuid::Uuid;

pub use types::{UpstreamMessage, UpstreamRequest};

use crate::client::{CHAT_TIMEOUT, ensure_success};
use crate::headers::build_browser_headers;
use crate::signature::{SignaturePayload, generate_chat_signature};
use crate::{AuthToken, Error, Result, ZaiClient};

/// Per-call identifiers that end up in the query string and the signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestIds {
    pub request_id: String,
    pub user_id: String,
    pub timestamp: String,
}

impl RequestIds {
    /// Fresh random ids stamped with the current time.
    pub fn generate() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            user_id: Uuid::new_v4().to_string(),
            timestamp: chrono::Utc::now().timestamp_millis().to_string(),
        }
    }

    /// The `e` half of the signed message.
    pub fn signing_descriptor(&self) -> String {
        format!(
            "requestId,{},timestamp,{},user_id,{}",
            self.request_id, self.timestamp, self.user_id
        )
    }
}

/// Build the chat URL with the fixed query parameters followed by `params`.
///
/// # Errors
///
/// Returns `Error::InvalidUrl` if `endpoint` does not parse.
pub fn build_upstream_url(
    endpoint: &str,
    ids: &RequestIds,
    signature: &SignaturePayload,
    request: &UpstreamRequest,
) -> Result<Url> {
    let mut url = Url::parse(endpoint).map_err(|e| Error::InvalidUrl {
        url: endpoint.to_string(),
        reason: e.to_string(),
    })?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("requestId", &ids.request_id)
            .append_pair("timestamp", &ids.timestamp)
            .append_pair("user_id", &ids.user_id)
            .append_pair("signature_timestamp", &signature.timestamp.to_string());
        for (key, value) in request.param_pairs() {
            query.append_pair(&key, &value);
        }
    }
    Ok(url)
}

impl ZaiClient {
    /// Issue the chat completion request.
    ///
    /// `chat_id` becomes the `Referer` path; `auth_token` the bearer token.
    ///
    /// # Errors
    ///
    /// - `Error::Timeout` after 60 seconds
    /// - `Error::Request` on transport failure
    /// - `Error::UpstreamStatus` on a non-2xx answer (body included)
    pub async fn call_upstream(
        &self,
        request: &UpstreamRequest,
        chat_id: &str,
        auth_token: &AuthToken,
    ) -> Result<reqwest::Response> {
        let ids = RequestIds::generate();
        let text = request.last_user_text();
        let signature = generate_chat_signature(&ids.signing_descriptor(), &text);

        let mut headers = build_browser_headers(&self.config, Some(chat_id));
        headers.insert(
            "Authorization",
            format!("Bearer {}", auth_token.expose_secret()),
        );
        headers.insert("X-Signature", signature.signature.as_str());

        let url = build_upstream_url(&self.config.api_endpoint, &ids, &signature, request)?;
        let body = serde_json::to_vec(request)?;

        debug!(
            request_id = %ids.request_id,
            chat_id,
            messages = request.messages.len(),
            "calling upstream chat endpoint"
        );

        let response = self
            .http
            .post(url)
            .headers(headers.to_header_map()?)
            .body(body)
            .timeout(CHAT_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, CHAT_TIMEOUT))?;

        ensure_success(response).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fixed_ids() -> RequestIds {
        RequestIds {
            request_id: "req-1".to_string(),
            user_id: "user-1".to_string(),
            timestamp: "1700000000000".to_string(),
        }
    }

    fn fixed_signature() -> SignaturePayload {
        SignaturePayload {
            signature: "abc".to_string(),
            timestamp: 1_700_000_000_123,
        }
    }

    fn url_for(request: &UpstreamRequest) -> Result<Url> {
        build_upstream_url(
            "https://chat.z.ai/api/chat/completions",
            &fixed_ids(),
            &fixed_signature(),
            request,
        )
    }

    #[test]
    fn descriptor_lists_ids_in_order() {
        assert_eq!(
            fixed_ids().signing_descriptor(),
            "requestId,req-1,timestamp,1700000000000,user_id,user-1"
        );
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = RequestIds::generate();
        let b = RequestIds::generate();
        assert_ne!(a.request_id, b.request_id);
        assert_ne!(a.user_id, b.user_id);
        assert_ne!(a.request_id, a.user_id);
        assert!(a.timestamp.parse::<i64>().is_ok());
    }

    #[test]
    fn url_carries_fixed_query_parameters() {
        let url = url_for(&UpstreamRequest::default()).unwrap();

        assert_eq!(url.path(), "/api/chat/completions");
        assert_eq!(
            url.query(),
            Some(
                "requestId=req-1&timestamp=1700000000000&user_id=user-1&signature_timestamp=1700000000123"
            )
        );
    }

    #[test]
    fn url_appends_params_skipping_nulls() {
        let request = UpstreamRequest::default().with_params(json!({"a": 1, "b": null, "c": "z"}));
        let url = url_for(&request).unwrap();
        let query = url.query().unwrap();

        assert!(query.contains("a=1"));
        assert!(query.contains("c=z"));
        assert!(!query.contains("b="));
    }

    #[test]
    fn url_encodes_param_values() {
        let request = UpstreamRequest::default().with_params(json!({"q": "a b&c"}));
        let url = url_for(&request).unwrap();
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("q".to_string(), "a b&c".to_string())));
    }

    #[test]
    fn invalid_endpoint_is_reported() {
        let request = UpstreamRequest::default();
        let err = build_upstream_url("not a url", &fixed_ids(), &fixed_signature(), &request)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }
}
