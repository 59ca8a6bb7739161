//! Model registry: static defaults overlaid with the provider's live list.
//!
//! The defaults always come first in their configured order. A live model
//! with a known id replaces the default in place; unknown ids are appended in
//! fetch order. Ids in the result are unique.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{MODELS_TIMEOUT, ensure_success};
use crate::fallback::with_fallback;
use crate::{DefaultModelIds, Error, Result, ZaiClient};

/// Owner stamped on models that do not name one.
pub const DEFAULT_OWNER: &str = "z.ai";

/// User-Agent sent with the model list fetch, separate from the header pool.
pub const MODELS_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/140.0.0.0 Safari/537.36";

/// Nested metadata the provider attaches to each model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Epoch seconds from an integer, a float (truncated) or a numeric string.
///
/// Anything else reads as absent.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f as i64),
        _ => None,
    })
}

/// A model descriptor as exposed to API consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZaiModel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<ModelMeta>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ZaiModel {
    /// A bare descriptor with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            display_name: None,
            created: None,
            owned_by: None,
            info: None,
            extra: Map::new(),
        }
    }

    /// Fill `name`, `created` and `owned_by` from `info`, then from defaults.
    fn normalized(mut self, now: i64) -> Self {
        let info = self.info.clone().unwrap_or_default();
        self.name = non_empty(self.name)
            .or_else(|| non_empty(info.name))
            .or_else(|| Some(self.id.clone()));
        self.created = self
            .created
            .filter(|c| *c != 0)
            .or(info.created_at.filter(|c| *c != 0))
            .or(Some(now));
        self.owned_by = non_empty(self.owned_by)
            .or_else(|| non_empty(info.user_id))
            .or_else(|| Some(DEFAULT_OWNER.to_string()));
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Envelope of the live model list.
///
/// Entries stay untyped so one malformed model does not void the rest.
#[derive(Debug, Deserialize)]
struct ModelListResponse {
    #[serde(default)]
    data: Option<Vec<Value>>,
}

impl ModelListResponse {
    fn into_models(self) -> Vec<ZaiModel> {
        self.data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<ZaiModel>(entry) {
                Ok(model) => Some(model),
                Err(error) => {
                    debug!(%error, "skipping malformed model entry");
                    None
                }
            })
            .collect()
    }
}

/// Source of the live model list.
///
/// [`ZaiClient`] implements this against the provider API; tests substitute
/// canned sources.
#[async_trait]
pub trait ModelSource: Send + Sync {
    /// Fetch the live list, reporting failures.
    async fn latest_models(&self) -> Result<Vec<ZaiModel>>;
}

/// Default descriptors built from configured ids, stamped with `now`.
pub fn default_models_at(ids: &DefaultModelIds, now: i64) -> Vec<ZaiModel> {
    ids.ordered()
        .into_iter()
        .map(|id| ZaiModel {
            name: Some(id.to_string()),
            created: Some(now),
            owned_by: Some(DEFAULT_OWNER.to_string()),
            ..ZaiModel::new(id)
        })
        .collect()
}

/// Default descriptors stamped with the current time.
pub fn default_models(ids: &DefaultModelIds) -> Vec<ZaiModel> {
    default_models_at(ids, now_secs())
}

/// Overlay `fetched` onto `defaults` by id.
pub fn merge_models(defaults: Vec<ZaiModel>, fetched: Vec<ZaiModel>, now: i64) -> Vec<ZaiModel> {
    let mut merged: Vec<ZaiModel> = Vec::with_capacity(defaults.len() + fetched.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for model in defaults.into_iter().chain(fetched.into_iter().map(|m| m.normalized(now))) {
        match index.get(&model.id) {
            Some(&pos) => merged[pos] = model,
            None => {
                index.insert(model.id.clone(), merged.len());
                merged.push(model);
            }
        }
    }
    merged
}

/// Registry over the configured default model ids.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    defaults: DefaultModelIds,
}

impl ModelRegistry {
    pub fn new(defaults: DefaultModelIds) -> Self {
        Self { defaults }
    }

    /// Static model list, in configured order.
    pub fn default_models(&self) -> Vec<ZaiModel> {
        default_models(&self.defaults)
    }

    /// Defaults merged with whatever `source` yields.
    ///
    /// Never fails: a failing or empty source leaves the defaults unchanged.
    pub async fn available_models(&self, source: &dyn ModelSource) -> Vec<ZaiModel> {
        let defaults = self.default_models();
        let fetched = with_fallback("live model fetch", source.latest_models(), Vec::new).await;
        if fetched.is_empty() {
            return defaults;
        }
        debug!(fetched = fetched.len(), "merging live models over defaults");
        merge_models(defaults, fetched, now_secs())
    }
}

#[async_trait]
impl ModelSource for ZaiClient {
    async fn latest_models(&self) -> Result<Vec<ZaiModel>> {
        let token = self.anonymous_token().await?;

        let response = self
            .http
            .get(&self.config.models_url)
            .header(reqwest::header::USER_AGENT, MODELS_USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(token.expose_secret())
            .timeout(MODELS_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, MODELS_TIMEOUT))?;
        let response = ensure_success(response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::from_reqwest(e, MODELS_TIMEOUT))?;
        let list: ModelListResponse = serde_json::from_str(&body)?;
        Ok(list.into_models())
    }
}

impl ZaiClient {
    /// Static model list from the client configuration.
    pub fn default_models(&self) -> Vec<ZaiModel> {
        default_models(&self.config.models)
    }

    /// Live model list; empty on any failure.
    pub async fn fetch_latest_models(&self) -> Vec<ZaiModel> {
        with_fallback("live model fetch", self.latest_models(), Vec::new).await
    }

    /// Defaults overlaid with the live list.
    pub async fn available_models(&self) -> Vec<ZaiModel> {
        ModelRegistry::new(self.config.models.clone())
            .available_models(self)
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct FailingSource;

    #[async_trait]
    impl ModelSource for FailingSource {
        async fn latest_models(&self) -> Result<Vec<ZaiModel>> {
            Err(Error::Request("connection refused".to_string()))
        }
    }

    struct StaticSource(Vec<ZaiModel>);

    #[async_trait]
    impl ModelSource for StaticSource {
        async fn latest_models(&self) -> Result<Vec<ZaiModel>> {
            Ok(self.0.clone())
        }
    }

    fn ids(models: &[ZaiModel]) -> Vec<&str> {
        models.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn default_models_follow_configured_ids() {
        let models = default_models_at(&DefaultModelIds::default(), 1_700_000_000);
        assert_eq!(
            ids(&models),
            ["GLM-4.5", "GLM-4.5-Thinking", "GLM-4.5-Search", "GLM-4.5-Air", "GLM-4.5V"]
        );
        for model in &models {
            assert_eq!(model.name.as_deref(), Some(model.id.as_str()));
            assert_eq!(model.created, Some(1_700_000_000));
            assert_eq!(model.owned_by.as_deref(), Some("z.ai"));
        }
    }

    #[tokio::test]
    async fn failing_fetch_returns_defaults_unchanged() {
        let registry = ModelRegistry::default();
        let models = registry.available_models(&FailingSource).await;
        let defaults = registry.default_models();

        assert_eq!(ids(&models), ids(&defaults));
        for (got, want) in models.iter().zip(&defaults) {
            assert_eq!(got.name, want.name);
            assert_eq!(got.owned_by, want.owned_by);
        }
    }

    #[tokio::test]
    async fn empty_fetch_returns_defaults() {
        let registry = ModelRegistry::default();
        let models = registry.available_models(&StaticSource(vec![])).await;
        assert_eq!(models.len(), registry.default_models().len());
    }

    #[tokio::test]
    async fn new_live_model_is_appended() {
        let registry = ModelRegistry::default();
        let fetched: ZaiModel = serde_json::from_value(json!({"id": "X", "name": "Foo"})).unwrap();
        let models = registry.available_models(&StaticSource(vec![fetched])).await;

        assert_eq!(models.len(), registry.default_models().len() + 1);
        let x = models.iter().find(|m| m.id == "X").unwrap();
        assert_eq!(x.name.as_deref(), Some("Foo"));
        assert_eq!(x.owned_by.as_deref(), Some("z.ai"));
        assert!(x.created.is_some());
        assert_eq!(models.last().unwrap().id, "X");
    }

    #[test]
    fn live_model_replaces_default_in_place() {
        let defaults = default_models_at(&DefaultModelIds::default(), 1);
        let fetched: ZaiModel = serde_json::from_value(json!({
            "id": "GLM-4.5-Air",
            "owned_by": "openai",
            "info": {"name": "GLM 4.5 Air", "created_at": 1_750_000_000}
        }))
        .unwrap();

        let merged = merge_models(defaults.clone(), vec![fetched], 99);

        assert_eq!(ids(&merged), ids(&defaults));
        let air = &merged[3];
        assert_eq!(air.name.as_deref(), Some("GLM 4.5 Air"));
        assert_eq!(air.created, Some(1_750_000_000));
        assert_eq!(air.owned_by.as_deref(), Some("openai"));
    }

    #[test]
    fn missing_fields_fall_back_to_info_then_defaults() {
        let with_info: ZaiModel = serde_json::from_value(json!({
            "id": "a",
            "name": "",
            "info": {"user_id": "owner-1"}
        }))
        .unwrap();
        let bare = ZaiModel::new("b");

        let merged = merge_models(vec![], vec![with_info, bare], 42);

        assert_eq!(merged[0].name.as_deref(), Some("a"));
        assert_eq!(merged[0].owned_by.as_deref(), Some("owner-1"));
        assert_eq!(merged[0].created, Some(42));
        assert_eq!(merged[1].name.as_deref(), Some("b"));
        assert_eq!(merged[1].owned_by.as_deref(), Some("z.ai"));
    }

    #[test]
    fn duplicate_live_ids_keep_last() {
        let first: ZaiModel = serde_json::from_value(json!({"id": "dup", "name": "one"})).unwrap();
        let second: ZaiModel = serde_json::from_value(json!({"id": "dup", "name": "two"})).unwrap();
        let merged = merge_models(vec![], vec![first, second], 0);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name.as_deref(), Some("two"));
    }

    #[test]
    fn timestamps_accept_floats_and_numeric_strings() {
        let model: ZaiModel = serde_json::from_value(json!({
            "id": "m",
            "created": "1750000000",
            "info": {"created_at": 1_755_000_000.5}
        }))
        .unwrap();
        assert_eq!(model.created, Some(1_750_000_000));
        assert_eq!(model.info.unwrap().created_at, Some(1_755_000_000));

        let model: ZaiModel = serde_json::from_value(json!({"id": "m", "created": [1]})).unwrap();
        assert!(model.created.is_none());
    }

    #[test]
    fn malformed_list_entries_are_skipped() {
        let list: ModelListResponse = serde_json::from_value(json!({
            "data": [
                {"id": "X", "name": "Foo"},
                {"name": "no id"},
                {"id": "Z", "owned_by": 7},
                {"id": "Y", "info": {"created_at": 1_755_000_000.5}}
            ]
        }))
        .unwrap();
        let models = list.into_models();
        assert_eq!(ids(&models), ["X", "Y"]);
    }

    #[test]
    fn unknown_fields_survive_round_trip() {
        let model: ZaiModel = serde_json::from_value(json!({
            "id": "m",
            "object": "model",
            "info": {"meta": {"capabilities": {"vision": true}}}
        }))
        .unwrap();
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["object"], "model");
        assert_eq!(value["info"]["meta"]["capabilities"]["vision"], true);
    }
}
