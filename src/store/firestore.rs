//! Firestore REST backend for the riddle collection.
//!
//! Documents live at
//! `{base_url}/projects/{project}/databases/(default)/documents/{collection}/{id}`
//! and carry Firestore typed values (`stringValue`, `integerValue`, `arrayValue`).
//! The riddle id is always the last segment of the document `name`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, instrument, warn};

use super::RiddleStore;
use crate::domain::{Difficulty, NewRiddle, Riddle, RiddlePatch};
use crate::error::{Result, RiddleError};
use crate::util::{extract_api_error, trunc_for_log};

const PAGE_SIZE: u32 = 300;

#[derive(Clone)]
pub struct FirestoreStore {
    client: reqwest::Client,
    collection_url: Url,
    pub project_id: String,
    pub collection: String,
    api_key: Option<String>,
    bearer_token: Option<String>,
}

impl FirestoreStore {
    /// Construct the store if FIRESTORE_PROJECT_ID is set; otherwise return None.
    pub fn from_env() -> Option<Self> {
        let project_id = std::env::var("FIRESTORE_PROJECT_ID").ok()?;
        let base_url = std::env::var("FIRESTORE_BASE_URL")
            .unwrap_or_else(|_| "https://firestore.googleapis.com/v1".into());
        let collection =
            std::env::var("FIRESTORE_COLLECTION").unwrap_or_else(|_| "riddles".into());
        let api_key = std::env::var("FIRESTORE_API_KEY").ok();
        let bearer_token = std::env::var("FIRESTORE_BEARER_TOKEN").ok();

        match Self::new(&base_url, &project_id, &collection, api_key, bearer_token) {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::error!(target: "riddle_backend", error = %e, "Invalid Firestore configuration");
                None
            }
        }
    }

    pub fn new(
        base_url: &str,
        project_id: &str,
        collection: &str,
        api_key: Option<String>,
        bearer_token: Option<String>,
    ) -> Result<Self> {
        let raw = format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            base_url.trim_end_matches('/'),
            project_id,
            collection
        );
        let collection_url = Url::parse(&raw)
            .map_err(|e| RiddleError::StoreUnavailable(format!("bad Firestore URL {raw}: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()?;

        Ok(Self {
            client,
            collection_url,
            project_id: project_id.to_string(),
            collection: collection.to_string(),
            api_key,
            bearer_token,
        })
    }

    fn document_url(&self, id: &str) -> Result<Url> {
        let mut url = self.collection_url.clone();
        url.path_segments_mut()
            .map_err(|_| RiddleError::StoreUnavailable("Firestore URL cannot be a base".into()))?
            .push(id);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let mut req = self
            .client
            .request(method, url)
            .header(USER_AGENT, "riddle-backend/0.1");
        if let Some(key) = &self.api_key {
            req = req.query(&[("key", key.as_str())]);
        }
        if let Some(token) = &self.bearer_token {
            req = req.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        req
    }

    async fn list_page(&self, page_size: u32, page_token: Option<&str>) -> Result<ListResponse> {
        let mut req = self
            .request(Method::GET, self.collection_url.clone())
            .query(&[("pageSize", page_size.to_string())]);
        if let Some(token) = page_token {
            req = req.query(&[("pageToken", token)]);
        }
        let res = req.send().await?;
        let res = check_status(res, None).await?;
        Ok(res.json::<ListResponse>().await?)
    }
}

#[async_trait]
impl RiddleStore for FirestoreStore {
    fn backend(&self) -> &'static str {
        "firestore"
    }

    #[instrument(level = "debug", skip(self), fields(%id))]
    async fn get(&self, id: &str) -> Result<Riddle> {
        let res = self.request(Method::GET, self.document_url(id)?).send().await?;
        let res = check_status(res, Some(id)).await?;
        let doc: Document = res.json().await?;
        decode_document(&doc)
    }

    #[instrument(level = "debug", skip(self))]
    async fn list(&self) -> Result<Vec<Riddle>> {
        let mut out = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = self.list_page(PAGE_SIZE, token.as_deref()).await?;
            for doc in &page.documents {
                match decode_document(doc) {
                    Ok(r) => out.push(r),
                    Err(e) => {
                        warn!(target: "riddle_backend", name = %doc.name, error = %e, "Skipping undecodable riddle document")
                    }
                }
            }
            match page.next_page_token {
                Some(t) if !t.is_empty() => token = Some(t),
                _ => break,
            }
        }
        debug!(target: "riddle_backend", count = out.len(), "Listed Firestore collection");
        Ok(out)
    }

    #[instrument(level = "info", skip(self, riddle), fields(title = %riddle.title))]
    async fn create(&self, riddle: NewRiddle) -> Result<String> {
        let body = json!({ "fields": encode_new(&riddle) });
        let res = self
            .request(Method::POST, self.collection_url.clone())
            .json(&body)
            .send()
            .await?;
        let res = check_status(res, None).await?;
        let doc: Document = res.json().await?;
        let id = document_id(&doc.name)?;
        info!(target: "riddle", %id, "Created riddle document");
        Ok(id)
    }

    #[instrument(level = "debug", skip(self, riddle), fields(id = %riddle.id))]
    async fn insert_with_id(&self, riddle: Riddle) -> Result<()> {
        let (id, body) = riddle.into_parts();
        let res = self
            .request(Method::POST, self.collection_url.clone())
            .query(&[("documentId", id.as_str())])
            .json(&json!({ "fields": encode_new(&body) }))
            .send()
            .await?;
        check_status(res, None).await?;
        Ok(())
    }

    #[instrument(level = "info", skip(self, patch), fields(%id, fields = ?patch.field_paths()))]
    async fn update(&self, id: &str, patch: RiddlePatch) -> Result<()> {
        if patch.is_empty() {
            // Nothing to merge; a plain read still reports NotFound.
            self.get(id).await?;
            return Ok(());
        }
        let paths = patch.field_paths();
        let mut req = self
            .request(Method::PATCH, self.document_url(id)?)
            .query(&[("currentDocument.exists", "true")]);
        for path in paths {
            req = req.query(&[("updateMask.fieldPaths", path)]);
        }
        let res = req.json(&json!({ "fields": encode_patch(&patch) })).send().await?;
        check_status(res, Some(id)).await?;
        Ok(())
    }

    #[instrument(level = "info", skip(self), fields(%id))]
    async fn delete(&self, id: &str) -> Result<()> {
        let res = self.request(Method::DELETE, self.document_url(id)?).send().await?;
        // Firestore answers 200 for missing documents too.
        match check_status(res, Some(id)).await {
            Ok(_) | Err(RiddleError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn is_empty(&self) -> Result<bool> {
        let page = self.list_page(1, None).await?;
        Ok(page.documents.is_empty())
    }
}

/// Map HTTP failures: 404 on a document becomes NotFound, everything else StoreUnavailable.
async fn check_status(res: reqwest::Response, id: Option<&str>) -> Result<reqwest::Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(RiddleError::NotFound(id.to_string()));
        }
    }
    let body = res.text().await.unwrap_or_default();
    debug!(target: "riddle_backend", %status, body = %trunc_for_log(&body, 300), "Firestore request failed");
    let msg = extract_api_error(&body).unwrap_or(body);
    Err(RiddleError::StoreUnavailable(format!("Firestore HTTP {}: {}", status, msg)))
}

// --- Firestore DTOs + codec ---

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default)]
    next_page_token: Option<String>,
}

fn string_value(s: &str) -> Value {
    json!({ "stringValue": s })
}

fn array_value(items: &[String]) -> Value {
    let values: Vec<Value> = items.iter().map(|s| string_value(s)).collect();
    json!({ "arrayValue": { "values": values } })
}

fn integer_value(n: i64) -> Value {
    // Firestore's JSON mapping carries int64 as a decimal string.
    json!({ "integerValue": n.to_string() })
}

fn encode_new(r: &NewRiddle) -> Map<String, Value> {
    let mut f = Map::new();
    f.insert("title".into(), string_value(&r.title));
    f.insert("riddle".into(), string_value(&r.riddle));
    f.insert("answer".into(), string_value(&r.answer));
    f.insert("difficulty".into(), string_value(r.difficulty.as_str()));
    f.insert("category".into(), string_value(&r.category));
    f.insert("hints".into(), array_value(&r.hints));
    f.insert("points".into(), integer_value(r.points));
    if let Some(alts) = &r.alternative_answers {
        f.insert("alternativeAnswers".into(), array_value(alts));
    }
    if let Some(exp) = &r.explanation {
        f.insert("explanation".into(), string_value(exp));
    }
    f
}

fn encode_patch(p: &RiddlePatch) -> Map<String, Value> {
    let mut f = Map::new();
    if let Some(v) = &p.title { f.insert("title".into(), string_value(v)); }
    if let Some(v) = &p.riddle { f.insert("riddle".into(), string_value(v)); }
    if let Some(v) = &p.answer { f.insert("answer".into(), string_value(v)); }
    if let Some(v) = &p.difficulty { f.insert("difficulty".into(), string_value(v.as_str())); }
    if let Some(v) = &p.category { f.insert("category".into(), string_value(v)); }
    if let Some(v) = &p.hints { f.insert("hints".into(), array_value(v)); }
    if let Some(v) = p.points { f.insert("points".into(), integer_value(v)); }
    if let Some(v) = &p.alternative_answers { f.insert("alternativeAnswers".into(), array_value(v)); }
    if let Some(v) = &p.explanation { f.insert("explanation".into(), string_value(v)); }
    f
}

fn document_id(name: &str) -> Result<String> {
    name.rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| RiddleError::StoreUnavailable(format!("malformed document name: {name}")))
}

fn decode_string(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)?
        .get("stringValue")?
        .as_str()
        .map(str::to_string)
}

fn decode_array(fields: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let arr = fields.get(key)?.get("arrayValue")?;
    let values = match arr.get("values").and_then(Value::as_array) {
        Some(v) => v,
        None => return Some(Vec::new()),
    };
    Some(
        values
            .iter()
            .filter_map(|v| v.get("stringValue").and_then(Value::as_str))
            .map(str::to_string)
            .collect(),
    )
}

fn decode_integer(fields: &Map<String, Value>, key: &str) -> Option<i64> {
    let v = fields.get(key)?;
    if let Some(i) = v.get("integerValue") {
        return match i {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.as_i64(),
            _ => None,
        };
    }
    v.get("doubleValue").and_then(Value::as_f64).map(|d| d as i64)
}

fn decode_document(doc: &Document) -> Result<Riddle> {
    let id = document_id(&doc.name)?;
    let f = &doc.fields;
    let missing = |field: &str| {
        RiddleError::StoreUnavailable(format!("document {id} missing field '{field}'"))
    };

    let difficulty_raw = decode_string(f, "difficulty").ok_or_else(|| missing("difficulty"))?;
    let difficulty = Difficulty::parse_filter(&difficulty_raw).ok_or_else(|| {
        RiddleError::StoreUnavailable(format!("document {id} has unknown difficulty '{difficulty_raw}'"))
    })?;

    Ok(Riddle {
        title: decode_string(f, "title").ok_or_else(|| missing("title"))?,
        riddle: decode_string(f, "riddle").ok_or_else(|| missing("riddle"))?,
        answer: decode_string(f, "answer").ok_or_else(|| missing("answer"))?,
        difficulty,
        category: decode_string(f, "category").unwrap_or_default(),
        hints: decode_array(f, "hints").unwrap_or_default(),
        points: decode_integer(f, "points").unwrap_or(0),
        alternative_answers: decode_array(f, "alternativeAnswers"),
        explanation: decode_string(f, "explanation"),
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::seed_riddles;

    fn doc_from(name: &str, fields: Map<String, Value>) -> Document {
        Document { name: name.into(), fields }
    }

    #[test]
    fn encoded_seed_decodes_back_with_id_from_name() {
        let original = seed_riddles().remove(1);
        let (id, body) = original.clone().into_parts();
        let doc = doc_from(
            &format!("projects/p/databases/(default)/documents/riddles/{id}"),
            encode_new(&body),
        );
        assert_eq!(decode_document(&doc).unwrap(), original);
    }

    #[test]
    fn decoding_tolerates_missing_hints_and_numeric_points() {
        let fields = json!({
            "title": { "stringValue": "T" },
            "riddle": { "stringValue": "R" },
            "answer": { "stringValue": "A" },
            "difficulty": { "stringValue": "hard" },
            "category": { "stringValue": "logic" },
            "points": { "integerValue": 25 },
            "id": { "stringValue": "ignored" }
        });
        let doc = doc_from(
            "projects/p/databases/(default)/documents/riddles/abc123",
            fields.as_object().unwrap().clone(),
        );
        let r = decode_document(&doc).unwrap();
        assert_eq!(r.id, "abc123");
        assert!(r.hints.is_empty());
        assert_eq!(r.points, 25);
        assert_eq!(r.difficulty, Difficulty::Hard);
    }

    #[test]
    fn empty_array_value_decodes_to_empty_list() {
        let mut fields = encode_new(&seed_riddles().remove(0).into_parts().1);
        fields.insert("hints".into(), json!({ "arrayValue": {} }));
        let r = decode_document(&doc_from("a/b/riddles/1", fields)).unwrap();
        assert!(r.hints.is_empty());
    }

    #[test]
    fn patch_encodes_only_set_fields() {
        let patch = RiddlePatch { answer: Some("x".into()), points: Some(5), ..Default::default() };
        let f = encode_patch(&patch);
        assert_eq!(f.len(), 2);
        assert_eq!(f["points"], json!({ "integerValue": "5" }));
    }

    #[test]
    fn document_url_escapes_the_id() {
        let store = FirestoreStore::new("http://localhost:8080/v1/", "demo", "riddles", None, None).unwrap();
        let url = store.document_url("a b").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v1/projects/demo/databases/(default)/documents/riddles/a%20b"
        );
    }

    #[test]
    fn list_response_accepts_an_empty_body() {
        let page: ListResponse = serde_json::from_str("{}").unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }

    // --- network behavior against an in-process Firestore stand-in ---

    type Calls = std::sync::Arc<std::sync::Mutex<Vec<String>>>;

    fn riddle_doc(id: &str, difficulty: &str) -> Value {
        let mut fields = encode_new(&seed_riddles().remove(0).into_parts().1);
        fields.insert("difficulty".into(), string_value(difficulty));
        json!({
            "name": format!("projects/demo/databases/(default)/documents/riddles/{id}"),
            "fields": fields,
        })
    }

    /// Serves a two-page collection (`1`, `2:expert` | `3`), a document `1`,
    /// and 404 for every other document. Records `METHOD path?query`.
    async fn fake_firestore() -> (FirestoreStore, Calls) {
        use axum::http::{StatusCode as Status, Uri};

        let calls: Calls = Default::default();
        let log = calls.clone();
        let app = axum::Router::new().fallback(move |method: axum::http::Method, uri: Uri| {
            let log = log.clone();
            async move {
                let query = uri.query().unwrap_or_default().to_string();
                log.lock().unwrap().push(format!("{} {}?{}", method, uri.path(), query));
                let path = uri.path();
                let body = if path.ends_with("/riddles") && method == axum::http::Method::GET {
                    if query.contains("pageToken=p2") {
                        json!({ "documents": [riddle_doc("3", "hard")] })
                    } else {
                        json!({
                            "documents": [riddle_doc("1", "easy"), riddle_doc("2", "expert")],
                            "nextPageToken": "p2",
                        })
                    }
                } else if path.ends_with("/riddles/1") {
                    riddle_doc("1", "easy")
                } else {
                    return (
                        Status::NOT_FOUND,
                        axum::Json(json!({ "error": { "code": 404, "message": "No document to update" } })),
                    );
                };
                (Status::OK, axum::Json(body))
            }
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let store =
            FirestoreStore::new(&format!("http://{addr}/v1"), "demo", "riddles", None, None).unwrap();
        (store, calls)
    }

    #[tokio::test]
    async fn list_follows_page_tokens_and_skips_undecodable_documents() {
        let (store, calls) = fake_firestore().await;
        let mut ids: Vec<String> = store.list().await.unwrap().into_iter().map(|r| r.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "3"]);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert!(!calls[0].contains("pageToken"));
        assert!(calls[1].contains("pageToken=p2"));
    }

    #[tokio::test]
    async fn missing_documents_are_not_found_on_get_and_update() {
        let (store, _) = fake_firestore().await;
        assert!(matches!(store.get("missing").await, Err(RiddleError::NotFound(id)) if id == "missing"));

        let patch = RiddlePatch { title: Some("T".into()), ..Default::default() };
        assert!(matches!(store.update("missing", patch).await, Err(RiddleError::NotFound(_))));
        assert!(matches!(
            store.update("missing", RiddlePatch::default()).await,
            Err(RiddleError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_succeeds_for_present_and_missing_documents() {
        let (store, calls) = fake_firestore().await;
        store.delete("1").await.unwrap();
        store.delete("missing").await.unwrap();
        assert!(calls.lock().unwrap().iter().all(|c| c.starts_with("DELETE ")));
    }

    #[tokio::test]
    async fn update_requires_existing_document_and_masks_patched_fields() {
        let (store, calls) = fake_firestore().await;
        let patch = RiddlePatch { answer: Some("x".into()), points: Some(5), ..Default::default() };
        store.update("1", patch).await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let call = &calls[0];
        assert!(call.starts_with("PATCH "));
        assert!(call.contains("currentDocument.exists=true"));
        assert!(call.contains("updateMask.fieldPaths=answer"));
        assert!(call.contains("updateMask.fieldPaths=points"));
        assert!(!call.contains("updateMask.fieldPaths=title"));
    }
}
