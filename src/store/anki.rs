//! AnkiConnect note-store client.
//!
//! Speaks the AnkiConnect JSON envelope over HTTP: requests are
//! `{"action", "version": 6, "params"}`, responses `{"result", "error"}`.
//! A non-null `error`, a non-success status, or a malformed body is a
//! store failure.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::core::error::TagError;

/// Opaque note identifier (AnkiConnect uses 64-bit integers).
pub type NoteId = i64;

/// One remote note resolved to the field text used for scoring.
///
/// Fetched per batch, dropped after scoring.
#[derive(Debug, Clone)]
pub struct NoteRecord {
    pub id: NoteId,
    pub text: String,
}

/// Remote note-store seam used by the pipeline.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Ids of every note matching the store's query syntax.
    async fn find_ids(&self, query: &str) -> Result<Vec<NoteId>>;

    /// Bulk-resolve ids to records.
    ///
    /// Ids unknown to the store, and notes without the configured field,
    /// are silently omitted.
    async fn fetch_records(&self, ids: &[NoteId]) -> Result<Vec<NoteRecord>>;

    /// Apply `tag` to every id in a single call.
    async fn add_tag(&self, ids: &[NoteId], tag: &str) -> Result<()>;
}

pub const ANKI_CONNECT_VERSION: u8 = 6;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct AnkiRequest {
    action: &'static str,
    version: u8,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct AnkiResponse<T> {
    result: Option<T>,
    error: Option<String>,
}

/// Note payload returned by `notesInfo`.
#[derive(Debug, Deserialize)]
struct NoteInfo {
    #[serde(rename = "noteId")]
    note_id: NoteId,
    fields: HashMap<String, NoteField>,
}

#[derive(Debug, Deserialize)]
struct NoteField {
    value: String,
}

/// HTTP client for a local AnkiConnect endpoint.
pub struct AnkiConnectStore {
    client: Client,
    endpoint: String,
    note_field: String,
}

impl AnkiConnectStore {
    pub fn new(endpoint: &str, note_field: &str) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            note_field: note_field.to_string(),
        })
    }

    /// One round trip through the AnkiConnect envelope.
    ///
    /// Returns `None` when the store answers with a null result (the
    /// convention for actions without a payload, such as `addTags`).
    async fn invoke<T: DeserializeOwned>(
        &self,
        action: &'static str,
        params: serde_json::Value,
    ) -> Result<Option<T>> {
        let request = AnkiRequest {
            action,
            version: ANKI_CONNECT_VERSION,
            params,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| TagError::Remote(format!("{action}: {e}")))?;

        if !response.status().is_success() {
            return Err(TagError::Remote(format!("{action}: HTTP {}", response.status())).into());
        }

        let body: AnkiResponse<T> = response
            .json()
            .await
            .map_err(|e| TagError::Remote(format!("{action}: malformed response: {e}")))?;

        if let Some(message) = body.error {
            return Err(TagError::Remote(format!("{action}: {message}")).into());
        }

        Ok(body.result)
    }
}

#[async_trait]
impl NoteStore for AnkiConnectStore {
    async fn find_ids(&self, query: &str) -> Result<Vec<NoteId>> {
        let result = self.invoke("findNotes", json!({ "query": query })).await?;
        Ok(result.unwrap_or_default())
    }

    async fn fetch_records(&self, ids: &[NoteId]) -> Result<Vec<NoteRecord>> {
        let result: Option<Vec<NoteInfo>> =
            self.invoke("notesInfo", json!({ "notes": ids })).await?;

        Ok(result
            .unwrap_or_default()
            .into_iter()
            .filter_map(|mut note| {
                note.fields.remove(&self.note_field).map(|field| NoteRecord {
                    id: note.note_id,
                    text: field.value,
                })
            })
            .collect())
    }

    async fn add_tag(&self, ids: &[NoteId], tag: &str) -> Result<()> {
        let _: Option<serde_json::Value> = self
            .invoke("addTags", json!({ "notes": ids, "tags": tag }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use anyhow::{bail, Result};
    use async_trait::async_trait;

    use super::{NoteId, NoteRecord, NoteStore};

    /// In-memory store for tests.
    ///
    /// Any batch whose first id appears in `fail_on` errors out, mimicking
    /// a transport failure for that fetch.
    pub struct StubStore {
        ids: Vec<NoteId>,
        notes: HashMap<NoteId, String>,
        fail_on: Vec<NoteId>,
        fail_tagging: bool,
        pub tag_calls: Mutex<Vec<(Vec<NoteId>, String)>>,
    }

    impl StubStore {
        pub fn new(notes: &[(NoteId, &str)]) -> Self {
            Self {
                ids: notes.iter().map(|(id, _)| *id).collect(),
                notes: notes
                    .iter()
                    .map(|(id, text)| (*id, text.to_string()))
                    .collect(),
                fail_on: Vec::new(),
                fail_tagging: false,
                tag_calls: Mutex::new(Vec::new()),
            }
        }

        pub fn failing_batch_at(mut self, id: NoteId) -> Self {
            self.fail_on.push(id);
            self
        }

        pub fn failing_tagging(mut self) -> Self {
            self.fail_tagging = true;
            self
        }
    }

    #[async_trait]
    impl NoteStore for StubStore {
        async fn find_ids(&self, _query: &str) -> Result<Vec<NoteId>> {
            Ok(self.ids.clone())
        }

        async fn fetch_records(&self, ids: &[NoteId]) -> Result<Vec<NoteRecord>> {
            if ids.first().is_some_and(|id| self.fail_on.contains(id)) {
                bail!("stub transport failure");
            }
            Ok(ids
                .iter()
                .filter_map(|id| {
                    self.notes.get(id).map(|text| NoteRecord {
                        id: *id,
                        text: text.clone(),
                    })
                })
                .collect())
        }

        async fn add_tag(&self, ids: &[NoteId], tag: &str) -> Result<()> {
            if self.fail_tagging {
                bail!("stub tagging failure");
            }
            self.tag_calls
                .lock()
                .unwrap()
                .push((ids.to_vec(), tag.to_string()));
            Ok(())
        }
    }
}
