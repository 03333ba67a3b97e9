//! Content catalog: the project records that back portfolio collectibles
//!
//! The catalog is fetched once, off the frame loop. Until it resolves (or if
//! it fails) the game simply has an empty pool. The fetch hands its result to
//! the game through a one-shot slot whose sender only holds a weak link, so a
//! session that has already ended never sees a late result.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CatalogError;

/// One project entry, snapshotted when it is drawn from the pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub year: Option<String>,
}

impl ContentRecord {
    /// Minimal record, mostly for demos and tests
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            url: String::new(),
            image_url: None,
            logo_url: None,
            department: None,
            year: None,
        }
    }
}

// CMS exports are inconsistent about numeric vs string ids and years.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    use serde::de::Error;
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected string or number, got {other}"))),
    }
}

fn optional_string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    use serde::de::Error;
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(D::Error::custom(format!("expected string or number, got {other}"))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    List(Vec<ContentRecord>),
    Wrapped { projects: Vec<ContentRecord> },
}

/// Parse a catalog payload: either a bare array or `{ "projects": [...] }`
pub fn parse_catalog(json: &str) -> Result<Vec<ContentRecord>, CatalogError> {
    let records = match serde_json::from_str::<CatalogDocument>(json) {
        Ok(CatalogDocument::List(records)) | Ok(CatalogDocument::Wrapped { projects: records }) => records,
        Err(_) => {
            // Re-run as a plain list to surface a useful error message
            serde_json::from_str::<Vec<ContentRecord>>(json)?
        }
    };
    Ok(records)
}

pub type CatalogResult = Result<Vec<ContentRecord>, CatalogError>;

type Slot = RefCell<Option<CatalogResult>>;

/// Write end, held by the detached fetch
#[derive(Debug)]
pub struct CatalogSender {
    slot: Weak<Slot>,
}

/// Read end, owned by the game session
#[derive(Debug)]
pub struct CatalogReceiver {
    slot: Rc<Slot>,
}

/// One-shot catalog handoff. Dropping the receiver cancels delivery.
pub fn channel() -> (CatalogSender, CatalogReceiver) {
    let slot = Rc::new(RefCell::new(None));
    let sender = CatalogSender {
        slot: Rc::downgrade(&slot),
    };
    (sender, CatalogReceiver { slot })
}

impl CatalogSender {
    /// Deliver the result. Returns false if the session is gone.
    pub fn send(self, result: CatalogResult) -> bool {
        match self.slot.upgrade() {
            Some(slot) => {
                *slot.borrow_mut() = Some(result);
                true
            }
            None => false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.slot.strong_count() == 0
    }
}

impl CatalogReceiver {
    /// Take the result if it has arrived
    pub fn try_recv(&mut self) -> Option<CatalogResult> {
        self.slot.borrow_mut().take()
    }
}

/// Fetch and parse the catalog in the background (browser only)
#[cfg(target_arch = "wasm32")]
pub fn spawn_fetch(url: String, sender: CatalogSender) {
    wasm_bindgen_futures::spawn_local(async move {
        let result = match fetch_text(&url).await {
            Ok(body) => parse_catalog(&body),
            Err(e) => Err(e),
        };
        if !sender.send(result) {
            log::info!("Catalog from {url} arrived after the session ended; discarded");
        }
    });
}

#[cfg(target_arch = "wasm32")]
async fn fetch_text(url: &str) -> Result<String, CatalogError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    fn js_error(value: wasm_bindgen::JsValue) -> CatalogError {
        CatalogError::Network(format!("{value:?}"))
    }

    let window = web_sys::window().ok_or_else(|| CatalogError::Network("no window".to_string()))?;
    let opts = web_sys::RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(web_sys::RequestMode::Cors);
    let request = web_sys::Request::new_with_str_and_init(url, &opts).map_err(js_error)?;

    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?;
    let response: web_sys::Response = response.dyn_into().map_err(js_error)?;
    if !response.ok() {
        return Err(CatalogError::Network(format!("HTTP {}", response.status())));
    }

    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    text.as_string()
        .ok_or_else(|| CatalogError::Network("response body is not text".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_array_with_camel_case_fields() {
        let json = r#"[
            {"id": 7, "title": "Harbor", "imageUrl": "h.png", "logoUrl": "l.svg",
             "description": "Wayfinding", "url": "/harbor", "department": "Design", "year": 2021}
        ]"#;
        let records = parse_catalog(json).unwrap();
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.id, "7");
        assert_eq!(r.image_url.as_deref(), Some("h.png"));
        assert_eq!(r.logo_url.as_deref(), Some("l.svg"));
        assert_eq!(r.year.as_deref(), Some("2021"));
    }

    #[test]
    fn test_parse_wrapped_document_and_defaults() {
        let json = r#"{"projects": [{"id": "a", "title": "A"}, {"id": "b", "title": "B", "year": null}]}"#;
        let records = parse_catalog(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].description, "");
        assert_eq!(records[1].year, None);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_catalog("not json"), Err(CatalogError::Parse(_))));
        assert!(parse_catalog(r#"[{"title": "missing id"}]"#).is_err());
    }

    #[test]
    fn test_channel_delivers_once() {
        let (tx, mut rx) = channel();
        assert!(rx.try_recv().is_none());
        assert!(!tx.is_closed());
        assert!(tx.send(Ok(vec![ContentRecord::new("1", "One")])));
        let records = rx.try_recv().unwrap().unwrap();
        assert_eq!(records[0].title, "One");
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn test_dropped_receiver_discards_late_result() {
        let (tx, rx) = channel();
        drop(rx);
        assert!(tx.is_closed());
        assert!(!tx.send(Ok(Vec::new())));
    }
}
