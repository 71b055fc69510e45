//! Pages of extracted PDF text.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RagdexError, Result};

/// One page of extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPage")]
pub struct Page {
    /// 1-based page number, 0 when the input carried none.
    pub page: u32,
    pub text: String,
}

impl Page {
    pub fn new(page: u32, text: impl Into<String>) -> Self {
        Self {
            page,
            text: text.into(),
        }
    }
}

/// Extractors disagree on key names; accept all of them.
#[derive(Deserialize)]
struct RawPage {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    page_number: Option<u32>,
    #[serde(default, rename = "pageIndex")]
    page_index: Option<u32>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl From<RawPage> for Page {
    fn from(raw: RawPage) -> Self {
        let page = [raw.page, raw.page_number, raw.page_index]
            .into_iter()
            .flatten()
            .find(|&n| n != 0)
            .unwrap_or(0);
        let text = raw
            .text
            .filter(|t| !t.is_empty())
            .or(raw.content)
            .unwrap_or_default();
        Page { page, text }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PagesDocument {
    List(Vec<Page>),
    Wrapped { pages: Vec<Page> },
}

/// Parse extracted pages: either a JSON list or `{"pages": [...]}`.
pub fn parse_pages(bytes: &[u8]) -> Result<Vec<Page>> {
    let document: PagesDocument = serde_json::from_slice(bytes).map_err(|err| {
        RagdexError::input(format!(
            "pages input must be a JSON list of pages or an object with a \"pages\" list: {err}"
        ))
    })?;
    Ok(match document {
        PagesDocument::List(pages) | PagesDocument::Wrapped { pages } => pages,
    })
}

pub fn load_pages(path: impl AsRef<Path>) -> Result<Vec<Page>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => {
            RagdexError::not_found(format!("{} does not exist", path.display()))
        }
        _ => RagdexError::Io(err),
    })?;
    parse_pages(&bytes)
}
