use serde::{Deserialize, Serialize};

/// `{"knowledge_base": {...}}` body for `PUT .../knowledge_bases/{name}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestEnvelope {
    pub knowledge_base: IngestRequest,
}

/// What to pull into a knowledge base
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum IngestRequest {
    /// Previously uploaded files, by name
    Files { files: Vec<String> },

    /// Web pages to crawl
    Webpages {
        urls: Vec<String>,
        crawl_depth: u32,
        filters: Vec<String>,
    },
}

impl IngestEnvelope {
    pub fn files(files: Vec<String>) -> Self {
        Self {
            knowledge_base: IngestRequest::Files { files },
        }
    }

    pub fn webpages(urls: Vec<String>, crawl_depth: u32, filters: Vec<String>) -> Self {
        Self {
            knowledge_base: IngestRequest::Webpages {
                urls,
                crawl_depth,
                filters,
            },
        }
    }
}
