// Deterministic fakes shared by unit tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::embeddings::Embedder;
use crate::llm::LanguageModel;
use crate::retrieval::KnowledgeBase;
use crate::{InspectorError, Result};

pub(crate) const HASHING_DIMENSION: usize = 64;

/// Bag-of-words embedder: each lowercase word bumps one hashed bucket
#[derive(Debug, Default)]
pub(crate) struct HashingEmbedder {
    pub batch_calls: AtomicUsize,
    pub delay: Option<Duration>,
}

impl HashingEmbedder {
    pub(crate) fn slow(delay: Duration) -> Self {
        Self {
            batch_calls: AtomicUsize::new(0),
            delay: Some(delay),
        }
    }

    pub(crate) fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0; HASHING_DIMENSION];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = word
                .to_lowercase()
                .bytes()
                .fold(17_usize, |acc, b| acc.wrapping_mul(31).wrapping_add(usize::from(b)));
            vector[bucket % HASHING_DIMENSION] += 1.0;
        }
        Ok(vector)
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        texts.iter().map(|text| self.embed(text)).collect()
    }

    fn model_name(&self) -> &str {
        "hashing-test"
    }
}

/// Returns fixed vectors for known texts and fails on anything else
#[derive(Debug, Default)]
pub(crate) struct TableEmbedder {
    vectors: HashMap<String, Vec<f32>>,
}

impl TableEmbedder {
    pub(crate) fn new<'a>(entries: impl IntoIterator<Item = (&'a str, Vec<f32>)>) -> Self {
        Self {
            vectors: entries
                .into_iter()
                .map(|(text, vector)| (text.to_string(), vector))
                .collect(),
        }
    }
}

impl Embedder for TableEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| InspectorError::Embedding(format!("no vector for {text:?}")))
    }

    fn model_name(&self) -> &str {
        "table-test"
    }
}

/// Returns a caller-supplied batch verbatim, ignoring the inputs
#[derive(Debug)]
pub(crate) struct FixedBatchEmbedder(pub Vec<Vec<f32>>);

impl Embedder for FixedBatchEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.0
            .first()
            .cloned()
            .ok_or_else(|| InspectorError::Embedding("empty fixture".to_string()))
    }

    fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self.0.clone())
    }

    fn model_name(&self) -> &str {
        "fixed-test"
    }
}

#[derive(Debug)]
pub(crate) struct StaticKnowledgeBase(pub String);

impl KnowledgeBase for StaticKnowledgeBase {
    fn load(&self) -> Result<String> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "static test knowledge base".to_string()
    }
}

/// Records every prompt and answers with a canned reply
#[derive(Debug)]
pub(crate) struct ScriptedModel {
    reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub(crate) fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

impl LanguageModel for ScriptedModel {
    fn generate(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        Ok(self.reply.clone())
    }
}
