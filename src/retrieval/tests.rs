use super::*;
use crate::test_support::{HashingEmbedder, StaticKnowledgeBase};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

const KNOWLEDGE_BASE: &str = "\
Retrieval-augmented generation combines a search step over local documents with a language model call so answers stay grounded.

The agent embeds knowledge-base chunks with an embedding model and ranks them by cosine similarity against the question.

The repository inspector can list files in the working tree and read a single file when the user asks for it by name.

Self evaluation runs a fixed question set and reports keyword coverage for every answer.";

/// Knowledge base whose text can be swapped or made unavailable mid-test
struct SwitchableKnowledgeBase {
    text: Arc<Mutex<Option<String>>>,
}

impl KnowledgeBase for SwitchableKnowledgeBase {
    fn load(&self) -> Result<String> {
        self.text
            .lock()
            .expect("lock")
            .clone()
            .ok_or_else(|| InspectorError::SourceUnavailable {
                path: PathBuf::from("switchable"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            })
    }

    fn describe(&self) -> String {
        "switchable".to_string()
    }
}

fn retriever_with(embedder: &Arc<HashingEmbedder>, text: &str) -> Retriever {
    Retriever::new(
        StaticKnowledgeBase(text.to_string()),
        Arc::clone(embedder) as Arc<dyn Embedder>,
        100,
    )
}

#[test]
fn first_query_builds_lazily_and_only_once() {
    let embedder = Arc::new(HashingEmbedder::default());
    let retriever = retriever_with(&embedder, KNOWLEDGE_BASE);

    assert!(!retriever.is_built());
    assert_eq!(embedder.batch_calls(), 0);

    let first = retriever
        .retrieve("How are chunks ranked?", 2)
        .expect("retrieve succeeds");
    assert!(retriever.is_built());
    assert_eq!(first.len(), 2);

    retriever
        .retrieve("What does self evaluation report?", 2)
        .expect("retrieve succeeds");
    assert_eq!(embedder.batch_calls(), 1);
}

#[test]
fn retrieve_returns_most_relevant_first() {
    let embedder = Arc::new(HashingEmbedder::default());
    let retriever = retriever_with(&embedder, KNOWLEDGE_BASE);

    let results = retriever
        .search(
            "The repository inspector can list files in the working tree and read a single file when the user asks for it by name.",
            4,
        )
        .expect("search succeeds");

    assert_eq!(results.len(), 4);
    assert!(results[0].content.contains("list files"));
    for pair in results.windows(2) {
        assert!(pair[0].similarity_score >= pair[1].similarity_score);
    }
}

#[test]
fn explicit_build_exposes_shape() {
    let embedder = Arc::new(HashingEmbedder::default());
    let retriever = retriever_with(&embedder, KNOWLEDGE_BASE);

    let index = retriever.build().expect("build succeeds");

    assert_eq!(index.chunks().len(), 4);
    assert_eq!(index.embeddings().len(), index.chunks().len());
    assert!(
        index
            .embeddings()
            .iter()
            .all(|row| row.len() == index.dimension())
    );
    assert!(Arc::ptr_eq(
        &index,
        &retriever.index().expect("index available")
    ));
}

#[test]
fn build_replaces_existing_index() {
    let embedder = Arc::new(HashingEmbedder::default());
    let retriever = retriever_with(&embedder, KNOWLEDGE_BASE);

    let first = retriever.index().expect("index builds");
    let second = retriever.build().expect("rebuild succeeds");

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(embedder.batch_calls(), 2);
}

#[test]
fn failed_rebuild_keeps_previous_index() {
    let text = Arc::new(Mutex::new(Some(KNOWLEDGE_BASE.to_string())));
    let retriever = Retriever::new(
        SwitchableKnowledgeBase {
            text: Arc::clone(&text),
        },
        Arc::new(HashingEmbedder::default()),
        100,
    );

    let original = retriever.build().expect("first build succeeds");
    *text.lock().expect("lock") = None;

    let result = retriever.build();
    assert!(matches!(
        result,
        Err(InspectorError::SourceUnavailable { .. })
    ));

    let current = retriever.index().expect("previous index still installed");
    assert!(Arc::ptr_eq(&original, &current));
}

#[test]
fn failed_lazy_build_is_retried_on_next_call() {
    let text = Arc::new(Mutex::new(None));
    let retriever = Retriever::new(
        SwitchableKnowledgeBase {
            text: Arc::clone(&text),
        },
        Arc::new(HashingEmbedder::default()),
        100,
    );

    assert!(retriever.retrieve("anything", 1).is_err());
    assert!(!retriever.is_built());

    *text.lock().expect("lock") = Some(KNOWLEDGE_BASE.to_string());
    assert_eq!(
        retriever
            .retrieve("anything", 1)
            .expect("retrieve succeeds")
            .len(),
        1
    );
}

#[test]
fn invalidate_forces_rebuild() {
    let embedder = Arc::new(HashingEmbedder::default());
    let retriever = retriever_with(&embedder, KNOWLEDGE_BASE);

    retriever.index().expect("index builds");
    retriever.invalidate();
    assert!(!retriever.is_built());

    retriever.index().expect("index rebuilds");
    assert_eq!(embedder.batch_calls(), 2);
}

#[test]
fn empty_knowledge_base_builds_but_cannot_be_queried() {
    let embedder = Arc::new(HashingEmbedder::default());
    let retriever = retriever_with(&embedder, "");

    let index = retriever.build().expect("empty build succeeds");
    assert!(index.chunks().is_empty());
    assert!(index.embeddings().is_empty());

    let result = retriever.retrieve("What is RAG?", 5);
    assert!(matches!(result, Err(InspectorError::EmptyIndex)));
}

#[test]
fn top_k_larger_than_index_returns_everything() {
    let embedder = Arc::new(HashingEmbedder::default());
    let text = "First paragraph about alpha.\n\nSecond paragraph about beta.\n\nThird about gamma.";
    let retriever = Retriever::new(
        StaticKnowledgeBase(text.to_string()),
        Arc::clone(&embedder) as Arc<dyn Embedder>,
        1,
    );

    let results = retriever.search("beta", 100).expect("search succeeds");
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].content, "Second paragraph about beta.");

    let mut indices: Vec<usize> = results.iter().map(|r| r.chunk_index).collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn missing_knowledge_base_file_is_source_unavailable() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("missing.md");
    let retriever = Retriever::new(
        FileKnowledgeBase::new(&path),
        Arc::new(HashingEmbedder::default()),
        100,
    );

    match retriever.retrieve("What is RAG?", 3) {
        Err(InspectorError::SourceUnavailable { path: reported, .. }) => {
            assert_eq!(reported, path);
        }
        other => panic!("expected SourceUnavailable, got {other:?}"),
    }
}

#[test]
fn file_knowledge_base_reads_text() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("knowledge_base.md");
    std::fs::write(&path, KNOWLEDGE_BASE).expect("write knowledge base");

    let source = FileKnowledgeBase::new(&path);
    assert_eq!(source.load().expect("loads"), KNOWLEDGE_BASE);
    assert_eq!(source.path(), path.as_path());
}

#[test]
fn concurrent_first_queries_share_one_build() {
    let embedder = Arc::new(HashingEmbedder::slow(Duration::from_millis(50)));
    let retriever = retriever_with(&embedder, KNOWLEDGE_BASE);

    let indices: Vec<Arc<VectorIndex>> = std::thread::scope(|scope| {
        let handles: Vec<_> =
            std::iter::repeat_with(|| scope.spawn(|| retriever.index().expect("index builds")))
                .take(8)
                .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect()
    });

    assert_eq!(embedder.batch_calls(), 1);
    for index in &indices[1..] {
        assert!(Arc::ptr_eq(&indices[0], index));
    }
}

#[test]
fn from_config_uses_configured_paths() {
    let mut config = Config::default();
    config.retrieval.knowledge_base = PathBuf::from("does/not/exist.md");

    let retriever = Retriever::from_config(&config).expect("retriever constructs");
    assert!(!retriever.is_built());

    // The missing file is reported before any embedding request is made.
    assert!(matches!(
        retriever.build(),
        Err(InspectorError::SourceUnavailable { .. })
    ));
}
