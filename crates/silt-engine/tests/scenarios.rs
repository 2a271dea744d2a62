//! End-to-end lifecycle scenarios across the engine services.

use serde_json::json;
use silt_core::{ChunkStatus, TaskId, TaskStatus};
use silt_engine::{
    ChunkStore, CompactionAdvisor, EvictionEngine, IngestParams, ReferenceGraph, TaskRegistry,
};
use silt_store::Store;

struct Harness {
    registry: TaskRegistry,
    chunks: ChunkStore,
    graph: ReferenceGraph,
    eviction: EvictionEngine,
    advisor: CompactionAdvisor,
    _dir: Option<tempfile::TempDir>,
}

impl Harness {
    fn in_memory() -> Self {
        Self::with_store(Store::in_memory().unwrap(), None)
    }

    fn file_backed() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silt.db");
        let store = Store::open(path.to_str().unwrap()).unwrap();
        Self::with_store(store, Some(dir))
    }

    fn with_store(store: Store, dir: Option<tempfile::TempDir>) -> Self {
        Self {
            registry: TaskRegistry::new(store.clone()),
            chunks: ChunkStore::new(store.clone()),
            graph: ReferenceGraph::new(store.clone()),
            eviction: EvictionEngine::new(store.clone()),
            advisor: CompactionAdvisor::new(store),
            _dir: dir,
        }
    }

    fn ingest(&self, tool: &str, args: serde_json::Value, tokens: u32, tasks: &[&str]) -> silt_engine::Chunk {
        self.chunks
            .ingest(IngestParams {
                tool_name: tool.to_owned(),
                args,
                content: String::new(),
                size_tokens: Some(tokens),
                active_task_ids: tasks.iter().map(|t| TaskId::from(*t)).collect(),
                session_id: None,
            })
            .unwrap()
    }

    fn status_of(&self, chunk: &silt_engine::Chunk) -> ChunkStatus {
        self.chunks.get(&chunk.id).unwrap().unwrap().status
    }
}

#[test]
fn completed_task_releases_its_chunk_into_the_hint_bundle() {
    let h = Harness::file_backed();
    let t1 = TaskId::from("t1");
    let _ = h.registry.create_task(t1.clone(), "first task").unwrap();
    let _ = h.registry.update_status(&t1, TaskStatus::InProgress).unwrap();

    let c1 = h.ingest("Bash", json!({"cmd": "cargo tree"}), 500, &["t1"]);
    assert_eq!(h.status_of(&c1), ChunkStatus::Fresh);

    let _ = h.registry.update_status(&t1, TaskStatus::Completed).unwrap();
    assert_eq!(h.status_of(&c1), ChunkStatus::Evictable);

    let bundle = h.advisor.build_hint_bundle().unwrap();
    assert_eq!(bundle.safe_to_evict, vec![c1.id]);
    assert_eq!(bundle.total_evictable_tokens, 500);
    assert!(bundle.active_tasks_summary.is_empty());
}

#[test]
fn superseded_chunk_waits_for_its_owner_then_both_become_evictable() {
    let h = Harness::in_memory();
    let t2 = TaskId::from("t2");
    let _ = h.registry.create_task(t2.clone(), "second task").unwrap();
    let _ = h.registry.update_status(&t2, TaskStatus::InProgress).unwrap();

    let c2 = h.ingest("grep", json!({"q": "foo"}), 100, &["t2"]);
    let c3 = h.ingest("grep", json!({"q": "foo"}), 120, &["t2"]);

    // The newer chunk supersedes the older one.
    assert_eq!(h.graph.superseded_by(&c2.id).unwrap(), vec![c3.id.clone()]);
    assert!(h.graph.superseded_by(&c3.id).unwrap().is_empty());

    // While the owner is open, neither is evictable.
    assert_eq!(h.status_of(&c2), ChunkStatus::Fresh);
    assert_eq!(h.status_of(&c3), ChunkStatus::Fresh);

    let _ = h.registry.update_status(&t2, TaskStatus::Completed).unwrap();
    assert_eq!(h.status_of(&c2), ChunkStatus::Evictable);
    assert_eq!(h.status_of(&c3), ChunkStatus::Evictable);
}

#[test]
fn open_second_owner_keeps_a_superseded_chunk_alive() {
    let h = Harness::in_memory();
    let _ = h.registry.create_task(TaskId::from("t1"), "done soon").unwrap();
    let _ = h.registry.create_task(TaskId::from("t2"), "stays open").unwrap();

    // Chunk owned by both tasks, then superseded.
    let a = h.ingest("grep", json!({"q": "x"}), 50, &["t1", "t2"]);
    let _b = h.ingest("grep", json!({"q": "x"}), 60, &["t1"]);

    let _ = h.registry.update_status(&TaskId::from("t1"), TaskStatus::Completed).unwrap();

    // t2 still owns A, so the owner gate holds even though A is
    // superseded.
    assert_eq!(h.status_of(&a), ChunkStatus::Fresh);

    let _ = h.registry.update_status(&TaskId::from("t2"), TaskStatus::Completed).unwrap();
    assert_eq!(h.status_of(&a), ChunkStatus::Evictable);
}

#[test]
fn untracked_chunks_stay_pinned_until_superseded() {
    let h = Harness::in_memory();
    let old = h.ingest("Read", json!({"file_path": "/etc/hosts"}), 30, &[]);

    // No sequence of task events can release it.
    let t = TaskId::from("t1");
    let _ = h.registry.create_task(t.clone(), "unrelated").unwrap();
    let _ = h.registry.update_status(&t, TaskStatus::Completed).unwrap();
    assert_eq!(h.status_of(&old), ChunkStatus::Fresh);

    let _new = h.ingest("Read", json!({"file_path": "/etc/hosts"}), 32, &[]);
    assert_eq!(h.status_of(&old), ChunkStatus::Evictable);
}

#[test]
fn evictability_is_monotonic_under_later_events() {
    let h = Harness::in_memory();
    let t1 = TaskId::from("t1");
    let _ = h.registry.create_task(t1.clone(), "work").unwrap();
    let c = h.ingest("Bash", json!({"cmd": "ls"}), 10, &["t1"]);
    let _ = h.registry.update_status(&t1, TaskStatus::Completed).unwrap();
    assert_eq!(h.status_of(&c), ChunkStatus::Evictable);

    // New tasks, new chunks, duplicate updates: nothing reverts it.
    let t2 = TaskId::from("t2");
    let _ = h.registry.create_task(t2.clone(), "later work").unwrap();
    let _ = h.ingest("Bash", json!({"cmd": "ls -l"}), 10, &["t2"]);
    let _ = h.registry.update_status(&t1, TaskStatus::Completed).unwrap();
    assert!(!h.eviction.recompute_chunk(&c.id).unwrap());
    assert_eq!(h.status_of(&c), ChunkStatus::Evictable);
}

#[test]
fn full_compaction_cycle_sweeps_and_reports() {
    let h = Harness::file_backed();
    let t1 = TaskId::from("t1");
    let _ = h.registry.create_task(t1.clone(), "research").unwrap();
    let kept = h.ingest("Bash", json!({"cmd": "make"}), 200, &["t1"]);
    let dropped = h.ingest("Read", json!({"file_path": "/a"}), 900, &["t1"]);

    // The summarizer pins one chunk before the task finishes.
    let _ = h.chunks.mark_integrated(&kept.id).unwrap();
    let _ = h.registry.update_status(&t1, TaskStatus::Completed).unwrap();

    let bundle = h.advisor.build_hint_bundle().unwrap();
    assert_eq!(bundle.safe_to_evict, vec![dropped.id.clone()]);
    h.advisor.record(&bundle).unwrap();

    let report = h.eviction.sweep().unwrap();
    assert_eq!(report.reclaimed_tokens, 900);
    assert_eq!(h.status_of(&dropped), ChunkStatus::Evicted);
    assert_eq!(h.status_of(&kept), ChunkStatus::Integrated);

    let summary = h.advisor.build_reinjection_summary().unwrap();
    assert!(summary.contains("No tasks are currently open."));
    assert!(summary.contains("research"));
    assert!(summary.contains("~900 tokens as reclaimable"));
}
