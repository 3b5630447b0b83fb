use everyday_core::{
    Block, BlockKind, BlockRepository, DocumentBlockRepository, DocumentStore, StoreConfig,
    StoreError, SystemClock, WorkspaceError, WorkspaceHandle, WorkspaceOptions, WorkspaceService,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

fn in_memory_service() -> Result<WorkspaceService, WorkspaceError> {
    let store = DocumentStore::open_in_memory()?;
    WorkspaceService::open(store, Box::new(SystemClock), WorkspaceOptions::default())
}

#[test]
fn concurrent_ready_calls_open_once() {
    let opened = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&opened);
    let handle = Arc::new(WorkspaceHandle::with_opener(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        thread::sleep(std::time::Duration::from_millis(20));
        in_memory_service()
    }));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let handle = Arc::clone(&handle);
            thread::spawn(move || {
                handle.ready().unwrap().add_block(BlockKind::Text).unwrap();
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(opened.load(Ordering::SeqCst), 1);
    assert_eq!(handle.ready().unwrap().blocks().len(), 8);
}

#[test]
fn try_ready_is_none_until_initialized() {
    let handle = WorkspaceHandle::with_opener(in_memory_service);

    assert!(!handle.is_ready());
    assert!(handle.try_ready().is_none());

    drop(handle.ready().unwrap());
    assert!(handle.is_ready());
    assert!(handle.try_ready().is_some());
}

#[test]
fn warm_up_initializes_in_background() {
    let handle = Arc::new(WorkspaceHandle::with_opener(in_memory_service));

    handle.warm_up().join().unwrap();

    assert!(handle.is_ready());
    assert_eq!(handle.try_ready().unwrap().current_section(), "Notes");
}

#[test]
fn failed_open_is_retried_on_next_call() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let handle = WorkspaceHandle::with_opener(move || {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(WorkspaceError::from(StoreError::ReadOnly));
        }
        in_memory_service()
    });

    assert!(handle.ready().is_err());
    assert!(!handle.is_ready());

    assert!(handle.ready().is_ok());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn handle_opens_store_under_configured_data_dir() {
    let root = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(root.path().join("data"));
    {
        let store = DocumentStore::open(config.db_path()).unwrap();
        let mut block = Block::new(BlockKind::Text, "Notes", 0);
        block.content = "persisted".to_string();
        DocumentBlockRepository::new(&store)
            .insert_block(&block)
            .unwrap();
    }

    let handle = WorkspaceHandle::new(config.clone(), WorkspaceOptions::default());
    let engine = handle.ready().unwrap();

    assert_eq!(engine.blocks().len(), 1);
    assert_eq!(engine.blocks()[0].content, "persisted");
    assert_eq!(engine.store().path(), Some(config.db_path().as_path()));
}
