//! Persistence behaviour of the seen-store across process boundaries.

use job_alert::store::SeenStore;
use std::collections::HashSet;

fn set(links: &[&str]) -> HashSet<String> {
    links.iter().map(|s| s.to_string()).collect()
}

#[test]
fn save_of_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sent_jobs.json");
    let original = set(&[
        "https://www.naukri.com/job-listings-ai-engineer-1",
        "https://www.naukri.com/job-listings-data-scientist-2",
        "https://www.naukri.com/job-listings-ml-engineer-3?src=jobsearch",
    ]);
    SeenStore::new(&path).save(&original).unwrap();

    let store = SeenStore::new(&path);
    let loaded = store.load();
    store.save(&loaded).unwrap();

    assert_eq!(SeenStore::new(&path).load(), original);
}

#[test]
fn reads_store_written_by_older_deployments() {
    // Compact, unsorted arrays are still accepted
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sent_jobs.json");
    std::fs::write(&path, r#"["https://x/2","https://x/1"]"#).unwrap();

    assert_eq!(SeenStore::new(&path).load(), set(&["https://x/1", "https://x/2"]));
}

#[test]
fn corrupt_store_recovers_on_next_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sent_jobs.json");
    std::fs::write(&path, "[\"https://x/1\", ").unwrap();

    let store = SeenStore::new(&path);
    let mut seen = store.load();
    assert!(seen.is_empty());

    seen.insert("https://x/2".to_string());
    store.save(&seen).unwrap();
    assert_eq!(store.load(), set(&["https://x/2"]));
}
