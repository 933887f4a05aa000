use super::store::EditorsStore;
use super::*;
use crate::identity::IdentityResolver;

use std::collections::HashMap;
use std::thread::ThreadId;

/// Blame source answering from a fixed table; unknown paths fail.
struct FixedBlame {
    files: HashMap<String, Editors>,
    seen_threads: Mutex<Vec<ThreadId>>,
}

impl FixedBlame {
    fn new(files: &[(&str, &[(&str, usize)])]) -> Self {
        let files = files
            .iter()
            .map(|(path, pairs)| {
                let editors = pairs.iter().map(|(a, n)| (a.to_string(), *n)).collect();
                (path.to_string(), editors)
            })
            .collect();
        Self {
            files,
            seen_threads: Mutex::new(Vec::new()),
        }
    }

    /// `count` files whose authors depend only on the file index.
    fn generated(count: usize) -> Self {
        let mut files = HashMap::new();
        for i in 0..count {
            let mut editors = Editors::new();
            editors.insert(format!("user{}", i % 7), i + 1);
            editors.insert(format!("user{}", i % 3), 2 * i + 3);
            files.insert(format!("src/file{i}.rs"), editors);
        }
        Self {
            files,
            seen_threads: Mutex::new(Vec::new()),
        }
    }
}

impl BlameSource for FixedBlame {
    fn editors_by_file(&self, path: &str) -> Result<Editors, String> {
        self.seen_threads.lock().push(thread::current().id());
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| format!("{path}: not tracked"))
    }
}

struct TableMapper(HashMap<&'static str, &'static str>);

impl UserMapper for TableMapper {
    fn display_name(&self, user_id: &str) -> String {
        self.0
            .get(user_id)
            .map(|s| s.to_string())
            .unwrap_or_else(|| user_id.to_string())
    }
}

fn paths(list: &[&str]) -> Vec<String> {
    list.iter().map(|p| p.to_string()).collect()
}

fn editors(pairs: &[(&str, usize)]) -> Editors {
    pairs.iter().map(|(a, n)| (a.to_string(), *n)).collect()
}

fn contents(store: &EditorsStore) -> Vec<(String, store::FileEditors)> {
    store
        .all_files()
        .into_iter()
        .filter_map(|path| store.file_editors(&path).map(|entry| (path, entry)))
        .collect()
}

#[test]
fn default_concurrency_is_at_least_one() {
    assert!(default_concurrency() >= 1);
}

#[test]
fn map_editors_sums_colliding_names() {
    let mapper = TableMapper(HashMap::from([
        ("jd@work.io", "John Doe"),
        ("johnd", "John Doe"),
    ]));
    let mapped = map_editors(
        &mapper,
        editors(&[("jd@work.io", 10), ("johnd", 20), ("other", 5)]),
    );
    assert_eq!(mapped, editors(&[("John Doe", 30), ("other", 5)]));
}

#[test]
fn sequential_stores_raw_ids_without_mapper() {
    let blame = FixedBlame::new(&[
        ("root/a.txt", &[("alice", 10)]),
        ("root/dir/b.txt", &[("bob", 5), ("alice", 5)]),
    ]);
    let store = EditorsStore::new();
    let analyzer = Analyzer::new(&blame, &store, None);

    analyzer
        .analyze_files(&paths(&["root/a.txt", "root/dir/b.txt"]), 1)
        .unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.error_count(), 0);
    assert_eq!(analyzer.completed(), 2);

    assert_eq!(
        store.file_editors("root/dir/b.txt").unwrap().editors,
        Some(editors(&[("alice", 5), ("bob", 5)]))
    );
}

#[test]
fn blame_failure_is_stored_not_returned() {
    let blame = FixedBlame::new(&[("ok.rs", &[("alice", 1)])]);
    let store = EditorsStore::new();
    let analyzer = Analyzer::new(&blame, &store, None);

    analyzer
        .analyze_files(&paths(&["ok.rs", "gone.rs"]), 1)
        .unwrap();
    assert_eq!(store.error_count(), 1);

    let gone = store.file_editors("gone.rs").unwrap();
    assert!(gone.editors.is_none());
    assert_eq!(gone.error, "gone.rs: not tracked");
    assert!(store.file_editors("ok.rs").unwrap().error.is_empty());
}

#[test]
fn mapper_merges_aliases_of_same_person() {
    let blame = FixedBlame::new(&[("a.rs", &[("jd@work.io", 10), ("johnd", 20)])]);
    let mapper = TableMapper(HashMap::from([
        ("jd@work.io", "John Doe"),
        ("johnd", "John Doe"),
    ]));
    let store = EditorsStore::new();
    Analyzer::new(&blame, &store, Some(&mapper))
        .analyze_files(&paths(&["a.rs"]), 1)
        .unwrap();
    assert_eq!(
        store.file_editors("a.rs").unwrap().editors,
        Some(editors(&[("John Doe", 30)]))
    );
}

#[test]
fn resolver_records_unmapped_during_analysis() {
    let blame = FixedBlame::new(&[("a.rs", &[("alice", 3), ("bob", 1)])]);
    let mut resolver = IdentityResolver::new();
    resolver.load_alias_table("Alice A.,Core,alice\n").unwrap();
    let store = EditorsStore::new();

    Analyzer::new(&blame, &store, Some(&resolver))
        .analyze_files(&paths(&["a.rs"]), 1)
        .unwrap();

    assert_eq!(
        store.file_editors("a.rs").unwrap().editors,
        Some(editors(&[("Alice A.", 3), ("bob", 1)]))
    );
    assert_eq!(resolver.unmapped_users(), vec!["bob"]);
}

#[test]
fn empty_input_is_fine() {
    let blame = FixedBlame::new(&[]);
    let store = EditorsStore::new();
    let analyzer = Analyzer::new(&blame, &store, None);
    analyzer.analyze_files(&[], 4).unwrap();
    assert_eq!(analyzer.completed(), 0);
    assert!(store.is_empty());
}

#[test]
fn zero_concurrency_runs_sequentially() {
    let blame = FixedBlame::generated(5);
    let store = EditorsStore::new();
    let list: Vec<String> = (0..5).map(|i| format!("src/file{i}.rs")).collect();
    Analyzer::new(&blame, &store, None)
        .analyze_files(&list, 0)
        .unwrap();
    assert_eq!(store.len(), 5);
    let main = thread::current().id();
    assert!(blame.seen_threads.lock().iter().all(|id| *id == main));
}

#[test]
fn parallel_runs_off_the_calling_thread() {
    let blame = FixedBlame::generated(20);
    let store = EditorsStore::new();
    let list: Vec<String> = (0..20).map(|i| format!("src/file{i}.rs")).collect();
    Analyzer::new(&blame, &store, None)
        .analyze_files(&list, 3)
        .unwrap();
    let main = thread::current().id();
    let seen = blame.seen_threads.lock();
    assert_eq!(seen.len(), 20);
    assert!(seen.iter().all(|id| *id != main));
}

#[test]
fn parallel_result_matches_sequential() {
    let blame = FixedBlame::generated(100);
    let mut list: Vec<String> = (0..100).map(|i| format!("src/file{i}.rs")).collect();
    list.push("src/missing.rs".to_string());

    let sequential = EditorsStore::new();
    Analyzer::new(&blame, &sequential, None)
        .analyze_files(&list, 1)
        .unwrap();

    let parallel = EditorsStore::new();
    let analyzer = Analyzer::new(&blame, &parallel, None);
    analyzer.analyze_files(&list, 4).unwrap();

    assert_eq!(parallel.error_count(), 1);
    assert_eq!(analyzer.completed(), 101);
    assert_eq!(contents(&sequential), contents(&parallel));
}

#[test]
fn parallel_with_resolver_matches_sequential() {
    let blame = FixedBlame::generated(60);
    let list: Vec<String> = (0..60).map(|i| format!("src/file{i}.rs")).collect();
    let table = "Zero,Core,user0\nOne,Core,user1\nTwo,Web,user2\n";

    let mut seq_resolver = IdentityResolver::new();
    seq_resolver.load_alias_table(table).unwrap();
    let sequential = EditorsStore::new();
    Analyzer::new(&blame, &sequential, Some(&seq_resolver))
        .analyze_files(&list, 1)
        .unwrap();

    let mut par_resolver = IdentityResolver::new();
    par_resolver.load_alias_table(table).unwrap();
    let parallel = EditorsStore::new();
    Analyzer::new(&blame, &parallel, Some(&par_resolver))
        .analyze_files(&list, 8)
        .unwrap();

    assert_eq!(contents(&sequential), contents(&parallel));
    assert_eq!(seq_resolver.unmapped_users(), par_resolver.unmapped_users());
    assert_eq!(
        par_resolver.unmapped_users(),
        vec!["user3", "user4", "user5", "user6"]
    );
}

#[test]
fn more_workers_than_files() {
    let blame = FixedBlame::generated(2);
    let store = EditorsStore::new();
    let list: Vec<String> = (0..2).map(|i| format!("src/file{i}.rs")).collect();
    let analyzer = Analyzer::new(&blame, &store, None);
    analyzer.analyze_files(&list, 16).unwrap();
    assert_eq!(analyzer.completed(), 2);
    assert_eq!(store.len(), 2);
}

#[test]
fn completed_counts_across_calls() {
    let blame = FixedBlame::generated(6);
    let store = EditorsStore::new();
    let analyzer = Analyzer::new(&blame, &store, None);
    let list: Vec<String> = (0..6).map(|i| format!("src/file{i}.rs")).collect();
    analyzer.analyze_files(&list[..2], 1).unwrap();
    analyzer.analyze_files(&list[2..], 3).unwrap();
    assert_eq!(analyzer.completed(), 6);
}
