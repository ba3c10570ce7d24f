//! Tests for MappingStore
//!
//! These tests verify:
//! - Shorten/expand basics and idempotence
//! - Uniqueness and collision probing
//! - Input validation
//! - Persistence round-trip through a fresh store
//! - Load resilience (missing, malformed, conflicting records)
//! - Save failures leaving memory intact
//! - Concurrent shorten from many threads

use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use std::thread;

use shortly::codegen::{base_code, CodeHasher, Crc32Hasher};
use shortly::config::{Config, SyncStrategy};
use shortly::storage::{FileStorage, MemoryStorage};
use shortly::{Mapping, MappingStore, ShortlyError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

/// Hash that sends every input to the same value
struct ConstantHasher(u32);

impl CodeHasher for ConstantHasher {
    fn hash(&self, _input: &[u8]) -> u32 {
        self.0
    }
}

fn setup_memory_store() -> (MemoryStorage, MappingStore) {
    let storage = MemoryStorage::new();
    let store = MappingStore::with_storage(Config::default(), storage.clone()).unwrap();
    (storage, store)
}

fn setup_colliding_store(max_probe_attempts: usize) -> (MemoryStorage, MappingStore) {
    let storage = MemoryStorage::new();
    let config = Config::builder()
        .max_probe_attempts(max_probe_attempts)
        .build();
    let store = MappingStore::with_parts(config, storage.clone(), ConstantHasher(0xbeef)).unwrap();
    (storage, store)
}

fn setup_file_config() -> (TempDir, Config) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .storage_path(temp_dir.path().join("url_mappings.txt"))
        .sync_strategy(SyncStrategy::EveryWrite)
        .build();
    (temp_dir, config)
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_shorten_uses_domain_and_crc32_hex() {
    let (_storage, store) = setup_memory_store();

    let short = store.shorten("123456789").unwrap();

    assert_eq!(short, "https://short.ly/cbf43926");
}

#[test]
fn test_shorten_then_expand() {
    let (_storage, store) = setup_memory_store();

    let short = store.shorten("https://example.com/some/long/path?q=1").unwrap();
    let long = store.expand(&short).unwrap();

    assert_eq!(long, "https://example.com/some/long/path?q=1");
}

#[test]
fn test_shorten_is_idempotent() {
    let (storage, store) = setup_memory_store();

    let first = store.shorten("https://example.com").unwrap();
    let second = store.shorten("https://example.com").unwrap();

    assert_eq!(first, second);
    assert_eq!(store.len(), 1);
    // Only the first call writes
    assert_eq!(storage.write_count(), 1);
}

#[test]
fn test_distinct_urls_get_distinct_codes() {
    let (_storage, store) = setup_memory_store();

    let mut seen = HashSet::new();
    for i in 0..500 {
        let short = store.shorten(&format!("https://example.com/page/{}", i)).unwrap();
        assert!(seen.insert(short), "duplicate short URL for page {}", i);
    }

    assert_eq!(store.len(), 500);
}

#[test]
fn test_expand_accepts_bare_code() {
    let (_storage, store) = setup_memory_store();

    let short = store.shorten("https://example.com").unwrap();
    let code = short.strip_prefix("https://short.ly/").unwrap();

    assert_eq!(store.expand(code).unwrap(), "https://example.com");
}

#[test]
fn test_expand_unknown_code_is_not_found() {
    let (_storage, store) = setup_memory_store();

    let err = store.expand("https://short.ly/doesnotexist").unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(err, ShortlyError::NotFound(ref s) if s == "https://short.ly/doesnotexist"));
}

#[test]
fn test_expand_removes_every_domain_occurrence() {
    let (_storage, store) = setup_memory_store();

    let short = store.shorten("https://example.com").unwrap();
    let doubled = format!("https://short.ly/{}", short);

    assert_eq!(store.expand(&doubled).unwrap(), "https://example.com");
}

#[test]
fn test_expand_unknown_remainder_is_not_found() {
    let (_storage, store) = setup_memory_store();

    let short = store.shorten("https://example.com").unwrap();
    let embedded = format!("x{}", short);

    assert!(store.expand(&embedded).unwrap_err().is_not_found());
}

#[test]
fn test_expand_empty_input_is_not_found() {
    let (_storage, store) = setup_memory_store();
    store.shorten("https://example.com").unwrap();

    assert!(store.expand("").unwrap_err().is_not_found());
    assert!(store.expand("https://short.ly/").unwrap_err().is_not_found());
}

#[test]
fn test_custom_domain() {
    let storage = MemoryStorage::new();
    let config = Config::builder().domain("http://go.test/").build();
    let store = MappingStore::with_storage(config, storage).unwrap();

    let short = store.shorten("https://example.com").unwrap();

    assert!(short.starts_with("http://go.test/"));
    assert_eq!(store.expand(&short).unwrap(), "https://example.com");
    assert_eq!(store.short_code_of(&short), &short["http://go.test/".len()..]);
}

#[test]
fn test_accessors_reflect_state() {
    let (_storage, store) = setup_memory_store();
    let short = store.shorten("https://example.com").unwrap();
    let code = store.short_code_of(&short).to_string();

    assert_eq!(store.domain(), shortly::DEFAULT_DOMAIN);
    assert_eq!(store.config().max_probe_attempts, 64);
    assert!(store.contains_code(&code));
    assert!(store.contains_url("https://example.com"));
    assert!(!store.is_dirty());
    assert_eq!(store.mappings(), vec![Mapping::new(code, "https://example.com")]);
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_shorten_rejects_empty_url() {
    let (storage, store) = setup_memory_store();

    let err = store.shorten("").unwrap_err();

    assert!(matches!(err, ShortlyError::InvalidUrl(_)));
    assert!(store.is_empty());
    assert_eq!(storage.write_count(), 0);
}

#[test]
fn test_shorten_rejects_spaces_and_line_breaks() {
    let (_storage, store) = setup_memory_store();

    for url in ["https://example.com/a b", "https://x\n", "https://x\ry", " https://x"] {
        let err = store.shorten(url).unwrap_err();
        assert!(matches!(err, ShortlyError::InvalidUrl(_)), "accepted {:?}", url);
    }
    assert!(store.is_empty());
}

#[test]
fn test_tab_and_unicode_space_urls_round_trip() {
    let (_temp, config) = setup_file_config();
    let urls = [
        "https://x.example/a\tb",
        "https://x.example/a\u{a0}b",
        "https://x.example/\u{3000}",
    ];

    let shorts: Vec<String> = {
        let store = MappingStore::open(config.clone()).unwrap();
        urls.iter()
            .map(|url| {
                let short = store.shorten(url).unwrap();
                assert_eq!(store.expand(&short).unwrap(), *url);
                short
            })
            .collect()
    };

    let reopened = MappingStore::open(config).unwrap();
    assert_eq!(reopened.load_report().records_loaded, 3);
    assert_eq!(reopened.load_report().records_skipped, 0);
    for (url, short) in urls.iter().zip(&shorts) {
        assert_eq!(reopened.expand(short).unwrap(), *url);
        assert_eq!(reopened.shorten(url).unwrap(), *short);
    }
}

#[test]
fn test_shorten_accepts_non_url_strings() {
    let (_storage, store) = setup_memory_store();

    let short = store.shorten("not-a-url-at-all").unwrap();

    assert_eq!(store.expand(&short).unwrap(), "not-a-url-at-all");
}

#[test]
fn test_invalid_config_rejected() {
    let empty_domain = Config::builder().domain("").build();
    assert!(matches!(
        MappingStore::with_storage(empty_domain, MemoryStorage::new()),
        Err(ShortlyError::Config(_))
    ));

    let zero_probe = Config::builder().max_probe_attempts(0).build();
    assert!(matches!(
        MappingStore::with_storage(zero_probe, MemoryStorage::new()),
        Err(ShortlyError::Config(_))
    ));
}

// =============================================================================
// Collision Tests
// =============================================================================

#[test]
fn test_colliding_urls_get_suffixed_codes() {
    let (_storage, store) = setup_colliding_store(64);

    let a = store.shorten("https://a.example").unwrap();
    let b = store.shorten("https://b.example").unwrap();
    let c = store.shorten("https://c.example").unwrap();

    assert_eq!(a, "https://short.ly/beef");
    assert_eq!(b, "https://short.ly/beef1");
    assert_eq!(c, "https://short.ly/beef11");

    assert_eq!(store.expand(&a).unwrap(), "https://a.example");
    assert_eq!(store.expand(&b).unwrap(), "https://b.example");
    assert_eq!(store.expand(&c).unwrap(), "https://c.example");
}

#[test]
fn test_colliding_url_repeat_is_still_idempotent() {
    let (_storage, store) = setup_colliding_store(64);

    store.shorten("https://a.example").unwrap();
    let b1 = store.shorten("https://b.example").unwrap();
    let b2 = store.shorten("https://b.example").unwrap();

    assert_eq!(b1, b2);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_collision_bound_exhausted() {
    let (storage, store) = setup_colliding_store(2);

    store.shorten("https://a.example").unwrap();
    store.shorten("https://b.example").unwrap();
    let err = store.shorten("https://c.example").unwrap_err();

    assert!(matches!(err, ShortlyError::CodeSpaceExhausted { attempts: 2 }));
    assert_eq!(store.len(), 2);
    assert!(!store.contains_url("https://c.example"));
    assert_eq!(storage.write_count(), 2);
}

#[test]
fn test_collision_with_loaded_record() {
    let url = "https://b.example";
    let taken = base_code(&Crc32Hasher, url);
    let storage = MemoryStorage::with_contents(format!("{} https://a.example\n", taken));
    let store = MappingStore::with_storage(Config::default(), storage).unwrap();

    let short = store.shorten(url).unwrap();

    assert_eq!(short, format!("https://short.ly/{}1", taken));
    assert_eq!(
        store.expand(&format!("https://short.ly/{}", taken)).unwrap(),
        "https://a.example"
    );
    assert_eq!(store.expand(&short).unwrap(), url);
}

// =============================================================================
// Persistence Tests
// =============================================================================

#[test]
fn test_missing_storage_yields_empty_store() {
    let (_temp, config) = setup_file_config();

    let store = MappingStore::open(config).unwrap();

    assert!(store.is_empty());
    assert!(!store.load_report().storage_found);
    assert_eq!(store.load_report().records_loaded, 0);
}

#[test]
fn test_persistence_round_trip() {
    let (_temp, config) = setup_file_config();

    let short = {
        let store = MappingStore::open(config.clone()).unwrap();
        store.shorten("https://example.com/persisted").unwrap()
    };

    let reopened = MappingStore::open(config).unwrap();

    assert!(reopened.load_report().storage_found);
    assert_eq!(reopened.load_report().records_loaded, 1);
    assert_eq!(reopened.expand(&short).unwrap(), "https://example.com/persisted");
    assert_eq!(reopened.shorten("https://example.com/persisted").unwrap(), short);
}

#[test]
fn test_open_path_convenience() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("links.txt");

    let short = MappingStore::open_path(&path)
        .unwrap()
        .shorten("https://example.com")
        .unwrap();

    let reopened = MappingStore::open_path(&path).unwrap();
    assert_eq!(reopened.expand(&short).unwrap(), "https://example.com");
}

#[test]
fn test_saved_file_format() {
    let (temp, config) = setup_file_config();
    let storage = FileStorage::new(&config.storage_path, config.sync_strategy);

    let store = MappingStore::with_parts(config, storage, ConstantHasher(0xabc)).unwrap();
    store.shorten("https://first.example").unwrap();
    store.shorten("https://second.example").unwrap();

    let contents = fs::read_to_string(temp.path().join("url_mappings.txt")).unwrap();
    assert_eq!(contents, "abc https://first.example\nabc1 https://second.example\n");
}

#[test]
fn test_save_rewrites_instead_of_appending() {
    let (_temp, config) = setup_file_config();
    let store = MappingStore::open(config.clone()).unwrap();

    for i in 0..5 {
        store.shorten(&format!("https://example.com/{}", i)).unwrap();
    }

    let contents = fs::read_to_string(&config.storage_path).unwrap();
    assert_eq!(contents.lines().count(), 5);
}

#[test]
fn test_saved_lines_sorted_by_code() {
    let (storage, store) = setup_memory_store();

    for i in 0..20 {
        store.shorten(&format!("https://example.com/{}", i)).unwrap();
    }

    let contents = storage.contents_string().unwrap();
    let codes: Vec<&str> = contents
        .lines()
        .map(|line| line.split(' ').next().unwrap())
        .collect();
    let mut sorted = codes.clone();
    sorted.sort();
    assert_eq!(codes, sorted);
}

#[test]
fn test_loaded_code_is_reused() {
    let storage = MemoryStorage::with_contents("zz https://example.com\n");
    let store = MappingStore::with_storage(Config::default(), storage.clone()).unwrap();

    assert_eq!(store.shorten("https://example.com").unwrap(), "https://short.ly/zz");
    assert_eq!(storage.write_count(), 0);
}

// =============================================================================
// Load Resilience Tests
// =============================================================================

#[test]
fn test_load_skips_malformed_records() {
    let contents = "a https://a\nbroken\nb https://b extra\n\nc https://c\r\n";
    let storage = MemoryStorage::with_contents(contents);

    let store = MappingStore::with_storage(Config::default(), storage).unwrap();

    let report = store.load_report();
    assert_eq!(report.records_loaded, 2);
    assert_eq!(report.records_skipped, 2);
    assert_eq!(report.records_conflicting, 0);
    assert_eq!(store.expand("a").unwrap(), "https://a");
    assert_eq!(store.expand("c").unwrap(), "https://c");
}

#[test]
fn test_load_skips_conflicting_records() {
    let contents = "a https://x\na https://y\nb https://x\nc https://z\na https://x\n";
    let storage = MemoryStorage::with_contents(contents);

    let store = MappingStore::with_storage(Config::default(), storage).unwrap();

    let report = store.load_report();
    assert_eq!(report.records_loaded, 2);
    assert_eq!(report.records_conflicting, 2);
    assert_eq!(store.expand("a").unwrap(), "https://x");
    assert!(store.expand("b").unwrap_err().is_not_found());
    assert_eq!(store.len(), 2);
}

#[test]
fn test_load_survives_invalid_utf8() {
    let mut contents = b"a https://a\n".to_vec();
    contents.extend_from_slice(&[0xc3, 0x28, b' ', b'u', b'\n']);
    let storage = MemoryStorage::with_contents(contents);

    let store = MappingStore::with_storage(Config::default(), storage).unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.load_report().records_skipped, 1);
}

#[test]
fn test_load_from_file_with_garbage() {
    let (_temp, config) = setup_file_config();
    fs::write(&config.storage_path, "ok https://ok\n\u{0}\u{0}\u{0}\nhalf").unwrap();

    let store = MappingStore::open(config).unwrap();

    assert_eq!(store.len(), 1);
    assert_eq!(store.load_report().records_skipped, 2);
}

// =============================================================================
// Save Failure Tests
// =============================================================================

#[test]
fn test_write_failure_keeps_memory_state() {
    let (storage, store) = setup_memory_store();
    storage.set_fail_writes(true);

    let err = store.shorten("https://example.com").unwrap_err();

    let short = match err {
        ShortlyError::Persistence {
            short_url: Some(short_url),
            ..
        } => short_url,
        other => panic!("expected persistence error, got {:?}", other),
    };
    assert!(store.is_dirty());
    assert_eq!(store.expand(&short).unwrap(), "https://example.com");
    assert_eq!(store.shorten("https://example.com").unwrap(), short);
    assert!(storage.contents().is_none());
}

#[test]
fn test_explicit_save_after_failure() {
    let (storage, store) = setup_memory_store();
    storage.set_fail_writes(true);
    let _ = store.shorten("https://example.com");

    assert!(matches!(
        store.save(),
        Err(ShortlyError::Persistence { short_url: None, .. })
    ));

    storage.set_fail_writes(false);
    store.save().unwrap();

    assert!(!store.is_dirty());
    assert!(storage.contents_string().unwrap().contains("https://example.com"));
}

#[test]
fn test_save_without_changes_is_noop() {
    let (storage, store) = setup_memory_store();

    store.save().unwrap();

    assert_eq!(storage.write_count(), 0);
}

#[test]
fn test_missing_directory_is_persistence_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("not_yet").join("url_mappings.txt");
    let store = MappingStore::open_path(&path).unwrap();

    let err = store.shorten("https://example.com").unwrap_err();
    let short = match err {
        ShortlyError::Persistence {
            short_url: Some(short_url),
            ..
        } => short_url,
        other => panic!("expected persistence error, got {:?}", other),
    };
    assert_eq!(store.expand(&short).unwrap(), "https://example.com");

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    store.save().unwrap();

    let reopened = MappingStore::open_path(&path).unwrap();
    assert_eq!(reopened.expand(&short).unwrap(), "https://example.com");
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_shorten_keeps_bijection() {
    let storage = MemoryStorage::new();
    let store = Arc::new(MappingStore::with_storage(Config::default(), storage.clone()).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                (0..50)
                    .map(|i| {
                        // Threads overlap on half of their URLs
                        let url = format!("https://example.com/{}", (t % 2) * 1000 + i);
                        (url.clone(), store.shorten(&url).unwrap())
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut assigned = std::collections::HashMap::new();
    for handle in handles {
        for (url, short) in handle.join().unwrap() {
            let previous = assigned.insert(url.clone(), short.clone());
            if let Some(previous) = previous {
                assert_eq!(previous, short, "same URL got two codes: {}", url);
            }
        }
    }

    let distinct_codes: HashSet<_> = assigned.values().collect();
    assert_eq!(assigned.len(), 100);
    assert_eq!(distinct_codes.len(), 100);
    assert_eq!(store.len(), 100);

    let contents = storage.contents_string().unwrap();
    assert_eq!(contents.lines().count(), 100);
}

#[test]
fn test_concurrent_expand() {
    let (_storage, store) = setup_memory_store();
    let store = Arc::new(store);
    let short = store.shorten("https://example.com").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let short = short.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    assert_eq!(store.expand(&short).unwrap(), "https://example.com");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
