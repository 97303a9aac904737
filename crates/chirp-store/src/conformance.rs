//! Behaviour every [`RecordStore`] backend must share.
//!
//! Each check takes a fresh store; the `backend_suite!` macro instantiates
//! the whole list once per backend.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use chirp_types::{Post, User, UserId};

use crate::error::{ErrorKind, StoreError};
use crate::traits::RecordStore;

fn round_trip(store: Arc<dyn RecordStore>) {
    let alice = store.create_user("alice").unwrap();
    assert_eq!(alice.id, UserId::new(1));
    assert_eq!(
        store.retrieve_user(UserId::new(1)).unwrap(),
        User::new(UserId::new(1), "alice")
    );
    assert_eq!(
        store.create_user("alice").unwrap_err().kind(),
        ErrorKind::UsernameTaken
    );
    assert_eq!(store.create_user("bob").unwrap().id, UserId::new(2));
}

fn monotonic_ids_across_deletes(store: Arc<dyn RecordStore>) {
    let mut seen = Vec::new();
    for round in 0..5 {
        let user = store.create_user(&format!("user-{round}")).unwrap();
        seen.push(user.id);
        if round % 2 == 0 {
            store.delete_user(user.id).unwrap();
        }
    }
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
    let live: Vec<_> = store.list_users().unwrap().into_iter().map(|u| u.id).collect();
    assert_eq!(live, vec![UserId::new(2), UserId::new(4)]);
}

fn delete_then_retrieve(store: Arc<dyn RecordStore>) {
    let user = store.create_user("short-lived").unwrap();
    assert_eq!(store.delete_user(user.id).unwrap(), user);
    assert!(matches!(
        store.retrieve_user(user.id),
        Err(StoreError::UserNotFound(id)) if id == user.id
    ));
    assert_eq!(store.user_count().unwrap(), 0);
}

fn posts_outlive_their_author(store: Arc<dyn RecordStore>) {
    let alice = store.create_user("alice").unwrap();
    store.create_post("alice", "still here").unwrap();
    store.delete_user(alice.id).unwrap();
    assert_eq!(
        store.list_posts_by_author("alice").unwrap(),
        vec![Post::new("alice", "still here")]
    );
}

fn filtering(store: Arc<dyn RecordStore>) {
    store.create_post("alice", "hi").unwrap();
    store.create_post("bob", "yo").unwrap();
    store.create_post("alice", "bye").unwrap();

    assert_eq!(
        store.list_posts_by_author("alice").unwrap(),
        vec![Post::new("alice", "hi"), Post::new("alice", "bye")]
    );
    assert!(store.list_posts_by_author("carol").unwrap().is_empty());
    assert!(store.list_posts_by_author("ALICE").unwrap().is_empty());
    assert!(store.list_posts_by_author("").unwrap().is_empty());
    assert_eq!(store.post_count().unwrap(), 3);
}

fn blank_usernames_rejected(store: Arc<dyn RecordStore>) {
    for name in ["", " ", "\t\n"] {
        assert_eq!(
            store.create_user(name).unwrap_err().kind(),
            ErrorKind::InvalidInput
        );
    }
    assert_eq!(store.user_count().unwrap(), 0);
    assert_eq!(store.create_user("first").unwrap().id, UserId::FIRST);
}

fn username_lookup(store: Arc<dyn RecordStore>) {
    let bob = store.create_user("bob").unwrap();
    assert_eq!(store.get_user_by_username("bob").unwrap(), bob);
    assert_eq!(
        store.get_user_by_username("Bob").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

fn concurrent_same_username(store: Arc<dyn RecordStore>) {
    const N: usize = 16;
    let barrier = Arc::new(Barrier::new(N));
    let handles: Vec<_> = (0..N)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.create_user("contended")
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread should not panic"))
        .collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    for r in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(r.kind(), ErrorKind::UsernameTaken);
    }
    assert_eq!(store.user_count().unwrap(), 1);
}

fn concurrent_delete_same_id(store: Arc<dyn RecordStore>) {
    const N: usize = 8;
    let victim = store.create_user("victim").unwrap();
    let barrier = Arc::new(Barrier::new(N));
    let handles: Vec<_> = (0..N)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let id = victim.id;
            thread::spawn(move || {
                barrier.wait();
                store.delete_user(id)
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("thread should not panic"))
        .collect();
    let removed: Vec<&User> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(removed, vec![&victim]);
    for r in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(r.kind(), ErrorKind::NotFound);
    }
    assert_eq!(store.user_count().unwrap(), 0);
}

fn concurrent_distinct_usernames(store: Arc<dyn RecordStore>) {
    const N: u64 = 32;
    let barrier = Arc::new(Barrier::new(N as usize));
    let handles: Vec<_> = (0..N)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.create_user(&format!("user-{i}")).unwrap()
            })
        })
        .collect();

    let ids: HashSet<u64> = handles
        .into_iter()
        .map(|h| h.join().expect("thread should not panic").id.get())
        .collect();
    assert_eq!(ids, (1..=N).collect::<HashSet<_>>());
    assert_eq!(store.list_users().unwrap().len(), N as usize);
}

macro_rules! backend_suite {
    ($module:ident, $make:expr) => {
        mod $module {
            use super::*;

            fn store() -> Arc<dyn RecordStore> {
                Arc::new($make)
            }

            #[test]
            fn round_trip() {
                super::round_trip(store());
            }

            #[test]
            fn monotonic_ids_across_deletes() {
                super::monotonic_ids_across_deletes(store());
            }

            #[test]
            fn delete_then_retrieve() {
                super::delete_then_retrieve(store());
            }

            #[test]
            fn posts_outlive_their_author() {
                super::posts_outlive_their_author(store());
            }

            #[test]
            fn filtering() {
                super::filtering(store());
            }

            #[test]
            fn blank_usernames_rejected() {
                super::blank_usernames_rejected(store());
            }

            #[test]
            fn username_lookup() {
                super::username_lookup(store());
            }

            #[test]
            fn concurrent_same_username() {
                super::concurrent_same_username(store());
            }

            #[test]
            fn concurrent_delete_same_id() {
                super::concurrent_delete_same_id(store());
            }

            #[test]
            fn concurrent_distinct_usernames() {
                super::concurrent_distinct_usernames(store());
            }
        }
    };
}

backend_suite!(memory, crate::memory::InMemoryRecordStore::new());

#[cfg(feature = "sqlite")]
backend_suite!(
    sqlite,
    crate::sqlite::SqliteRecordStore::open_in_memory().unwrap()
);
