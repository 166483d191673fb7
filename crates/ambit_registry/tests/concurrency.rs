//! Concurrent access tests for `ambit_registry`.
//!
//! These tests verify that registries and the contexts carrying them can be
//! shared across threads and async tasks.

use std::sync::{Arc, Barrier};
use std::thread;

use ambit_registry::prelude::*;
use ambit_registry::Context;

#[derive(Debug, Clone, Default, PartialEq)]
struct Config {
    name: String,
}

#[derive(Debug, Default)]
struct Hits {
    count: u64,
}

/// Test concurrent reads from multiple threads.
#[test]
fn concurrent_reads_from_multiple_threads() {
    let ctx = context_with(
        &Context::background(),
        Config {
            name: "shared".into(),
        },
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ctx = ctx.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    assert_eq!(from_context::<Config>(&ctx).name, "shared");
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }
}

/// Test that registrations from several threads all land.
#[test]
fn concurrent_registration_of_distinct_types() {
    let ctx = context_with_default_registry(&Context::background());
    let barrier = Arc::new(Barrier::new(3));

    let spawn = |register: fn(&Context)| {
        let ctx = ctx.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            register(&ctx);
        })
    };

    let handles = [
        spawn(|ctx| must_register(ctx, 1_u8)),
        spawn(|ctx| must_register(ctx, 2_u16)),
        spawn(|ctx| must_register(ctx, 3_u32)),
    ];

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(from_context::<u8>(&ctx), 1);
    assert_eq!(from_context::<u16>(&ctx), 2);
    assert_eq!(from_context::<u32>(&ctx), 3);
}

/// Test that readers racing a writer see either value, never garbage.
#[test]
fn reads_racing_replacement_see_old_or_new() {
    let ctx = context_with(&Context::background(), Config { name: "old".into() });

    let writer = {
        let ctx = ctx.clone();
        thread::spawn(move || {
            for _ in 0..100 {
                must_register(&ctx, Config { name: "new".into() });
            }
        })
    };

    for _ in 0..100 {
        let name = from_context::<Config>(&ctx).name;
        assert!(name == "old" || name == "new", "unexpected {name}");
    }

    writer.join().expect("Thread panicked");
    assert_eq!(from_context::<Config>(&ctx).name, "new");
}

/// Test that handle mutations from many threads accumulate.
#[test]
fn shared_handle_accumulates_across_threads() {
    let ctx = context_with_ptr(&Context::background(), Shared::new(Hits::default()));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ctx = ctx.clone();
            thread::spawn(move || {
                let hits = ptr_from_context::<Hits>(&ctx).expect("hits registered");
                for _ in 0..50 {
                    hits.write().count += 1;
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(ptr_from_context::<Hits>(&ctx).unwrap().read().count, 400);
}

/// Test that a context carried into async tasks resolves the same services.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn services_follow_context_into_tasks() {
    let ctx = Context::background()
        .with_service(Config {
            name: "async".into(),
        })
        .with_shared(Shared::new(Hits::default()));

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                ctx.shared::<Hits>().unwrap().write().count += 1;
                ctx.service::<Config>().name
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.expect("task panicked"), "async");
    }

    assert_eq!(ctx.shared::<Hits>().unwrap().read().count, 4);
}

/// Test that registry events are emitted through `tracing`.
#[test]
fn registration_emits_tracing_events() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("ambit_registry=trace"))
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let ctx = context_with(&Context::background(), Config::default());
        must_register(&ctx, Config { name: "traced".into() });
        assert_eq!(from_context::<Config>(&ctx).name, "traced");
    });
}
