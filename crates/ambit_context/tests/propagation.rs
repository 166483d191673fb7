//! Propagation tests for `ambit_context`.
//!
//! These tests move contexts across threads and async tasks and check that
//! values, cancellation and deadlines travel with them.

use core::time::Duration;
use std::thread;
use std::time::Instant;

use ambit_context::prelude::*;

#[derive(Debug, PartialEq)]
struct TraceId(u128);

#[test]
fn values_cross_threads() {
    let ctx = Context::background().with(TraceId(99));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let ctx = ctx.clone();
            thread::spawn(move || ctx.get::<TraceId>().map(|id| id.0))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("Thread panicked"), Some(99));
    }
}

#[test]
fn cancel_from_another_thread() {
    let (ctx, cancel) = Context::background().with_cancel();

    thread::spawn(move || cancel.cancel())
        .join()
        .expect("Thread panicked");

    assert_eq!(ctx.err(), Some(ContextError::Canceled));
}

#[test]
fn nested_cancel_scopes_are_independent() {
    let (outer, outer_cancel) = Context::background().with_cancel();
    let (inner, inner_cancel) = outer.with_cancel();

    inner_cancel.cancel();
    assert!(inner.is_cancelled());
    assert!(!outer.is_cancelled());

    outer_cancel.cancel();
    assert!(outer.is_cancelled());
}

#[test]
fn child_cannot_extend_parent_deadline() {
    let parent = Context::background().with_timeout(Duration::from_millis(50));
    let child = parent.with_timeout(Duration::from_secs(3600));

    assert_eq!(child.deadline(), parent.deadline());
    assert!(child.deadline().unwrap() < Instant::now() + Duration::from_secs(60));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn deadline_expires_inside_task() {
    let ctx = Context::background()
        .with(TraceId(1))
        .with_timeout(Duration::from_millis(10));

    let task = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        (ctx.err(), ctx.get::<TraceId>())
    });

    let (err, trace) = task.await.expect("task panicked");
    assert_eq!(err, Some(ContextError::DeadlineExceeded));
    assert_eq!(trace.as_deref(), Some(&TraceId(1)));
}

#[tokio::test]
async fn cancel_observed_by_waiting_task() {
    let (ctx, cancel) = Context::background().with_cancel();

    let task = tokio::spawn(async move {
        ctx.cancelled().await;
        ctx.err()
    });

    cancel.cancel();
    assert_eq!(task.await.expect("task panicked"), Some(ContextError::Canceled));
}

#[tokio::test]
async fn done_reports_ancestor_cancellation() {
    let (parent, cancel) = Context::background().with_cancel();
    let child = parent
        .with(TraceId(2))
        .with_timeout(Duration::from_secs(3600));

    let task = tokio::spawn(async move { child.done().await });

    cancel.cancel();
    assert_eq!(task.await.expect("task panicked"), ContextError::Canceled);
}

#[tokio::test]
async fn done_reports_deadline() {
    let ctx = Context::background().with_timeout(Duration::from_millis(10));

    assert_eq!(ctx.done().await, ContextError::DeadlineExceeded);
    assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
}

#[tokio::test]
async fn uncancelable_context_never_completes() {
    let ctx = Context::background().with(TraceId(3));

    let waited = tokio::time::timeout(Duration::from_millis(20), ctx.cancelled()).await;
    assert!(waited.is_err());
}
