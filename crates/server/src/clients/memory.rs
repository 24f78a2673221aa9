//! An in-process [`PuzzleApi`] serving fixed data.
//!
//! Backs offline runs of the printer, where only the curated set and a local
//! snapshot are available, and the acquisition tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use futures::future::BoxFuture;
use puzzle_core::PuzzleRecord;
use reqwest::StatusCode;

use super::PuzzleApi;
use crate::sources::SourceError;

#[derive(Default)]
pub struct MemoryApi {
    activity: Vec<PuzzleRecord>,
    activity_fails: bool,
    daily: Option<PuzzleRecord>,
    by_id: HashMap<String, PuzzleRecord>,
    /// Answers for ids not in `by_id`, handed out in order.
    lucky: Mutex<VecDeque<PuzzleRecord>>,
    activity_requests: Mutex<Vec<usize>>,
    probes: AtomicUsize,
}

impl MemoryApi {
    pub fn with_activity(mut self, records: Vec<PuzzleRecord>) -> Self {
        self.activity = records;
        self
    }

    pub fn failing_activity(mut self) -> Self {
        self.activity_fails = true;
        self
    }

    pub fn with_daily(mut self, record: PuzzleRecord) -> Self {
        self.daily = Some(record);
        self
    }

    pub fn with_puzzles(mut self, records: Vec<PuzzleRecord>) -> Self {
        self.by_id
            .extend(records.into_iter().map(|r| (r.id.clone(), r)));
        self
    }

    /// Serve `records` one by one to lookups of unknown ids.
    pub fn with_lucky_probes(self, records: Vec<PuzzleRecord>) -> Self {
        *lock(&self.lucky) = records.into();
        self
    }

    /// `max` values passed to [`PuzzleApi::activity`], in call order.
    pub fn activity_requests(&self) -> Vec<usize> {
        lock(&self.activity_requests).clone()
    }

    /// Number of by-id lookups served.
    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

impl PuzzleApi for MemoryApi {
    fn activity(&self, max: usize) -> BoxFuture<'_, Result<Vec<PuzzleRecord>, SourceError>> {
        Box::pin(async move {
            lock(&self.activity_requests).push(max);
            if self.activity_fails {
                return Err(SourceError::Status(StatusCode::SERVICE_UNAVAILABLE));
            }
            Ok(self.activity.iter().take(max).cloned().collect())
        })
    }

    fn daily(&self) -> BoxFuture<'_, Result<PuzzleRecord, SourceError>> {
        Box::pin(async move {
            self.daily
                .clone()
                .ok_or(SourceError::Status(StatusCode::NOT_FOUND))
        })
    }

    fn puzzle<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<PuzzleRecord>, SourceError>> {
        Box::pin(async move {
            self.probes.fetch_add(1, Ordering::SeqCst);
            if let Some(record) = self.by_id.get(id) {
                return Ok(Some(record.clone()));
            }
            Ok(lock(&self.lucky).pop_front())
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
