//! Glue between a table session and its data source.
//!
//! The session queues requests and the [`Dispatcher`] carries them to the
//! source after a configurable latency, then hands the answers back. Time is
//! passed in, so the whole round trip is testable without sleeping.

use crate::model::Record;
use crate::source::DataSource;
use crate::state::{DataMode, FetchRequest, SaveOutcome, SaveRequest, TableSession};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug)]
struct Pending<T> {
    due: Instant,
    request: T,
}

/// What one [`Dispatcher::pump`] applied.
#[derive(Debug, Default, PartialEq)]
pub struct PumpReport {
    /// Fetch answers the session accepted.
    pub fetched: usize,
    /// Fetch answers dropped as stale.
    pub dropped: usize,
    /// Save results, in completion order.
    pub saves: Vec<SaveOutcome>,
}

impl PumpReport {
    /// Whether anything reached the session.
    pub fn is_empty(&self) -> bool {
        self.fetched == 0 && self.dropped == 0 && self.saves.is_empty()
    }
}

/// Delivers queued fetches and saves once their latency has elapsed.
#[derive(Debug)]
pub struct Dispatcher {
    latency: Duration,
    fetches: VecDeque<Pending<FetchRequest>>,
    saves: VecDeque<Pending<SaveRequest>>,
}

impl Dispatcher {
    /// Dispatcher answering every request `latency` after it was submitted.
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            fetches: VecDeque::new(),
            saves: VecDeque::new(),
        }
    }

    /// Queue a fetch.
    pub fn submit_fetch(&mut self, request: FetchRequest, now: Instant) {
        debug!(ticket = request.ticket.get(), "fetch dispatched");
        self.fetches.push_back(Pending {
            due: now + self.latency,
            request,
        });
    }

    /// Queue a save.
    pub fn submit_save(&mut self, request: SaveRequest, now: Instant) {
        debug!(row = %request.row_id, column = %request.column_key, "save dispatched");
        self.saves.push_back(Pending {
            due: now + self.latency,
            request,
        });
    }

    /// Nothing is waiting.
    pub fn is_idle(&self) -> bool {
        self.fetches.is_empty() && self.saves.is_empty()
    }

    /// Time until the earliest queued request is due.
    pub fn next_due_in(&self, now: Instant) -> Option<Duration> {
        self.fetches
            .iter()
            .map(|p| p.due)
            .chain(self.saves.iter().map(|p| p.due))
            .min()
            .map(|due| due.saturating_duration_since(now))
    }

    /// Collect the session's queued fetch, then apply every request due by `now`.
    ///
    /// A save the source accepted refreshes the session: local sessions get
    /// the source's rows, remote sessions re-fetch.
    pub fn pump<S: DataSource>(
        &mut self,
        session: &mut TableSession<Record>,
        source: &mut S,
        now: Instant,
    ) -> PumpReport {
        let mut report = PumpReport::default();
        self.collect(session, now);

        while let Some(pending) = pop_due(&mut self.saves, now) {
            let request = pending.request;
            let result = source.save(&request);
            let accepted = result.is_ok();
            report.saves.push(session.complete_save(request.ticket, result));
            if accepted {
                match session.mode() {
                    DataMode::Local => session.set_rows(source.rows().to_vec()),
                    DataMode::Remote => session.refresh(),
                }
            }
        }
        self.collect(session, now);

        while let Some(pending) = pop_due(&mut self.fetches, now) {
            let request = pending.request;
            let result = source.fetch(&request.query);
            if session.resolve_fetch(request.ticket, result) {
                report.fetched += 1;
            } else {
                report.dropped += 1;
            }
        }
        report
    }

    fn collect(&mut self, session: &mut TableSession<Record>, now: Instant) {
        if let Some(request) = session.take_fetch() {
            self.submit_fetch(request, now);
        }
    }
}

fn pop_due<T>(queue: &mut VecDeque<Pending<T>>, now: Instant) -> Option<Pending<T>> {
    if queue.front().is_some_and(|p| p.due <= now) {
        queue.pop_front()
    } else {
        None
    }
}
