// SPDX: CC0-1.0

//! Analysis on a background thread, with newer requests superseding older
//! ones.
//!
//! Requests share a slot when they have the same [`RequestKind`] and equation
//! ids. Submitting into a slot makes everything queued or running in that slot
//! stale: the worker skips stale jobs it has not started, and [`Worker::poll`]
//! drops stale results that arrive anyway. Nothing is retried.

use crate::{
    analysis::{self, Analysis, AnalysisParams},
    config::GraphConfig,
    equation::EquationId,
    error::GeometryError,
    evaluator::{self, Evaluator},
    extrema::ExtremumScan,
    intersect::IntersectionScan,
    sample::{self, Segment},
    viewport::Domain,
    Number, Point,
};
use std::{
    collections::HashMap,
    sync::{
        mpsc::{channel, Receiver, RecvTimeoutError, Sender},
        Arc, Mutex, PoisonError,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};
use tracing::{debug, trace, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Display polyline of one expression; `sample_count` is the pixel width.
    Samples,
    /// Crossings of exactly two expressions.
    Intersections,
    /// Extrema and asymptotes of one expression; `sample_count` is the
    /// extremum grid, the asymptote grid comes from [`WorkerParams`].
    Analysis,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RequestKey {
    pub kind: RequestKind,
    pub ids: Vec<EquationId>,
    pub expressions: Vec<String>,
    pub domain: Domain,
    pub sample_count: usize,
}

type Slot = (RequestKind, Vec<EquationId>);

impl RequestKey {
    fn slot(&self) -> Slot {
        (self.kind, self.ids.clone())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Segments(Vec<Segment>),
    Points(Vec<Point>),
    Analysis(Analysis),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub key: RequestKey,
    pub payload: Payload,
}

struct Job {
    key: RequestKey,
    generation: u64,
}

struct Done {
    response: Response,
    generation: u64,
}

/// Scan settings that are not part of a request key.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorkerParams {
    pub bisection_steps: usize,
    pub refine_step: Number,
    pub asymptote_samples: usize,
    pub asymptote_jump: Number,
}

impl WorkerParams {
    pub fn from_config(config: &GraphConfig) -> Self {
        Self {
            bisection_steps: config.intersections.bisection_steps,
            refine_step: config.analysis.refine_step,
            asymptote_samples: config.analysis.asymptote_samples,
            asymptote_jump: config.analysis.asymptote_jump,
        }
    }
}

impl Default for WorkerParams {
    fn default() -> Self {
        Self::from_config(&GraphConfig::default())
    }
}

type Generations = Arc<Mutex<HashMap<Slot, u64>>>;

fn is_current(generations: &Generations, slot: &Slot, generation: u64) -> bool {
    generations
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get(slot)
        .is_some_and(|&latest| latest == generation)
}

pub struct Worker {
    jobs: Option<Sender<Job>>,
    results: Receiver<Done>,
    generations: Generations,
    thread: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn<E>(evaluator: Arc<E>, params: WorkerParams) -> Self
    where
        E: Evaluator + 'static,
    {
        let (job_tx, job_rx) = channel::<Job>();
        let (done_tx, done_rx) = channel::<Done>();
        let generations = Generations::default();

        let shared = Arc::clone(&generations);
        let thread = thread::spawn(move || {
            while let Ok(Job { key, generation }) = job_rx.recv() {
                if !is_current(&shared, &key.slot(), generation) {
                    trace!(kind = ?key.kind, generation, "skipping superseded request");
                    continue;
                }
                let payload = compute(&*evaluator, &key, &params);
                let done = Done {
                    response: Response { key, payload },
                    generation,
                };
                if done_tx.send(done).is_err() {
                    break;
                }
            }
        });

        Self {
            jobs: Some(job_tx),
            results: done_rx,
            generations,
            thread: Some(thread),
        }
    }

    /// Queue a request, superseding anything earlier in the same slot.
    pub fn submit(&self, key: RequestKey) -> Result<(), GeometryError> {
        if key.sample_count == 0 {
            return Err(GeometryError::ZeroSamples);
        }
        let generation = {
            let mut generations = self
                .generations
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let latest = generations.entry(key.slot()).or_insert(0);
            *latest += 1;
            *latest
        };
        debug!(kind = ?key.kind, generation, "submitting request");
        if let Some(jobs) = &self.jobs {
            if jobs.send(Job { key, generation }).is_err() {
                warn!("analysis worker has stopped");
            }
        }
        Ok(())
    }

    fn accept(&self, done: Done) -> Option<Response> {
        if is_current(&self.generations, &done.response.key.slot(), done.generation) {
            Some(done.response)
        } else {
            debug!(kind = ?done.response.key.kind, generation = done.generation, "discarding stale result");
            None
        }
    }

    /// Current results that have arrived so far, without blocking.
    pub fn poll(&self) -> Vec<Response> {
        self.results
            .try_iter()
            .filter_map(|done| self.accept(done))
            .collect()
    }

    /// Block until a current result arrives, the timeout passes, or the
    /// worker stops.
    pub fn wait(&self, timeout: Duration) -> Option<Response> {
        loop {
            match self.results.recv_timeout(timeout) {
                Ok(done) => {
                    if let Some(response) = self.accept(done) {
                        return Some(response);
                    }
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Like [`Worker::wait`], but only for the answer to `key`. Current
    /// results for other requests that arrive first are dropped.
    pub fn wait_for(&self, key: &RequestKey, timeout: Duration) -> Option<Response> {
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline.checked_duration_since(Instant::now())?;
            let response = self.wait(left)?;
            if response.key == *key {
                return Some(response);
            }
            debug!(kind = ?response.key.kind, ids = ?response.key.ids, "ignoring unrelated result");
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        // closing the queue ends the thread's receive loop
        self.jobs.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("analysis worker panicked");
            }
        }
    }
}

fn compute<E: Evaluator + ?Sized>(ev: &E, key: &RequestKey, params: &WorkerParams) -> Payload {
    let result = match (key.kind, key.expressions.as_slice()) {
        (RequestKind::Samples, [expr]) => {
            sample::sample_expr(ev, expr, key.domain, key.sample_count)
                .map(|segments| Payload::Segments(segments.collect()))
        }
        (RequestKind::Intersections, [a, b]) => IntersectionScan {
            sample_count: key.sample_count,
            bisection_steps: params.bisection_steps,
        }
        .run(evaluator::function(ev, a), evaluator::function(ev, b), key.domain)
        .map(Payload::Points),
        (RequestKind::Analysis, [expr]) => analysis::analyze(
            evaluator::function(ev, expr),
            &AnalysisParams {
                domain: key.domain,
                extrema: ExtremumScan {
                    sample_count: key.sample_count,
                    refine_step: params.refine_step,
                },
                asymptote_samples: params.asymptote_samples,
                asymptote_jump: params.asymptote_jump,
            },
        )
        .map(Payload::Analysis),
        (kind, exprs) => {
            warn!(?kind, expressions = exprs.len(), "malformed request");
            return empty(kind);
        }
    };
    result.unwrap_or_else(|err| {
        warn!(%err, "request rejected");
        empty(key.kind)
    })
}

fn empty(kind: RequestKind) -> Payload {
    match kind {
        RequestKind::Samples => Payload::Segments(Vec::new()),
        RequestKind::Intersections => Payload::Points(Vec::new()),
        RequestKind::Analysis => Payload::Analysis(Analysis::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::StackEvaluator;

    const TIMEOUT: Duration = Duration::from_secs(30);

    fn key(kind: RequestKind, ids: &[&str], exprs: &[&str], sample_count: usize) -> RequestKey {
        RequestKey {
            kind,
            ids: ids.iter().map(|&id| EquationId::from(id)).collect(),
            expressions: exprs.iter().map(|s| s.to_string()).collect(),
            domain: Domain::new(0.0, 4.0).unwrap(),
            sample_count,
        }
    }

    #[test]
    fn intersections_in_the_background() {
        let worker = Worker::spawn(Arc::new(StackEvaluator::default()), WorkerParams::default());
        worker
            .submit(key(RequestKind::Intersections, &["a", "b"], &["x", "2-x"], 200))
            .unwrap();
        let response = worker.wait(TIMEOUT).unwrap();
        match response.payload {
            Payload::Points(points) => {
                assert_eq!(points.len(), 1);
                assert!((points[0].x - 1.0).abs() < 1e-3);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn only_the_newest_request_in_a_slot_is_delivered() {
        let worker = Worker::spawn(Arc::new(StackEvaluator::default()), WorkerParams::default());
        for expr in ["x", "x^2", "x^3"] {
            worker
                .submit(key(RequestKind::Samples, &["a"], &[expr], 100))
                .unwrap();
        }
        let response = worker.wait(TIMEOUT).unwrap();
        assert_eq!(response.key.expressions, vec!["x^3".to_string()]);
        // nothing older may show up afterwards
        assert!(worker.wait(Duration::from_millis(200)).is_none());
        assert!(worker.poll().is_empty());
    }

    #[test]
    fn different_slots_do_not_supersede_each_other() {
        let worker = Worker::spawn(Arc::new(StackEvaluator::default()), WorkerParams::default());
        worker
            .submit(key(RequestKind::Analysis, &["a"], &["sin(x)"], 1000))
            .unwrap();
        worker
            .submit(key(RequestKind::Analysis, &["b"], &["-(x^2)"], 1000))
            .unwrap();
        let mut got = vec![worker.wait(TIMEOUT).unwrap(), worker.wait(TIMEOUT).unwrap()];
        got.sort_by(|l, r| l.key.ids.cmp(&r.key.ids));
        assert_eq!(got[0].key.ids, vec![EquationId::from("a")]);
        assert_eq!(got[1].key.ids, vec![EquationId::from("b")]);
        match &got[1].payload {
            Payload::Analysis(a) => assert_eq!(a.extrema.len(), 0),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn asymptote_grid_comes_from_params() {
        // at 20 samples the neighbours of 0 are +-10 apart, well under the jump
        let params = WorkerParams {
            asymptote_samples: 2000,
            ..WorkerParams::default()
        };
        let worker = Worker::spawn(Arc::new(StackEvaluator::default()), params);
        let mut request = key(RequestKind::Analysis, &["a"], &["1/x"], 20);
        request.domain = Domain::new(-1.0, 1.0).unwrap();
        worker.submit(request).unwrap();
        match worker.wait(TIMEOUT).unwrap().payload {
            Payload::Analysis(a) => {
                assert_eq!(a.asymptotes.len(), 1, "{a:?}");
                assert!(a.asymptotes[0].abs() < 1e-2);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn waiting_for_a_key_skips_other_answers() {
        let worker = Worker::spawn(Arc::new(StackEvaluator::default()), WorkerParams::default());
        let samples = key(RequestKind::Samples, &["a"], &["x"], 100);
        let analysis = key(RequestKind::Analysis, &["b"], &["-(x^2)"], 1000);
        worker.submit(samples).unwrap();
        worker.submit(analysis.clone()).unwrap();
        let response = worker.wait_for(&analysis, TIMEOUT).unwrap();
        assert_eq!(response.key, analysis);
        assert!(matches!(response.payload, Payload::Analysis(_)));
    }

    #[test]
    fn zero_samples_are_rejected_on_submit() {
        let worker = Worker::spawn(Arc::new(StackEvaluator::default()), WorkerParams::default());
        assert_eq!(
            worker.submit(key(RequestKind::Samples, &["a"], &["x"], 0)),
            Err(GeometryError::ZeroSamples)
        );
    }

    #[test]
    fn malformed_requests_yield_empty_results() {
        let worker = Worker::spawn(Arc::new(StackEvaluator::default()), WorkerParams::default());
        worker
            .submit(key(RequestKind::Intersections, &["a"], &["x"], 10))
            .unwrap();
        assert_eq!(
            worker.wait(TIMEOUT).unwrap().payload,
            Payload::Points(Vec::new())
        );
    }
}
