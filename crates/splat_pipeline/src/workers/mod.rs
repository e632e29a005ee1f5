//! # Worker Contexts
//!
//! Each worker is a named OS thread running a single-threaded request loop
//! over a bounded channel. The request handlers are plain structs so they
//! can be exercised without threads.
//!
//! ```text
//! Main ──SortRequest──> [splat-sort] ──SortResponse──> Main
//! Main ──SimRequest───> [splat-sim]  ──SimResponse───> Main
//! ```

mod sim_worker;
mod sort_worker;

use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};

use crate::error::{PipelineError, PipelineResult};

pub use sim_worker::SimContext;
pub use sort_worker::SortContext;

/// Something that turns requests into responses on a worker thread.
pub trait RequestHandler: Send + 'static {
    /// Request type.
    type Request: Send + 'static;
    /// Response type.
    type Response: Send + 'static;

    /// Handles one request.
    fn handle(&mut self, request: Self::Request) -> Self::Response;
}

impl RequestHandler for SortContext {
    type Request = crate::protocol::SortRequest;
    type Response = crate::protocol::SortResponse;

    fn handle(&mut self, request: Self::Request) -> Self::Response {
        SortContext::handle(self, request)
    }
}

impl RequestHandler for SimContext {
    type Request = crate::protocol::SimRequest;
    type Response = crate::protocol::SimResponse;

    fn handle(&mut self, request: Self::Request) -> Self::Response {
        SimContext::handle(self, request)
    }
}

/// Main-side end of a worker: request sender, response receiver, thread.
pub struct WorkerLink<Req, Resp> {
    name: &'static str,
    requests: Option<Sender<Req>>,
    responses: Receiver<Resp>,
    handle: Option<JoinHandle<()>>,
}

impl<Req: Send + 'static, Resp: Send + 'static> WorkerLink<Req, Resp> {
    /// Spawns `handler` on a thread named `splat-{name}`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Spawn`] if the thread cannot be started.
    pub fn spawn<H>(name: &'static str, mut handler: H, capacity: usize) -> PipelineResult<Self>
    where
        H: RequestHandler<Request = Req, Response = Resp>,
    {
        let (request_tx, request_rx) = bounded::<Req>(capacity);
        let (response_tx, response_rx) = bounded::<Resp>(capacity);

        let handle = std::thread::Builder::new()
            .name(format!("splat-{name}"))
            .spawn(move || {
                tracing::info!(worker = name, "worker started");
                for request in request_rx.iter() {
                    if response_tx.send(handler.handle(request)).is_err() {
                        break;
                    }
                }
                tracing::info!(worker = name, "worker stopped");
            })
            .map_err(|source| PipelineError::Spawn { name, source })?;

        Ok(Self {
            name,
            requests: Some(request_tx),
            responses: response_rx,
            handle: Some(handle),
        })
    }

    /// Sends a request.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::WorkerDisconnected`] if the worker is gone.
    pub fn send(&self, request: Req) -> PipelineResult<()> {
        self.requests
            .as_ref()
            .ok_or(PipelineError::WorkerDisconnected(self.name))?
            .send(request)
            .map_err(|_| PipelineError::WorkerDisconnected(self.name))
    }

    /// Takes a response if one is ready.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::WorkerDisconnected`] if the worker is gone
    /// and nothing is left to read.
    pub fn poll(&self) -> PipelineResult<Option<Resp>> {
        match self.responses.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(PipelineError::WorkerDisconnected(self.name)),
        }
    }
}

impl<Req, Resp> Drop for WorkerLink<Req, Resp> {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop; closing the
        // response channel unblocks a worker stuck on a full one.
        drop(self.requests.take());
        drop(std::mem::replace(&mut self.responses, crossbeam_channel::never()));
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!(worker = self.name, "worker panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{SimRequest, SimResponse};
    use splat_core::Vec3;
    use splat_sim::SimulationParams;

    #[test]
    fn test_round_trip_through_thread() {
        let link = WorkerLink::spawn("sim-test", SimContext::new(SimulationParams::default()), 2).unwrap();
        link.send(SimRequest::Merge {
            records: Vec::new(),
            eye: Vec3::ZERO,
        })
        .unwrap();
        let started = std::time::Instant::now();
        let response = loop {
            if let Some(response) = link.poll().unwrap() {
                break response;
            }
            assert!(started.elapsed() < std::time::Duration::from_secs(5), "no response");
            std::thread::yield_now();
        };
        assert!(matches!(response, SimResponse::Merged { len: 0 }));
        assert!(link.poll().unwrap().is_none());
    }
}
