//! Render service - owns the worker thread and its channels

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use flume::{Receiver, RecvTimeoutError, Sender};
use log::debug;

use super::request::{RenderParams, RenderRequest, RenderResponse, RequestId};
use super::worker::render_worker;
use crate::export::{ExportConfig, ExportJob};

#[derive(Debug)]
enum PendingRequest {
    Render(usize),
    Export(usize),
}

/// Drives one document on a dedicated worker thread.
///
/// MuPDF documents are not `Send`, so the worker opens the file itself and
/// keeps it for its whole life. Opening another document means creating a
/// new service; dropping this one stops the worker.
pub struct RenderService {
    request_tx: Sender<RenderRequest>,
    response_rx: Receiver<RenderResponse>,
    next_request_id: u64,
    pending_requests: HashMap<RequestId, PendingRequest>,
}

impl RenderService {
    /// Spawn a worker for `doc_path`. The first response is either
    /// `DocumentInfo` or `LoadFailed`.
    #[must_use]
    pub fn open(doc_path: PathBuf, export: ExportConfig) -> Self {
        let (request_tx, request_rx) = flume::unbounded();
        let (response_tx, response_rx) = flume::unbounded();

        std::thread::spawn(move || {
            render_worker(&doc_path, export, request_rx, response_tx);
        });

        Self {
            request_tx,
            response_rx,
            next_request_id: 1,
            pending_requests: HashMap::new(),
        }
    }

    /// Request a page to be rendered
    pub fn request_render(&mut self, page: usize, params: RenderParams) -> RequestId {
        let id = self.next_id();
        let _ = self
            .request_tx
            .send(RenderRequest::Render { id, page, params });
        self.pending_requests.insert(id, PendingRequest::Render(page));
        id
    }

    /// Request a selection export
    pub fn request_export(&mut self, job: ExportJob) -> RequestId {
        let id = self.next_id();
        let page = job.page;
        let _ = self.request_tx.send(RenderRequest::Export { id, job });
        self.pending_requests.insert(id, PendingRequest::Export(page));
        id
    }

    /// Poll for completed responses without blocking
    pub fn poll_responses(&mut self) -> Vec<RenderResponse> {
        let mut responses = vec![];
        while let Ok(response) = self.response_rx.try_recv() {
            self.track(&response);
            responses.push(response);
        }
        responses
    }

    /// Block until the next response arrives or `timeout` passes.
    /// Returns `None` on timeout or once the worker is gone.
    pub fn wait_response(&mut self, timeout: Duration) -> Option<RenderResponse> {
        match self.response_rx.recv_timeout(timeout) {
            Ok(response) => {
                self.track(&response);
                Some(response)
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    fn track(&mut self, response: &RenderResponse) {
        let id = match response {
            RenderResponse::Page { id, .. }
            | RenderResponse::RenderError { id, .. }
            | RenderResponse::Exported { id, .. }
            | RenderResponse::ExportError { id, .. } => *id,
            RenderResponse::DocumentInfo(_) | RenderResponse::LoadFailed { .. } => return,
        };
        match self.pending_requests.remove(&id) {
            Some(PendingRequest::Render(page)) => debug!("Render of page {} done", page + 1),
            Some(PendingRequest::Export(page)) => debug!("Export of page {} done", page + 1),
            None => debug!("Response for unknown request {id:?}"),
        }
    }

    /// Stop the worker
    pub fn shutdown(&self) {
        let _ = self.request_tx.send(RenderRequest::Shutdown);
    }

    fn next_id(&mut self) -> RequestId {
        let id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;
        id
    }
}

impl Drop for RenderService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
