//! # Session Worker
//!
//! Runs a [`Session`] on a dedicated thread and serves requests from any
//! number of [`SessionHandle`]s. Requests travel over a `std::sync::mpsc`
//! channel; callers either block on the reply ([`SessionHandle::call`]) or
//! await it ([`SessionHandle::call_async`], backed by a `tokio` oneshot).
//!
//! While a drive is in flight every other request is rejected with
//! `SessionBusy` instead of queueing behind it. Breaking into the target
//! goes through the [`InterruptHandle`], which never touches the queue.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use super::drive::{DriveOutcome, DriveRequest};
use super::interrupt::InterruptHandle;
use super::state::{DriveClaim, SessionShared, SessionState};
use super::Session;
use crate::config::SessionConfig;
use crate::error::{BridgeError, BridgeResult};

/// Name of the thread that owns the engine connection.
pub const WORKER_THREAD_NAME: &str = "dbgbridge-engine";

type Job = Box<dyn FnOnce(&Session) + Send>;

enum Request
{
    Run(Job),
    Shutdown,
}

/// Owner of the session thread.
///
/// Dropping the worker (or calling [`SessionWorker::shutdown`]) closes the
/// session on its own thread and joins it. Handles that outlive the worker
/// fail with `SessionClosed`.
pub struct SessionWorker
{
    handle: SessionHandle,
    thread: Option<JoinHandle<()>>,
}

impl SessionWorker
{
    /// Spawn the session thread and open a session on it with `config`.
    ///
    /// ## Errors
    ///
    /// - `Io`: the thread could not be spawned
    /// - Any error from [`Session::open`]
    pub fn spawn(config: SessionConfig) -> BridgeResult<Self>
    {
        let (requests, inbox) = mpsc::channel::<Request>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<BridgeResult<Arc<SessionShared>>>(1);

        let thread = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || serve(config, &inbox, &ready_tx))?;
        let worker_thread = thread.thread().id();

        let shared = match ready_rx.recv() {
            Ok(Ok(shared)) => shared,
            Ok(Err(err)) => {
                let _ = thread.join();
                return Err(err);
            }
            Err(_) => {
                let _ = thread.join();
                return Err(BridgeError::WorkerGone);
            }
        };
        debug!("Session worker started");

        Ok(Self {
            handle: SessionHandle {
                requests,
                shared,
                worker_thread,
            },
            thread: Some(thread),
        })
    }

    /// A new handle to the session.
    #[must_use]
    pub fn handle(&self) -> SessionHandle
    {
        self.handle.clone()
    }

    /// Close the session and join the thread.
    ///
    /// ## Errors
    ///
    /// - `WorkerGone`: the session thread panicked
    pub fn shutdown(mut self) -> BridgeResult<()>
    {
        self.stop()
    }

    fn stop(&mut self) -> BridgeResult<()>
    {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        let _ = self.handle.requests.send(Request::Shutdown);
        thread.join().map_err(|_| BridgeError::WorkerGone)?;
        debug!("Session worker stopped");
        Ok(())
    }
}

impl Drop for SessionWorker
{
    fn drop(&mut self)
    {
        if let Err(err) = self.stop() {
            warn!("Session worker did not stop cleanly: {err}");
        }
    }
}

impl fmt::Debug for SessionWorker
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("SessionWorker")
            .field("state", &self.handle.state())
            .field("running", &self.thread.is_some())
            .finish()
    }
}

fn serve(config: SessionConfig, inbox: &Receiver<Request>, ready: &SyncSender<BridgeResult<Arc<SessionShared>>>)
{
    let session = match Session::open(config) {
        Ok(session) => session,
        Err(err) => {
            let _ = ready.send(Err(err));
            return;
        }
    };
    if ready.send(Ok(Arc::clone(&session.shared))).is_err() {
        return;
    }

    while let Ok(request) = inbox.recv() {
        match request {
            Request::Run(job) => {
                if panic::catch_unwind(AssertUnwindSafe(|| job(&session))).is_err() {
                    error!("Session request panicked; the session stays open");
                }
            }
            Request::Shutdown => break,
        }
    }

    match session.close() {
        Ok(()) | Err(BridgeError::SessionClosed) => {}
        Err(err) => warn!("Closing session on worker exit failed: {err}"),
    }
    info!("Session worker exiting");
}

/// Cloneable, thread-safe handle that forwards requests to the session thread.
#[derive(Clone)]
pub struct SessionHandle
{
    requests: Sender<Request>,
    shared: Arc<SessionShared>,
    worker_thread: thread::ThreadId,
}

impl SessionHandle
{
    #[must_use]
    pub fn state(&self) -> SessionState
    {
        self.shared.state()
    }

    #[must_use]
    pub fn interrupt_handle(&self) -> InterruptHandle
    {
        InterruptHandle::new(Arc::clone(&self.shared))
    }

    /// Run `request` on the session thread and block until it returns.
    ///
    /// ## Errors
    ///
    /// - `SessionBusy`: a drive is in flight
    /// - `SessionClosed`: the session has been torn down
    /// - `ReentrantCall`: called from the session thread itself
    /// - `WorkerGone`: the session thread exited before replying
    pub fn call<T, F>(&self, request: F) -> BridgeResult<T>
    where
        F: FnOnce(&Session) -> BridgeResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.admit("SessionHandle::call")?;
        let (reply, response) = mpsc::sync_channel(1);
        self.submit(Box::new(move |session| {
            let _ = reply.send(request(session));
        }))?;
        response.recv().map_err(|_| BridgeError::WorkerGone)?
    }

    /// Async form of [`SessionHandle::call`].
    pub async fn call_async<T, F>(&self, request: F) -> BridgeResult<T>
    where
        F: FnOnce(&Session) -> BridgeResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.admit("SessionHandle::call_async")?;
        let (reply, response) = oneshot::channel();
        self.submit(Box::new(move |session| {
            let _ = reply.send(request(session));
        }))?;
        response.await.map_err(|_| BridgeError::WorkerGone)?
    }

    /// Drive the target on the session thread and block until it stops.
    ///
    /// The drive is claimed before the request is queued, so a concurrent
    /// drive from any thread fails with `SessionBusy` right away.
    pub fn drive(&self, request: DriveRequest) -> BridgeResult<DriveOutcome>
    {
        let claim = self.claim("SessionHandle::drive")?;
        let (reply, response) = mpsc::sync_channel(1);
        self.submit(Box::new(move |session| {
            let _ = reply.send(session.drive_claimed(claim, request));
        }))?;
        response.recv().map_err(|_| BridgeError::WorkerGone)?
    }

    /// Async form of [`SessionHandle::drive`].
    pub async fn drive_async(&self, request: DriveRequest) -> BridgeResult<DriveOutcome>
    {
        let claim = self.claim("SessionHandle::drive_async")?;
        let (reply, response) = oneshot::channel();
        self.submit(Box::new(move |session| {
            let _ = reply.send(session.drive_claimed(claim, request));
        }))?;
        response.await.map_err(|_| BridgeError::WorkerGone)?
    }

    fn admit(&self, operation: &'static str) -> BridgeResult<()>
    {
        match self.shared.state() {
            SessionState::Connected => {}
            SessionState::Running => return Err(BridgeError::SessionBusy),
            SessionState::Created | SessionState::Closed => return Err(BridgeError::SessionClosed),
        }
        self.reject_session_thread(operation)
    }

    fn claim(&self, operation: &'static str) -> BridgeResult<DriveClaim>
    {
        self.reject_session_thread(operation)?;
        DriveClaim::acquire(&self.shared)
    }

    /// The session thread would wait on itself.
    fn reject_session_thread(&self, operation: &'static str) -> BridgeResult<()>
    {
        if thread::current().id() == self.worker_thread {
            error!("{operation} issued from the session thread");
            return Err(BridgeError::ReentrantCall { operation });
        }
        Ok(())
    }

    fn submit(&self, job: Job) -> BridgeResult<()>
    {
        self.requests
            .send(Request::Run(job))
            .map_err(|_| BridgeError::WorkerGone)
    }
}

impl fmt::Debug for SessionHandle
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("SessionHandle")
            .field("state", &self.state())
            .field("worker_thread", &self.worker_thread)
            .finish_non_exhaustive()
    }
}
