use crate::form::submission::SubmissionPhase;
use crate::theme::Theme;
use crate::{Error, Result, Site, UiEvent};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Instant;
use tokio::sync::oneshot;

enum Command {
    Dispatch(UiEvent, oneshot::Sender<()>),
    Snapshot(oneshot::Sender<SiteSnapshot>),
    WaitIdle(oneshot::Sender<()>),
    Close(oneshot::Sender<()>),
}

/// Observable state of a running site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSnapshot {
    pub submission: Option<SubmissionPhase>,
    pub history: Vec<SubmissionPhase>,
    pub modal_open: bool,
    pub visible: Vec<u64>,
    pub theme: Theme,
    pub timers_pending: bool,
}

impl SiteSnapshot {
    fn of(site: &Site) -> Self {
        Self {
            submission: site.submission_phase(),
            history: site.submission_history().to_vec(),
            modal_open: matches!(site.modal_state(), crate::ModalState::Open(_)),
            visible: site.visible_ids().to_vec(),
            theme: site.theme(),
            timers_pending: !site.is_idle(),
        }
    }
}

/// An async-friendly handle to a site running on a dedicated worker thread.
///
/// The worker thread owns the `Site`, applies commands in arrival order and
/// fires its timers against the wall clock, so delays such as the simulated
/// transmission latency take real time.
#[derive(Clone)]
pub struct SiteHandle {
    cmd_tx: Sender<Command>,
}

impl SiteHandle {
    /// Spawn the worker; `build` runs on the worker thread.
    pub async fn spawn<F>(build: F) -> Result<Self>
    where
        F: FnOnce() -> Result<Site> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx): (oneshot::Sender<Result<()>>, oneshot::Receiver<Result<()>>) =
            oneshot::channel();

        thread::spawn(move || {
            let mut site = match build() {
                Ok(s) => s,
                Err(err) => {
                    let _ = init_tx.send(Err(err));
                    return;
                }
            };
            let _ = init_tx.send(Ok(()));

            let mut last = Instant::now();
            let mut idle_waiters: Vec<oneshot::Sender<()>> = Vec::new();

            loop {
                let received = match site.next_timer_in() {
                    Some(wait) => match cmd_rx.recv_timeout(wait) {
                        Ok(cmd) => Some(cmd),
                        Err(RecvTimeoutError::Timeout) => None,
                        Err(RecvTimeoutError::Disconnected) => break,
                    },
                    None => match cmd_rx.recv() {
                        Ok(cmd) => Some(cmd),
                        Err(_) => break,
                    },
                };

                let now = Instant::now();
                site.advance(now.duration_since(last));
                last = now;

                match received {
                    Some(Command::Dispatch(event, resp)) => {
                        site.dispatch(event);
                        let _ = resp.send(());
                    }
                    Some(Command::Snapshot(resp)) => {
                        let _ = resp.send(SiteSnapshot::of(&site));
                    }
                    Some(Command::WaitIdle(resp)) => idle_waiters.push(resp),
                    Some(Command::Close(resp)) => {
                        let _ = resp.send(());
                        break;
                    }
                    None => {}
                }

                if site.is_idle() {
                    for waiter in idle_waiters.drain(..) {
                        let _ = waiter.send(());
                    }
                }
            }
            log::debug!("site worker stopped");
        });

        let init_res = init_rx
            .await
            .map_err(|e| Error::Other(format!("Worker init canceled: {}", e)))?;
        init_res?;

        Ok(Self { cmd_tx })
    }

    /// Deliver a UI event; resolves once the site has reacted to it.
    pub async fn dispatch(&self, event: UiEvent) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Dispatch(event, tx));
        rx.await
            .map_err(|e| Error::Other(format!("Dispatch canceled: {}", e)))
    }

    pub async fn snapshot(&self) -> Result<SiteSnapshot> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Snapshot(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Snapshot canceled: {}", e)))
    }

    /// Resolves once no timers are pending.
    pub async fn wait_idle(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::WaitIdle(tx));
        rx.await
            .map_err(|e| Error::Other(format!("WaitIdle canceled: {}", e)))
    }

    /// Stop the worker thread.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Close(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))
    }
}
