use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, TrySendError};
use log::{debug, info};

use super::{Frame, Listener, ListenerError, ListenerStats};

/// Control side of a listener running on a background thread
///
/// Consumers either sample the most recent frame with [`latest`](Self::latest)
/// or drain every frame through [`frames`](Self::frames). The snapshot is
/// swapped by a single assignment once a message is fully decoded, so a
/// reader never sees a partially built table. When the queue is full, new
/// frames still replace the snapshot but are not queued.
pub struct ListenerHandle {
    local_addr: SocketAddr,
    receiver: Receiver<Frame>,
    latest: Arc<Mutex<Option<Frame>>>,
    stats: Arc<Mutex<ListenerStats>>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<(), ListenerError>>>,
}

impl Listener {
    /// Run the receive loop on a background thread named `structfeed-listener`
    pub fn spawn(mut self) -> Result<ListenerHandle, ListenerError> {
        let local_addr = self.local_addr()?;
        let (sender, receiver) = bounded::<Frame>(self.config.channel_capacity);
        let latest: Arc<Mutex<Option<Frame>>> = Arc::new(Mutex::new(None));
        let stats = Arc::new(Mutex::new(ListenerStats::default()));
        let stop = Arc::new(AtomicBool::new(false));

        let latest_slot = Arc::clone(&latest);
        let stats_slot = Arc::clone(&stats);
        let stop_flag = Arc::clone(&stop);

        let thread = thread::Builder::new()
            .name("structfeed-listener".to_string())
            .spawn(move || {
                while !stop_flag.load(Ordering::Relaxed) {
                    let polled = self.poll_frame();
                    *stats_slot.lock().unwrap_or_else(PoisonError::into_inner) = self.stats;

                    let Some(frame) = polled? else {
                        continue;
                    };
                    let sequence = frame.sequence;
                    *latest_slot.lock().unwrap_or_else(PoisonError::into_inner) =
                        Some(frame.clone());
                    match sender.try_send(frame) {
                        Ok(()) | Err(TrySendError::Disconnected(_)) => {}
                        Err(TrySendError::Full(_)) => {
                            debug!("Frame queue full, frame {} only kept as latest", sequence);
                        }
                    }
                }
                info!("Listener on {} stopped", local_addr);
                Ok(())
            })?;

        Ok(ListenerHandle {
            local_addr,
            receiver,
            latest,
            stats,
            stop,
            thread: Some(thread),
        })
    }
}

impl ListenerHandle {
    /// Address the background socket is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Most recently decoded frame, if any
    pub fn latest(&self) -> Option<Frame> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Queue of decoded frames in arrival order
    pub fn frames(&self) -> &Receiver<Frame> {
        &self.receiver
    }

    /// Counters as of the last receive attempt
    pub fn stats(&self) -> ListenerStats {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask the loop to stop and wait for it
    ///
    /// The loop notices the request after its current receive call returns,
    /// so this blocks for at most one read timeout. Returns the final
    /// counters, or the socket error that ended the loop early.
    pub fn stop(mut self) -> Result<ListenerStats, ListenerError> {
        self.shutdown()?;
        Ok(self.stats())
    }

    fn shutdown(&mut self) -> Result<(), ListenerError> {
        self.stop.store(true, Ordering::Relaxed);
        match self.thread.take() {
            Some(thread) => match thread.join() {
                Ok(result) => result,
                Err(_panic) => Err(ListenerError::ThreadPanicked),
            },
            None => Ok(()),
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            if let Err(e) = self.shutdown() {
                log::warn!("Listener ended with error: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerHandle")
            .field("local_addr", &self.local_addr)
            .field("running", &self.thread.is_some())
            .finish()
    }
}
