/// One background request and the channel its answer comes back on.
///
/// The game loop owns the `Pending` and polls it once per frame; the
/// worker thread sends exactly one value and exits. Dropping a `Pending`
/// just detaches the thread.

use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;

#[derive(Debug, PartialEq, Eq)]
pub enum Poll<T> {
    Ready(T),
    Waiting,
    /// The worker died (panicked) before sending.
    Lost,
}

pub struct Pending<T> {
    rx: Receiver<T>,
    label: &'static str,
}

impl<T: Send + 'static> Pending<T> {
    pub fn spawn<F>(label: &'static str, job: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = channel::<T>();
        thread::spawn(move || {
            // The receiver may be gone if the game quit meanwhile.
            let _ = tx.send(job());
        });
        log::debug!("Started {label} request");
        Pending { rx, label }
    }

    pub fn poll(&self) -> Poll<T> {
        match self.rx.try_recv() {
            Ok(value) => {
                log::debug!("{} request finished", self.label);
                Poll::Ready(value)
            }
            Err(TryRecvError::Empty) => Poll::Waiting,
            Err(TryRecvError::Disconnected) => {
                log::error!("{} worker exited without a result", self.label);
                Poll::Lost
            }
        }
    }
}
