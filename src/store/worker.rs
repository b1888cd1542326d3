//! Background thread that owns the store.
//!
//! The UI thread never blocks on disk: it queues loads and saves here and
//! polls for `PersistEvent`s, which makes every write failure observable.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::KeyValueStore;
use crate::error::NotesError;

#[derive(Debug)]
enum PersistRequest {
    Load { key: String },
    Save { key: String, bytes: Vec<u8> },
    Remove { key: String },
}

impl PersistRequest {
    fn key(&self) -> &str {
        match self {
            PersistRequest::Load { key }
            | PersistRequest::Save { key, .. }
            | PersistRequest::Remove { key } => key,
        }
    }

    fn is_write(&self) -> bool {
        !matches!(self, PersistRequest::Load { .. })
    }
}

#[derive(Debug)]
pub enum PersistEvent {
    Loaded { key: String, bytes: Option<Vec<u8>> },
    Saved { key: String },
    Failed { key: String, error: NotesError },
}

pub struct PersistWorker {
    request_sender: Sender<PersistRequest>,
    event_receiver: Receiver<PersistEvent>,
    thread_handle: JoinHandle<()>,
}

impl PersistWorker {
    pub fn spawn(store: Box<dyn KeyValueStore>) -> io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<PersistRequest>();
        let (event_tx, event_rx) = mpsc::channel::<PersistEvent>();

        let thread_handle = thread::Builder::new()
            .name("persist-worker".into())
            .spawn(move || {
                worker_thread_loop(store, request_rx, event_tx);
            })?;

        Ok(Self {
            request_sender: request_tx,
            event_receiver: event_rx,
            thread_handle,
        })
    }

    pub fn load(&self, key: &str) {
        self.send(PersistRequest::Load { key: key.to_string() });
    }

    pub fn save(&self, key: &str, bytes: Vec<u8>) {
        self.send(PersistRequest::Save {
            key: key.to_string(),
            bytes,
        });
    }

    pub fn remove(&self, key: &str) {
        self.send(PersistRequest::Remove { key: key.to_string() });
    }

    fn send(&self, request: PersistRequest) {
        if self.request_sender.send(request).is_err() {
            log::error!("persist worker is gone, request dropped");
        }
    }

    #[inline]
    pub fn try_recv(&self) -> Option<PersistEvent> {
        match self.event_receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<PersistEvent> {
        self.event_receiver.recv_timeout(timeout).ok()
    }

    /// Lets the queue drain, joins the thread and returns the events nobody
    /// polled for.
    pub fn shutdown(self) -> Vec<PersistEvent> {
        let Self {
            request_sender,
            event_receiver,
            thread_handle,
        } = self;
        drop(request_sender);
        if thread_handle.join().is_err() {
            log::error!("persist worker panicked");
        }
        event_receiver.try_iter().collect()
    }
}

fn worker_thread_loop(
    mut store: Box<dyn KeyValueStore>,
    receiver: Receiver<PersistRequest>,
    sender: Sender<PersistEvent>,
) {
    while let Ok(request) = receiver.recv() {
        let mut batch = vec![request];
        while let Ok(newer) = receiver.try_recv() {
            batch.push(newer);
        }

        for (i, request) in batch.iter().enumerate() {
            // Skip a write when the next request for the same key overwrites it.
            let superseded = request.is_write()
                && batch[i + 1..]
                    .iter()
                    .find(|later| later.key() == request.key())
                    .is_some_and(PersistRequest::is_write);
            if superseded {
                continue;
            }

            if sender.send(execute(store.as_mut(), request)).is_err() {
                return;
            }
        }
    }
}

fn execute(store: &mut dyn KeyValueStore, request: &PersistRequest) -> PersistEvent {
    let key = request.key().to_string();
    let result = match request {
        PersistRequest::Load { key: k } => store.get(k).map(Some),
        PersistRequest::Save { key: k, bytes } => store.set(k, bytes).map(|()| None),
        PersistRequest::Remove { key: k } => store.remove(k).map(|()| None),
    };
    match (result, request.is_write()) {
        (Ok(Some(bytes)), false) => PersistEvent::Loaded { key, bytes },
        (Ok(_), _) => PersistEvent::Saved { key },
        (Err(error), _) => PersistEvent::Failed { key, error },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let worker = PersistWorker::spawn(Box::new(store.clone())).unwrap();

        worker.save("notes", vec![1, 2, 3]);
        assert!(matches!(worker.recv_timeout(WAIT), Some(PersistEvent::Saved { .. })));

        worker.load("notes");
        match worker.recv_timeout(WAIT) {
            Some(PersistEvent::Loaded { key, bytes }) => {
                assert_eq!(key, "notes");
                assert_eq!(bytes, Some(vec![1, 2, 3]));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(store.get("notes").unwrap(), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_failures_are_reported() {
        let worker = PersistWorker::spawn(Box::new(MemoryStore::unavailable())).unwrap();
        worker.save("bgOffset", vec![0]);
        match worker.recv_timeout(WAIT) {
            Some(PersistEvent::Failed { key, error }) => {
                assert_eq!(key, "bgOffset");
                assert!(matches!(error, NotesError::StoreUnavailable { .. }));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_last_write_wins() {
        let store = MemoryStore::new();
        let worker = PersistWorker::spawn(Box::new(store.clone())).unwrap();
        for i in 0..50u8 {
            worker.save("notes", vec![i]);
        }
        worker.load("notes");

        loop {
            match worker.recv_timeout(WAIT) {
                Some(PersistEvent::Loaded { bytes, .. }) => {
                    assert_eq!(bytes, Some(vec![49]));
                    break;
                }
                Some(_) => continue,
                None => panic!("worker went quiet"),
            }
        }
    }

    #[test]
    fn test_shutdown_flushes_queue() {
        let store = MemoryStore::new();
        let worker = PersistWorker::spawn(Box::new(store.clone())).unwrap();
        worker.save("notes", vec![7]);
        worker.save("bgOffset", vec![8]);
        worker.remove("bgImage");

        let leftover = worker.shutdown();
        assert!(leftover
            .iter()
            .all(|e| matches!(e, PersistEvent::Saved { .. })));
        assert_eq!(store.get("notes").unwrap(), Some(vec![7]));
        assert_eq!(store.get("bgOffset").unwrap(), Some(vec![8]));
    }

    #[test]
    fn test_missing_key_loads_none() {
        let worker = PersistWorker::spawn(Box::new(MemoryStore::new())).unwrap();
        worker.load("bgImage");
        assert!(matches!(
            worker.recv_timeout(WAIT),
            Some(PersistEvent::Loaded { bytes: None, .. })
        ));
    }
}
