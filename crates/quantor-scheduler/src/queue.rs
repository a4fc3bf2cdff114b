use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

/// Async FIFO queue carrying job ids only. Cloning shares the same
/// underlying channel, so the HTTP handler that enqueues a job and the
/// scheduler loop that dequeues it can each hold their own handle.
#[derive(Clone)]
pub struct JobQueue {
    sender: mpsc::UnboundedSender<Uuid>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Uuid>>>,
}

impl JobQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    pub fn put(&self, job_id: Uuid) {
        // The receiver is held for the scheduler's lifetime, so this only
        // fails if every clone of `self` has already been dropped.
        let _ = self.sender.send(job_id);
    }

    pub async fn get(&self) -> Option<Uuid> {
        self.receiver.lock().await.recv().await
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_returns_ids_in_fifo_order() {
        let queue = JobQueue::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        queue.put(a);
        queue.put(b);

        assert_eq!(queue.get().await, Some(a));
        assert_eq!(queue.get().await, Some(b));
    }

    #[tokio::test]
    async fn clones_share_the_same_queue() {
        let queue = JobQueue::new();
        let producer = queue.clone();
        let id = Uuid::new_v4();
        producer.put(id);
        assert_eq!(queue.get().await, Some(id));
    }
}
