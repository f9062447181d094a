use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::motion::Millis;

/// Smallest period accepted for repeating tasks
const MIN_PERIOD_MS: Millis = 1.0;

/// Handle for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Due time with a total order so it can key a BTreeMap
#[derive(Debug, Clone, Copy)]
struct Due(Millis);

impl PartialEq for Due {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Due {}

impl PartialOrd for Due {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Due {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Ordering key: due time first, then scheduling order for ties
type Key = (Due, u64);

#[derive(Debug, Clone)]
struct Entry<J> {
    id: TaskId,
    period: Option<Millis>,
    job: J,
}

/// A task that became due
#[derive(Debug, Clone, PartialEq)]
pub struct DueTask<J> {
    pub id: TaskId,
    pub due: Millis,
    pub job: J,
}

/// Cancellable timer queue plus a per-frame coalescing flag
///
/// Jobs are plain values. The owner pops due tasks one at a time and runs
/// them, so a running job may cancel or schedule other tasks in between.
#[derive(Debug, Clone)]
pub struct TaskQueue<J> {
    next_id: u64,
    next_seq: u64,
    entries: BTreeMap<Key, Entry<J>>,
    index: HashMap<TaskId, Key>,
    frame_requested: bool,
}

impl<J> Default for TaskQueue<J> {
    fn default() -> Self {
        Self {
            next_id: 1,
            next_seq: 0,
            entries: BTreeMap::new(),
            index: HashMap::new(),
            frame_requested: false,
        }
    }
}

impl<J: Clone> TaskQueue<J> {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, id: TaskId, due: Millis, period: Option<Millis>, job: J) {
        let key = (Due(due), self.next_seq);
        self.next_seq += 1;
        self.entries.insert(key, Entry { id, period, job });
        self.index.insert(id, key);
    }

    fn allocate(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Run `job` once, `delay` ms after `now`
    pub fn schedule(&mut self, now: Millis, delay: Millis, job: J) -> TaskId {
        let id = self.allocate();
        self.insert(id, now + delay.max(0.0), None, job);
        id
    }

    /// Run `job` every `period` ms, first at `now + period`
    pub fn schedule_interval(&mut self, now: Millis, period: Millis, job: J) -> TaskId {
        let period = period.max(MIN_PERIOD_MS);
        let id = self.allocate();
        self.insert(id, now + period, Some(period), job);
        id
    }

    /// Cancel `slot`'s task (if any) and schedule a fresh one in its place
    pub fn reschedule(&mut self, slot: &mut Option<TaskId>, now: Millis, delay: Millis, job: J) {
        if let Some(id) = slot.take() {
            self.cancel(id);
        }
        *slot = Some(self.schedule(now, delay, job));
    }

    /// Cancel a task. Cancelling an unknown or finished task is a no-op.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        match self.index.remove(&id) {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.index.contains_key(&id)
    }

    /// Pop the earliest task due at or before `now`
    ///
    /// Repeating tasks are re-armed one period later before being returned.
    pub fn pop_due(&mut self, now: Millis) -> Option<DueTask<J>> {
        let (key, _) = self.entries.first_key_value()?;
        if key.0 .0 > now {
            return None;
        }
        self.pop_next()
    }

    /// Pop the earliest task regardless of time
    pub fn pop_next(&mut self) -> Option<DueTask<J>> {
        let (key, entry) = self.entries.pop_first()?;
        let due = key.0 .0;
        self.index.remove(&entry.id);

        if let Some(period) = entry.period {
            self.insert(entry.id, due + period, Some(period), entry.job.clone());
        }

        Some(DueTask {
            id: entry.id,
            due,
            job: entry.job,
        })
    }

    /// Earliest due time, if anything is scheduled
    pub fn next_deadline(&self) -> Option<Millis> {
        self.entries.first_key_value().map(|(key, _)| key.0 .0)
    }

    /// Pending jobs in due order
    pub fn pending(&self) -> impl Iterator<Item = (TaskId, Millis, &J)> {
        self.entries
            .iter()
            .map(|(key, entry)| (entry.id, key.0 .0, &entry.job))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discard every pending task and the frame request; returns how many
    /// tasks were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.entries.len();
        self.entries.clear();
        self.index.clear();
        self.frame_requested = false;
        dropped
    }

    /// Request a frame pass. Returns false if one was already pending.
    pub fn request_frame(&mut self) -> bool {
        if self.frame_requested {
            return false;
        }
        self.frame_requested = true;
        true
    }

    /// Consume the pending frame request
    pub fn take_frame_request(&mut self) -> bool {
        std::mem::take(&mut self.frame_requested)
    }

    #[inline]
    pub fn frame_requested(&self) -> bool {
        self.frame_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_order_and_ties() {
        let mut q = TaskQueue::new();
        q.schedule(0.0, 200.0, "c");
        q.schedule(0.0, 100.0, "a");
        q.schedule(0.0, 100.0, "b");

        assert!(q.pop_due(99.0).is_none());
        assert_eq!(q.pop_due(150.0).unwrap().job, "a");
        assert_eq!(q.pop_due(150.0).unwrap().job, "b");
        assert!(q.pop_due(150.0).is_none());
        assert_eq!(q.pop_due(200.0).unwrap().job, "c");
        assert!(q.is_empty());
    }

    #[test]
    fn test_cancel() {
        let mut q = TaskQueue::new();
        let a = q.schedule(0.0, 10.0, 1);
        let b = q.schedule(0.0, 20.0, 2);
        assert!(q.cancel(a));
        assert!(!q.cancel(a));
        assert!(!q.is_pending(a));
        assert!(q.is_pending(b));
        assert_eq!(q.pop_due(100.0).unwrap().job, 2);
    }

    #[test]
    fn test_interval_rearms_until_cancelled() {
        let mut q = TaskQueue::new();
        let id = q.schedule_interval(0.0, 50.0, "tick");
        let mut fired = Vec::new();
        while let Some(task) = q.pop_due(175.0) {
            fired.push(task.due);
        }
        assert_eq!(fired, vec![50.0, 100.0, 150.0]);
        assert_eq!(q.next_deadline(), Some(200.0));
        assert!(q.cancel(id));
        assert!(q.is_empty());
    }

    #[test]
    fn test_reschedule_replaces() {
        let mut q = TaskQueue::new();
        let mut slot = None;
        q.reschedule(&mut slot, 0.0, 250.0, "resize");
        q.reschedule(&mut slot, 100.0, 250.0, "resize");
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_deadline(), Some(350.0));
    }

    #[test]
    fn test_frame_request_coalesces() {
        let mut q: TaskQueue<()> = TaskQueue::new();
        assert!(q.request_frame());
        assert!(!q.request_frame());
        assert!(q.take_frame_request());
        assert!(!q.take_frame_request());
    }

    #[test]
    fn test_clear() {
        let mut q = TaskQueue::new();
        q.schedule(0.0, 1.0, ());
        q.schedule_interval(0.0, 5.0, ());
        q.request_frame();
        assert_eq!(q.clear(), 2);
        assert!(q.is_empty());
        assert!(!q.frame_requested());
    }
}
