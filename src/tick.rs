//! Tick timing
//!
//! Interval timers and a small task scheduler for effects that resume on a
//! future tick (validation passes, reload and respawn delays). Everything
//! is driven by the host's frame loop; tasks are bounded and cancellable,
//! there are no free-running waits.

use std::time::Duration;

/// Fires at a fixed interval as the host feeds it frame deltas
#[derive(Debug, Clone)]
pub struct TickTimer {
    /// Interval between fires (in seconds)
    interval: f32,
    /// Time since last fire
    since_last: f32,
    /// Total elapsed time in seconds
    elapsed: f32,
}

impl TickTimer {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            since_last: 0.0,
            elapsed: 0.0,
        }
    }

    /// Advance time and return true if the interval elapsed
    pub fn update(&mut self, delta: Duration) -> bool {
        let delta_secs = delta.as_secs_f32();
        self.elapsed += delta_secs;
        self.since_last += delta_secs;

        if self.since_last >= self.interval {
            self.since_last -= self.interval;
            true
        } else {
            false
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Get total elapsed time
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Reset the timer
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.since_last = 0.0;
    }
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Handle for a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

#[derive(Debug)]
struct Task {
    id: TaskId,
    remaining: f32,
    /// Some(interval) for repeating tasks
    repeat: Option<f32>,
}

/// Host-driven task scheduler. The host calls `advance` once per tick and
/// runs whatever came due; tasks hold no callbacks and cannot outlive an
/// explicit `cancel`.
#[derive(Debug, Default)]
pub struct TickScheduler {
    tasks: Vec<Task>,
    next_id: u64,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    /// Schedule a one-shot task
    pub fn schedule_in(&mut self, delay: Duration) -> TaskId {
        self.push_task(delay.as_secs_f32(), None)
    }

    /// Schedule a repeating task
    pub fn schedule_repeating(&mut self, interval: Duration) -> TaskId {
        let secs = interval.as_secs_f32();
        self.push_task(secs, Some(secs))
    }

    fn push_task(&mut self, delay: f32, repeat: Option<f32>) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            remaining: delay,
            repeat,
        });
        id
    }

    /// Cancel a task; returns false if it was not scheduled
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Advance all tasks and return those that came due, in schedule order.
    /// One-shot tasks are removed; repeating tasks fire at most once per
    /// advance and keep their remainder.
    pub fn advance(&mut self, delta: Duration) -> Vec<TaskId> {
        let delta_secs = delta.as_secs_f32();
        let mut due = Vec::new();
        for task in &mut self.tasks {
            task.remaining -= delta_secs;
            if task.remaining <= 0.0 {
                due.push(task.id);
                if let Some(interval) = task.repeat {
                    task.remaining += interval;
                }
            }
        }
        self.tasks.retain(|t| t.repeat.is_some() || !due.contains(&t.id));
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_fires_on_interval() {
        let mut timer = TickTimer::new(1.0);
        assert!(!timer.update(Duration::from_millis(400)));
        assert!(!timer.update(Duration::from_millis(400)));
        assert!(timer.update(Duration::from_millis(400)));
        // Remainder carries over
        assert!(timer.update(Duration::from_millis(800)));
    }

    #[test]
    fn test_timer_reset() {
        let mut timer = TickTimer::new(1.0);
        timer.update(Duration::from_millis(900));
        timer.reset();
        assert!(!timer.update(Duration::from_millis(500)));
        assert_eq!(timer.elapsed(), 0.5);
    }

    #[test]
    fn test_one_shot_task() {
        let mut scheduler = TickScheduler::new();
        let id = scheduler.schedule_in(Duration::from_secs(2));

        assert!(scheduler.advance(Duration::from_secs(1)).is_empty());
        assert_eq!(scheduler.advance(Duration::from_secs(1)), vec![id]);
        assert!(!scheduler.is_scheduled(id));
    }

    #[test]
    fn test_repeating_task() {
        let mut scheduler = TickScheduler::new();
        let id = scheduler.schedule_repeating(Duration::from_secs(1));

        assert_eq!(scheduler.advance(Duration::from_secs(1)), vec![id]);
        assert_eq!(scheduler.advance(Duration::from_secs(1)), vec![id]);
        assert!(scheduler.is_scheduled(id));
    }

    #[test]
    fn test_cancel() {
        let mut scheduler = TickScheduler::new();
        let id = scheduler.schedule_repeating(Duration::from_secs(1));

        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));
        assert!(scheduler.advance(Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn test_multiple_tasks_fire_in_schedule_order() {
        let mut scheduler = TickScheduler::new();
        let first = scheduler.schedule_in(Duration::from_secs(1));
        let second = scheduler.schedule_in(Duration::from_secs(1));

        assert_eq!(scheduler.advance(Duration::from_secs(1)), vec![first, second]);
        assert!(scheduler.is_empty());
    }
}
