use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

struct Timer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Owns the single periodic playback timer.
///
/// Each timer is tagged with a generation; the tick callback receives it so a
/// tick racing with `stop` can be recognised and ignored.
pub struct PlaybackController {
    period: Duration,
    generation: u64,
    timer: Option<Timer>,
}

impl PlaybackController {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            generation: 0,
            timer: None,
        }
    }

    /// Spawns the timer unless one is already live. The first tick fires one
    /// period after start; the timer ends when `on_tick` resolves to `false`.
    pub fn start<F, Fut>(&mut self, mut on_tick: F)
    where
        F: FnMut(u64) -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        if self.active_timers() > 0 {
            return;
        }
        self.stop();

        self.generation += 1;
        let generation = self.generation;
        let period = self.period;
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !on_tick(generation).await {
                    break;
                }
            }
            debug!("playback timer {generation} finished");
        });

        debug!("playback timer {generation} started ({period:?})");
        self.timer = Some(Timer { generation, handle });
    }

    /// Cancels the live timer. Returns whether there was one.
    pub fn stop(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) => {
                timer.handle.abort();
                debug!("playback timer {} stopped", timer.generation);
                true
            }
            None => false,
        }
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.timer
            .as_ref()
            .is_some_and(|timer| timer.generation == generation)
    }

    pub fn active_timers(&self) -> usize {
        usize::from(
            self.timer
                .as_ref()
                .is_some_and(|timer| !timer.handle.is_finished()),
        )
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.stop();
    }
}
