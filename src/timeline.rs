//! Pure timeline state machine. No I/O and no timers: every operation returns
//! a [`Transition`] that the caller carries out.

use crate::errors::TimelineError;
use crate::models::{DateSequence, PlaybackStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub date: String,
    pub token: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimerCommand {
    #[default]
    Keep,
    Start,
    Stop,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    pub fetch: Option<FetchRequest>,
    pub timer: TimerCommand,
}

#[derive(Debug, Clone, Default)]
pub struct TimelineState {
    dates: DateSequence,
    current_index: usize,
    playback: PlaybackStatus,
    pending_token: u64,
}

impl TimelineState {
    pub fn new(dates: DateSequence) -> Self {
        Self {
            dates,
            ..Self::default()
        }
    }

    pub fn dates(&self) -> &DateSequence {
        &self.dates
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_date(&self) -> Option<&str> {
        self.dates.get(self.current_index)
    }

    pub fn playback(&self) -> PlaybackStatus {
        self.playback
    }

    pub fn pending_token(&self) -> u64 {
        self.pending_token
    }

    pub fn slider_max(&self) -> usize {
        self.dates.last_index().unwrap_or(0)
    }

    /// Whether a completed fetch was issued under the newest token.
    pub fn accepts(&self, token: u64) -> bool {
        token == self.pending_token
    }

    pub fn refresh(&mut self) -> Transition {
        Transition {
            fetch: self.issue_fetch(),
            timer: TimerCommand::Keep,
        }
    }

    /// Manual scrub. Playback is stopped first.
    pub fn seek(&mut self, index: usize) -> Result<Transition, TimelineError> {
        if self.dates.is_empty() {
            return Err(TimelineError::Empty);
        }
        if index >= self.dates.len() {
            return Err(TimelineError::IndexOutOfRange {
                index,
                len: self.dates.len(),
            });
        }

        let timer = self.stop();
        self.current_index = index;
        Ok(Transition {
            fetch: self.issue_fetch(),
            timer,
        })
    }

    pub fn seek_date(&mut self, date: &str) -> Result<Transition, TimelineError> {
        let index = self
            .dates
            .position(date)
            .ok_or_else(|| TimelineError::UnknownDate {
                date: date.to_string(),
            })?;
        self.seek(index)
    }

    /// Starting at the last date leaves playback stopped.
    pub fn play(&mut self) -> Transition {
        let at_end = self
            .dates
            .last_index()
            .is_none_or(|last| self.current_index >= last);
        if self.playback == PlaybackStatus::Playing || at_end {
            return Transition::default();
        }

        self.playback = PlaybackStatus::Playing;
        Transition {
            fetch: None,
            timer: TimerCommand::Start,
        }
    }

    pub fn pause(&mut self) -> Transition {
        Transition {
            fetch: None,
            timer: self.stop(),
        }
    }

    pub fn toggle(&mut self) -> Transition {
        match self.playback {
            PlaybackStatus::Playing => self.pause(),
            PlaybackStatus::Stopped => self.play(),
        }
    }

    /// One playback tick: advance a date, stopping on arrival at the last one.
    pub fn tick(&mut self) -> Transition {
        if self.playback != PlaybackStatus::Playing {
            return Transition::default();
        }
        let Some(last) = self.dates.last_index() else {
            return self.pause();
        };
        if self.current_index >= last {
            return self.pause();
        }

        self.current_index += 1;
        let fetch = self.issue_fetch();
        let timer = if self.current_index == last {
            self.stop()
        } else {
            TimerCommand::Keep
        };
        Transition { fetch, timer }
    }

    fn stop(&mut self) -> TimerCommand {
        match self.playback {
            PlaybackStatus::Playing => {
                self.playback = PlaybackStatus::Stopped;
                TimerCommand::Stop
            }
            PlaybackStatus::Stopped => TimerCommand::Keep,
        }
    }

    fn issue_fetch(&mut self) -> Option<FetchRequest> {
        let date = self.dates.get(self.current_index)?.to_string();
        self.pending_token += 1;
        Some(FetchRequest {
            date,
            token: self.pending_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(len: usize) -> TimelineState {
        let dates = (1..=len).map(|day| format!("2021-01-{day:02}")).collect();
        TimelineState::new(DateSequence::new(dates))
    }

    #[test]
    fn starts_at_first_date() {
        let state = timeline(5);
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.slider_max(), 4);
        assert_eq!(state.current_date(), Some("2021-01-01"));
        assert_eq!(state.playback(), PlaybackStatus::Stopped);
    }

    #[test]
    fn every_index_change_issues_a_newer_token() {
        let mut state = timeline(3);
        let first = state.refresh().fetch.unwrap();
        let second = state.seek(2).unwrap().fetch.unwrap();
        assert!(second.token > first.token);
        assert_eq!(second.date, "2021-01-03");
        assert!(state.accepts(second.token));
        assert!(!state.accepts(first.token));
    }

    #[test]
    fn seek_while_playing_stops_playback() {
        let mut state = timeline(3);
        assert_eq!(state.play().timer, TimerCommand::Start);
        let transition = state.seek(1).unwrap();
        assert_eq!(transition.timer, TimerCommand::Stop);
        assert_eq!(state.playback(), PlaybackStatus::Stopped);
    }

    #[test]
    fn seek_rejects_out_of_range_and_unknown_dates() {
        let mut state = timeline(2);
        assert_eq!(
            state.seek(2),
            Err(TimelineError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert!(matches!(
            state.seek_date("2022-01-01"),
            Err(TimelineError::UnknownDate { .. })
        ));
        assert_eq!(state.current_index(), 0);
        assert_eq!(state.pending_token(), 0);
        assert_eq!(timeline(0).seek(0), Err(TimelineError::Empty));
    }

    #[test]
    fn play_and_pause_are_idempotent() {
        let mut state = timeline(3);
        assert_eq!(state.play().timer, TimerCommand::Start);
        assert_eq!(state.play(), Transition::default());
        assert_eq!(state.pause().timer, TimerCommand::Stop);
        assert_eq!(state.pause(), Transition::default());
    }

    #[test]
    fn ticks_stop_on_reaching_last_date() {
        let mut state = timeline(4);
        state.play();
        let mut ticks = 0;
        while state.playback() == PlaybackStatus::Playing {
            let transition = state.tick();
            assert!(transition.fetch.is_some());
            ticks += 1;
        }
        assert_eq!(ticks, 3);
        assert_eq!(state.current_index(), 3);
        assert_eq!(state.tick(), Transition::default());
    }

    #[test]
    fn play_at_last_date_stays_stopped() {
        let mut state = timeline(2);
        state.seek(1).unwrap();
        assert_eq!(state.play(), Transition::default());
        assert_eq!(state.playback(), PlaybackStatus::Stopped);
        assert_eq!(timeline(1).play(), Transition::default());
    }
}
