use crate::backend::RiskBackend;
use crate::catalog;
use crate::errors::TimelineError;
use crate::fetcher::{DataFetcher, FetchOutcome};
use crate::models::{Dataset, LayerRequest, LayerVisibility, StatsSummary, ViewResponse};
use crate::overlay::OverlayLayer;
use crate::playback::PlaybackController;
use crate::stats::compute_stats;
use crate::timeline::{TimelineState, TimerCommand, Transition};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Everything the viewer shows, owned in one place.
pub struct Viewer {
    catalog_error: Option<String>,
    timeline: TimelineState,
    playback: PlaybackController,
    overlay: OverlayLayer,
    dataset: Option<Dataset>,
    stats: Option<StatsSummary>,
    layers: LayerVisibility,
    fetch_error: Option<String>,
    loading: bool,
}

impl Viewer {
    fn new(period: Duration) -> Self {
        Self {
            catalog_error: None,
            timeline: TimelineState::default(),
            playback: PlaybackController::new(period),
            overlay: OverlayLayer::default(),
            dataset: None,
            stats: None,
            layers: LayerVisibility::default(),
            fetch_error: None,
            loading: false,
        }
    }

    fn ensure_enabled(&self) -> Result<(), TimelineError> {
        if let Some(reason) = &self.catalog_error {
            return Err(TimelineError::Disabled {
                reason: reason.clone(),
            });
        }
        if self.timeline.dates().is_empty() {
            return Err(TimelineError::Empty);
        }
        Ok(())
    }

    /// Applies a finished fetch if it is still the newest one.
    fn apply_outcome(&mut self, outcome: FetchOutcome) {
        if !self.timeline.accepts(outcome.token) {
            debug!(
                "discarding snapshot for {} (token {}, pending {})",
                outcome.date,
                outcome.token,
                self.timeline.pending_token()
            );
            return;
        }

        self.loading = false;
        match outcome.result {
            Ok(dataset) => {
                self.overlay.render(&dataset, self.layers);
                self.stats = Some(compute_stats(&dataset));
                self.fetch_error = None;
                debug!(
                    "rendered {} features for {} (revision {})",
                    dataset.features.len(),
                    dataset.date,
                    self.overlay.revision()
                );
                self.dataset = Some(dataset);
            }
            Err(err) => {
                warn!("keeping previous overlay: {err}");
                self.fetch_error = Some(format!("Error loading {}", outcome.date));
            }
        }
    }

    fn view(&self) -> ViewResponse {
        let current_date = self.timeline.current_date().map(str::to_string);
        let date_label = match (&self.catalog_error, &current_date) {
            (Some(_), _) => "Timeline unavailable".to_string(),
            (None, Some(date)) => date.clone(),
            (None, None) => "No dates available".to_string(),
        };
        let playback = self.timeline.playback();

        ViewResponse {
            enabled: self.catalog_error.is_none(),
            timeline_visible: self.ensure_enabled().is_ok(),
            catalog_error: self.catalog_error.clone(),
            date_count: self.timeline.dates().len(),
            slider_max: self.timeline.slider_max(),
            current_index: self.timeline.current_index(),
            current_date,
            date_label,
            playback,
            playback_glyph: playback.glyph().to_string(),
            loading: self.loading,
            fetch_error: self.fetch_error.clone(),
            rendered_date: self.overlay.rendered_date().map(str::to_string),
            overlay_revision: self.overlay.revision(),
            stats: self.stats.clone(),
            layers: self.layers,
            shapes: self.overlay.shapes().to_vec(),
        }
    }
}

/// Single entry point for everything that changes the current date.
#[derive(Clone)]
pub struct TimelineSync {
    viewer: Arc<Mutex<Viewer>>,
    fetcher: DataFetcher,
}

impl TimelineSync {
    /// Loads the catalog and requests the first date. A catalog failure
    /// leaves the viewer disabled rather than failing.
    pub async fn start(backend: Arc<dyn RiskBackend>, period: Duration) -> Self {
        let fetcher = DataFetcher::new(backend);
        let mut viewer = Viewer::new(period);

        match catalog::load_dates(fetcher.backend()).await {
            Ok(dates) => viewer.timeline = TimelineState::new(dates),
            Err(err) => {
                error!("date catalog unavailable, timeline disabled: {err}");
                viewer.catalog_error = Some(err.to_string());
            }
        }

        let sync = Self {
            viewer: Arc::new(Mutex::new(viewer)),
            fetcher,
        };
        {
            let mut viewer = sync.viewer.lock().await;
            let transition = viewer.timeline.refresh();
            sync.dispatch(&mut viewer, transition);
        }
        sync
    }

    pub async fn view(&self) -> ViewResponse {
        self.viewer.lock().await.view()
    }

    pub async fn seek(&self, index: usize) -> Result<ViewResponse, TimelineError> {
        self.update(|timeline| timeline.seek(index)).await
    }

    pub async fn select_date(&self, date: &str) -> Result<ViewResponse, TimelineError> {
        self.update(|timeline| timeline.seek_date(date)).await
    }

    pub async fn play(&self) -> Result<ViewResponse, TimelineError> {
        self.update(|timeline| Ok(timeline.play())).await
    }

    pub async fn pause(&self) -> Result<ViewResponse, TimelineError> {
        self.update(|timeline| Ok(timeline.pause())).await
    }

    pub async fn toggle(&self) -> Result<ViewResponse, TimelineError> {
        self.update(|timeline| Ok(timeline.toggle())).await
    }

    /// Checkbox changes redraw the retained dataset; nothing is refetched.
    pub async fn set_layers(&self, request: LayerRequest) -> Result<ViewResponse, TimelineError> {
        let mut viewer = self.viewer.lock().await;
        viewer.ensure_enabled()?;
        let viewer = &mut *viewer;
        if let Some(actual) = request.actual {
            viewer.layers.actual = actual;
        }
        if let Some(predicted) = request.predicted {
            viewer.layers.predicted = predicted;
        }
        if let Some(dataset) = &viewer.dataset {
            viewer.overlay.render(dataset, viewer.layers);
        }
        Ok(viewer.view())
    }

    /// Viewer teardown: releases the playback timer.
    pub async fn shutdown(&self) {
        let mut viewer = self.viewer.lock().await;
        let transition = viewer.timeline.pause();
        self.dispatch(&mut viewer, transition);
        viewer.playback.stop();
        info!("viewer shut down");
    }

    pub async fn active_timers(&self) -> usize {
        self.viewer.lock().await.playback.active_timers()
    }

    async fn update<F>(&self, step: F) -> Result<ViewResponse, TimelineError>
    where
        F: FnOnce(&mut TimelineState) -> Result<Transition, TimelineError>,
    {
        let mut viewer = self.viewer.lock().await;
        viewer.ensure_enabled()?;
        let transition = step(&mut viewer.timeline)?;
        self.dispatch(&mut viewer, transition);
        Ok(viewer.view())
    }

    fn dispatch(&self, viewer: &mut Viewer, transition: Transition) {
        match transition.timer {
            TimerCommand::Start => self.start_timer(viewer),
            TimerCommand::Stop => {
                viewer.playback.stop();
            }
            TimerCommand::Keep => {}
        }

        if let Some(request) = transition.fetch {
            viewer.loading = true;
            viewer.fetch_error = None;
            let sync = self.clone();
            tokio::spawn(async move {
                let outcome = sync
                    .fetcher
                    .fetch_snapshot(request.date, request.token)
                    .await;
                sync.complete(outcome).await;
            });
        }
    }

    fn start_timer(&self, viewer: &mut Viewer) {
        let handle = Arc::downgrade(&self.viewer);
        let fetcher = self.fetcher.clone();
        viewer.playback.start(move |generation| {
            let sync = handle.upgrade().map(|viewer| TimelineSync {
                viewer,
                fetcher: fetcher.clone(),
            });
            async move {
                match sync {
                    Some(sync) => sync.tick(generation).await,
                    None => false,
                }
            }
        });
    }

    async fn tick(&self, generation: u64) -> bool {
        let mut viewer = self.viewer.lock().await;
        if !viewer.playback.is_current(generation) {
            debug!("ignoring tick from stopped timer {generation}");
            return false;
        }

        let transition = viewer.timeline.tick();
        let keep_running = transition.timer != TimerCommand::Stop;
        debug!(
            "tick {generation}: index {}",
            viewer.timeline.current_index()
        );
        self.dispatch(&mut viewer, transition);
        keep_running
    }

    async fn complete(&self, outcome: FetchOutcome) {
        self.viewer.lock().await.apply_outcome(outcome);
    }
}
