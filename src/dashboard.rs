//! The dashboard: one context object owning the queue, both controllers,
//! the sources and the renderer, driven by a single `select!` loop.
//!
//! Fetches run on spawned tasks and come back through a [`JoinSet`] tagged
//! with their [`FetchTicket`]. Every other state change happens on the loop
//! itself, so a rebuild, its cursor clamp and the following render are
//! never interleaved with anything else.

use crate::clock::Clock;
use crate::config::BoardConfig;
use crate::error::{BoardError, Result};
use crate::input::InputEvent;
use crate::item::{Card, Photo, goal_cards};
use crate::photos::{JsonlPhotoStore, PhotoStore};
use crate::queue::RotationQueue;
use crate::refresh::{FetchTicket, GestureAction, RefreshController, RefreshOutcome, RefreshSettings};
use crate::render::Renderer;
use crate::rotation::{Direction, RotationController};
use crate::source::{CardSource, TrelloSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Clock readout refresh period.
const CLOCK_PERIOD: Duration = Duration::from_secs(1);

/// Timing and content settings for a [`Dashboard`].
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub tick_period: Duration,
    pub refresh: RefreshSettings,
    pub clock_utc_offset_hours: i32,
    /// Goal texts, used only when there is no card source.
    pub goals: Vec<String>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(10),
            refresh: RefreshSettings::default(),
            clock_utc_offset_hours: 7,
            goals: Vec::new(),
        }
    }
}

impl DashboardSettings {
    pub fn from_config(config: &BoardConfig) -> Self {
        Self {
            tick_period: config.tick_period(),
            refresh: config.refresh_settings(),
            clock_utc_offset_hours: config.display.clock_utc_offset_hours,
            goals: config.goals.clone(),
        }
    }
}

/// Result of one background refresh.
struct FetchCompletion {
    ticket: FetchTicket,
    /// `None` when there is no card source.
    cards: Option<Result<Vec<Card>>>,
    photos: Result<Vec<Photo>>,
}

pub struct Dashboard<R: Renderer> {
    queue: RotationQueue,
    rotation: RotationController,
    refresh: RefreshController,
    source: Option<Arc<dyn CardSource>>,
    photos: Arc<dyn PhotoStore>,
    goals: Vec<String>,
    clock: Clock,
    renderer: R,
    fetches: JoinSet<FetchCompletion>,
    started: bool,
}

impl<R: Renderer> Dashboard<R> {
    pub fn new(
        settings: DashboardSettings,
        source: Option<Arc<dyn CardSource>>,
        photos: Arc<dyn PhotoStore>,
        renderer: R,
    ) -> Result<Self> {
        Ok(Self {
            queue: RotationQueue::new(),
            rotation: RotationController::new(settings.tick_period),
            refresh: RefreshController::new(settings.refresh, source.is_some()),
            source,
            photos,
            goals: settings.goals,
            clock: Clock::new(settings.clock_utc_offset_hours)?,
            renderer,
            fetches: JoinSet::new(),
            started: false,
        })
    }

    /// Build a dashboard from loaded configuration: a Trello source when
    /// credentials are present, and the JSONL photo store.
    pub fn from_config(config: &BoardConfig, renderer: R) -> Result<Self> {
        let source: Option<Arc<dyn CardSource>> = match config.trello_config() {
            Some(trello) => Some(Arc::new(TrelloSource::new(trello)?)),
            None => None,
        };
        let photos: Arc<dyn PhotoStore> = Arc::new(JsonlPhotoStore::new(config.photos_path()));
        Self::new(DashboardSettings::from_config(config), source, photos, renderer)
    }

    pub fn queue(&self) -> &RotationQueue {
        &self.queue
    }

    pub fn rotation(&self) -> &RotationController {
        &self.rotation
    }

    pub fn refresh(&self) -> &RefreshController {
        &self.refresh
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Load both sources, render the first item, start rotating and arm
    /// auto-refresh if it is on by default. A failing source starts empty.
    pub async fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let photos = match load_photos(Arc::clone(&self.photos)).await {
            Ok(photos) => photos,
            Err(e) => {
                warn!("photo store unavailable at startup: {e}");
                Vec::new()
            }
        };

        let cards = match &self.source {
            Some(source) => {
                let ticket = self.refresh.begin_refresh();
                match self.refresh.complete(ticket, source.fetch().await) {
                    RefreshOutcome::Apply(cards) => cards,
                    _ => {
                        self.renderer
                            .render_notice("Could not load cards; retrying on next refresh");
                        Vec::new()
                    }
                }
            }
            None => goal_cards(&self.goals),
        };

        info!(cards = cards.len(), photos = photos.len(), "dashboard starting");
        self.queue.replace(Some(cards), Some(photos));

        let now = Instant::now();
        self.render_current();
        self.renderer.render_auto_refresh(self.refresh.is_enabled());
        self.rotation.start(&self.queue, now);
        if self.refresh.is_enabled() {
            self.refresh.set_auto_refresh(true, now);
        }
    }

    /// Start a background refresh of cards and photos.
    pub fn refresh_now(&mut self) -> FetchTicket {
        let ticket = self.refresh.begin_refresh();
        debug!(generation = ticket.generation(), "refresh started");
        self.spawn_fetch(ticket);
        ticket
    }

    /// Run until `cancel` fires or a `quit` event arrives. Calls
    /// [`start`](Self::start) first if it has not run yet.
    pub async fn run(
        &mut self,
        mut input_rx: mpsc::Receiver<InputEvent>,
        cancel: CancellationToken,
    ) -> Result<()> {
        self.start().await;

        let mut clock_tick = tokio::time::interval(CLOCK_PERIOD);
        clock_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut input_open = true;

        loop {
            let rotation_at = self.rotation.next_deadline();
            let poll_at = self.refresh.next_poll_deadline();
            let gesture_at = self.refresh.gesture_deadline();
            let fetching = !self.fetches.is_empty();

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!("dashboard cancelled");
                    break;
                }
                event = input_rx.recv(), if input_open => match event {
                    Some(InputEvent::Quit) => {
                        info!("quit requested");
                        break;
                    }
                    Some(event) => self.handle_input(event, Instant::now()),
                    None => {
                        debug!("input closed; display keeps running");
                        input_open = false;
                    }
                },
                Some(joined) = self.fetches.join_next(), if fetching => match joined {
                    Ok(completion) => self.apply_completion(completion, Instant::now()),
                    Err(e) => warn!("refresh task failed: {e}"),
                },
                _ = sleep_until(gesture_at) => {
                    let now = Instant::now();
                    let action = self.refresh.on_gesture_deadline(now);
                    self.renderer.render_gesture(self.refresh.gesture_view(now));
                    self.handle_gesture_action(action);
                }
                _ = sleep_until(rotation_at) => {
                    if self.rotation.on_tick(&mut self.queue, Instant::now()) {
                        self.render_current();
                    }
                }
                _ = sleep_until(poll_at) => {
                    if let Some(ticket) = self.refresh.on_poll_due(Instant::now()) {
                        debug!(generation = ticket.generation(), "auto-refresh due");
                        self.spawn_fetch(ticket);
                    }
                }
                _ = clock_tick.tick() => {
                    self.renderer.render_clock(&self.clock.now());
                }
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Handle one input event at `now`.
    pub fn handle_input(&mut self, event: InputEvent, now: Instant) {
        match event {
            InputEvent::Next => self.step(Direction::Forward, now),
            InputEvent::Previous => self.step(Direction::Backward, now),
            InputEvent::PressStart => {
                if self.refresh.press_start(now) {
                    self.renderer.render_gesture(self.refresh.gesture_view(now));
                }
            }
            InputEvent::PressEnd => {
                let action = self.refresh.press_end(now);
                self.renderer.render_gesture(self.refresh.gesture_view(now));
                self.handle_gesture_action(action);
            }
            InputEvent::Blur | InputEvent::Hidden => {
                self.refresh.interrupt();
                self.renderer.render_gesture(self.refresh.gesture_view(now));
            }
            InputEvent::Quit => {}
        }
    }

    fn step(&mut self, direction: Direction, now: Instant) {
        if self.rotation.advance(&mut self.queue, direction, now) {
            self.render_current();
        }
    }

    fn handle_gesture_action(&mut self, action: GestureAction) {
        match action {
            GestureAction::None => {}
            GestureAction::RefreshNow => {
                self.refresh_now();
            }
            GestureAction::Toggled(enabled) => self.renderer.render_auto_refresh(enabled),
        }
    }

    /// Fetch cards and photos on a spawned task tagged with `ticket`.
    fn spawn_fetch(&mut self, ticket: FetchTicket) {
        let source = self.source.clone();
        let photos = Arc::clone(&self.photos);
        self.fetches.spawn(async move {
            let cards = match source {
                Some(source) => Some(source.fetch().await),
                None => None,
            };
            FetchCompletion {
                ticket,
                cards,
                photos: load_photos(photos).await,
            }
        });
    }

    /// Rebuild from a finished refresh, re-clamp, and render, in one step.
    fn apply_completion(&mut self, completion: FetchCompletion, now: Instant) {
        let FetchCompletion {
            ticket,
            cards,
            photos,
        } = completion;

        let cards = match cards {
            Some(result) => match self.refresh.complete(ticket, result) {
                RefreshOutcome::Apply(cards) => Some(cards),
                RefreshOutcome::Stale => None,
                RefreshOutcome::Failed => {
                    self.renderer
                        .render_notice("Card refresh failed; showing last loaded cards");
                    None
                }
            },
            None => None,
        };

        let photos = match photos {
            Ok(photos) => {
                if !self.refresh.accept_photos(ticket) || same_photos(self.queue.photos(), &photos) {
                    None
                } else {
                    Some(photos)
                }
            }
            Err(e) => {
                warn!("photo reload failed, keeping previous photos: {e}");
                None
            }
        };

        if cards.is_none() && photos.is_none() {
            return;
        }
        self.queue.replace(cards, photos);
        self.rotation.on_rebuild(&self.queue, now);
        self.render_current();
    }

    fn render_current(&mut self) {
        let current = self.queue.current().cloned();
        if let Some(item) = &current {
            debug!(cursor = self.queue.cursor(), item = item.label(), "render");
        }
        self.renderer.render(current.as_ref());
    }

    /// Clear every timer and drop in-flight fetches.
    fn shutdown(&mut self) {
        self.rotation.stop();
        self.refresh.shutdown();
        self.fetches.abort_all();
    }
}

fn same_photos(current: &[Arc<Photo>], loaded: &[Photo]) -> bool {
    current.len() == loaded.len() && current.iter().zip(loaded).all(|(a, b)| **a == *b)
}

/// Read the photo store off the event loop.
async fn load_photos(store: Arc<dyn PhotoStore>) -> Result<Vec<Photo>> {
    tokio::task::spawn_blocking(move || store.list())
        .await
        .map_err(|e| BoardError::PhotoStore(format!("photo load task failed: {e}")))?
}

/// Sleep until `deadline`, or forever when there is none.
async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

impl<R: Renderer> std::fmt::Debug for Dashboard<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("items", &self.queue.len())
            .field("cursor", &self.queue.cursor())
            .field("rotation", &self.rotation.state())
            .field("auto_refresh", &self.refresh.is_enabled())
            .field("has_source", &self.source.is_some())
            .finish()
    }
}
