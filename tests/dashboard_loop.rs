//! Dashboard Event Loop Tests
//!
//! Drive the full `select!` loop on a paused clock with a scripted card
//! source and a recording renderer.

use async_trait::async_trait;
use goalboard::refresh::RefreshSettings;
use goalboard::rotation::RotationState;
use goalboard::{
    BoardError, Card, CardSource, Dashboard, DashboardSettings, InputEvent, Photo, PhotoStore,
    QueueItem, Renderer, Result,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const POLL_PERIOD: Duration = Duration::from_secs(60);
const HOLD: Duration = Duration::from_secs(2);
const EPSILON: Duration = Duration::from_millis(1);

// ────────────────────────────────────────────────────────────────────────────
// Fakes
// ────────────────────────────────────────────────────────────────────────────

/// Answers each fetch with the next scripted `(delay, result)`; an empty
/// script answers with no cards.
struct ScriptedSource {
    script: Mutex<VecDeque<(Duration, Result<Vec<Card>>)>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(script: Vec<(Duration, Result<Vec<Card>>)>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CardSource for ScriptedSource {
    async fn fetch(&self) -> Result<Vec<Card>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => Ok(Vec::new()),
        }
    }
}

struct NoPhotos;

impl PhotoStore for NoPhotos {
    fn list(&self) -> Result<Vec<Photo>> {
        Ok(Vec::new())
    }
}

enum PhotoStep {
    Ready(Result<Vec<Photo>>),
    /// Blocks the listing until the paired sender fires or is dropped.
    Gated(std_mpsc::Receiver<()>, Vec<Photo>),
}

/// Answers each listing with the next scripted step; an empty script
/// answers with no photos.
struct ScriptedPhotos {
    script: Mutex<VecDeque<PhotoStep>>,
    /// Signalled when a gated listing starts waiting.
    parked: Notify,
}

impl ScriptedPhotos {
    fn new(script: Vec<PhotoStep>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            parked: Notify::new(),
        })
    }
}

impl PhotoStore for ScriptedPhotos {
    fn list(&self) -> Result<Vec<Photo>> {
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(PhotoStep::Ready(result)) => result,
            Some(PhotoStep::Gated(gate, photos)) => {
                self.parked.notify_one();
                let _ = gate.recv();
                Ok(photos)
            }
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Default)]
struct Log {
    frames: Vec<String>,
    auto_refresh: Vec<bool>,
    notices: Vec<String>,
}

struct Recorder(Arc<Mutex<Log>>);

impl Renderer for Recorder {
    fn render(&mut self, item: Option<&QueueItem>) {
        let label = item.map_or_else(|| "<empty>".to_owned(), |i| i.label().to_owned());
        self.0.lock().unwrap().frames.push(label);
    }

    fn render_auto_refresh(&mut self, enabled: bool) {
        self.0.lock().unwrap().auto_refresh.push(enabled);
    }

    fn render_notice(&mut self, message: &str) {
        self.0.lock().unwrap().notices.push(message.to_owned());
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Harness
// ────────────────────────────────────────────────────────────────────────────

struct Running {
    input: mpsc::Sender<InputEvent>,
    cancel: CancellationToken,
    handle: JoinHandle<Dashboard<Recorder>>,
    log: Arc<Mutex<Log>>,
}

impl Running {
    async fn send(&self, event: InputEvent) {
        self.input.send(event).await.unwrap();
    }

    async fn short_press(&self) {
        self.send(InputEvent::PressStart).await;
        self.send(InputEvent::PressEnd).await;
    }

    async fn hold(&self, held: Duration) {
        self.send(InputEvent::PressStart).await;
        tokio::time::sleep(held).await;
        self.send(InputEvent::PressEnd).await;
    }

    fn frames(&self) -> Vec<String> {
        self.log.lock().unwrap().frames.clone()
    }

    async fn stop(self) -> (Dashboard<Recorder>, Arc<Mutex<Log>>) {
        self.cancel.cancel();
        (self.handle.await.unwrap(), self.log)
    }
}

fn settings(goals: &[&str]) -> DashboardSettings {
    DashboardSettings {
        tick_period: Duration::from_secs(10),
        refresh: RefreshSettings {
            poll_period: POLL_PERIOD,
            ..Default::default()
        },
        goals: goals.iter().map(|g| (*g).to_owned()).collect(),
        ..Default::default()
    }
}

fn launch(settings: DashboardSettings, source: Option<Arc<dyn CardSource>>) -> Running {
    launch_with_photos(settings, source, Arc::new(NoPhotos))
}

fn launch_with_photos(
    settings: DashboardSettings,
    source: Option<Arc<dyn CardSource>>,
    photos: Arc<dyn PhotoStore>,
) -> Running {
    let log = Arc::new(Mutex::new(Log::default()));
    let mut dashboard =
        Dashboard::new(settings, source, photos, Recorder(Arc::clone(&log))).unwrap();
    let (input, input_rx) = mpsc::channel(16);
    let cancel = CancellationToken::new();
    let loop_cancel = cancel.clone();
    let handle = tokio::spawn(async move {
        dashboard.run(input_rx, loop_cancel).await.unwrap();
        dashboard
    });
    Running {
        input,
        cancel,
        handle,
        log,
    }
}

fn cards(titles: &[&str]) -> Vec<Card> {
    titles
        .iter()
        .map(|t| Card {
            title: (*t).to_owned(),
            ..Default::default()
        })
        .collect()
}

fn photo(name: &str) -> Photo {
    Photo {
        name: name.to_owned(),
        data_url: "data:image/png;base64,AA==".to_owned(),
        added_at: chrono::Utc::now(),
    }
}

fn photo_names(dashboard: &Dashboard<Recorder>) -> Vec<String> {
    dashboard
        .queue()
        .photos()
        .iter()
        .map(|p| p.name.clone())
        .collect()
}

/// Let the loop drain queued events and short timers.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

// ────────────────────────────────────────────────────────────────────────────
// Rotation
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn goals_rotate_and_wrap_around() {
    let running = launch(settings(&["Ship v1", "Write docs"]), None);

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    let (dashboard, log) = running.stop().await;
    assert_eq!(
        log.lock().unwrap().frames,
        vec!["Ship v1", "Write docs", "Ship v1"]
    );
    assert_eq!(dashboard.queue().len(), 2);
    assert!(dashboard.queue().cards().iter().all(|c| c.is_simple));
    assert_eq!(dashboard.queue().cursor(), 0);
    // Stopped on shutdown.
    assert_eq!(dashboard.rotation().state(), RotationState::Idle);
}

#[tokio::test(start_paused = true)]
async fn manual_step_restarts_the_tick_period() {
    let running = launch(settings(&["a", "b", "c"]), None);

    tokio::time::sleep(Duration::from_secs(9)).await;
    running.send(InputEvent::Next).await;
    // Nine seconds after the manual step: no auto-advance yet.
    tokio::time::sleep(Duration::from_secs(9)).await;
    assert_eq!(running.frames(), vec!["a", "b"]);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(running.frames(), vec!["a", "b", "c"]);
    running.stop().await;
}

#[tokio::test(start_paused = true)]
async fn single_goal_never_rotates() {
    let running = launch(settings(&["only"]), None);
    tokio::time::sleep(Duration::from_secs(35)).await;
    running.send(InputEvent::Next).await;
    settle().await;
    assert_eq!(running.frames(), vec!["only"]);
    running.stop().await;
}

// ────────────────────────────────────────────────────────────────────────────
// Refresh
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn failed_fetch_keeps_cards_and_shorter_success_reclamps() {
    let source = ScriptedSource::new(vec![
        (Duration::ZERO, Ok(cards(&["A", "B", "C"]))),
        (
            Duration::ZERO,
            Err(BoardError::SourceUnavailable("offline".into())),
        ),
        (Duration::ZERO, Ok(cards(&["X"]))),
    ]);
    let running = launch(settings(&[]), Some(source.clone()));

    running.send(InputEvent::Next).await;
    running.send(InputEvent::Next).await;
    settle().await;
    assert_eq!(running.frames(), vec!["A", "B", "C"]);

    running.short_press().await;
    settle().await;
    assert_eq!(source.calls(), 2);
    assert_eq!(running.frames(), vec!["A", "B", "C"]);
    assert_eq!(running.log.lock().unwrap().notices.len(), 1);

    running.short_press().await;
    settle().await;
    assert_eq!(running.frames().last().map(String::as_str), Some("X"));

    let (dashboard, _) = running.stop().await;
    assert_eq!(dashboard.queue().len(), 1);
    assert_eq!(dashboard.queue().cursor(), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_fetch_leaves_cursor_in_place() {
    let source = ScriptedSource::new(vec![
        (Duration::ZERO, Ok(cards(&["A", "B", "C"]))),
        (
            Duration::ZERO,
            Err(BoardError::SourceUnavailable("offline".into())),
        ),
    ]);
    let running = launch(settings(&[]), Some(source));

    running.send(InputEvent::Next).await;
    running.short_press().await;
    settle().await;

    let (dashboard, _) = running.stop().await;
    assert_eq!(dashboard.queue().len(), 3);
    assert_eq!(dashboard.queue().cursor(), 1);
}

#[tokio::test(start_paused = true)]
async fn superseded_fetch_result_is_discarded() {
    let source = ScriptedSource::new(vec![
        (Duration::ZERO, Ok(cards(&["A"]))),
        (Duration::from_secs(5), Ok(cards(&["OLD1", "OLD2"]))),
        (Duration::from_secs(1), Ok(cards(&["NEW"]))),
    ]);
    let running = launch(settings(&[]), Some(source.clone()));

    running.short_press().await;
    running.short_press().await;
    tokio::time::sleep(Duration::from_secs(6)).await;

    assert_eq!(source.calls(), 3);
    let frames = running.frames();
    assert_eq!(frames, vec!["A", "NEW"]);

    let (dashboard, _) = running.stop().await;
    let titles: Vec<&str> = dashboard
        .queue()
        .cards()
        .iter()
        .map(|c| c.title.as_str())
        .collect();
    assert_eq!(titles, vec!["NEW"]);
}

#[tokio::test(start_paused = true)]
async fn initial_fetch_failure_starts_empty_and_recovers() {
    let source = ScriptedSource::new(vec![
        (
            Duration::ZERO,
            Err(BoardError::SourceUnavailable("offline".into())),
        ),
        (Duration::ZERO, Ok(cards(&["A", "B"]))),
    ]);
    let running = launch(settings(&["ignored goal"]), Some(source));
    settle().await;
    assert_eq!(running.frames(), vec!["<empty>"]);

    running.short_press().await;
    settle().await;
    assert_eq!(running.frames(), vec!["<empty>", "A"]);

    let (dashboard, _) = running.stop().await;
    // Rotation started once the queue grew past one item; stopped on shutdown.
    assert_eq!(dashboard.queue().len(), 2);
}

#[tokio::test]
async fn late_photo_reload_does_not_replace_newer_photos() {
    let (release, gate) = std_mpsc::channel();
    let photos = ScriptedPhotos::new(vec![
        PhotoStep::Ready(Ok(Vec::new())),
        PhotoStep::Gated(gate, vec![photo("old.jpg")]),
        PhotoStep::Ready(Ok(vec![photo("new.jpg")])),
    ]);
    let running = launch_with_photos(settings(&["goal"]), None, photos.clone());

    running.short_press().await;
    photos.parked.notified().await;
    running.short_press().await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    release.send(()).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let (dashboard, log) = running.stop().await;
    assert_eq!(photo_names(&dashboard), vec!["new.jpg"]);
    // The late reload produced no extra frame.
    assert_eq!(log.lock().unwrap().frames, vec!["goal", "goal"]);
}

// ────────────────────────────────────────────────────────────────────────────
// Photos
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn refresh_interleaves_photo_added_out_of_band() {
    let photos = ScriptedPhotos::new(vec![
        PhotoStep::Ready(Ok(Vec::new())),
        PhotoStep::Ready(Ok(vec![photo("beach.jpg")])),
    ]);
    let running = launch_with_photos(settings(&["a", "b"]), None, photos);
    settle().await;

    running.short_press().await;
    settle().await;
    running.send(InputEvent::Next).await;
    running.send(InputEvent::Next).await;
    settle().await;

    assert_eq!(running.frames(), vec!["a", "a", "beach.jpg", "b"]);
    let (dashboard, _) = running.stop().await;
    assert_eq!(dashboard.queue().len(), 3);
    assert_eq!(photo_names(&dashboard), vec!["beach.jpg"]);
}

#[tokio::test(start_paused = true)]
async fn failed_photo_reload_keeps_photos_and_cursor() {
    let photos = ScriptedPhotos::new(vec![
        PhotoStep::Ready(Ok(vec![photo("beach.jpg")])),
        PhotoStep::Ready(Err(BoardError::PhotoStore("disk unplugged".into()))),
    ]);
    let running = launch_with_photos(settings(&["a", "b"]), None, photos);

    running.send(InputEvent::Next).await;
    settle().await;
    running.short_press().await;
    settle().await;

    assert_eq!(running.frames(), vec!["a", "beach.jpg"]);
    let (dashboard, _) = running.stop().await;
    assert_eq!(dashboard.queue().len(), 3);
    assert_eq!(dashboard.queue().cursor(), 1);
    assert_eq!(photo_names(&dashboard), vec!["beach.jpg"]);
}

// ────────────────────────────────────────────────────────────────────────────
// Long Press
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn hold_short_of_duration_refreshes_once_without_toggle() {
    let source = ScriptedSource::new(vec![(Duration::ZERO, Ok(cards(&["A"])))]);
    let running = launch(settings(&[]), Some(source.clone()));
    settle().await;

    running.hold(HOLD - EPSILON).await;
    settle().await;

    assert_eq!(source.calls(), 2);
    assert_eq!(running.log.lock().unwrap().auto_refresh, vec![false]);
    let (dashboard, _) = running.stop().await;
    assert!(!dashboard.refresh().is_enabled());
}

#[tokio::test(start_paused = true)]
async fn hold_past_duration_toggles_once_without_refresh() {
    let source = ScriptedSource::new(vec![(Duration::ZERO, Ok(cards(&["A"])))]);
    let running = launch(settings(&[]), Some(source.clone()));
    settle().await;

    running.hold(HOLD + EPSILON).await;
    settle().await;

    assert_eq!(source.calls(), 1);
    assert_eq!(running.log.lock().unwrap().auto_refresh, vec![false, true]);

    // The poll timer is now armed and keeps firing.
    tokio::time::sleep(POLL_PERIOD).await;
    assert_eq!(source.calls(), 2);
    tokio::time::sleep(POLL_PERIOD).await;
    assert_eq!(source.calls(), 3);

    // A second long press turns polling off again.
    running.hold(HOLD + EPSILON).await;
    tokio::time::sleep(POLL_PERIOD * 2).await;
    assert_eq!(source.calls(), 3);
    assert_eq!(
        running.log.lock().unwrap().auto_refresh,
        vec![false, true, false]
    );
    running.stop().await;
}

#[tokio::test(start_paused = true)]
async fn blur_during_hold_fires_nothing() {
    let source = ScriptedSource::new(vec![(Duration::ZERO, Ok(cards(&["A"])))]);
    let running = launch(settings(&[]), Some(source.clone()));
    settle().await;

    running.send(InputEvent::PressStart).await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    running.send(InputEvent::Blur).await;
    tokio::time::sleep(Duration::from_secs(2)).await;
    running.send(InputEvent::PressEnd).await;
    settle().await;

    assert_eq!(source.calls(), 1);
    assert_eq!(running.log.lock().unwrap().auto_refresh, vec![false]);
    running.stop().await;
}

#[tokio::test(start_paused = true)]
async fn auto_refresh_default_arms_polling_at_start() {
    let source = ScriptedSource::new(vec![(Duration::ZERO, Ok(cards(&["A"])))]);
    let mut settings = settings(&[]);
    settings.refresh.auto_refresh_default = true;
    let running = launch(settings, Some(source.clone()));

    tokio::time::sleep(POLL_PERIOD + Duration::from_millis(100)).await;
    assert_eq!(source.calls(), 2);
    assert_eq!(running.log.lock().unwrap().auto_refresh, vec![true]);
    running.stop().await;
}

// ────────────────────────────────────────────────────────────────────────────
// Shutdown
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn quit_event_ends_the_loop() {
    let running = launch(settings(&["a", "b"]), None);
    running.send(InputEvent::Quit).await;
    let dashboard = running.handle.await.unwrap();
    assert!(dashboard.rotation().next_deadline().is_none());
    assert!(dashboard.refresh().next_poll_deadline().is_none());
}
