use crate::config::Config;
use crate::countdown::{self, Countdown};
use crate::features::bar::CountdownBar;
use crate::gfx::anim::Timeline;
use crate::gfx::draw::DrawContext;
use crate::gfx::math::{Rect, Vec2};
use log::info;
use xkbcommon::xkb::keysyms;

/// Designates one countdown run. Stale handles (from a run that has since
/// been replaced or finished) cancel nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownHandle(u64);

#[derive(Debug, Clone)]
pub enum BarMode {
    Idle,
    Counting {
        countdown: Countdown,
        handle: CountdownHandle,
    },
    Completion {
        tl: Timeline,
    },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    PointerEnter { pos: Vec2 },
    PointerLeave,
    PointerMove { pos: Vec2 },
    PointerDown { pos: Vec2, button: u32 },
    PointerUp,
    Scroll { delta: f32 },
    Key(u32),
}

/// The bound progress element. Holds the last percent written to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressDisplay {
    pub value: u8,
}

pub struct App {
    pub config: Config,
    pub mode: BarMode,
    pub buffer_size: [u32; 2],
    pub hover: bool,
    pub time: f32,
    pub quit: bool,

    /// Present once the overlay surface is up; a missing display is tolerated
    /// and percent writes are silently skipped.
    pub display: Option<ProgressDisplay>,

    pub bar: CountdownBar,
    last_fraction: f32,
    duration_secs: u64,
    duration_index: Option<usize>,
    reveal_tl: Timeline,
    next_handle: u64,
}

const DURATIONS_SECS: [u64; 6] = [30 * 60, 25 * 60, 20 * 60, 15 * 60, 10 * 60, 5 * 60];

impl App {
    pub fn new(config: Config) -> Self {
        let buffer_size = [config.bar_size.width, config.bar_size.height];
        let duration_secs = config.default_duration_secs;
        Self {
            config,
            mode: BarMode::Idle,
            buffer_size,
            hover: false,
            time: 0.0,
            quit: false,
            display: None,
            bar: CountdownBar::new(),
            last_fraction: 0.0,
            duration_secs,
            duration_index: None,
            reveal_tl: Timeline::new(0.15),
            next_handle: 0,
        }
    }

    /// Starts a countdown over `[start_ms, end_ms]`, replacing any run that is
    /// already counting. Returns the handle that cancels this run.
    pub fn start_countdown(&mut self, start_ms: i64, end_ms: i64) -> CountdownHandle {
        if let BarMode::Counting { handle, .. } = self.mode {
            info!("Replacing active countdown {:?}", handle);
        }
        self.next_handle += 1;
        let handle = CountdownHandle(self.next_handle);
        let countdown = Countdown::new(start_ms, end_ms);
        self.mode = BarMode::Counting { countdown, handle };
        self.reveal_tl.start(self.time);
        info!(
            "Countdown started: {}ms total, handle {:?}",
            countdown.total_ms(),
            handle
        );
        handle
    }

    /// Cancels the run designated by `handle`. Returns false if that run is no
    /// longer active.
    pub fn cancel(&mut self, handle: CountdownHandle) -> bool {
        match self.mode {
            BarMode::Counting { handle: active, .. } if active == handle => {
                info!("Countdown {:?} cancelled", handle);
                self.mode = BarMode::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn active_handle(&self) -> Option<CountdownHandle> {
        match self.mode {
            BarMode::Counting { handle, .. } => Some(handle),
            _ => None,
        }
    }

    pub fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::PointerEnter { .. } => self.hover = true,
            UiEvent::PointerLeave => self.hover = false,
            UiEvent::PointerDown { button, .. } => {
                // BTN_RIGHT toggles the countdown
                if button == 0x111 {
                    match self.active_handle() {
                        Some(handle) => {
                            self.cancel(handle);
                        }
                        None => {
                            self.start_default_countdown();
                        }
                    }
                }
            }
            UiEvent::Scroll { delta } => self.cycle_duration(delta),
            UiEvent::Key(sym) => match sym {
                keysyms::KEY_space => {
                    self.start_default_countdown();
                }
                keysyms::KEY_Escape | keysyms::KEY_q => {
                    self.quit = true;
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn start_default_countdown(&mut self) -> CountdownHandle {
        let start = countdown::now_ms();
        let end = start + self.duration_secs as i64 * 1000;
        self.start_countdown(start, end)
    }

    /// Cycles the default duration through the preset list. Only affects the
    /// next run, never one already counting.
    pub fn cycle_duration(&mut self, delta: f32) {
        let index = match self.duration_index {
            Some(i) if delta > 0.0 => (i + 1) % DURATIONS_SECS.len(),
            Some(i) => i.checked_sub(1).unwrap_or(DURATIONS_SECS.len() - 1),
            None => 0,
        };
        self.duration_index = Some(index);
        self.duration_secs = DURATIONS_SECS[index];
        info!("Default duration set to {}s", self.duration_secs);
    }

    /// Frame callback: advances the loop clock and samples the wall clock once.
    pub fn update(&mut self, dt: f32) {
        self.time += dt;
        self.reveal_tl.update(self.time);
        self.tick(countdown::now_ms());
    }

    /// One sample of the countdown at `now_ms`: writes percent to the display
    /// if one is bound, and stops the run once remaining time hits zero.
    pub fn tick(&mut self, now_ms: i64) {
        match &mut self.mode {
            BarMode::Idle => {}
            BarMode::Counting { countdown, .. } => {
                let percent = countdown.percent(now_ms);
                if let Some(display) = &mut self.display {
                    display.value = percent;
                }
                // The fill renders from the unrounded fraction; the display
                // element gets the rounded percent
                self.last_fraction = countdown.fraction(now_ms);
                self.bar.set_remaining(countdown.remaining_ms(now_ms));

                if countdown.is_expired(now_ms) {
                    let mut tl = Timeline::new(2.0);
                    tl.start(self.time);
                    self.mode = BarMode::Completion { tl };
                    info!("Countdown complete");
                }
            }
            BarMode::Completion { tl } => {
                tl.update(self.time);
                if tl.is_complete() {
                    self.mode = BarMode::Idle;
                }
            }
        }
    }

    pub fn render(&self, draw: &mut DrawContext, viewport: Rect) {
        if self.display.is_none() {
            return;
        }
        match &self.mode {
            BarMode::Idle => {}
            BarMode::Counting { .. } => {
                let alpha = self.reveal_tl.eased_progress();
                self.bar.render(
                    draw,
                    viewport,
                    &self.config.theme,
                    self.last_fraction,
                    alpha,
                    0.0,
                );
            }
            BarMode::Completion { tl } => {
                // Flash, then fade the empty bar out
                let fade = 1.0 - tl.eased_progress();
                self.bar
                    .render(draw, viewport, &self.config.theme, 0.0, fade, tl.progress());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_display() -> App {
        let mut app = App::new(Config::default());
        app.display = Some(ProgressDisplay::default());
        app
    }

    #[test]
    fn tick_writes_percent_to_display() {
        let mut app = app_with_display();
        app.start_countdown(0, 1_000);
        app.tick(500);
        assert_eq!(app.display.unwrap().value, 50);
        assert!(matches!(app.mode, BarMode::Counting { .. }));
    }

    #[test]
    fn expiry_stops_the_run() {
        let mut app = app_with_display();
        app.start_countdown(0, 1_000);
        app.tick(1_000);
        assert_eq!(app.display.unwrap().value, 0);
        assert!(matches!(app.mode, BarMode::Completion { .. }));
        assert!(app.active_handle().is_none());

        // Completion flash winds down to idle on the loop clock
        app.time = 10.0;
        app.tick(1_001);
        assert!(matches!(app.mode, BarMode::Idle));
    }

    #[test]
    fn missing_display_is_tolerated() {
        let mut app = App::new(Config::default());
        assert!(app.display.is_none());
        app.start_countdown(0, 1_000);
        app.tick(250);
        app.tick(2_000);
        assert!(matches!(app.mode, BarMode::Completion { .. }));
    }

    #[test]
    fn fill_tracks_unrounded_fraction() {
        let mut app = app_with_display();
        app.start_countdown(0, 1_000);
        app.tick(333);
        // The display element gets the rounded percent; the fill keeps the
        // unrounded fraction
        assert_eq!(app.display.unwrap().value, 67);
        assert!((app.last_fraction - 0.667).abs() < 1e-3);
    }

    #[test]
    fn second_start_cancels_the_first() {
        let mut app = app_with_display();
        let first = app.start_countdown(0, 1_000);
        let second = app.start_countdown(0, 2_000);
        assert_ne!(first, second);
        assert_eq!(app.active_handle(), Some(second));

        // The stale handle no longer cancels anything
        assert!(!app.cancel(first));
        assert_eq!(app.active_handle(), Some(second));
        assert!(app.cancel(second));
        assert!(matches!(app.mode, BarMode::Idle));
    }

    #[test]
    fn zero_length_run_reads_zero_and_expires() {
        let mut app = app_with_display();
        app.start_countdown(500, 500);
        app.tick(500);
        assert_eq!(app.display.unwrap().value, 0);
        assert!(matches!(app.mode, BarMode::Completion { .. }));
    }

    #[test]
    fn right_click_toggles_countdown() {
        let mut app = app_with_display();
        app.handle_event(UiEvent::PointerDown {
            pos: Vec2::new(0.0, 0.0),
            button: 0x111,
        });
        assert!(app.active_handle().is_some());
        app.handle_event(UiEvent::PointerDown {
            pos: Vec2::new(0.0, 0.0),
            button: 0x111,
        });
        assert!(app.active_handle().is_none());
    }

    #[test]
    fn scroll_cycles_duration_presets() {
        let mut app = app_with_display();
        app.cycle_duration(1.0);
        app.cycle_duration(1.0);
        assert_eq!(app.duration_secs, DURATIONS_SECS[1]);
        app.cycle_duration(-1.0);
        assert_eq!(app.duration_secs, DURATIONS_SECS[0]);
    }
}
