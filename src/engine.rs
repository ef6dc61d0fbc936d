use crate::feed::Feed;
use crate::types::{BgEvent, Progress, ScrollPhase};
use crate::utils::log_msg;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);
/// Regular wait between scroll steps.
pub const SHORT_DELAY_SECS: u32 = 5;
/// Longer wait taken every [`LONG_DELAY_EVERY`]th step so slower network
/// fetches get a chance to land.
pub const LONG_DELAY_SECS: u32 = 10;
pub const LONG_DELAY_EVERY: u64 = 5;
/// Seconds without height growth after which the feed is considered
/// exhausted.
pub const STALL_LIMIT_SECS: u32 = 20;

/// Drives the page to the bottom on a timer until the content stops growing.
///
/// All state lives here and is only touched from the UI thread: commands and
/// ticks are handled to completion, one at a time. The ticker thread does
/// nothing but push [`BgEvent::Tick`] into the app channel once a second; it
/// is spawned lazily on the first start and kept for the life of the process,
/// firing through pauses (the tick handler gates on the phase). Tearing
/// timers down around pause and resume is where drift and duplicate-timer
/// bugs come from, so it is never done.
pub struct ScrollEngine {
    phase: ScrollPhase,
    last_height: u64,
    secs_since_growth: u32,
    step_count: u64,
    countdown: u32,
    events: Sender<BgEvent>,
    progress: Sender<Progress>,
    ticker: Option<JoinHandle<()>>,
}

impl ScrollEngine {
    pub fn new(events: Sender<BgEvent>, progress: Sender<Progress>) -> Self {
        Self {
            phase: ScrollPhase::Idle,
            last_height: 0,
            secs_since_growth: 0,
            step_count: 0,
            countdown: 0,
            events,
            progress,
            ticker: None,
        }
    }

    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    /// Discards any previous session and starts scrolling from the feed's
    /// current height. Allowed from any phase; calling it while already
    /// scrolling never spawns a second ticker.
    pub fn start_fresh(&mut self, feed: &dyn Feed) {
        self.last_height = feed.content_height();
        self.secs_since_growth = 0;
        self.step_count = 0;
        self.countdown = 0;
        self.phase = ScrollPhase::Scrolling;
        self.ensure_ticker();
        log_msg("info", "Auto-scroll started");
    }

    /// Pauses scrolling without touching the session: height, stall clock,
    /// step count and countdown all survive so resuming continues rather
    /// than restarts. No-op unless scrolling.
    pub fn stop(&mut self) {
        if self.phase == ScrollPhase::Scrolling {
            self.phase = ScrollPhase::Paused;
            log_msg("info", "Auto-scroll paused");
        }
    }

    /// Continues a paused session on the existing ticker. No-op while
    /// already scrolling or after the session ended.
    pub fn resume(&mut self) {
        if self.phase == ScrollPhase::Paused {
            self.phase = ScrollPhase::Scrolling;
            self.ensure_ticker();
            log_msg("info", "Auto-scroll resumed");
        }
    }

    /// One manual jump to the bottom. Never touches the session or the
    /// timer loop.
    pub fn scroll_once(&mut self, feed: &mut dyn Feed) {
        feed.scroll_to(feed.content_height());
    }

    /// Called for every ticker fire, whatever the phase.
    pub fn on_tick(&mut self, feed: &mut dyn Feed) {
        if self.phase != ScrollPhase::Scrolling {
            return;
        }
        self.secs_since_growth = self.secs_since_growth.saturating_add(1);
        if self.countdown > 0 {
            self.countdown -= 1;
            self.emit_progress();
            return;
        }
        self.step(feed);
    }

    fn step(&mut self, feed: &mut dyn Feed) {
        let height = feed.content_height();
        feed.scroll_to(height);
        self.step_count += 1;

        if height > self.last_height {
            self.last_height = height;
            self.secs_since_growth = 0;
        } else if self.secs_since_growth >= STALL_LIMIT_SECS {
            self.phase = ScrollPhase::Idle;
            log_msg("info", "No new content; auto-scroll finished");
            return;
        }

        self.countdown = if self.step_count % LONG_DELAY_EVERY == 0 {
            LONG_DELAY_SECS
        } else {
            SHORT_DELAY_SECS
        };
        self.emit_progress();
    }

    // Best effort: whoever was watching the countdown may be gone, and that
    // is fine.
    fn emit_progress(&self) {
        let _ = self.progress.send(Progress {
            seconds_remaining: self.countdown,
        });
    }

    fn ensure_ticker(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        let tx = self.events.clone();
        self.ticker = Some(thread::spawn(move || {
            loop {
                thread::sleep(TICK_PERIOD);
                if tx.send(BgEvent::Tick).is_err() {
                    break;
                }
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::mpsc::{self, Receiver};

    struct FakeFeed {
        height: u64,
        growth: VecDeque<u64>,
        scrolls: Vec<u64>,
    }

    impl FakeFeed {
        fn with_height(height: u64) -> Self {
            Self {
                height,
                growth: VecDeque::new(),
                scrolls: Vec::new(),
            }
        }

        fn growing(height: u64, steps: usize) -> Self {
            let mut feed = Self::with_height(height);
            feed.growth = std::iter::repeat(30).take(steps).collect();
            feed
        }
    }

    impl Feed for FakeFeed {
        fn content_height(&self) -> u64 {
            self.height
        }

        // Each scroll to the bottom "lazy loads" the next scripted chunk.
        fn scroll_to(&mut self, y: u64) {
            self.scrolls.push(y);
            if let Some(grow) = self.growth.pop_front() {
                self.height += grow;
            }
        }

        fn links(&self) -> Vec<String> {
            Vec::new()
        }

        fn set_mark(&mut self, _url: &str, _marked: bool) {}
    }

    fn engine() -> (ScrollEngine, Receiver<Progress>) {
        let (events_tx, _events_rx) = mpsc::channel();
        let (progress_tx, progress_rx) = mpsc::channel();
        (ScrollEngine::new(events_tx, progress_tx), progress_rx)
    }

    fn drain(rx: &Receiver<Progress>) -> Vec<u32> {
        let mut out = Vec::new();
        while let Ok(p) = rx.try_recv() {
            out.push(p.seconds_remaining);
        }
        out
    }

    #[test]
    fn every_fifth_step_waits_ten_seconds() {
        let (mut eng, rx) = engine();
        let mut feed = FakeFeed::growing(100, 100);
        eng.start_fresh(&feed);

        let mut scheduled = Vec::new();
        let mut last = None;
        for _ in 0..40 {
            let before = eng.step_count;
            eng.on_tick(&mut feed);
            if eng.step_count > before {
                scheduled.push(drain(&rx).pop().unwrap());
            } else {
                last = drain(&rx).pop().or(last);
            }
            if scheduled.len() == 6 {
                break;
            }
        }

        assert_eq!(scheduled, vec![5, 5, 5, 5, 10, 5]);
        // Countdown ticks in between count down to zero.
        assert_eq!(last, Some(0));
    }

    #[test]
    fn stalls_out_after_twenty_seconds_without_growth() {
        let (mut eng, rx) = engine();
        let mut feed = FakeFeed::with_height(100);
        eng.start_fresh(&feed);

        for _ in 0..40 {
            eng.on_tick(&mut feed);
        }

        assert_eq!(eng.phase(), ScrollPhase::Idle);
        // Steps at ticks 1, 7, 13, 19 each schedule a delay; the step at
        // tick 25 observes 25s without growth and terminates instead. Every
        // tick up to then emitted exactly one progress event, nothing after.
        assert_eq!(drain(&rx).len(), 24);

        let after: Vec<u32> = {
            eng.on_tick(&mut feed);
            drain(&rx)
        };
        assert!(after.is_empty());
    }

    #[test]
    fn pause_preserves_the_session_and_the_delay_modulus() {
        let (mut eng, rx) = engine();
        let mut feed = FakeFeed::growing(100, 100);
        eng.start_fresh(&feed);

        // Step 1 at tick 1, then two countdown ticks.
        for _ in 0..3 {
            eng.on_tick(&mut feed);
        }
        assert_eq!(eng.step_count, 1);
        assert_eq!(drain(&rx), vec![5, 4, 3]);

        eng.stop();
        for _ in 0..10 {
            eng.on_tick(&mut feed);
        }
        assert_eq!(eng.phase(), ScrollPhase::Paused);
        assert_eq!(eng.step_count, 1);
        assert!(drain(&rx).is_empty());

        // Resuming picks the countdown up at 3: three more countdown ticks,
        // then the next step.
        eng.resume();
        for _ in 0..3 {
            eng.on_tick(&mut feed);
        }
        assert_eq!(eng.step_count, 1);
        eng.on_tick(&mut feed);
        assert_eq!(eng.step_count, 2);

        // Step numbering was not reset: the fifth step still takes the long
        // delay.
        drain(&rx);
        for _ in 0..20 {
            let before = eng.step_count;
            eng.on_tick(&mut feed);
            if eng.step_count > before && eng.step_count == 5 {
                assert_eq!(drain(&rx).pop(), Some(10));
                return;
            }
            drain(&rx);
        }
        panic!("fifth step never happened");
    }

    #[test]
    fn starting_twice_keeps_a_single_ticker() {
        let (events_tx, events_rx) = mpsc::channel();
        let (progress_tx, _progress_rx) = mpsc::channel();
        let mut eng = ScrollEngine::new(events_tx, progress_tx);
        let feed = FakeFeed::with_height(100);

        eng.start_fresh(&feed);
        eng.start_fresh(&feed);
        assert!(eng.ticker.is_some());

        // One ticker delivers one tick a second; a duplicate would double it.
        thread::sleep(Duration::from_millis(2500));
        let ticks = events_rx.try_iter().count();
        assert!((1..=3).contains(&ticks), "got {ticks} ticks");
    }

    #[test]
    fn restarting_resets_the_session() {
        let (mut eng, rx) = engine();
        let mut feed = FakeFeed::growing(100, 100);
        eng.start_fresh(&feed);
        for _ in 0..8 {
            eng.on_tick(&mut feed);
        }
        assert!(eng.step_count > 1);

        eng.start_fresh(&feed);
        assert_eq!(eng.step_count, 0);
        assert_eq!(eng.phase(), ScrollPhase::Scrolling);
        drain(&rx);
        eng.on_tick(&mut feed);
        assert_eq!(eng.step_count, 1);
    }

    #[test]
    fn commands_out_of_phase_are_no_ops() {
        let (mut eng, rx) = engine();
        let mut feed = FakeFeed::with_height(100);

        eng.resume();
        assert_eq!(eng.phase(), ScrollPhase::Idle);
        eng.stop();
        assert_eq!(eng.phase(), ScrollPhase::Idle);
        eng.on_tick(&mut feed);
        assert!(drain(&rx).is_empty());
        assert!(feed.scrolls.is_empty());
    }

    #[test]
    fn scroll_once_jumps_without_engaging_the_timer() {
        let (mut eng, rx) = engine();
        let mut feed = FakeFeed::with_height(120);

        eng.scroll_once(&mut feed);
        assert_eq!(feed.scrolls, vec![120]);
        assert_eq!(eng.phase(), ScrollPhase::Idle);
        assert_eq!(eng.step_count, 0);
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn progress_is_dropped_silently_when_nobody_listens() {
        let (mut eng, rx) = engine();
        drop(rx);
        let mut feed = FakeFeed::growing(100, 100);
        eng.start_fresh(&feed);
        for _ in 0..10 {
            eng.on_tick(&mut feed);
        }
        assert!(eng.step_count > 0);
    }
}
