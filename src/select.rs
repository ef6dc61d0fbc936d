use crate::feed::Feed;
use crate::utils::log_msg;
use regex::Regex;
use std::sync::OnceLock;

static VIDEO_LINK: OnceLock<Regex> = OnceLock::new();

/// The one canonical video permalink shape, shared by the collector and the
/// selector. Photo posts and foreign hosts do not count.
pub fn is_video_link(url: &str) -> bool {
    VIDEO_LINK
        .get_or_init(|| Regex::new(r"^https://www\.tiktok\.com/@[^/]+/video/\d+").unwrap())
        .is_match(url)
}

/// Every video link currently on the page, document order, duplicates kept.
/// De-duplication belongs to whoever stores the result.
pub fn collect_video_links(feed: &dyn Feed) -> Vec<String> {
    feed.links()
        .into_iter()
        .filter(|url| is_video_link(url))
        .collect()
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum SelectMode {
    Off,
    On,
}

/// What became of a link activation routed through the selector.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Click {
    /// Not ours; the caller should navigate as usual.
    PassThrough,
    Added,
    Removed,
}

/// Interactive pick mode: while on, activating a video link toggles it in a
/// working set instead of navigating. The selector is consulted for every
/// link activation; the mode flag is what turns it into a no-op, so there is
/// no registering and unregistering to get wrong.
pub struct Selector {
    mode: SelectMode,
    members: Vec<String>,
}

impl Selector {
    pub fn new() -> Self {
        Self {
            mode: SelectMode::Off,
            members: Vec::new(),
        }
    }

    pub fn is_on(&self) -> bool {
        self.mode == SelectMode::On
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Turns pick mode on, discarding any stale set (and its marks) from a
    /// previous round first.
    pub fn enter(&mut self, feed: &mut dyn Feed) {
        self.clear(feed);
        self.mode = SelectMode::On;
        log_msg("info", "Selection mode started");
    }

    /// Routes one link activation. Only video links while the mode is on are
    /// captured; everything else passes through untouched.
    pub fn on_click(&mut self, url: &str, feed: &mut dyn Feed) -> Click {
        if self.mode == SelectMode::Off || !is_video_link(url) {
            return Click::PassThrough;
        }
        if let Some(pos) = self.members.iter().position(|m| m == url) {
            self.members.remove(pos);
            feed.set_mark(url, false);
            Click::Removed
        } else {
            self.members.push(url.to_string());
            feed.set_mark(url, true);
            Click::Added
        }
    }

    /// Ends pick mode and hands back the selection.
    pub fn validate(&mut self, feed: &mut dyn Feed) -> Vec<String> {
        let links = std::mem::take(&mut self.members);
        for url in &links {
            feed.set_mark(url, false);
        }
        self.mode = SelectMode::Off;
        log_msg("info", &format!("Selection validated: {} links", links.len()));
        links
    }

    /// Ends pick mode discarding the selection. Same cleanup as
    /// [`Selector::validate`], no result.
    pub fn cancel(&mut self, feed: &mut dyn Feed) {
        self.clear(feed);
        log_msg("info", "Selection cancelled");
    }

    fn clear(&mut self, feed: &mut dyn Feed) {
        for url in self.members.drain(..) {
            feed.set_mark(&url, false);
        }
        self.mode = SelectMode::Off;
    }
}
