#[derive(PartialEq, Clone, Copy, Debug)]
pub enum AppMode {
    Normal,
    Insert,
    Select,
    Bookmarks,
}

/// Lifecycle of the auto-scroll session. `Idle` is both the initial state and
/// the state reached when the feed stops growing.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum ScrollPhase {
    Idle,
    Scrolling,
    Paused,
}

/// Everything the controller (keybindings here, a popup in a browser) can ask
/// the core to do.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Command {
    StartFresh,
    Stop,
    Resume,
    ScrollOnce,
    CollectAllLinks,
    EnterSelectMode,
    ValidateSelection,
    CancelSelection,
}

/// Command results carry derived values only, never references into the
/// core's state.
#[derive(PartialEq, Clone, Debug)]
pub enum Reply {
    Status(&'static str),
    Links(Vec<String>),
    StatusLinks(&'static str, Vec<String>),
}

impl Reply {
    pub fn links(&self) -> Option<&[String]> {
        match self {
            Reply::Status(_) => None,
            Reply::Links(links) | Reply::StatusLinks(_, links) => Some(links),
        }
    }
}

/// Countdown notification pushed to whoever is (maybe) watching.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Progress {
    pub seconds_remaining: u32,
}

/// One anchor pulled out of fetched markup, href already resolved.
#[derive(PartialEq, Clone, Debug)]
pub struct ParsedLink {
    pub href: String,
    pub caption: String,
}

pub enum BgEvent {
    Tick,
    PageLoaded {
        url: String,
        title: String,
        links: Vec<ParsedLink>,
        is_history_nav: bool,
    },
    MoreLoaded {
        links: Vec<ParsedLink>,
    },
    Error(String),
}
