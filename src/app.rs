use crate::bookmarks::Bookmarks;
use crate::engine::ScrollEngine;
use crate::feed::{Feed, FeedPage};
use crate::i18n::t;
use crate::select::{Click, Selector, collect_video_links, is_video_link};
use crate::types::{AppMode, BgEvent, Command, Progress, Reply, ScrollPhase};
use crate::utils::log_msg;
use crate::web::WebEngine;
use crossterm::event::{KeyCode, KeyModifiers};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};

pub struct App {
    pub mode: AppMode,
    pub previous_mode: AppMode,

    web: WebEngine,
    rx: Receiver<BgEvent>,
    progress_rx: Receiver<Progress>,
    pub is_loading: bool,
    pub loading_more: bool,

    pub current_url: String,
    pub url_input: String,
    pub cursor_pos: usize,

    pub page: FeedPage,
    pub hint_buffer: String,
    pub hint_mode_active: bool,

    pub history: Vec<String>,
    pub history_index: usize,

    pub scroll: ScrollEngine,
    pub selector: Selector,
    pub seconds_remaining: u32,

    pub bookmarks: Bookmarks,
    pub bookmark_cursor: usize,
    pub status_msg: Option<String>,
}

impl App {
    pub fn new(start_url: String, bookmarks_path: PathBuf) -> Self {
        log_msg("info", "App initialized");

        let (tx, rx) = mpsc::channel();
        let (progress_tx, progress_rx) = mpsc::channel();
        let web = WebEngine::new(tx.clone());
        let scroll = ScrollEngine::new(tx, progress_tx);

        Self {
            mode: AppMode::Normal,
            previous_mode: AppMode::Normal,
            web,
            rx,
            progress_rx,
            is_loading: false,
            loading_more: false,
            current_url: start_url.clone(),
            url_input: start_url.clone(),
            cursor_pos: start_url.len(),
            page: FeedPage::new(start_url),
            hint_buffer: String::new(),
            hint_mode_active: false,
            history: vec![],
            history_index: 0,
            scroll,
            selector: Selector::new(),
            seconds_remaining: 0,
            bookmarks: Bookmarks::load(bookmarks_path),
            bookmark_cursor: 0,
            status_msg: None,
        }
    }

    /// Kicks off the first page load. Kept out of [`App::new`] so building an
    /// app never touches the network.
    pub fn open_start_page(&mut self) {
        let url = self.current_url.clone();
        self.trigger_fetch(url, false);
    }

    pub fn trigger_fetch(&mut self, url: String, is_history: bool) {
        self.is_loading = true;
        self.url_input = url.clone();
        self.cursor_pos = self.url_input.len();
        self.web.fetch(&self.current_url, url, is_history);
    }

    pub fn handle_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                BgEvent::Tick => {
                    self.scroll.on_tick(&mut self.page);
                    self.maybe_load_more();
                }
                BgEvent::PageLoaded {
                    url,
                    title,
                    links,
                    is_history_nav,
                } => {
                    log_msg("info", "Page Loaded");
                    self.is_loading = false;
                    // Navigating away ends any selection round in progress.
                    if self.selector.is_on() {
                        self.selector.cancel(&mut self.page);
                        self.mode = AppMode::Normal;
                    }
                    self.page.load(url.clone(), title, links);
                    self.current_url = url.clone();
                    self.url_input = url.clone();
                    self.cursor_pos = self.url_input.len();

                    if !is_history_nav && self.history.last() != Some(&url) {
                        self.history.truncate(self.history_index + 1);
                        self.history.push(url);
                        self.history_index = self.history.len() - 1;
                    }
                }
                BgEvent::MoreLoaded { links } => {
                    self.loading_more = false;
                    let added = self.page.append_unseen(links);
                    if added > 0 {
                        log_msg("info", &format!("Feed grew by {added} links"));
                    }
                }
                BgEvent::Error(e) => {
                    log_msg("error", &format!("{e}"));
                    self.is_loading = false;
                    self.status_msg = Some(t!("errors.generic", error = e).to_string());
                }
            }
        }

        while let Ok(p) = self.progress_rx.try_recv() {
            self.seconds_remaining = p.seconds_remaining;
        }
    }

    /// The command surface a remote controller would talk to. Every reply is
    /// a copy; out-of-phase commands come back with the normal status.
    pub fn handle_command(&mut self, cmd: Command) -> Reply {
        match cmd {
            Command::StartFresh => {
                self.scroll.start_fresh(&self.page);
                Reply::Status("started")
            }
            Command::Stop => {
                self.scroll.stop();
                Reply::Status("stopped")
            }
            Command::Resume => {
                self.scroll.resume();
                Reply::Status("resumed")
            }
            Command::ScrollOnce => {
                self.scroll.scroll_once(&mut self.page);
                self.maybe_load_more();
                Reply::Status("ok")
            }
            Command::CollectAllLinks => Reply::Links(collect_video_links(&self.page)),
            Command::EnterSelectMode => {
                self.selector.enter(&mut self.page);
                Reply::Status("started")
            }
            Command::ValidateSelection => {
                Reply::StatusLinks("ok", self.selector.validate(&mut self.page))
            }
            Command::CancelSelection => {
                self.selector.cancel(&mut self.page);
                Reply::Status("ok")
            }
        }
    }

    fn maybe_load_more(&mut self) {
        if self.page.take_wants_more() && !self.loading_more && !self.is_loading {
            self.loading_more = true;
            self.web.fetch_more(self.current_url.clone());
        }
    }

    pub fn on_key(&mut self, key: KeyCode, modifiers: KeyModifiers, _term_h: u16) -> bool {
        self.status_msg = None;
        match self.mode {
            AppMode::Insert => {
                self.handle_insert(key, modifiers);
                false
            }
            AppMode::Bookmarks => {
                self.handle_bookmark_list(key);
                false
            }
            _ => self.handle_normal(key),
        }
    }

    fn handle_normal(&mut self, key: KeyCode) -> bool {
        if self.hint_mode_active {
            self.handle_hint(key);
            return false;
        }

        match key {
            KeyCode::Enter if self.mode == AppMode::Select => {
                let reply = self.handle_command(Command::ValidateSelection);
                let links = reply.links().unwrap_or_default().to_vec();
                let added = self.bookmarks.add_many(links);
                self.status_msg = Some(t!("msg.selection_saved", count = added).to_string());
                self.mode = AppMode::Normal;
            }
            KeyCode::Esc if self.mode == AppMode::Select => {
                self.handle_command(Command::CancelSelection);
                self.status_msg = Some(t!("msg.selection_cancelled").to_string());
                self.mode = AppMode::Normal;
            }
            KeyCode::Char('q') => return true,
            KeyCode::Char('i') => {
                self.previous_mode = self.mode;
                self.mode = AppMode::Insert;
            }
            KeyCode::Char('f') => self.hint_mode_active = true,

            KeyCode::Char('s') => {
                self.handle_command(Command::StartFresh);
            }
            KeyCode::Char(' ') => match self.scroll.phase() {
                ScrollPhase::Scrolling => {
                    self.handle_command(Command::Stop);
                }
                ScrollPhase::Paused => {
                    self.handle_command(Command::Resume);
                }
                ScrollPhase::Idle => {}
            },
            KeyCode::Char('o') => {
                self.handle_command(Command::ScrollOnce);
            }

            KeyCode::Char('a') => {
                let reply = self.handle_command(Command::CollectAllLinks);
                let links = reply.links().unwrap_or_default().to_vec();
                let added = self.bookmarks.add_many(links);
                self.status_msg = Some(t!("msg.bookmarked_many", count = added).to_string());
            }
            KeyCode::Char('v') => {
                self.handle_command(Command::EnterSelectMode);
                self.mode = AppMode::Select;
            }
            KeyCode::Char('b') => self.bookmark_current(),
            KeyCode::Char('B') if self.mode == AppMode::Normal => {
                self.bookmark_cursor = 0;
                self.mode = AppMode::Bookmarks;
            }
            KeyCode::Char('x') => {
                self.bookmarks.clear();
                self.status_msg = Some(t!("msg.bookmarks_cleared").to_string());
            }

            KeyCode::Char('j') | KeyCode::Down => self.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => {
                self.page.scroll_y = self.page.scroll_y.saturating_sub(1);
            }
            KeyCode::PageDown => self.scroll_by(10),
            KeyCode::PageUp => self.page.scroll_y = self.page.scroll_y.saturating_sub(10),

            KeyCode::Char('h') => {
                if self.history_index > 0 {
                    self.history_index -= 1;
                    let u = self.history[self.history_index].clone();
                    self.trigger_fetch(u, true);
                }
            }
            KeyCode::Char('l') => {
                if self.history_index + 1 < self.history.len() {
                    self.history_index += 1;
                    let u = self.history[self.history_index].clone();
                    self.trigger_fetch(u, true);
                }
            }
            _ => {}
        }
        false
    }

    fn handle_hint(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.hint_mode_active = false;
                self.hint_buffer.clear();
            }
            KeyCode::Backspace => {
                self.hint_buffer.pop();
            }
            KeyCode::Char(c) => {
                self.hint_buffer.push(c);
                if let Some(url) = self.page.link_by_hint(&self.hint_buffer) {
                    self.hint_mode_active = false;
                    self.hint_buffer.clear();
                    self.activate_link(url);
                } else if self.hint_buffer.len() >= 2 {
                    self.hint_buffer.clear();
                    self.hint_mode_active = false;
                }
            }
            _ => {}
        }
    }

    fn handle_bookmark_list(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('B') => {
                self.mode = AppMode::Normal;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if self.bookmark_cursor + 1 < self.bookmarks.len() {
                    self.bookmark_cursor += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.bookmark_cursor = self.bookmark_cursor.saturating_sub(1);
            }
            KeyCode::Char('d') => {
                if let Some(url) = self.bookmarks.items().get(self.bookmark_cursor).cloned() {
                    self.bookmarks.remove(&url);
                    self.bookmark_cursor = self
                        .bookmark_cursor
                        .min(self.bookmarks.len().saturating_sub(1));
                    self.status_msg = Some(t!("msg.bookmark_removed").to_string());
                }
            }
            KeyCode::Char('x') => {
                self.bookmarks.clear();
                self.bookmark_cursor = 0;
                self.status_msg = Some(t!("msg.bookmarks_cleared").to_string());
            }
            KeyCode::Enter => {
                if let Some(url) = self.bookmarks.items().get(self.bookmark_cursor).cloned() {
                    self.mode = AppMode::Normal;
                    self.trigger_fetch(url, false);
                }
            }
            _ => {}
        }
    }

    // Every link activation goes through the selector; it decides whether
    // the click is captured or navigates.
    fn activate_link(&mut self, url: String) {
        match self.selector.on_click(&url, &mut self.page) {
            Click::Added => {
                self.status_msg = Some(t!("msg.link_selected").to_string());
            }
            Click::Removed => {
                self.status_msg = Some(t!("msg.link_unselected").to_string());
            }
            Click::PassThrough => self.trigger_fetch(url, false),
        }
    }

    fn bookmark_current(&mut self) {
        if !is_video_link(&self.current_url) {
            self.status_msg = Some(t!("msg.not_video").to_string());
            return;
        }
        if self.bookmarks.add(&self.current_url) {
            self.status_msg = Some(t!("msg.bookmarked").to_string());
        } else {
            self.status_msg = Some(t!("msg.already_bookmarked").to_string());
        }
    }

    fn scroll_by(&mut self, lines: u64) {
        let y = self.page.scroll_y.saturating_add(lines);
        self.page.scroll_to(y);
        self.maybe_load_more();
    }

    fn handle_insert(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        match key {
            KeyCode::Enter => {
                self.mode = self.previous_mode;
                let u = self.url_input.clone();
                self.trigger_fetch(u, false);
            }
            KeyCode::Esc => self.mode = self.previous_mode,
            KeyCode::Char('w') if modifiers.contains(KeyModifiers::CONTROL) => self.delete_word(),
            KeyCode::Backspace => {
                if modifiers.contains(KeyModifiers::ALT) {
                    self.delete_word();
                } else if self.cursor_pos > 0 {
                    let prev = prev_boundary(&self.url_input, self.cursor_pos);
                    self.url_input.replace_range(prev..self.cursor_pos, "");
                    self.cursor_pos = prev;
                }
            }
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                self.url_input.insert(self.cursor_pos, c);
                self.cursor_pos += c.len_utf8();
            }
            KeyCode::Left => self.cursor_pos = prev_boundary(&self.url_input, self.cursor_pos),
            KeyCode::Right => self.cursor_pos = next_boundary(&self.url_input, self.cursor_pos),
            KeyCode::Home => self.cursor_pos = 0,
            KeyCode::End => self.cursor_pos = self.url_input.len(),
            _ => {}
        }
    }

    fn delete_word(&mut self) {
        if self.cursor_pos == 0 {
            return;
        }
        let prefix = &self.url_input[..self.cursor_pos];
        let new_pos = prefix.trim_end().rfind(' ').map(|i| i + 1).unwrap_or(0);
        self.url_input.replace_range(new_pos..self.cursor_pos, "");
        self.cursor_pos = new_pos;
    }
}

fn prev_boundary(text: &str, pos: usize) -> usize {
    let mut p = pos.min(text.len());
    while p > 0 {
        p -= 1;
        if text.is_char_boundary(p) {
            break;
        }
    }
    p
}

fn next_boundary(text: &str, pos: usize) -> usize {
    let mut p = (pos + 1).min(text.len());
    while p < text.len() && !text.is_char_boundary(p) {
        p += 1;
    }
    p
}
