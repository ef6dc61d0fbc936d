use crate::feed::parse_feed;
use crate::types::BgEvent;
use crate::utils::log_msg;
use reqwest::Url;
use reqwest::blocking::Client;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

const USER_AGENT: &str = "tokmark/0.2";

/// Blocking fetches on background threads, results delivered as [`BgEvent`]s.
pub struct WebEngine {
    client: Client,
    tx: Sender<BgEvent>,
}

impl WebEngine {
    pub fn new(tx: Sender<BgEvent>) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap();
        Self { client, tx }
    }

    /// Navigates: fetches `target` (resolved against the current URL) and
    /// replaces the page when it lands.
    pub fn fetch(&self, current_url: &str, target: String, is_history: bool) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        let base_str = current_url.to_string();

        thread::spawn(move || {
            let target_url = match Url::parse(&base_str) {
                Ok(base) => base.join(&target).map(|u| u.to_string()).unwrap_or(target),
                Err(_) => target,
            };
            log_msg("info", &format!("Fetching URL: {target_url}"));

            match client.get(&target_url).send() {
                Ok(resp) => {
                    if resp.status().is_success() {
                        let html = resp.text().unwrap_or_default();
                        let (title, links) = parse_feed(&html, &target_url);
                        let _ = tx.send(BgEvent::PageLoaded {
                            url: target_url,
                            title,
                            links,
                            is_history_nav: is_history,
                        });
                    } else {
                        let _ = tx.send(BgEvent::Error(format!("HTTP {}", resp.status())));
                    }
                }
                Err(e) => {
                    let _ = tx.send(BgEvent::Error(e.to_string()));
                }
            }
        });
    }

    /// Lazy load: re-requests the feed URL so links that were not on the
    /// page yet can be appended. A failed round trip only means the feed
    /// does not grow this time.
    pub fn fetch_more(&self, url: String) {
        let client = self.client.clone();
        let tx = self.tx.clone();

        thread::spawn(move || {
            log_msg("info", &format!("Fetching more of: {url}"));
            match client.get(&url).send() {
                Ok(resp) if resp.status().is_success() => {
                    let html = resp.text().unwrap_or_default();
                    let (_, links) = parse_feed(&html, &url);
                    let _ = tx.send(BgEvent::MoreLoaded { links });
                }
                Ok(resp) => {
                    log_msg("warn", &format!("Load more got HTTP {}", resp.status()));
                    let _ = tx.send(BgEvent::MoreLoaded { links: Vec::new() });
                }
                Err(e) => {
                    log_msg("warn", &format!("Load more failed: {e}"));
                    let _ = tx.send(BgEvent::MoreLoaded { links: Vec::new() });
                }
            }
        });
    }
}
