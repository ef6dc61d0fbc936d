use crate::utils::log_msg;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// On-disk layout: one ordered list under the `bookmarks` key.
#[derive(Default, Serialize, Deserialize)]
struct StoredList {
    bookmarks: Vec<String>,
}

/// The saved-links list. Lives entirely outside the scroll/selection core:
/// the core only ever hands over plain URL lists, this store decides what is
/// new and writes it out.
pub struct Bookmarks {
    path: PathBuf,
    items: Vec<String>,
}

impl Bookmarks {
    /// Loads the list, starting empty if the file is missing or unreadable.
    pub fn load(path: PathBuf) -> Self {
        let items = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<StoredList>(&raw) {
                Ok(stored) => stored.bookmarks,
                Err(e) => {
                    log_msg("warn", &format!("Ignoring unreadable bookmark file: {e}"));
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self { path, items }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds one URL unless it is already saved. Returns whether it was new.
    pub fn add(&mut self, url: &str) -> bool {
        if self.items.iter().any(|b| b == url) {
            return false;
        }
        self.items.push(url.to_string());
        self.save();
        true
    }

    /// Adds every not-yet-saved URL, keeping their order and dropping
    /// duplicates within the batch. Returns how many were new.
    pub fn add_many(&mut self, urls: impl IntoIterator<Item = String>) -> usize {
        let mut added = 0;
        for url in urls {
            if self.items.iter().any(|b| *b == url) {
                continue;
            }
            self.items.push(url);
            added += 1;
        }
        if added > 0 {
            self.save();
        }
        added
    }

    pub fn remove(&mut self, url: &str) {
        let before = self.items.len();
        self.items.retain(|b| b != url);
        if self.items.len() != before {
            self.save();
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.save();
    }

    // Best effort, like the rest of the persistence layer: a failed write is
    // logged and the in-memory list stays authoritative.
    fn save(&self) {
        let stored = StoredList {
            bookmarks: self.items.clone(),
        };
        match serde_json::to_string_pretty(&stored) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    log_msg("error", &format!("Saving bookmarks failed: {e}"));
                }
            }
            Err(e) => log_msg("error", &format!("Encoding bookmarks failed: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &tempfile::TempDir) -> Bookmarks {
        Bookmarks::load(dir.path().join("bookmarks.json"))
    }

    #[test]
    fn add_deduplicates_and_survives_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut bm = store(&dir);
        assert!(bm.add("https://www.tiktok.com/@a/video/1"));
        assert!(!bm.add("https://www.tiktok.com/@a/video/1"));
        assert!(bm.add("https://www.tiktok.com/@b/video/2"));
        assert_eq!(bm.len(), 2);

        let reloaded = store(&dir);
        assert_eq!(reloaded.items(), bm.items());
    }

    #[test]
    fn add_many_keeps_order_and_skips_known_urls() {
        let dir = tempfile::tempdir().unwrap();
        let mut bm = store(&dir);
        bm.add("https://a/1");

        let added = bm.add_many(
            ["https://a/2", "https://a/1", "https://a/3", "https://a/2"]
                .into_iter()
                .map(String::from),
        );
        assert_eq!(added, 2);
        assert_eq!(bm.items(), ["https://a/1", "https://a/2", "https://a/3"]);
    }

    #[test]
    fn remove_and_clear_persist() {
        let dir = tempfile::tempdir().unwrap();
        let mut bm = store(&dir);
        bm.add_many(["https://a/1", "https://a/2"].map(String::from));
        bm.remove("https://a/1");
        assert_eq!(store(&dir).items(), ["https://a/2"]);

        bm.clear();
        assert_eq!(store(&dir).len(), 0);
    }

    #[test]
    fn a_corrupt_file_starts_empty_instead_of_crashing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookmarks.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(Bookmarks::load(path).len(), 0);
    }
}
