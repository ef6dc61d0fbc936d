use crate::types::ParsedLink;
use regex::Regex;
use reqwest::Url;
use std::collections::HashSet;

/// Lines the page header occupies (title + separator).
pub const HEADER_LINES: u64 = 2;
/// Lines one rendered link card occupies (caption, href, spacer).
pub const ITEM_LINES: u64 = 3;

/// The page surface the scroll engine and the selector operate on. The real
/// implementation is [`FeedPage`]; tests script their own.
pub trait Feed {
    /// Total height of the rendered content, in lines.
    fn content_height(&self) -> u64;
    /// Moves the viewport. Scrolling to the bottom is what triggers lazy
    /// loading of more content.
    fn scroll_to(&mut self, y: u64);
    /// Every link currently on the page, document order, duplicates kept.
    fn links(&self) -> Vec<String>;
    /// Sets or clears the selection highlight on every occurrence of `url`.
    fn set_mark(&mut self, url: &str, marked: bool);
}

pub struct FeedItem {
    pub href: String,
    pub caption: String,
    pub hint: String,
    pub marked: bool,
}

/// One loaded feed document: an ordered list of link cards plus a viewport
/// position. Replaced wholesale on navigation, appended to on lazy loads.
pub struct FeedPage {
    pub url: String,
    pub title: String,
    pub items: Vec<FeedItem>,
    pub scroll_y: u64,
    wants_more: bool,
}

impl FeedPage {
    pub fn new(url: String) -> Self {
        Self {
            url,
            title: String::new(),
            items: Vec::new(),
            scroll_y: 0,
            wants_more: false,
        }
    }

    /// Replaces the whole page after a navigation.
    pub fn load(&mut self, url: String, title: String, links: Vec<ParsedLink>) {
        self.url = url;
        self.title = title;
        self.items = links
            .into_iter()
            .enumerate()
            .map(|(i, link)| FeedItem {
                href: link.href,
                caption: link.caption,
                hint: hint_key(i),
                marked: false,
            })
            .collect();
        self.scroll_y = 0;
        self.wants_more = false;
    }

    /// Appends links not present yet, the way a lazy-loading feed grows when
    /// the viewport reaches the bottom. Returns how many were new.
    pub fn append_unseen(&mut self, links: Vec<ParsedLink>) -> usize {
        let seen: HashSet<String> = self.items.iter().map(|i| i.href.clone()).collect();
        let mut added = 0;
        for link in links {
            if seen.contains(&link.href) {
                continue;
            }
            let hint = hint_key(self.items.len());
            self.items.push(FeedItem {
                href: link.href,
                caption: link.caption,
                hint,
                marked: false,
            });
            added += 1;
        }
        added
    }

    pub fn link_by_hint(&self, hint: &str) -> Option<String> {
        self.items
            .iter()
            .find(|i| i.hint == hint)
            .map(|i| i.href.clone())
    }

    /// True once per request: the viewport hit the bottom and more content
    /// should be fetched.
    pub fn take_wants_more(&mut self) -> bool {
        std::mem::take(&mut self.wants_more)
    }
}

impl Feed for FeedPage {
    fn content_height(&self) -> u64 {
        HEADER_LINES + self.items.len() as u64 * ITEM_LINES
    }

    fn scroll_to(&mut self, y: u64) {
        let bottom = self.content_height();
        self.scroll_y = y.min(bottom);
        if y >= bottom {
            self.wants_more = true;
        }
    }

    fn links(&self) -> Vec<String> {
        self.items.iter().map(|i| i.href.clone()).collect()
    }

    fn set_mark(&mut self, url: &str, marked: bool) {
        for item in self.items.iter_mut().filter(|i| i.href == url) {
            item.marked = marked;
        }
    }
}

/// Two-letter hint keys: aa, ab, ... az, ba, ...
pub fn hint_key(index: usize) -> String {
    let index = index % 676;
    let hi = (b'a' + (index / 26) as u8) as char;
    let lo = (b'a' + (index % 26) as u8) as char;
    format!("{hi}{lo}")
}

/// Pulls the title and every anchor out of fetched markup. Hrefs are resolved
/// against `base_url`; captions are the anchors' inner markup flattened to a
/// single line of text.
pub fn parse_feed(html: &str, base_url: &str) -> (String, Vec<ParsedLink>) {
    let title_regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
    let title = title_regex
        .captures(html)
        .map(|caps| flatten_fragment(&caps[1]))
        .unwrap_or_default();

    let base = Url::parse(base_url).ok();
    let link_regex = Regex::new(r#"(?is)<a[^>]+href=["']([^"']+)["'][^>]*>(.*?)</a>"#).unwrap();

    let mut links = Vec::new();
    for caps in link_regex.captures_iter(html) {
        let raw_href = &caps[1];
        let href = match &base {
            Some(b) => b
                .join(raw_href)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| raw_href.to_string()),
            None => raw_href.to_string(),
        };
        links.push(ParsedLink {
            href,
            caption: flatten_fragment(&caps[2]),
        });
    }

    (title, links)
}

fn flatten_fragment(fragment: &str) -> String {
    let text = html2text::from_read(fragment.as_bytes(), 200).unwrap_or_default();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(href: &str) -> ParsedLink {
        ParsedLink {
            href: href.to_string(),
            caption: String::new(),
        }
    }

    const SAMPLE: &str = r#"
        <html><head><title>For You
        - TikTok</title></head><body>
        <a href="https://www.tiktok.com/@a/video/111"><div>first
        clip</div></a>
        <a href='/@b/video/222'>second</a>
        <a href="https://www.tiktok.com/@a/video/111">first again</a>
        </body></html>"#;

    #[test]
    fn parses_anchors_in_document_order_and_resolves_relative_hrefs() {
        let (title, links) = parse_feed(SAMPLE, "https://www.tiktok.com/explore");
        assert_eq!(title, "For You - TikTok");
        let hrefs: Vec<&str> = links.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(
            hrefs,
            vec![
                "https://www.tiktok.com/@a/video/111",
                "https://www.tiktok.com/@b/video/222",
                "https://www.tiktok.com/@a/video/111",
            ]
        );
        assert_eq!(links[0].caption, "first clip");
    }

    #[test]
    fn page_height_grows_only_with_unseen_links() {
        let mut page = FeedPage::new("https://www.tiktok.com/explore".into());
        page.load(
            page.url.clone(),
            "feed".into(),
            vec![link("https://a/1"), link("https://a/2")],
        );
        let before = page.content_height();

        assert_eq!(page.append_unseen(vec![link("https://a/2")]), 0);
        assert_eq!(page.content_height(), before);

        assert_eq!(
            page.append_unseen(vec![link("https://a/2"), link("https://a/3")]),
            1
        );
        assert_eq!(page.content_height(), before + ITEM_LINES);
        assert_eq!(page.items[2].hint, hint_key(2));
    }

    #[test]
    fn scrolling_to_the_bottom_requests_more_content_once() {
        let mut page = FeedPage::new("u".into());
        page.load("u".into(), String::new(), vec![link("https://a/1")]);

        page.scroll_to(1);
        assert!(!page.take_wants_more());

        page.scroll_to(page.content_height());
        assert!(page.take_wants_more());
        assert!(!page.take_wants_more());
    }

    #[test]
    fn marks_apply_to_every_occurrence_of_a_link() {
        let mut page = FeedPage::new("u".into());
        page.load(
            "u".into(),
            String::new(),
            vec![link("https://a/1"), link("https://a/2"), link("https://a/1")],
        );
        page.set_mark("https://a/1", true);
        assert!(page.items[0].marked);
        assert!(!page.items[1].marked);
        assert!(page.items[2].marked);
    }
}
