use std::sync::LazyLock;

use anyhow::Context;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use super::Platform;

/// A supported post found in a message, normalized to its canonical url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub platform: Platform,
    pub id: String,
    pub url: String,
    pub author: Option<String>,
}

struct LinkPattern {
    platform: Platform,
    regex: Regex,
    canonical: fn(&Captures) -> String,
}

fn pattern(platform: Platform, regex: &str, canonical: fn(&Captures) -> String) -> LinkPattern {
    LinkPattern {
        platform,
        regex: Regex::new(regex)
            .with_context(|| format!("Failed to create {} link regex", platform))
            .unwrap(),
        canonical,
    }
}

static LINK_PATTERNS: LazyLock<Vec<LinkPattern>> = LazyLock::new(|| {
    vec![
        pattern(
            Platform::Twitter,
            r"(?xi)
                (?:www\.)?
                \b(?:twitter|x)\.com/
                (?P<author>[^\s?\#]+?)/
                status(?:es)?/
                (?P<id>\d+)
            ",
            |caps| format!("https://twitter.com/{}/status/{}", &caps["author"], &caps["id"]),
        ),
        pattern(
            Platform::TikTok,
            r"(?xi)
                (?:(?:www|m)\.)?
                tiktok\.com/
                (?:v|embed|trending|@[\w.]+/video)
                /?
                (?:\?shareId=)?
                (?P<id>\d+)
            ",
            |caps| format!("https://m.tiktok.com/v/{}", &caps["id"]),
        ),
        pattern(
            Platform::TikTok,
            r"(?xi)
                \b(?P<pre>v\w)\.
                tiktok\.com/
                (?P<id>\w+)
            ",
            |caps| format!("https://{}.tiktok.com/{}", &caps["pre"], &caps["id"]),
        ),
        pattern(
            Platform::Instagram,
            r"(?xi)
                (?:instagram\.com|instagr\.(?:am|com))/
                (?:p|reel|tv)/
                (?P<id>[\w-]{11})
            ",
            |caps| format!("https://instagram.com/p/{}", &caps["id"]),
        ),
        pattern(
            Platform::YouTube,
            r"(?xi)
                youtube\.com/
                shorts/
                (?P<id>\w{11})
            ",
            |caps| format!("https://www.youtube.com/shorts/{}", &caps["id"]),
        ),
    ]
});

/// Every supported link in `text`, in order of appearance. The same post
/// mentioned twice is returned once.
pub fn find_links(text: &str) -> Vec<Link> {
    let mut found: Vec<(usize, usize, Link)> = Vec::new();

    for pattern in LINK_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let link = Link {
                platform: pattern.platform,
                id: caps["id"].to_string(),
                url: (pattern.canonical)(&caps),
                author: caps.name("author").map(|m| m.as_str().to_string()),
            };
            found.push((whole.start(), whole.end(), link));
        }
    }

    found.sort_by_key(|(start, _, _)| *start);

    let mut links: Vec<Link> = Vec::new();
    let mut last_end = 0;
    for (start, end, link) in found {
        if start < last_end {
            continue;
        }
        last_end = end;
        if !links.iter().any(|l| l.platform == link.platform && l.id == link.id) {
            links.push(link);
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twitter_links() {
        let links = find_links("look https://mobile.twitter.com/someone/status/1234567890?s=20 and x.com/other/statuses/42");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].platform, Platform::Twitter);
        assert_eq!(links[0].id, "1234567890");
        assert_eq!(links[0].author.as_deref(), Some("someone"));
        assert_eq!(links[0].url, "https://twitter.com/someone/status/1234567890");
        assert_eq!(links[1].url, "https://twitter.com/other/status/42");

        let links = find_links("https://twitter.com/i/web/status/1534567890123456789");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id, "1534567890123456789");
        assert_eq!(links[0].author.as_deref(), Some("i/web"));
    }

    #[test]
    fn test_tiktok_links() {
        let links = find_links("https://www.tiktok.com/@some.user/video/7106594312292453675?lang=en");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].platform, Platform::TikTok);
        assert_eq!(links[0].url, "https://m.tiktok.com/v/7106594312292453675");

        let links = find_links("https://vm.tiktok.com/ZMNnX3Q4K/");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id, "ZMNnX3Q4K");
        assert_eq!(links[0].url, "https://vm.tiktok.com/ZMNnX3Q4K");
    }

    #[test]
    fn test_instagram_and_youtube_links() {
        let links = find_links(
            "https://www.instagram.com/reel/CdmYaq3LAYo/?utm_source=ig_web_copy_link https://youtube.com/shorts/dQw4w9WgXcQ?feature=share",
        );
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].platform, Platform::Instagram);
        assert_eq!(links[0].url, "https://instagram.com/p/CdmYaq3LAYo");
        assert_eq!(links[1].platform, Platform::YouTube);
        assert_eq!(links[1].url, "https://www.youtube.com/shorts/dQw4w9WgXcQ");
    }

    #[test]
    fn test_order_and_duplicates() {
        let text = "https://youtube.com/shorts/dQw4w9WgXcQ \
                    https://twitter.com/a/status/1 \
                    https://www.youtube.com/shorts/dQw4w9WgXcQ";
        let links = find_links(text);
        let platforms: Vec<_> = links.iter().map(|l| l.platform).collect();
        assert_eq!(platforms, vec![Platform::YouTube, Platform::Twitter]);
    }

    #[test]
    fn test_no_links() {
        assert!(find_links("hello there, nothing to see").is_empty());
        assert!(find_links("https://example.com/status/123").is_empty());
        assert!(find_links("https://inbox.com/someone/status/1").is_empty());
    }
}
