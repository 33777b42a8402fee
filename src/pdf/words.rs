//! Word boxes reported by `pdftotext -bbox`.

use std::sync::LazyLock;

use regex::Regex;

static PAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<page\s+width="([-\d.]+)"\s+height="([-\d.]+)"\s*>"#).expect("valid regex")
});

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<word\s+xMin="([-\d.]+)"\s+yMin="([-\d.]+)"\s+xMax="([-\d.]+)"\s+yMax="([-\d.]+)"\s*>(.*?)</word>"#,
    )
    .expect("valid regex")
});

/// A word and its bounding box in PDF points, origin at the top-left.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Word {
    pub fn new(text: &str, x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            text: text.to_string(),
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0)
    }
}

/// Words of one page, in the order the PDF text layer reports them.
#[derive(Debug, Clone, PartialEq)]
pub struct PageWords {
    /// 1-based page number.
    pub page: u32,
    pub width: f64,
    pub height: f64,
    pub words: Vec<Word>,
}

/// Decode the entities pdftotext escapes in word text.
fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn number(s: &str) -> f64 {
    s.parse().unwrap_or(0.0)
}

/// Parse `pdftotext -bbox` output. Pages are numbered from `first_page`.
pub fn parse_bbox_html(html: &str, first_page: u32) -> Vec<PageWords> {
    let pages: Vec<_> = PAGE_RE.captures_iter(html).collect();
    let mut result = Vec::with_capacity(pages.len());

    for (i, caps) in pages.iter().enumerate() {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let body_end = pages
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(html.len());
        let body = &html[whole.end()..body_end];

        let words = WORD_RE
            .captures_iter(body)
            .map(|w| Word {
                text: unescape(&w[5]),
                x_min: number(&w[1]),
                y_min: number(&w[2]),
                x_max: number(&w[3]),
                y_max: number(&w[4]),
            })
            .filter(|w| !w.text.trim().is_empty())
            .collect();

        result.push(PageWords {
            page: first_page + i as u32,
            width: number(&caps[1]),
            height: number(&caps[2]),
            words,
        });
    }
    result
}
