//! Page selection: `all`, `3`, `1,3-5`.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ExtractionError;

/// Pages of a document to process (1-based).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageSelection {
    #[default]
    All,
    Ranges(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    pub fn contains(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Ranges(ranges) => ranges.iter().any(|r| r.contains(&page)),
        }
    }

    /// Smallest and largest selected page, if bounded.
    pub fn bounds(&self) -> Option<(u32, u32)> {
        match self {
            PageSelection::All => None,
            PageSelection::Ranges(ranges) => {
                let first = ranges.iter().map(|r| *r.start()).min()?;
                let last = ranges.iter().map(|r| *r.end()).max()?;
                Some((first, last))
            }
        }
    }
}

fn parse_page(s: &str, spec: &str) -> Result<u32, ExtractionError> {
    match s.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(ExtractionError::InvalidPageSelection(spec.to_string())),
        Ok(n) => Ok(n),
    }
}

impl FromStr for PageSelection {
    type Err = ExtractionError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let trimmed = spec.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        let mut ranges = Vec::new();
        for part in trimmed.split(',') {
            let range = match part.split_once('-') {
                Some((start, end)) => {
                    let start = parse_page(start, spec)?;
                    let end = parse_page(end, spec)?;
                    if start > end {
                        return Err(ExtractionError::InvalidPageSelection(spec.to_string()));
                    }
                    start..=end
                }
                None => {
                    let page = parse_page(part, spec)?;
                    page..=page
                }
            };
            ranges.push(range);
        }
        Ok(PageSelection::Ranges(ranges))
    }
}

impl fmt::Display for PageSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSelection::All => write!(f, "all"),
            PageSelection::Ranges(ranges) => {
                let parts: Vec<String> = ranges
                    .iter()
                    .map(|r| {
                        if r.start() == r.end() {
                            r.start().to_string()
                        } else {
                            format!("{}-{}", r.start(), r.end())
                        }
                    })
                    .collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all() {
        assert_eq!("all".parse::<PageSelection>().unwrap(), PageSelection::All);
        assert_eq!("ALL".parse::<PageSelection>().unwrap(), PageSelection::All);
        assert_eq!("".parse::<PageSelection>().unwrap(), PageSelection::All);
    }

    #[test]
    fn test_parse_ranges() {
        let sel: PageSelection = "1,3-5".parse().unwrap();
        assert_eq!(sel, PageSelection::Ranges(vec![1..=1, 3..=5]));
        assert!(sel.contains(1));
        assert!(!sel.contains(2));
        assert!(sel.contains(4));
        assert_eq!(sel.bounds(), Some((1, 5)));
        assert_eq!(sel.to_string(), "1,3-5");
    }

    #[test]
    fn test_parse_single() {
        let sel: PageSelection = " 3 ".parse().unwrap();
        assert_eq!(sel, PageSelection::Ranges(vec![3..=3]));
    }

    #[test]
    fn test_reject_invalid() {
        for spec in ["0", "5-3", "x", "1,,2", "2-"] {
            assert!(spec.parse::<PageSelection>().is_err(), "{spec} should fail");
        }
    }

    #[test]
    fn test_all_has_no_bounds() {
        assert_eq!(PageSelection::All.bounds(), None);
        assert!(PageSelection::All.contains(999));
    }
}
