//! Whitespace-based ("stream") table inference from word positions.
//!
//! Words are grouped into text rows, rows into segments separated by wide
//! horizontal gaps. Consecutive rows with several segments form a table
//! region whose columns come from the most common segment layout.

use std::collections::HashMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::words::{PageWords, Word};
use crate::table::Table;

/// Tunables for stream inference, in PDF points unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamParams {
    /// Words whose tops differ by at most this much share a row.
    pub row_tolerance: f64,
    /// Horizontal gaps at least this wide separate segments.
    pub column_gap: f64,
    /// Minimum rows with two or more segments for a table.
    pub min_table_rows: usize,
    /// Single-segment rows allowed between multi-segment rows of a table.
    pub max_gap_rows: usize,
}

impl Default for StreamParams {
    fn default() -> Self {
        Self {
            row_tolerance: 2.0,
            column_gap: 8.0,
            min_table_rows: 2,
            max_gap_rows: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Segment {
    x0: f64,
    x1: f64,
    text: String,
}

impl Segment {
    fn center(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TextRow {
    segments: Vec<Segment>,
}

impl TextRow {
    fn is_multi(&self) -> bool {
        self.segments.len() >= 2
    }
}

/// Group words into rows, each row into gap-separated segments.
fn text_rows(words: &[Word], params: &StreamParams) -> Vec<TextRow> {
    let mut sorted: Vec<&Word> = words.iter().collect();
    sorted.sort_by(|a, b| a.y_min.total_cmp(&b.y_min).then(a.x_min.total_cmp(&b.x_min)));

    let mut groups: Vec<Vec<&Word>> = Vec::new();
    let mut row_top = f64::NEG_INFINITY;
    for word in sorted {
        match groups.last_mut() {
            Some(group) if (word.y_min - row_top).abs() <= params.row_tolerance => group.push(word),
            _ => {
                row_top = word.y_min;
                groups.push(vec![word]);
            }
        }
    }

    groups
        .into_iter()
        .map(|mut group| {
            group.sort_by(|a, b| a.x_min.total_cmp(&b.x_min));
            let mut segments: Vec<Segment> = Vec::new();
            for word in group {
                match segments.last_mut() {
                    Some(last) if word.x_min - last.x1 < params.column_gap => {
                        last.x1 = last.x1.max(word.x_max);
                        last.text.push(' ');
                        last.text.push_str(&word.text);
                    }
                    _ => segments.push(Segment {
                        x0: word.x_min,
                        x1: word.x_max,
                        text: word.text.clone(),
                    }),
                }
            }
            TextRow { segments }
        })
        .collect()
}

/// Row index ranges that form tables.
fn table_regions(rows: &[TextRow], params: &StreamParams) -> Vec<RangeInclusive<usize>> {
    let mut regions = Vec::new();
    let mut i = 0;
    while i < rows.len() {
        if !rows[i].is_multi() {
            i += 1;
            continue;
        }

        let start = i;
        let mut end = i;
        let mut multi_rows = 1;
        let mut j = i + 1;
        while j < rows.len() {
            if rows[j].is_multi() {
                end = j;
                multi_rows += 1;
            } else if j - end > params.max_gap_rows {
                break;
            }
            j += 1;
        }

        if multi_rows >= params.min_table_rows {
            regions.push(start..=end);
        }
        i = end + 1;
    }
    regions
}

/// Column spans from the most common segment count in the region.
fn column_spans(rows: &[TextRow]) -> Vec<(f64, f64)> {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for row in rows.iter().filter(|r| r.is_multi()) {
        *counts.entry(row.segments.len()).or_default() += 1;
    }
    let Some(mode) = counts
        .iter()
        .max_by_key(|(len, count)| (**count, **len))
        .map(|(len, _)| *len)
    else {
        return Vec::new();
    };

    let mut spans: Vec<(f64, f64)> = vec![(f64::INFINITY, f64::NEG_INFINITY); mode];
    for row in rows.iter().filter(|r| r.segments.len() == mode) {
        for (span, seg) in spans.iter_mut().zip(&row.segments) {
            span.0 = span.0.min(seg.x0);
            span.1 = span.1.max(seg.x1);
        }
    }

    spans.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.last_mut() {
            Some(last) if span.0 <= last.1 => last.1 = last.1.max(span.1),
            _ => merged.push(span),
        }
    }
    merged
}

/// Detect stream tables on one page, top to bottom.
pub fn detect_tables(page: &PageWords, params: &StreamParams) -> Vec<Table> {
    let rows = text_rows(&page.words, params);
    let mut tables = Vec::new();

    for region in table_regions(&rows, params) {
        let region_rows = &rows[region];
        let spans = column_spans(region_rows);
        if spans.len() < 2 {
            continue;
        }
        let boundaries: Vec<f64> = spans.windows(2).map(|w| (w[0].1 + w[1].0) / 2.0).collect();

        let matrix = region_rows
            .iter()
            .map(|row| {
                let mut cells = vec![String::new(); spans.len()];
                for seg in &row.segments {
                    let column = boundaries.iter().filter(|b| seg.center() >= **b).count();
                    let cell = &mut cells[column];
                    if !cell.is_empty() {
                        cell.push(' ');
                    }
                    cell.push_str(&seg.text);
                }
                cells
            })
            .collect();
        tables.push(Table::new(matrix));
    }

    tracing::debug!("Page {}: {} stream table(s)", page.page, tables.len());
    tables
}
