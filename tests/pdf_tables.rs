//! Stream table detection from `pdftotext -bbox` output through to CSV files.

use docextract::pdf::{detect_stream_tables, parse_bbox_html, write_tables, StreamParams};
use docextract::table::Table;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn word(x_min: f64, y_min: f64, text: &str) -> String {
    let x_max = x_min + 6.0 * text.chars().count() as f64;
    format!(
        r#"    <word xMin="{:.6}" yMin="{:.6}" xMax="{:.6}" yMax="{:.6}">{}</word>"#,
        x_min,
        y_min,
        x_max,
        y_min + 11.0,
        text
    )
}

/// Page 1: heading, a 3-column table, closing paragraph.
/// Page 2: prose only. Page 3: a 2-column table with an entity.
fn document() -> String {
    let page1 = [
        word(72.0, 60.0, "Inventory"),
        word(130.0, 60.0, "summary"),
        word(72.0, 100.0, "Item"),
        word(220.0, 100.0, "Qty"),
        word(360.0, 100.0, "Price"),
        word(72.0, 116.0, "Bolts"),
        word(220.0, 116.0, "40"),
        word(360.0, 116.0, "0.10"),
        word(72.0, 132.0, "Nuts,"),
        word(108.0, 132.0, "small"),
        word(220.0, 132.0, "55"),
        word(360.0, 132.0, "0.05"),
        word(72.0, 400.0, "Prices"),
        word(114.0, 400.0, "exclude"),
        word(162.0, 400.0, "tax."),
    ]
    .join("\n");
    let page2 = [word(72.0, 72.0, "Nothing"), word(118.0, 72.0, "tabular")].join("\n");
    let page3 = [
        word(72.0, 90.0, "Team"),
        word(300.0, 90.0, "Lead"),
        word(72.0, 106.0, "R&amp;D"),
        word(300.0, 106.0, "Ada"),
    ]
    .join("\n");

    format!(
        r#"<html xmlns="http://www.w3.org/1999/xhtml">
<body>
<doc>
  <page width="612.000000" height="792.000000">
{}
  </page>
  <page width="612.000000" height="792.000000">
{}
  </page>
  <page width="612.000000" height="792.000000">
{}
  </page>
</doc>
</body>
</html>
"#,
        page1, page2, page3
    )
}

#[test]
fn test_tables_detected_across_pages() {
    let pages = parse_bbox_html(&document(), 1);
    assert_eq!(pages.len(), 3);

    let tables = detect_stream_tables(&pages, &StreamParams::default());
    assert_eq!(tables.iter().map(|t| t.page).collect::<Vec<_>>(), [1, 3]);

    let rows: Vec<Vec<&str>> = tables[0]
        .table
        .rows()
        .iter()
        .map(|r| r.iter().map(String::as_str).collect())
        .collect();
    assert_eq!(
        rows,
        vec![
            vec!["Item", "Qty", "Price"],
            vec!["Bolts", "40", "0.10"],
            vec!["Nuts, small", "55", "0.05"],
        ]
    );
    assert_eq!(tables[1].table.rows()[1], vec!["R&D".to_string(), "Ada".to_string()]);
}

#[test]
fn test_each_table_written_with_all_fields_quoted() {
    let dir = TempDir::new().unwrap();
    let pages = parse_bbox_html(&document(), 1);
    let tables = detect_stream_tables(&pages, &StreamParams::default());

    let files = write_tables(&tables, dir.path()).unwrap();
    assert_eq!(
        files,
        [dir.path().join("table_0.csv"), dir.path().join("table_1.csv")]
    );

    let first = std::fs::read_to_string(&files[0]).unwrap();
    assert_eq!(
        first,
        "\"Item\",\"Qty\",\"Price\"\n\"Bolts\",\"40\",\"0.10\"\n\"Nuts, small\",\"55\",\"0.05\"\n"
    );

    let second = Table::read_csv(&files[1]).unwrap();
    assert_eq!(second, tables[1].table);
}

#[test]
fn test_wide_column_gap_merges_everything() {
    let pages = parse_bbox_html(&document(), 1);
    let params = StreamParams {
        column_gap: 1000.0,
        ..StreamParams::default()
    };
    assert!(detect_stream_tables(&pages, &params).is_empty());
}
