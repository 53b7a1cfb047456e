use sqlsheet::Error;
use sqlsheet::chart::ChartPosition;
use sqlsheet::layout::{ChartExtent, LayoutConfig, PlacementRequest, SheetLayout};

fn table_request(data_rows: u32, columns: u32) -> PlacementRequest {
    PlacementRequest {
        row_start: None,
        column_start: None,
        heading: None,
        data_rows,
        columns,
        chart: None,
    }
}

#[test]
fn test_statements_flow_down_a_sheet() {
    let mut layout = SheetLayout::new();
    let request = table_request(9, 3);

    let plan = layout.place("Sheet1", &request).expect("first placement");
    assert_eq!(plan.row_start, 1);
    assert_eq!(plan.header_row, 1);
    assert_eq!(plan.table_rows, 10);
    assert_eq!(plan.table_columns, 3);
    assert_eq!(plan.table_bottom, 10);
    assert_eq!(plan.next_free_row, 12);
    assert!(plan.chart.is_none());

    let plan = layout.place("Sheet1", &request).expect("second placement");
    assert_eq!(plan.row_start, 12);
    assert_eq!(plan.table_bottom, 21);
    assert_eq!(plan.next_free_row, 23);
}

#[test]
fn test_right_chart_extends_the_cursor() {
    let mut layout = SheetLayout::new();
    let mut request = table_request(3, 2);
    request.chart = Some(ChartExtent {
        position: ChartPosition::Right,
        height: 7.5,
    });

    let plan = layout.place("Sheet1", &request).expect("placement");
    assert_eq!(plan.table_bottom, 4);
    let chart = plan.chart.expect("chart placement");
    assert_eq!(chart.anchor_row, 1);
    assert_eq!(chart.anchor_column, 4);
    assert_eq!(chart.bottom_row, 15);
    assert_eq!(plan.next_free_row, 17);
}

#[test]
fn test_short_right_chart_leaves_the_cursor_to_the_table() {
    let mut layout = SheetLayout::new();
    let mut request = table_request(3, 2);
    request.chart = Some(ChartExtent {
        position: ChartPosition::Right,
        height: 1.0,
    });

    let plan = layout.place("Sheet1", &request).expect("placement");
    let chart = plan.chart.expect("chart placement");
    assert_eq!(chart.bottom_row, 2);
    assert_eq!(plan.next_free_row, 6);
}

#[test]
fn test_bottom_chart_sits_under_the_table() {
    let mut layout = SheetLayout::new();
    let mut request = table_request(3, 2);
    request.chart = Some(ChartExtent {
        position: ChartPosition::Bottom,
        height: 7.5,
    });

    let plan = layout.place("Sheet1", &request).expect("placement");
    assert_eq!(plan.table_bottom, 4);
    let chart = plan.chart.expect("chart placement");
    assert_eq!(chart.anchor_row, 5);
    assert_eq!(chart.anchor_column, 1);
    assert_eq!(chart.bottom_row, 19);
    assert_eq!(plan.next_free_row, 21);
}

#[test]
fn test_explicit_rows_cannot_overlap() {
    let mut layout = SheetLayout::new();
    layout
        .place("Sheet1", &table_request(9, 3))
        .expect("first placement");

    let mut request = table_request(2, 3);
    request.row_start = Some(10);
    let err = layout.place("Sheet1", &request).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert_eq!(
        err.to_string(),
        "Configuration error: Row 10 on sheet `Sheet1` is already occupied through row 10"
    );
    // The rejected placement left the cursor where it was.
    assert_eq!(layout.sheet("Sheet1").expect("sheet state").next_free_row, 12);

    let mut request = table_request(2, 3);
    request.row_start = Some(11);
    let plan = layout.place("Sheet1", &request).expect("row 11 is free");
    assert_eq!(plan.row_start, 11);
    assert_eq!(plan.next_free_row, 15);
}

#[test]
fn test_rows_and_columns_are_numbered_from_one() {
    let mut layout = SheetLayout::new();

    let mut request = table_request(2, 2);
    request.row_start = Some(0);
    let err = layout.place("Sheet1", &request).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(layout.sheet("Sheet1").is_none());

    let mut request = table_request(2, 2);
    request.column_start = Some(0);
    let err = layout.place("Sheet1", &request).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(layout.sheet("Sheet1").is_none());
}

#[test]
fn test_explicit_start_on_a_fresh_sheet() {
    let mut layout = SheetLayout::new();
    let mut request = table_request(3, 2);
    request.row_start = Some(5);
    request.column_start = Some(4);
    request.chart = Some(ChartExtent {
        position: ChartPosition::Right,
        height: 1.0,
    });

    let plan = layout.place("Sheet1", &request).expect("placement");
    assert_eq!(plan.row_start, 5);
    assert_eq!(plan.column_start, 4);
    assert_eq!(plan.table_bottom, 8);
    let chart = plan.chart.expect("chart placement");
    assert_eq!(chart.anchor_row, 5);
    assert_eq!(chart.anchor_column, 7);
}

#[test]
fn test_heading_takes_a_row_above_the_header() {
    let mut layout = SheetLayout::new();
    let mut request = table_request(3, 2);
    request.heading = Some("Quarterly totals".to_owned());

    let plan = layout.place("Sheet1", &request).expect("placement");
    assert_eq!(plan.row_start, 1);
    assert_eq!(plan.header_row, 2);
    assert_eq!(plan.table_rows, 5);
    assert_eq!(plan.table_bottom, 5);
    assert_eq!(plan.next_free_row, 7);
    assert_eq!(plan.heading.as_deref(), Some("Quarterly totals"));
}

#[test]
fn test_empty_results_still_take_a_header_row() {
    let mut layout = SheetLayout::new();
    let plan = layout
        .place("Sheet1", &table_request(0, 4))
        .expect("placement");
    assert_eq!(plan.table_rows, 1);
    assert_eq!(plan.table_bottom, 1);
    assert_eq!(plan.next_free_row, 3);
}

#[test]
fn test_sheets_keep_independent_cursors() {
    let mut layout = SheetLayout::new();

    let plan = layout.place("Alpha", &table_request(4, 2)).expect("alpha");
    assert_eq!(plan.row_start, 1);
    let plan = layout.place("Beta", &table_request(4, 2)).expect("beta");
    assert_eq!(plan.row_start, 1);
    let plan = layout.place("Alpha", &table_request(4, 2)).expect("alpha again");
    assert_eq!(plan.row_start, 7);
}

#[test]
fn test_layout_config_overrides_spacing() {
    let config = LayoutConfig {
        separator: 3,
        chart_gap: 2,
        chart_height_scale: 1.0,
        ..LayoutConfig::default()
    };
    let mut layout = SheetLayout::with_config(config);

    let mut request = table_request(3, 2);
    request.chart = Some(ChartExtent {
        position: ChartPosition::Right,
        height: 2.5,
    });

    let plan = layout.place("Sheet1", &request).expect("placement");
    let chart = plan.chart.expect("chart placement");
    assert_eq!(chart.anchor_column, 5);
    assert_eq!(chart.bottom_row, 3);
    assert_eq!(plan.next_free_row, 7);
}
