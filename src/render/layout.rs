//! Coordinates are in points from the top-left corner of the page.

use crate::models::{Record, ReportGroup};

pub const REPORT_TITLE: &str = "AlumConnect Report";

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: String,
    pub width: f32,
}

impl Column {
    pub fn new(label: &str, width: f32) -> Self {
        Self {
            label: label.to_string(),
            width,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageConfig {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub row_height: f32,
    pub cell_padding: f32,
    pub title_height: f32,
    pub card_width: f32,
    pub card_height: f32,
    pub card_gap: f32,
    /// Index, name, batch, status, company.
    pub columns: Vec<Column>,
}

impl Default for PageConfig {
    fn default() -> Self {
        // US Letter with the 30pt margin the report has always used.
        Self {
            page_width: 612.0,
            page_height: 792.0,
            margin: 30.0,
            row_height: 20.0,
            cell_padding: 5.0,
            title_height: 40.0,
            card_width: 200.0,
            card_height: 50.0,
            card_gap: 10.0,
            columns: vec![
                Column::new("#", 40.0),
                Column::new("Name", 150.0),
                Column::new("Batch", 60.0),
                Column::new("Status", 110.0),
                Column::new("Company", 190.0),
            ],
        }
    }
}

impl PageConfig {
    pub fn usable_height(&self) -> f32 {
        self.page_height - 2.0 * self.margin
    }

    pub fn usable_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    pub fn top(&self) -> f32 {
        self.margin
    }

    pub fn bottom(&self) -> f32 {
        self.margin + self.usable_height()
    }

    pub fn table_width(&self) -> f32 {
        self.columns.iter().map(|c| c.width).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub page: usize,
    pub y: f32,
}

impl Cursor {
    pub fn top(config: &PageConfig) -> Self {
        Self {
            page: 0,
            y: config.top(),
        }
    }

    pub fn remaining(&self, config: &PageConfig) -> f32 {
        config.bottom() - self.y
    }

    fn advance(self, by: f32) -> Self {
        Self {
            y: self.y + by,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub x: f32,
    pub clip_width: f32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowLayout {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub cells: Vec<Cell>,
    /// x positions of the vertical lines between columns.
    pub dividers: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Title {
        text: String,
        y: f32,
    },
    Card {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        status: String,
        count: usize,
    },
    Heading {
        x: f32,
        y: f32,
        text: String,
    },
    Border {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    HeaderRow(RowLayout),
    DataRow(RowLayout),
    PageBreak,
}

/// Lays out the whole report: title, one summary card per group, then one
/// table per group.
pub fn layout(groups: &[ReportGroup], config: &PageConfig) -> Vec<DrawOp> {
    let mut ops = Vec::new();
    let mut cursor = Cursor::top(config);

    ops.push(DrawOp::Title {
        text: REPORT_TITLE.to_string(),
        y: cursor.y,
    });
    cursor = cursor.advance(config.title_height);

    cursor = layout_summary(groups, config, cursor, &mut ops);
    for group in groups {
        cursor = layout_group(group, config, cursor, &mut ops);
    }

    ops
}

pub fn layout_summary(
    groups: &[ReportGroup],
    config: &PageConfig,
    mut cursor: Cursor,
    ops: &mut Vec<DrawOp>,
) -> Cursor {
    for group in groups {
        if cursor.remaining(config) < config.card_height {
            cursor = page_break(config, cursor, ops);
        }
        ops.push(DrawOp::Card {
            x: config.margin,
            y: cursor.y,
            width: config.card_width.min(config.usable_width()),
            height: config.card_height,
            status: group.status.clone(),
            count: group.len(),
        });
        cursor = cursor.advance(config.card_height + config.card_gap);
    }
    cursor
}

pub fn layout_group(
    group: &ReportGroup,
    config: &PageConfig,
    mut cursor: Cursor,
    ops: &mut Vec<DrawOp>,
) -> Cursor {
    let row_height = config.row_height;
    let count = group.len();

    let needed = row_height * (count as f32 + 3.0);
    if cursor.remaining(config) < needed && !matches!(ops.last(), Some(DrawOp::PageBreak)) {
        cursor = page_break(config, cursor, ops);
    }

    ops.push(DrawOp::Heading {
        x: config.margin,
        y: cursor.y,
        text: group.status.clone(),
    });
    cursor = cursor.advance(row_height);

    ops.push(border(config, cursor, count));
    ops.push(DrawOp::HeaderRow(header_row(config, cursor.y)));
    cursor = cursor.advance(row_height);

    for (index, record) in group.records.iter().enumerate() {
        if cursor.remaining(config) < row_height {
            cursor = page_break(config, cursor, ops);
            ops.push(DrawOp::HeaderRow(header_row(config, cursor.y)));
            ops.push(border(config, cursor, count - index));
            cursor = cursor.advance(row_height);
        }
        ops.push(DrawOp::DataRow(data_row(config, cursor.y, index, record)));
        cursor = cursor.advance(row_height);
    }

    cursor.advance(row_height)
}

fn page_break(config: &PageConfig, cursor: Cursor, ops: &mut Vec<DrawOp>) -> Cursor {
    ops.push(DrawOp::PageBreak);
    Cursor {
        page: cursor.page + 1,
        y: config.top(),
    }
}

/// Frame around a header row at `header` and as many of the `rows` that
/// follow as fit on the current page.
fn border(config: &PageConfig, header: Cursor, rows: usize) -> DrawOp {
    let row_height = config.row_height;
    let mut y = header.y + row_height;
    let mut fitting = 0;
    while fitting < rows && config.bottom() - y >= row_height {
        fitting += 1;
        y += row_height;
    }

    DrawOp::Border {
        x: config.margin,
        y: header.y,
        width: config.table_width(),
        height: row_height * (fitting as f32 + 1.0),
    }
}

fn header_row(config: &PageConfig, y: f32) -> RowLayout {
    let labels = config.columns.iter().map(|c| c.label.clone()).collect();
    row_layout(config, y, labels)
}

fn data_row(config: &PageConfig, y: f32, index: usize, record: &Record) -> RowLayout {
    let values = vec![
        (index + 1).to_string(),
        record.name.clone(),
        record.batch.to_string(),
        record.status.clone(),
        record.company.clone(),
    ];
    row_layout(config, y, values)
}

fn row_layout(config: &PageConfig, y: f32, values: Vec<String>) -> RowLayout {
    let mut x = config.margin;
    let mut cells = Vec::with_capacity(config.columns.len());
    let mut dividers = Vec::with_capacity(config.columns.len().saturating_sub(1));

    for (position, (column, text)) in config.columns.iter().zip(values).enumerate() {
        if position > 0 {
            dividers.push(x);
        }
        cells.push(Cell {
            x: x + config.cell_padding,
            clip_width: (column.width - config.cell_padding).max(0.0),
            text,
        });
        x += column.width;
    }

    RowLayout {
        x: config.margin,
        y,
        width: config.table_width(),
        height: config.row_height,
        cells,
        dividers,
    }
}
