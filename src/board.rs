//! The presentation surface: one table per configured panel, printed to the terminal.

use crate::presenter::RenderedRow;
use comfy_table::{
    presets,
    Attribute,
    Cell,
    CellAlignment,
    Color,
    ContentArrangement,
    Table,
};
use metrics_tracker_config::PanelConfig;

/// Where the loader puts rows and inline errors.
pub trait Surface {
    /// Replaces everything the panel currently shows.
    fn show_rows(&mut self, panel: &str, rows: Vec<RenderedRow>);

    fn show_error(&mut self, panel: &str, message: String);
}

#[derive(Debug, Clone, PartialEq)]
enum Content {
    Loading,
    Rows(Vec<RenderedRow>),
    Error(String),
}

#[derive(Debug, Clone)]
struct Panel {
    id: String,
    title: String,
    show_change: bool,
    content: Content,
}

/// Panels in configuration order.
#[derive(Debug, Clone, Default)]
pub struct Board {
    panels: Vec<Panel>,
}

impl Board {
    pub fn new(panels: &[PanelConfig]) -> Self {
        Self {
            panels: panels
                .iter()
                .map(|panel| Panel {
                    id: panel.id.clone(),
                    title: panel.title.clone(),
                    show_change: panel.options.show_change,
                    content: Content::Loading,
                })
                .collect(),
        }
    }

    fn panel_mut(&mut self, id: &str) -> Option<&mut Panel> {
        let panel = self.panels.iter_mut().find(|panel| panel.id == id);
        if panel.is_none() {
            warn!(panel = id, "No such panel on the board");
        }
        panel
    }

    pub fn rows(&self, id: &str) -> Option<&[RenderedRow]> {
        self.panels
            .iter()
            .find(|panel| panel.id == id)
            .and_then(|panel| match &panel.content {
                Content::Rows(rows) => Some(rows.as_slice()),
                _ => None,
            })
    }

    pub fn error(&self, id: &str) -> Option<&str> {
        self.panels
            .iter()
            .find(|panel| panel.id == id)
            .and_then(|panel| match &panel.content {
                Content::Error(message) => Some(message.as_str()),
                _ => None,
            })
    }

    pub fn render(&self) -> String {
        let mut output = String::new();
        for panel in &self.panels {
            output.push_str(&format!("\n📊 {}\n", panel.title));
            match &panel.content {
                Content::Loading => output.push_str("Loading...\n"),
                Content::Error(message) => output.push_str(&format!("❌ {message}\n")),
                Content::Rows(rows) if rows.is_empty() => output.push_str("No records\n"),
                Content::Rows(rows) => output.push_str(&format!("{}\n", table(rows, panel.show_change))),
            }
        }
        output
    }
}

fn table(rows: &[RenderedRow], show_change: bool) -> Table {
    let mut header = vec![
        Cell::new("ID").add_attribute(Attribute::Bold),
        Cell::new("Timestamp").add_attribute(Attribute::Bold),
        Cell::new("Count").add_attribute(Attribute::Bold),
    ];
    if show_change {
        header.push(Cell::new("Change").add_attribute(Attribute::Bold));
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for row in rows {
        let mut cells = vec![
            Cell::new(&row.id),
            Cell::new(&row.timestamp),
            Cell::new(&row.count).set_alignment(CellAlignment::Right),
        ];
        if show_change {
            cells.push(match &row.change {
                Some(change) if change.is_negative() => Cell::new(change).fg(Color::Red),
                Some(change) => Cell::new(change).fg(Color::Green),
                None => Cell::new(""),
            });
        }
        table.add_row(cells);
    }
    table
}

impl Surface for Board {
    fn show_rows(&mut self, panel: &str, rows: Vec<RenderedRow>) {
        if let Some(panel) = self.panel_mut(panel) {
            panel.content = Content::Rows(rows);
        }
    }

    fn show_error(&mut self, panel: &str, message: String) {
        if let Some(panel) = self.panel_mut(panel) {
            panel.content = Content::Error(message);
        }
    }
}
