use ratatui::prelude::*;
use ratatui::widgets::{
    Block, BorderType, HighlightSpacing, List, ListItem, ListState, Padding, Paragraph,
    StatefulWidget, Widget,
};

use crate::color::Color as ThemeColor;
use crate::theme::ColorScheme;

use super::list::{FilterState, ThemeList};

const COLUMNS: usize = 4;
const GAP: usize = 2;
/// Border plus one column of padding on each side of a swatch group.
const FRAME_ALLOWANCE: usize = 4;
const BORDER_COLOR: Color = Color::Indexed(69);
const ACCENT_COLOR: Color = Color::Indexed(170);

/// Rows of the list pane that are not list items: border, status, help.
const LIST_CHROME_ROWS: u16 = 6;
/// Each entry takes a title row and a description row.
const ROWS_PER_ENTRY: u16 = 2;

/// Width of the right-hand pane for a terminal `width` columns wide.
pub fn preview_width(width: u16) -> u16 {
    width - width / 2
}

/// Number of entries one page of the list pane can show.
pub fn list_page_size(height: u16) -> usize {
    (height.saturating_sub(LIST_CHROME_ROWS) / ROWS_PER_ENTRY).max(1) as usize
}

fn to_color(c: ThemeColor) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Choose black or white foreground for readable text on the given background.
fn contrast_fg(c: ThemeColor) -> Color {
    if c.relative_luminance() > 0.4 {
        Color::Black
    } else {
        Color::White
    }
}

/// Center `text` in `width` cells, cutting it if it does not fit.
fn center(text: &str, width: usize) -> String {
    let text: String = text.chars().take(width).collect();
    format!("{text:^width$}")
}

/// A solid block of the token's color, with the token written on it.
///
/// Tokens that do not resolve to a color are shown as plain text.
fn swatch(token: &str, box_width: usize) -> Span<'static> {
    let label = center(token.trim(), box_width);
    match ThemeColor::parse(token) {
        Some(c) => Span::styled(label, Style::new().bg(to_color(c)).fg(contrast_fg(c))),
        None => Span::raw(label),
    }
}

/// Render a theme file as a preview of its palette, sized for `width`.
///
/// A theme that fails to parse produces a one-line error instead.
pub fn render_preview(content: &str, width: u16) -> Text<'static> {
    let scheme = match ColorScheme::parse(content) {
        Ok(scheme) => scheme,
        Err(err) => return Text::from(format!("Error parsing theme: {}", super::error_line(&err))),
    };

    let content_width = usize::from(width).saturating_sub(FRAME_ALLOWANCE);
    let box_width = (content_width.saturating_sub((COLUMNS - 1) * GAP) / COLUMNS).max(1);
    let group = SwatchGroup {
        content_width,
        box_width,
    };

    let colors = &scheme.colors;
    let primary = [
        (colors.primary.background.as_str(), "Background".to_string()),
        (colors.primary.foreground.as_str(), "Foreground".to_string()),
    ];
    let normal: Vec<(&str, String)> = colors
        .normal
        .named()
        .into_iter()
        .map(|(token, name)| (token, name.to_string()))
        .collect();
    let bright: Vec<(&str, String)> = colors
        .bright
        .named()
        .into_iter()
        .map(|(token, name)| (token, format!("Bright {name}")))
        .collect();

    let mut lines = Vec::new();
    push_title(&mut lines, "Theme Preview");
    lines.push(Line::default());
    push_title(&mut lines, "Background/Foreground Colors");
    group.push(&mut lines, &primary);
    lines.push(Line::default());
    push_title(&mut lines, "Normal Colors");
    group.push(&mut lines, &normal);
    lines.push(Line::default());
    push_title(&mut lines, "Bright Colors");
    group.push(&mut lines, &bright);

    Text::from(lines)
}

fn push_title(lines: &mut Vec<Line<'static>>, title: &'static str) {
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(title, Style::new().bold())).centered());
}

/// A rounded, padded box of swatches laid out `COLUMNS` per row.
struct SwatchGroup {
    content_width: usize,
    box_width: usize,
}

impl SwatchGroup {
    fn push(&self, lines: &mut Vec<Line<'static>>, swatches: &[(&str, String)]) {
        let border = Style::new().fg(BORDER_COLOR);
        let inner = self.content_width + 2;

        lines.push(Line::from(Span::styled(
            format!("╭{}╮", "─".repeat(inner)),
            border,
        )));
        lines.push(self.framed(Vec::new(), 0, border));
        for row in swatches.chunks(COLUMNS) {
            let used = row.len() * self.box_width + (row.len() - 1) * GAP;
            let boxes = row
                .iter()
                .map(|(token, _)| swatch(token, self.box_width))
                .collect();
            let labels = row
                .iter()
                .map(|(_, label)| Span::raw(center(label, self.box_width)))
                .collect();
            lines.push(self.framed(boxes, used, border));
            lines.push(self.framed(labels, used, border));
        }
        lines.push(self.framed(Vec::new(), 0, border));
        lines.push(Line::from(Span::styled(
            format!("╰{}╯", "─".repeat(inner)),
            border,
        )));
    }

    /// One line inside the border, `cells` centered and separated by `GAP`.
    fn framed(&self, cells: Vec<Span<'static>>, used: usize, border: Style) -> Line<'static> {
        let left = self.content_width.saturating_sub(used) / 2;
        let right = self.content_width.saturating_sub(used + left);

        let mut spans = vec![
            Span::styled("│ ", border),
            Span::raw(" ".repeat(left)),
        ];
        for (i, cell) in cells.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" ".repeat(GAP)));
            }
            spans.push(cell);
        }
        spans.push(Span::raw(" ".repeat(right)));
        spans.push(Span::styled(" │", border));
        Line::from(spans)
    }
}

/// The left pane: title, status, the paged entry list and key help.
pub struct ThemeListWidget<'a> {
    list: &'a ThemeList,
    applied: Option<&'a str>,
}

impl<'a> ThemeListWidget<'a> {
    pub fn new(list: &'a ThemeList, applied: Option<&'a str>) -> Self {
        Self { list, applied }
    }

    fn status_line(&self) -> Line<'static> {
        if self.list.is_editing_filter() {
            return Line::from(vec![
                Span::styled("Filter: ", Style::new().fg(ACCENT_COLOR)),
                Span::raw(format!("{}█", self.list.filter_text())),
            ]);
        }

        let count = if self.list.filter_state() == FilterState::Applied {
            format!(
                "“{}” {} of {} items",
                self.list.filter_text(),
                self.list.len(),
                self.list.total_len()
            )
        } else {
            format!("{} items", self.list.len())
        };
        let mut spans = vec![Span::styled(count, Style::new().dark_gray())];
        if let Some(name) = self.applied {
            spans.push(Span::styled(" • ", Style::new().dark_gray()));
            spans.push(Span::styled(format!("applied {name}"), Style::new().dark_gray()));
        }
        Line::from(spans)
    }

    fn help_lines(&self) -> Vec<Line<'static>> {
        let rows: &[&'static str] = if self.list.is_editing_filter() {
            &["enter apply • esc clear"]
        } else {
            &["q quit • enter select • / filter", "↑/k ↓/j move • ←/h →/l page"]
        };
        rows.iter()
            .map(|row| Line::from(Span::styled(*row, Style::new().dark_gray())))
            .collect()
    }
}

impl Widget for ThemeListWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let frame = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::new().fg(BORDER_COLOR))
            .title(Span::styled(" Alacritheme ", Style::new().bold()));
        let inner = frame.inner(area);
        frame.render(area, buf);

        let [status_area, list_area, help_area] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .areas(inner);

        Paragraph::new(vec![self.status_line()])
            .block(Block::new().padding(Padding::left(1)))
            .render(status_area, buf);

        if self.list.is_empty() {
            Paragraph::new(Line::from(Span::styled(" No items.", Style::new().dark_gray())))
                .render(list_area, buf);
        } else {
            let items: Vec<ListItem> = self
                .list
                .visible()
                .map(|entry| {
                    let name = if entry.is_directory && entry.name != ".." {
                        format!("{}/", entry.name)
                    } else {
                        entry.name.clone()
                    };
                    ListItem::new(vec![
                        Line::from(name),
                        Line::from(Span::styled(
                            entry.path.display().to_string(),
                            Style::new().dark_gray(),
                        )),
                    ])
                })
                .collect();

            let mut state = ListState::default()
                .with_offset(self.list.page_start())
                .with_selected(Some(self.list.index()));
            let list = List::new(items)
                .highlight_symbol("│ ")
                .highlight_spacing(HighlightSpacing::Always)
                .highlight_style(Style::new().fg(ACCENT_COLOR).bold());
            StatefulWidget::render(list, list_area, buf, &mut state);
        }

        Paragraph::new(self.help_lines())
            .block(Block::new().padding(Padding::left(1)))
            .render(help_area, buf);
    }
}
