//! Rendering routines for the pest gallery TUI.

use crate::app::App;
use pest_gallery_core::Route;
use pest_gallery_core::detail::{DetailState, DetailView};
use pest_gallery_core::flows::FormField;
use pest_gallery_core::gallery::LoadState;
use pest_gallery_protocol::{Category, CategoryFilter, Record};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap,
};

const PRIMARY: Color = Color::Rgb(236, 91, 43); // #EC5B2B
const SECONDARY: Color = Color::Rgb(238, 121, 72); // #EE7948
const TEXT: Color = Color::Rgb(238, 238, 238); // #eeeeee
const TEXT_MUTED: Color = Color::Rgb(128, 128, 128); // #808080
const BORDER: Color = Color::Rgb(60, 60, 60); // #3c3c3c
const BORDER_ACTIVE: Color = Color::Rgb(238, 121, 72); // #EE7948
const ERROR: Color = Color::Rgb(224, 108, 117); // #e06c75
const SUCCESS: Color = Color::Rgb(152, 195, 121); // #98c379
const YELLOW: Color = Color::Rgb(229, 192, 123); // #e5c07b

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Draw the entire TUI frame.
pub fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.area();
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // nav bar
            Constraint::Min(0),    // page
            Constraint::Length(1), // status bar
        ])
        .split(area);

    draw_nav(frame, app, root[0]);
    match app.route().clone() {
        Route::Gallery => draw_gallery(frame, app, root[1]),
        Route::Detail(_) => draw_detail(frame, app, root[1]),
        Route::About => draw_placeholder(frame, "About", "About Page", root[1]),
        Route::Contact => draw_placeholder(frame, "Contact", "Contact Us Page", root[1]),
    }
    draw_status_bar(frame, app, root[2]);

    if app.create.is_open() {
        draw_create_dialog(frame, app, area);
    } else if app.edit.is_open() {
        draw_edit_dialog(frame, app, area);
    }
    if let Some(message) = app.delete.confirmation_message() {
        draw_confirm(frame, &message, area);
    } else if let Some(name) = app.delete.name() {
        draw_confirm(frame, &format!("Deleting {name}..."), area);
    }
}

fn category_color(category: Category) -> Color {
    match category {
        Category::Negative => ERROR,
        Category::Positive => SUCCESS,
        Category::Neutral => TEXT_MUTED,
    }
}

fn category_chip(category: Category) -> Span<'static> {
    Span::styled(
        format!(" {} ", category.as_str()),
        Style::default()
            .fg(category_color(category))
            .add_modifier(Modifier::BOLD),
    )
}

/// Title plus Home / About / Contact tabs.
fn draw_nav(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER));

    let mut spans = vec![
        Span::styled(
            " Pest Gallery ",
            Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("v{VERSION}  "), Style::default().fg(TEXT_MUTED)),
    ];
    let home = Route::Gallery;
    let active_page = match app.route() {
        Route::Detail(_) => &home,
        other => other,
    };
    for (index, route) in Route::NAV.iter().enumerate() {
        let style = if route == active_page {
            Style::default()
                .fg(SECONDARY)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(TEXT)
        };
        spans.push(Span::styled(format!(" {}", index + 1), Style::default().fg(TEXT_MUTED)));
        spans.push(Span::styled(format!(" {} ", route.title()), style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_gallery(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    draw_filter_bar(frame, app, rows[0]);

    let mut title = String::from(" Pests ");
    if app.collection.loading {
        title.push_str("(refreshing) ");
    }
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER))
        .title(Span::styled(
            title,
            Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
        ));
    if let Some(warning) = app.gallery.refresh_error(&app.collection) {
        let block = block.title_bottom(Span::styled(
            format!(" {warning} "),
            Style::default().fg(YELLOW),
        ));
        render_collection(frame, app, block, rows[1]);
    } else {
        render_collection(frame, app, block, rows[1]);
    }
}

fn render_collection(frame: &mut Frame<'_>, app: &App, block: Block<'_>, area: Rect) {
    match app.gallery.load_state(&app.collection) {
        LoadState::Loading => {
            let text = Paragraph::new(Span::styled(" Loading pests...", Style::default().fg(TEXT_MUTED)))
                .block(block);
            frame.render_widget(text, area);
        }
        LoadState::Failed(message) => {
            let text = Paragraph::new(vec![
                Line::from(Span::styled(
                    " Failed to load pests",
                    Style::default().fg(ERROR).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(format!(" {message}"), Style::default().fg(TEXT_MUTED))),
                Line::from(Span::styled(" Press r to retry", Style::default().fg(TEXT_MUTED))),
            ])
            .wrap(Wrap { trim: false })
            .block(block);
            frame.render_widget(text, area);
        }
        LoadState::Empty => {
            let text = Paragraph::new(Span::styled(
                " No pests match this filter. Press n to add one.",
                Style::default().fg(TEXT_MUTED),
            ))
            .block(block);
            frame.render_widget(text, area);
        }
        LoadState::Ready(records) => {
            let items: Vec<ListItem<'_>> = records
                .iter()
                .map(|record| record_item(app, record))
                .collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().bg(BORDER))
                .highlight_symbol("> ");
            let mut state = ListState::default().with_selected(Some(app.gallery.selected()));
            frame.render_stateful_widget(list, area, &mut state);
        }
    }
}

fn record_item<'a>(app: &App, record: &'a Record) -> ListItem<'a> {
    let mut lines = vec![Line::from(vec![
        Span::styled(
            record.name.as_str(),
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        category_chip(record.category),
    ])];
    let description = app.gallery.description(record);
    let clipped = description.has_read_more();
    lines.push(Line::from(Span::styled(
        description.text().to_string(),
        Style::default().fg(TEXT_MUTED),
    )));
    if clipped {
        lines.push(Line::from(Span::styled(
            "Read more (Enter)",
            Style::default().fg(SECONDARY).add_modifier(Modifier::ITALIC),
        )));
    }
    lines.push(Line::from(""));
    ListItem::new(lines)
}

fn draw_filter_bar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(" Filter:", Style::default().fg(TEXT_MUTED))];
    for filter in CategoryFilter::ALL {
        let color = match filter {
            CategoryFilter::All => TEXT,
            CategoryFilter::Only(category) => category_color(category),
        };
        let style = if filter == app.gallery.filter() {
            Style::default()
                .fg(color)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(color)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} ", filter.label()), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_detail(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let Route::Detail(id) = app.route().clone() else {
        return;
    };
    let view = DetailView::new(id);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_ACTIVE))
        .title(Span::styled(
            " Pest details ",
            Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);

    let lines: Vec<Line<'static>> = match view.state(&app.detail) {
        DetailState::Loading => vec![Line::from(Span::styled(
            "Loading...",
            Style::default().fg(TEXT_MUTED),
        ))],
        DetailState::Failed { message, cause } => vec![
            Line::from(Span::styled(
                message,
                Style::default().fg(ERROR).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(cause, Style::default().fg(TEXT_MUTED))),
        ],
        DetailState::Ready(record) => detail_lines(record),
    };

    let total_lines = Paragraph::new(lines.clone())
        .wrap(Wrap { trim: false })
        .line_count(inner.width)
        .max(1);
    let max_scroll = total_lines.saturating_sub(inner.height as usize) as u16;
    app.update_detail_scroll_bounds(max_scroll);

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.detail_scroll, 0));
    frame.render_widget(block, area);
    frame.render_widget(paragraph, inner);
}

fn detail_lines(record: &Record) -> Vec<Line<'static>> {
    let label = Style::default().fg(TEXT_MUTED);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                record.name.clone(),
                Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            category_chip(record.category),
        ]),
        Line::from(""),
        Line::from(Span::styled("Description", label)),
        Line::from(Span::styled(record.description.clone(), Style::default().fg(TEXT))),
    ];
    if let Some(note) = DetailView::note(record) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Notes", label)));
        lines.push(Line::from(Span::styled(note.to_string(), Style::default().fg(TEXT))));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Image ", label),
        Span::styled(record.image_url.clone(), Style::default().fg(SECONDARY)),
    ]));
    lines
}

fn draw_placeholder(frame: &mut Frame<'_>, title: &str, body: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
        ));
    let text = Paragraph::new(Line::from(Span::styled(
        format!(" {body}"),
        Style::default().fg(TEXT),
    )))
    .block(block);
    frame.render_widget(text, area);
}

fn form_lines<'a>(
    fields: &[FormField],
    focus: FormField,
    value: impl Fn(FormField) -> &'a str,
) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    for field in fields {
        let focused = *field == focus;
        let marker = if focused { "> " } else { "  " };
        let label_style = if focused {
            Style::default().fg(SECONDARY).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(TEXT_MUTED)
        };
        let shown = value(*field);
        let shown = if *field == FormField::Category {
            format!("< {shown} >")
        } else {
            shown.to_string()
        };
        lines.push(Line::from(vec![
            Span::styled(marker, label_style),
            Span::styled(format!("{:<12}", field.label()), label_style),
            Span::styled(shown, Style::default().fg(TEXT)),
        ]));
    }
    lines
}

fn draw_create_dialog(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(form) = app.create.form() else {
        return;
    };
    let mut lines = form_lines(&FormField::CREATE, app.focus, |field| form.value(field));
    lines.push(Line::from(""));
    if let Some(err) = app.create.error() {
        lines.push(Line::from(Span::styled(
            format!("  {err}"),
            Style::default().fg(ERROR),
        )));
    }
    let hint = if app.create.is_submitting() {
        "  Uploading image and saving...  Esc to cancel"
    } else {
        "  Tab next field  Left/Right category  Enter upload  Esc cancel"
    };
    lines.push(Line::from(Span::styled(hint, Style::default().fg(TEXT_MUTED))));
    draw_popup(frame, " Upload a pest ", lines, area);
}

fn draw_edit_dialog(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(form) = app.edit.form() else {
        return;
    };
    let mut lines = form_lines(&FormField::EDIT, app.focus, |field| form.value(field));
    lines.push(Line::from(vec![
        Span::styled("  Image       ", Style::default().fg(TEXT_MUTED)),
        Span::styled(form.image_url.as_str(), Style::default().fg(TEXT_MUTED)),
    ]));
    lines.push(Line::from(""));
    if let Some(err) = app.edit.error() {
        lines.push(Line::from(Span::styled(
            format!("  {err}"),
            Style::default().fg(ERROR),
        )));
    }
    let hint = if app.edit.is_submitting() {
        "  Saving...  Esc to cancel"
    } else {
        "  Tab next field  Left/Right category  Enter save  Esc cancel"
    };
    lines.push(Line::from(Span::styled(hint, Style::default().fg(TEXT_MUTED))));
    draw_popup(frame, " Edit pest ", lines, area);
}

fn draw_confirm(frame: &mut Frame<'_>, message: &str, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(format!("  {message}"), Style::default().fg(TEXT))),
        Line::from(""),
        Line::from(Span::styled(
            "  y confirm  n cancel",
            Style::default().fg(TEXT_MUTED),
        )),
    ];
    draw_popup(frame, " Delete pest ", lines, area);
}

fn draw_popup(frame: &mut Frame<'_>, title: &str, lines: Vec<Line<'_>>, area: Rect) {
    let height = (lines.len() as u16 + 2).min(area.height);
    let width = (area.width * 3 / 4).max(40).min(area.width);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_ACTIVE))
        .title(Span::styled(
            title.to_string(),
            Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        popup,
    );
}

/// Draw the status bar at the bottom.
fn draw_status_bar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let status_color = match app.status.as_str() {
        "idle" => TEXT_MUTED,
        status if status.contains("failed") => ERROR,
        _ => YELLOW,
    };

    let shortcuts: &[(&str, &str)] = match app.route() {
        Route::Gallery => &[
            (" q", " quit"),
            ("  Up/Down", " select"),
            ("  Left/Right", " filter"),
            ("  Enter", " read more"),
            ("  n", " new"),
            ("  e", " edit"),
            ("  d", " delete"),
            ("  r", " refresh"),
        ],
        Route::Detail(_) => &[
            (" q", " quit"),
            ("  Esc", " back"),
            ("  Up/Down", " scroll"),
        ],
        Route::About | Route::Contact => &[(" q", " quit"), ("  Esc", " back")],
    };
    let spans: Vec<Span<'_>> = shortcuts
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(*key, Style::default().fg(TEXT_MUTED)),
                Span::styled(*action, Style::default().fg(BORDER)),
            ]
        })
        .collect();

    let right_text = format!(" {} ", app.status);
    let right_len = right_text.chars().count() as u16;
    let left_area = Rect {
        width: area.width.saturating_sub(right_len),
        ..area
    };
    let right_area = Rect {
        x: area.x + area.width.saturating_sub(right_len),
        width: right_len.min(area.width),
        ..area
    };

    frame.render_widget(Paragraph::new(Line::from(spans)), left_area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            right_text,
            Style::default().fg(status_color),
        ))),
        right_area,
    );
}
