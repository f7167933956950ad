use tui::backend::Backend;
use tui::layout::{Constraint, Direction, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Span, Spans};
use tui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use tui::Frame;

use nt_core::SentimentLabel;
use nt_view::render::NO_RESULTS;
use nt_view::{AnalysisRender, ArticleCard, DetailRender, FormField, ListRender, SentimentBadge};

use crate::app::{App, Focus, Screen};

pub fn draw<B: Backend>(f: &mut Frame<B>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.size());

    draw_form(f, app, chunks[0]);
    draw_address(f, app, chunks[1]);
    match app.screen {
        Screen::List => draw_list(f, app, chunks[2]),
        Screen::Detail => draw_detail(f, app, chunks[2]),
    }
    draw_help(f, app, chunks[3]);
}

fn draw_form<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let draft = app.form.draft();
    let editing = app.focus == Focus::Form;
    let error = app.form.field_error();

    let field = |field: FormField| -> Vec<Span<'static>> {
        let focused = editing && app.form.focus() == field;
        let has_error = matches!(error, Some((e, _)) if e == field);
        let mut value_style = Style::default();
        if focused {
            value_style = value_style.add_modifier(Modifier::REVERSED);
        }
        if has_error {
            value_style = value_style.fg(Color::Red);
        }
        let value = draft.value(field);
        vec![
            Span::styled(format!("{}: ", field.label()), Style::default().fg(Color::DarkGray)),
            Span::styled(if value.is_empty() { " ".to_string() } else { value }, value_style),
            Span::raw("   "),
        ]
    };

    let mut lines = vec![
        Spans::from([field(FormField::Query), field(FormField::Source)].concat()),
        Spans::from(
            [
                field(FormField::Sentiment),
                field(FormField::Sort),
                field(FormField::DateFrom),
                field(FormField::DateTo),
            ]
            .concat(),
        ),
    ];
    if let Some((_, message)) = error {
        lines.push(Spans::from(Span::styled(message, Style::default().fg(Color::Red))));
    }

    let border = if editing { Color::Yellow } else { Color::Gray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Filters ");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_address<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let (text, style) = if app.focus == Focus::AddressPrompt {
        (app.address_input.clone(), Style::default().add_modifier(Modifier::REVERSED))
    } else {
        (format!("?{}", app.filter.address()), Style::default())
    };
    let title = if app.filter.can_go_back() { " Address  (b: back) " } else { " Address " };
    let block = Block::default().borders(Borders::ALL).title(title);
    f.render_widget(Paragraph::new(Span::styled(text, style)).block(block), area);
}

fn draw_list<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Articles ");
    match app.list.render() {
        ListRender::Skeletons(count) => {
            let items: Vec<ListItem> = (0..count)
                .map(|_| {
                    ListItem::new(vec![
                        Spans::from(Span::styled("░".repeat(32), Style::default().fg(Color::DarkGray))),
                        Spans::from(Span::styled("░".repeat(18), Style::default().fg(Color::DarkGray))),
                        Spans::from(""),
                    ])
                })
                .collect();
            f.render_widget(List::new(items).block(block), area);
        }
        ListRender::Error { message, .. } => {
            let text = vec![
                Spans::from(Span::styled(
                    "Failed to load articles",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Spans::from(message),
                Spans::from(""),
                Spans::from(Span::styled("r: retry", Style::default().fg(Color::DarkGray))),
            ];
            f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: false }), area);
        }
        ListRender::NoResults => {
            f.render_widget(Paragraph::new(NO_RESULTS).block(block), area);
        }
        ListRender::Cards(cards) => {
            let items: Vec<ListItem> = cards.iter().map(card_item).collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(Style::default().bg(Color::DarkGray))
                .highlight_symbol("> ");
            let mut state = ListState::default();
            state.select(Some(app.selected));
            f.render_stateful_widget(list, area, &mut state);
        }
    }
}

fn badge_span(badge: &SentimentBadge) -> Span<'static> {
    let color = match badge.label {
        SentimentLabel::Positive => Color::Green,
        SentimentLabel::Neutral => Color::Gray,
        SentimentLabel::Negative => Color::Red,
    };
    Span::styled(format!(" [{}] ", badge.text()), Style::default().fg(color))
}

fn card_item(card: &ArticleCard) -> ListItem<'static> {
    let mut title = vec![Span::styled(
        card.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(badge) = &card.badge {
        title.push(badge_span(badge));
    }

    let mut lines = vec![
        Spans::from(title),
        Spans::from(Span::styled(card.published.clone(), Style::default().fg(Color::DarkGray))),
    ];
    if let Some(summary) = &card.summary {
        lines.push(Spans::from(summary.clone()));
    }
    if !card.keywords.is_empty() {
        lines.push(Spans::from(Span::styled(
            card.keywords.join(" · "),
            Style::default().fg(Color::Cyan),
        )));
    }
    lines.push(Spans::from(""));
    ListItem::new(lines)
}

fn draw_detail<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Article ");
    let lines = match app.detail.render() {
        DetailRender::Empty => Vec::new(),
        DetailRender::Loading => vec![Spans::from("Loading...")],
        DetailRender::Error { message, .. } => vec![
            Spans::from(Span::styled("Failed to load article", Style::default().fg(Color::Red))),
            Spans::from(message),
        ],
        DetailRender::Article { card, analysis } => {
            let mut lines = vec![Spans::from(Span::styled(
                card.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ))];
            let mut meta = vec![Span::styled(card.published.clone(), Style::default().fg(Color::DarkGray))];
            if let Some(badge) = &card.badge {
                meta.push(badge_span(badge));
            }
            lines.push(Spans::from(meta));
            lines.push(Spans::from(""));
            if let Some(summary) = &card.summary {
                lines.push(Spans::from(summary.clone()));
                lines.push(Spans::from(""));
            }
            if !card.keywords.is_empty() {
                lines.push(Spans::from(Span::styled(card.keywords.join(" · "), Style::default().fg(Color::Cyan))));
            }
            lines.push(Spans::from(Span::styled(card.link.clone(), Style::default().fg(Color::Blue))));
            lines.push(Spans::from(""));

            match analysis {
                AnalysisRender::NotRequested => {
                    lines.push(Spans::from(Span::styled("a: load analysis", Style::default().fg(Color::DarkGray))))
                }
                AnalysisRender::Loading => lines.push(Spans::from("Loading analysis...")),
                AnalysisRender::Unavailable(message) => lines.push(Spans::from(Span::styled(
                    format!("Analysis unavailable: {}", message),
                    Style::default().fg(Color::Red),
                ))),
                AnalysisRender::Ready(panel) => {
                    lines.push(Spans::from(Span::styled("Analysis", Style::default().add_modifier(Modifier::BOLD))));
                    if let Some(badge) = &panel.badge {
                        let score = badge.score.map(|s| format!("{:.2}", s)).unwrap_or_default();
                        lines.push(Spans::from(vec![badge_span(badge), Span::raw(score)]));
                    }
                    if let Some(summary) = &panel.summary {
                        lines.push(Spans::from(summary.clone()));
                    }
                    if !panel.keywords.is_empty() {
                        lines.push(Spans::from(panel.keywords.join(" · ")));
                    }
                    if let Some(model) = &panel.model_name {
                        lines.push(Spans::from(format!("model: {}", model)));
                    }
                    if let Some(created) = &panel.created {
                        lines.push(Spans::from(format!("analyzed: {}", created)));
                    }
                    for (key, value) in &panel.metadata {
                        lines.push(Spans::from(format!("{}: {}", key, value)));
                    }
                }
            }
            lines
        }
    };
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}

fn draw_help<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let help = match (app.screen, app.focus) {
        (_, Focus::AddressPrompt) => "enter: open address  esc: cancel",
        (Screen::Detail, _) => "a: analysis  esc/b: back to list  q: quit",
        (Screen::List, Focus::Form) => "tab: next field  ←/→: change choice  ctrl-u: clear  enter: apply  esc: leave form",
        (Screen::List, Focus::List) => "/: filters  ↑/↓: select  enter: open  g: go to address  b: back  r: reload  q: quit",
    };
    f.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(Color::DarkGray))),
        area,
    );
}
