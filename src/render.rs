//! Terminal-style rendering of the cookie screen.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::actions::{OPEN_ANOTHER, SHARE, TAP_COOKIE};
use crate::app::App;
use crate::host::Host;
use crate::input::{is_narrow_layout, ClickState};
use crate::reveal::{RevealPhase, TAPS_TO_BREAK};
use crate::session::SessionPhase;
use crate::widgets::ClickableList;

/// Whole cookie, 16 columns wide.
const COOKIE_ART: &[&str] = &[
    "   ▄▄██████▄▄   ",
    " ▄████▀▀▀▀████▄ ",
    "▐███▌  🥠  ▐███▌",
    " ▀████▄▄▄▄████▀ ",
    "   ▀▀██████▀▀   ",
];

/// Broken in two with the slip showing.
const BROKEN_ART: &[&str] = &[
    "  ▄▄██▄    ▄██▄▄  ",
    " ▐████▌ ╲╱ ▐████▌ ",
    " ▐███▌  ══  ▐███▌ ",
    "  ▀██▀  ══  ▀██▀  ",
    "                  ",
];

/// Phone-portrait variant.
const COOKIE_ART_COMPACT: &[&str] = &[" ▄████▄ ", "▐█ 🥠 █▌", " ▀████▀ "];
const BROKEN_ART_COMPACT: &[&str] = &["▄█▄  ▄█▄", "▐█▌══▐█▌", "▀█▀  ▀█▀"];

const SPINNER: &[char] = &['◐', '◓', '◑', '◒'];

/// Hint under the cookie for the given number of taps so far.
pub fn tap_hint(taps: u8) -> &'static str {
    match taps {
        0 => "Нажмите, чтобы узнать судьбу",
        1 => "Ещё раз...",
        2 => "Почти готово!",
        _ => "",
    }
}

/// Outside the chat app the share button copies to the clipboard instead.
fn share_label(native_share: bool) -> &'static str {
    if native_share {
        "📤 Поделиться в историю"
    } else {
        "📋 Скопировать предсказание"
    }
}

/// `● ● ○` style progress towards the break.
fn progress_dots(taps: u8) -> String {
    (0..TAPS_TO_BREAK)
        .map(|i| if i < taps { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

fn cookie_art(broken: bool, narrow: bool) -> &'static [&'static str] {
    match (broken, narrow) {
        (false, false) => COOKIE_ART,
        (true, false) => BROKEN_ART,
        (false, true) => COOKIE_ART_COMPACT,
        (true, true) => BROKEN_ART_COMPACT,
    }
}

/// Left padding (0..=2) for the current frame. The cookie sits at 1 and
/// jitters between 0 and 2 while a shake is running.
fn shake_offset(shake: u32, anim_frame: u32) -> u16 {
    if shake > 0 && anim_frame % 2 == 0 {
        2
    } else if shake > 0 {
        0
    } else {
        1
    }
}

/// Rows the fortune card needs at `width`, borders included.
pub fn fortune_card_height(text: &str, width: u16) -> u16 {
    let inner = width.saturating_sub(2).max(1);
    let body = Paragraph::new(fortune_lines(text)).wrap(Wrap { trim: true });
    body.line_count(inner) as u16 + 2
}

fn fortune_lines(text: &str) -> Vec<Line<'_>> {
    vec![
        Line::from(""),
        Line::from(Span::styled(
            text,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center),
        Line::from(""),
    ]
}

pub fn render<H: Host>(
    app: &App<H>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area);

    render_title(f, chunks[0]);
    match (app.session().phase(), app.session().fortune()) {
        (SessionPhase::ShowingFortune, Some(text)) => {
            let native_share = app.session().host().capabilities().share;
            render_fortune(text, native_share, f, chunks[1], click_state)
        }
        _ => render_cookie(app, f, chunks[1], click_state),
    }
    render_toast(app, f, chunks[2]);
}

fn render_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        "🥠 Печенье с предсказанием",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .alignment(Alignment::Center);
    f.render_widget(title, area);
}

fn render_cookie<H: Host>(
    app: &App<H>,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let session = app.session();
    let phase = session.reveal_phase();
    let breaking = phase == RevealPhase::Breaking;
    let narrow = is_narrow_layout(area.width);

    let border_color = if app.shake() > 0 { Color::White } else { Color::Yellow };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);

    let mut lines: Vec<Line> = Vec::new();

    if breaking && app.opening_indicator() {
        let spinner = SPINNER[(app.anim_frame() / 2) as usize % SPINNER.len()];
        let top_pad = inner.height.saturating_sub(1) / 2;
        lines.extend((0..top_pad).map(|_| Line::from("")));
        lines.push(Line::from(Span::styled(
            format!("{spinner} Открываю судьбу..."),
            Style::default().fg(Color::Cyan),
        )));
        f.render_widget(
            Paragraph::new(lines).block(block).alignment(Alignment::Center),
            area,
        );
        return;
    }

    let art = cookie_art(breaking, narrow);
    let art_height = art.len() as u16;
    // art + blank + dots + hint
    let top_pad = inner.height.saturating_sub(art_height + 3) / 2;
    lines.extend((0..top_pad).map(|_| Line::from("")));

    let offset = shake_offset(app.shake(), app.anim_frame()) as usize;
    let (left, right) = (" ".repeat(offset), " ".repeat(2 - offset));
    let image = app.image_available() && !breaking;
    for row in art {
        if image {
            lines.push(Line::from(""));
        } else {
            lines.push(Line::from(Span::styled(
                format!("{left}{row}{right}"),
                Style::default().fg(Color::Yellow),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        progress_dots(session.taps()),
        Style::default().fg(Color::Yellow),
    )));
    let hint = if breaking { "Хрусть!" } else { tap_hint(session.taps()) };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )));

    f.render_widget(
        Paragraph::new(lines).block(block).alignment(Alignment::Center),
        area,
    );

    let mut cs = click_state.borrow_mut();
    if image {
        let art_width = art.iter().map(|r| Line::from(*r).width()).max().unwrap_or(0) as u16;
        let art_width = (art_width + 4).min(inner.width);
        cs.cookie_area = Some(Rect::new(
            inner.x + (inner.width - art_width) / 2,
            inner.y + top_pad,
            art_width,
            art_height.min(inner.height),
        ));
    }
    if !breaking {
        cs.add_click_target(area, TAP_COOKIE);
    }
}

fn render_fortune(
    text: &str,
    native_share: bool,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
) {
    let card_height = fortune_card_height(text, area.width);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(card_height),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .split(area);

    let card = Paragraph::new(fortune_lines(text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" ✨ Ваше предсказание ✨ "),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(card, chunks[0]);

    let button = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let mut cl = ClickableList::new();
    cl.push_clickable(
        Line::from(vec![
            Span::styled(" [S] ", button),
            Span::raw(share_label(native_share)),
        ]),
        SHARE,
    );
    cl.push_clickable(
        Line::from(vec![
            Span::styled(" [R] ", button),
            Span::raw("🥠 Открыть ещё одно"),
        ]),
        OPEN_ANOTHER,
    );

    let mut cs = click_state.borrow_mut();
    cl.register_targets(chunks[1], &mut cs, 1, 1);
    let buttons = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(buttons, chunks[1]);
}

fn render_toast<H: Host>(app: &App<H>, f: &mut Frame, area: Rect) {
    let Some(toast) = app.toast() else {
        return;
    };
    let line = Line::from(Span::styled(
        toast.text.as_str(),
        Style::default().fg(Color::Green),
    ));
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
