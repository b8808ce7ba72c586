use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use audio_drill::app::{ReviewState, SessionView};
use audio_drill::data;
use audio_drill::feedback;
use audio_drill::playback::PlaybackState;

const ORANGE: Color = Color::Rgb(0xFF, 0x98, 0x00);
const GREEN: Color = Color::Rgb(0x4C, 0xAF, 0x50);

pub fn render(view: &SessionView, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(9),    // Card
            Constraint::Length(3), // Primary action
            Constraint::Length(3), // Stats
            Constraint::Length(1), // Hint
        ])
        .split(frame.area());

    render_card(view, frame, chunks[0]);
    render_button(view, frame, chunks[1]);
    render_stats(view, frame, chunks[2]);

    let hint = Paragraph::new("Space / click: continue   r: replay   q: quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(hint, chunks[3]);
}

fn render_card(view: &SessionView, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ORANGE))
        .title(format!(" Card {} ", view.card_id));

    let speaker = match view.playback {
        PlaybackState::Loading => "[ ... ]",
        PlaybackState::Playing => "[ ))) ]",
        PlaybackState::Error => "[  x  ]",
        _ => "[  -  ]",
    };

    let mut lines = vec![
        Line::from(Span::styled(
            speaker,
            Style::default().fg(ORANGE).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            feedback::playback_label(view.playback),
            Style::default().fg(Color::Gray),
        )),
    ];

    // There is no sound in a terminal, so show what is being said instead.
    if view.playback == PlaybackState::Playing {
        if let Some(text) = data::transcript(&view.prompt) {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(text, Style::default().fg(Color::White))));
        }
    }

    if let Some(error) = &view.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red))));
    }

    if let Some(answer) = &view.answer {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            answer.as_str(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )));
        if let Some(seconds) = view.last_reaction {
            lines.push(Line::from(Span::styled(
                format!("answered in {:.2}s", seconds),
                Style::default().fg(Color::Gray),
            )));
        }
    }

    let card = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(card, area);
}

fn render_button(view: &SessionView, frame: &mut Frame, area: Rect) {
    let dimmed = view.state == ReviewState::Playing && view.playback == PlaybackState::Loading;
    let style = if dimmed {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(GREEN).add_modifier(Modifier::BOLD)
    };

    let button = Paragraph::new(view.primary_label)
        .style(style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(style));
    frame.render_widget(button, area);
}

fn render_stats(view: &SessionView, frame: &mut Frame, area: Rect) {
    let stats = Paragraph::new(view.stats.to_string())
        .style(Style::default().fg(ORANGE).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::ALL).title(" Stats "));
    frame.render_widget(stats, area);
}
