use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::state::app_state::LookupState;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use ftc_api::{
    AggregatedTeamView, Alliance, AllianceColor, EventMatches, EventParticipation, Match, Outcome,
    StatValue, TeamNumber, TeamResult,
};

static TABS: &[&str; 2] = &["Team", "Matches"];

const HELP_TEXT: &str = "Help: q=quit  /=team number  r=retry  1=Team  2=Matches  j/k=move  \
    Enter=open event  h/l=prev/next event  f=full screen  \"=logs";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }
        draw_input(f, layout.input, app);

        match app.state.active_tab {
            MenuItem::Overview => draw_overview(f, layout.main, app),
            MenuItem::Matches => draw_matches(f, layout.main, app),
            MenuItem::Help => draw_placeholder(f, layout.main, HELP_TEXT),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        log::error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Overview => 0,
        MenuItem::Matches => 1,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_input(f: &mut Frame, area: Rect, app: &App) {
    let input = &app.state.input;
    let (border, title) = if input.editing {
        (Color::Yellow, " Team number (Enter to look up, Esc to cancel) ")
    } else {
        (Color::DarkGray, " Team number (/ to edit) ")
    };
    let block = default_border(border).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut spans = vec![Span::raw(input.text.as_str())];
    if input.editing {
        spans.push(Span::styled("_", Style::default().fg(Color::Yellow)));
    }
    if let Some(at) = app.state.loaded_at.as_deref() {
        spans.push(Span::styled(
            format!("   season {}  updated {at}", app.settings.season),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn draw_overview(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Team ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(view) = app.state.lookup.view() else {
        draw_lookup_status(f, inner, app);
        return;
    };

    let [profile_area, events_area] = if inner.width >= 90 {
        Layout::horizontal([Constraint::Percentage(38), Constraint::Percentage(62)]).areas(inner)
    } else {
        Layout::vertical([Constraint::Length(12), Constraint::Fill(1)]).areas(inner)
    };

    draw_profile(f, profile_area, view);
    draw_event_list(f, events_area, view, app.state.team_view.selected_event);
}

/// Everything that isn't a loaded team: idle, loading, not found, invalid, failed.
fn draw_lookup_status(f: &mut Frame, area: Rect, app: &App) {
    let (msg, color) = match &app.state.lookup {
        LookupState::Idle => (
            "Enter a team number to view its season".to_string(),
            Color::DarkGray,
        ),
        LookupState::Loading { input } => (format!("Loading team {input}..."), Color::Gray),
        LookupState::NotFound(team) => (
            format!("Team {team} not found for the {} season", app.settings.season),
            Color::Yellow,
        ),
        LookupState::Invalid(raw) => (
            format!("\"{raw}\" is not a valid team number"),
            Color::Magenta,
        ),
        LookupState::Failed { message, retryable } => {
            let hint = if *retryable { "\n\nPress r to retry" } else { "" };
            (format!("Lookup failed:\n{message}{hint}"), Color::Red)
        }
        LookupState::Found(_) => return,
    };
    let [_top, middle] =
        Layout::vertical([Constraint::Percentage(40), Constraint::Fill(1)]).areas(area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(color))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        middle,
    );
}

fn draw_profile(f: &mut Frame, area: Rect, view: &AggregatedTeamView) {
    let block = default_border(Color::DarkGray).title(format!(" {} ", view.profile.number));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let p = &view.profile;
    let label = Style::default().fg(Color::Gray);
    let mut lines = vec![
        Line::from(Span::styled(
            p.name.clone().unwrap_or_else(|| "(unnamed)".to_string()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("School   ", label),
            Span::raw(or_dash(p.school_name.as_deref())),
        ]),
        Line::from(vec![
            Span::styled("Location ", label),
            Span::raw(or_dash(p.location.display().as_deref())),
        ]),
        Line::from(vec![
            Span::styled("Rookie   ", label),
            Span::raw(p.rookie_year.map_or("-".to_string(), |y| y.to_string())),
        ]),
    ];
    if !p.sponsors.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Sponsors ", label),
            Span::raw(p.sponsors.join(", ")),
        ]));
    }
    lines.push(Line::from(""));

    let team_count = view.metrics.as_ref().and_then(|m| m.team_count);
    match view.metrics.as_ref() {
        Some(m) => {
            lines.push(Line::from(Span::styled(
                format!("{} season OPR", view.season),
                label,
            )));
            for (name, stat) in [
                ("Total ", m.total),
                ("Auto  ", m.auto),
                ("Driver", m.driver_controlled),
                ("End   ", m.endgame),
            ] {
                lines.push(Line::from(format!("  {name} {}", format_stat(stat, team_count))));
            }
        }
        None => lines.push(Line::from(Span::styled(
            "No season stats yet",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    let record = view.season_record();
    if record.played() > 0 {
        lines.push(Line::from(""));
        lines.push(Line::from(format!("Quals record {record}")));
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_event_list(f: &mut Frame, area: Rect, view: &AggregatedTeamView, selected: usize) {
    let block = default_border(Color::DarkGray).title(" Events (most recent first) ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if view.events.is_empty() {
        f.render_widget(
            Paragraph::new("No events this season")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let mut lines = Vec::with_capacity(view.events.len() * 2 + 1);
    if view.partial_failure() {
        lines.push(Line::from(Span::styled(
            "Some match lists could not be loaded (press r to retry)",
            Style::default().fg(Color::Red),
        )));
    }

    // Two lines per event; keep the selection on screen.
    let per_page = (inner.height as usize).saturating_sub(lines.len()).max(2) / 2;
    let skip = selected.saturating_sub(per_page.saturating_sub(1));

    for (idx, event) in view.events.iter().enumerate().skip(skip).take(per_page) {
        let is_selected = idx == selected;
        let marker = if is_selected { ">" } else { " " };
        let title_style = if is_selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
            Span::raw(format!("{marker} ")),
            Span::styled(format_event_dates(event), Style::default().fg(Color::Gray)),
            Span::raw(" "),
            Span::styled(
                event.event.name.clone().unwrap_or_else(|| event.event.code.clone()),
                title_style,
            ),
        ]));
        lines.push(Line::from(vec![
            Span::raw("    "),
            Span::styled(event_summary(event), Style::default().fg(Color::DarkGray)),
            match &event.matches {
                EventMatches::Unavailable { .. } => {
                    Span::styled("  matches unavailable", Style::default().fg(Color::Red))
                }
                EventMatches::Loaded { .. } => Span::raw(""),
            },
        ]));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_matches(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Matches ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(view) = app.state.lookup.view() else {
        draw_lookup_status(f, inner, app);
        return;
    };
    let Some(event) = app.state.team_view.selected(view) else {
        f.render_widget(
            Paragraph::new("No event selected")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    };

    let [header, key_legend, content] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(inner);

    let name = event.event.name.as_deref().unwrap_or(event.event.code.as_str());
    let location = event
        .event
        .venue
        .iter()
        .cloned()
        .chain(event.event.location())
        .collect::<Vec<_>>()
        .join(", ");
    f.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled(
                format!("{name} [{}]  {}", event.event.code, format_event_dates(event)),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("{}  {}", or_dash(Some(location.as_str())), event_summary(event)),
                Style::default().fg(Color::Gray),
            )),
        ]),
        header,
    );
    f.render_widget(
        Paragraph::new("Keys: j/k=scroll  h/l=prev/next event  Esc=back")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    let matches = match &event.matches {
        EventMatches::Unavailable { reason } => {
            let msg = format!("Matches could not be loaded:\n{reason}\n\nPress r to retry");
            f.render_widget(
                Paragraph::new(msg)
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: true }),
                content,
            );
            return;
        }
        EventMatches::Loaded { matches } if matches.is_empty() => {
            f.render_widget(
                Paragraph::new("No qualification matches played")
                    .style(Style::default().fg(Color::DarkGray))
                    .alignment(Alignment::Center),
                content,
            );
            return;
        }
        EventMatches::Loaded { matches } => matches,
    };

    let team = view.profile.number;
    let mut lines = Vec::with_capacity(matches.len() + 1);
    lines.push(Line::from(Span::styled(
        "  #   Red            Score      Blue           Result",
        Style::default().fg(Color::Gray),
    )));
    let offset = app.state.team_view.match_scroll as usize;
    let visible = content.height.saturating_sub(1) as usize;
    for m in matches.iter().skip(offset).take(visible.max(1)) {
        lines.push(match_line(m, team));
    }
    f.render_widget(Paragraph::new(lines), content);
}

fn match_line(m: &Match, team: TeamNumber) -> Line<'static> {
    let red = Style::default().fg(Color::Red);
    let blue = Style::default().fg(Color::Blue);
    let winner = Style::default().add_modifier(Modifier::BOLD);

    let (red_score_style, blue_score_style) = match (m.has_score(), m.outcome) {
        (true, Outcome::Red) => (red.patch(winner), blue),
        (true, Outcome::Blue) => (red, blue.patch(winner)),
        _ => (red, blue),
    };

    let result = match (m.team_result, m.has_score()) {
        (_, false) => Span::styled("no score yet", Style::default().fg(Color::DarkGray)),
        (Some(r), true) => Span::styled(
            format!("{} {:+}", r.short(), m.team_margin.unwrap_or(0)),
            Style::default().fg(match r {
                TeamResult::Win => Color::Green,
                TeamResult::Loss => Color::Red,
                TeamResult::Tie => Color::Yellow,
            }),
        ),
        (None, true) => Span::raw(outcome_label(m.outcome)),
    };

    Line::from(vec![
        Span::raw(format!("Q{:<3} ", m.number)),
        roster_span(&m.red, team, AllianceColor::Red, m.team_alliance),
        Span::raw(" "),
        Span::styled(format!("{:>4}", format_score(m.red_score)), red_score_style),
        Span::raw(" - "),
        Span::styled(format!("{:<4}", format_score(m.blue_score)), blue_score_style),
        Span::raw(" "),
        roster_span(&m.blue, team, AllianceColor::Blue, m.team_alliance),
        Span::raw(" "),
        result,
    ])
}

fn roster_span(
    alliance: &Alliance,
    team: TeamNumber,
    color: AllianceColor,
    team_alliance: Option<AllianceColor>,
) -> Span<'static> {
    let fg = match color {
        AllianceColor::Red => Color::Red,
        AllianceColor::Blue => Color::Blue,
    };
    let mut style = Style::default().fg(fg);
    if team_alliance == Some(color) && alliance.contains(team) {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    Span::styled(format_roster(alliance), style)
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let block = default_border(Color::DarkGray).title(" Logs ");
    f.render_widget(TuiLoggerWidget::default().block(block), area);
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

fn or_dash(s: Option<&str>) -> String {
    s.filter(|v| !v.is_empty()).unwrap_or("-").to_string()
}

fn format_score(score: Option<u32>) -> String {
    score.map_or("--".to_string(), |s| s.to_string())
}

fn format_roster(alliance: &Alliance) -> String {
    let slot = |s: Option<u32>| s.map_or("-----".to_string(), |n| format!("{n:<5}"));
    format!("{} {}", slot(alliance.stations[0]), slot(alliance.stations[1]))
}

fn format_stat(stat: Option<StatValue>, team_count: Option<u32>) -> String {
    match stat {
        None => "-".to_string(),
        Some(StatValue { value, rank: Some(rank) }) => match team_count {
            Some(count) => format!("{value:>7.2}  #{rank} of {count}"),
            None => format!("{value:>7.2}  #{rank}"),
        },
        Some(StatValue { value, rank: None }) => format!("{value:>7.2}"),
    }
}

fn format_event_dates(event: &EventParticipation) -> String {
    match (event.event.start, event.event.end) {
        (Some(start), Some(end)) if end != start => {
            format!("{} – {}", start.format("%b %d"), end.format("%b %d"))
        }
        (Some(start), _) => start.format("%b %d").to_string(),
        (None, _) => "date tbd".to_string(),
    }
}

fn event_summary(event: &EventParticipation) -> String {
    let rank = event.rank.map_or("rank -".to_string(), |r| format!("rank #{r}"));
    let record = event.record.map_or("-".to_string(), |r| r.to_string());
    let rp = event.ranking_points.map_or("-".to_string(), |v| format!("{v:.2}"));
    let opr = event.opr.map_or("-".to_string(), |v| format!("{v:.2}"));
    format!("{rank}  {record}  RP {rp}  OPR {opr}")
}

fn outcome_label(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Red => "Red wins",
        Outcome::Blue => "Blue wins",
        Outcome::Tie => "Tie",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ftc_api::{EventInfo, Record};

    #[test]
    fn roster_shows_empty_slots() {
        let a = Alliance { stations: [Some(14584), None] };
        assert_eq!(format_roster(&a), "14584 -----");
    }

    #[test]
    fn missing_score_is_not_zero() {
        assert_eq!(format_score(None), "--");
        assert_eq!(format_score(Some(0)), "0");
    }

    #[test]
    fn stat_formatting_includes_rank_context() {
        let stat = Some(StatValue { value: 88.25, rank: Some(40) });
        assert_eq!(format_stat(stat, Some(7000)), "  88.25  #40 of 7000");
        assert_eq!(format_stat(None, Some(7000)), "-");
    }

    #[test]
    fn event_summary_handles_missing_stats() {
        let mut event = EventParticipation::default();
        assert_eq!(event_summary(&event), "rank -  -  RP -  OPR -");
        event.rank = Some(3);
        event.record = Some(Record { wins: 4, losses: 1, ties: 0 });
        assert_eq!(event_summary(&event), "rank #3  4-1-0  RP -  OPR -");
    }

    #[test]
    fn single_day_events_show_one_date() {
        let day = NaiveDate::from_ymd_opt(2024, 10, 1);
        let event = EventParticipation {
            event: EventInfo { start: day, end: day, ..Default::default() },
            ..Default::default()
        };
        assert_eq!(format_event_dates(&event), "Oct 01");
        assert_eq!(format_event_dates(&EventParticipation::default()), "date tbd");
    }
}
