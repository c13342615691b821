//! ratatui-based UI.

use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::Context as _;
use bookstand_application::{BrowserContext, filter_catalog};
use bookstand_catalog::{Catalog, NamedEntry};
use bookstand_core::{FilterCriteria, Selector, Theme};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{event, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, Paragraph, Wrap,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiExit {
    Quit,
}

pub struct Ui {
    ctx: BrowserContext,
    catalog: Catalog,
    search_panel: SearchPanel,
    settings_panel: SettingsPanel,
    detail_panel: DetailPanel,
}

impl Ui {
    pub fn new(catalog: Catalog, ctx: BrowserContext) -> Self {
        Self {
            ctx,
            catalog,
            search_panel: SearchPanel::default(),
            settings_panel: SettingsPanel::default(),
            detail_panel: DetailPanel::default(),
        }
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let mut terminal = setup_terminal()?;
        terminal.clear().ok();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.event_loop(&mut terminal)
        }));
        let restore_result = restore_terminal(&mut terminal);

        match (result, restore_result) {
            (Ok(Ok(UiExit::Quit)), Ok(())) => Ok(()),
            (Ok(Ok(_)), Err(err)) => Err(err),
            (Ok(Err(err)), _) => Err(err),
            (Err(panic), Ok(())) => Err(anyhow::anyhow!(panic_to_string(panic))),
            (Err(panic), Err(err)) => Err(anyhow::anyhow!(
                "{}\n(additionally failed to restore terminal: {err})",
                panic_to_string(panic)
            )),
        }
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<UiExit> {
        let tick_rate = Duration::from_millis(250);
        let mut needs_redraw = true;

        loop {
            if needs_redraw {
                terminal.draw(|frame| self.draw(frame.area(), frame))?;
                needs_redraw = false;
            }

            if !event::poll(tick_rate)? {
                continue;
            }

            match event::read()? {
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Release {
                        continue;
                    }

                    needs_redraw = true;

                    let exit = if self.settings_panel.open {
                        self.handle_settings_panel_key(key)
                    } else if self.search_panel.open {
                        self.handle_search_panel_key(key)
                    } else if self.detail_panel.open {
                        self.handle_detail_panel_key(key)
                    } else {
                        self.handle_main_key(key)
                    };
                    if let Some(exit) = exit {
                        return Ok(exit);
                    }
                }
                _ => {}
            }
        }
    }

    fn handle_main_key(&mut self, key: KeyEvent) -> Option<UiExit> {
        match key.code {
            KeyCode::Esc => Some(UiExit::Quit),
            KeyCode::Char('/') => {
                self.open_search_panel();
                None
            }
            KeyCode::Char('s') => {
                self.open_settings_panel();
                None
            }
            KeyCode::Char('m') => {
                self.show_more();
                None
            }
            KeyCode::Enter => {
                self.activate_selected();
                None
            }
            KeyCode::Down => {
                self.ctx.select_next();
                None
            }
            KeyCode::Up => {
                self.ctx.select_prev();
                None
            }
            _ => None,
        }
    }

    /// Show-more is a no-op while the control is disabled.
    fn show_more(&mut self) {
        if self.ctx.remaining() > 0 {
            self.ctx.advance();
        }
    }

    /// Resolves the selected preview's carried id against the full catalog,
    /// not just the current matches.
    fn activate_selected(&mut self) {
        let Some(idx) = self.ctx.selected_match() else {
            return;
        };
        let Some(id) = self.catalog.book(idx).map(|b| b.id.clone()) else {
            return;
        };
        self.show_detail_by_id(&id);
    }

    /// Silent no-op when the id has no catalog match.
    fn show_detail_by_id(&mut self, id: &str) {
        if let Some(pos) = self.catalog.books().iter().position(|b| b.id == id) {
            self.detail_panel.open = true;
            self.detail_panel.book = Some(pos);
        }
    }

    fn handle_detail_panel_key(&mut self, key: KeyEvent) -> Option<UiExit> {
        if key.code == KeyCode::Esc {
            self.detail_panel = DetailPanel::default();
        }
        None
    }

    fn open_search_panel(&mut self) {
        self.settings_panel.open = false;
        self.search_panel = SearchPanel::from_criteria(
            &self.ctx.criteria,
            &self.author_entries(),
            &self.genre_entries(),
        );
        self.search_panel.open = true;
    }

    fn handle_search_panel_key(&mut self, key: KeyEvent) -> Option<UiExit> {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && let KeyCode::Char('u') = key.code
        {
            self.search_panel.query.clear();
            self.search_panel.author_choice = Selector::Any;
            self.search_panel.genre_choice = Selector::Any;
            self.search_panel.author_cursor = 0;
            self.search_panel.genre_cursor = 0;
            return None;
        }

        match key.code {
            KeyCode::Esc => {
                // Draft discarded; the applied criteria were never touched.
                self.search_panel = SearchPanel::default();
                None
            }
            KeyCode::Enter => {
                self.submit_search_panel();
                None
            }
            KeyCode::Tab => {
                self.search_panel.focus = self.search_panel.focus.next();
                None
            }
            KeyCode::BackTab => {
                self.search_panel.focus = self.search_panel.focus.prev();
                None
            }
            KeyCode::Up => {
                match self.search_panel.focus {
                    SearchFocus::Title => {}
                    SearchFocus::Authors => {
                        self.search_panel.author_cursor =
                            self.search_panel.author_cursor.saturating_sub(1);
                    }
                    SearchFocus::Genres => {
                        self.search_panel.genre_cursor =
                            self.search_panel.genre_cursor.saturating_sub(1);
                    }
                }
                None
            }
            KeyCode::Down => {
                match self.search_panel.focus {
                    SearchFocus::Title => {}
                    SearchFocus::Authors => {
                        let last = self.author_entries().len().saturating_sub(1);
                        self.search_panel.author_cursor =
                            (self.search_panel.author_cursor + 1).min(last);
                    }
                    SearchFocus::Genres => {
                        let last = self.genre_entries().len().saturating_sub(1);
                        self.search_panel.genre_cursor =
                            (self.search_panel.genre_cursor + 1).min(last);
                    }
                }
                None
            }
            KeyCode::Char(' ') => {
                match self.search_panel.focus {
                    SearchFocus::Title => self.search_panel.query.push(' '),
                    SearchFocus::Authors => self.apply_author_cursor(),
                    SearchFocus::Genres => self.apply_genre_cursor(),
                }
                None
            }
            KeyCode::Backspace => {
                if self.search_panel.focus == SearchFocus::Title {
                    self.search_panel.query.pop();
                }
                None
            }
            KeyCode::Char(ch) => {
                if self.search_panel.focus == SearchFocus::Title && !ch.is_control() {
                    self.search_panel.query.push(ch);
                }
                None
            }
            _ => None,
        }
    }

    /// Submission: build criteria from the draft, refilter, reset to page 1.
    fn submit_search_panel(&mut self) {
        let criteria = FilterCriteria {
            genre: self.search_panel.genre_choice.clone(),
            author: self.search_panel.author_choice.clone(),
            title: self.search_panel.query.clone(),
        };
        let results = filter_catalog(self.catalog.books(), &criteria);
        self.ctx.reset_and_apply(criteria, results);
        self.search_panel = SearchPanel::default();
    }

    fn apply_author_cursor(&mut self) {
        let entries = self.author_entries();
        if let Some(entry) = entries.get(self.search_panel.author_cursor) {
            self.search_panel.author_choice = entry.selector.clone();
        }
    }

    fn apply_genre_cursor(&mut self) {
        let entries = self.genre_entries();
        if let Some(entry) = entries.get(self.search_panel.genre_cursor) {
            self.search_panel.genre_choice = entry.selector.clone();
        }
    }

    fn author_entries(&self) -> Vec<SelectorEntry> {
        selector_entries(self.catalog.authors())
    }

    fn genre_entries(&self) -> Vec<SelectorEntry> {
        selector_entries(self.catalog.genres())
    }

    fn open_settings_panel(&mut self) {
        self.search_panel.open = false;
        self.settings_panel.open = true;
        self.settings_panel.theme = self.ctx.settings.theme;
    }

    fn handle_settings_panel_key(&mut self, key: KeyEvent) -> Option<UiExit> {
        match key.code {
            KeyCode::Esc => {
                self.settings_panel = SettingsPanel::default();
            }
            KeyCode::Left | KeyCode::Right => {
                self.settings_panel.theme = match self.settings_panel.theme {
                    Theme::Day => Theme::Night,
                    Theme::Night => Theme::Day,
                };
            }
            KeyCode::Enter => {
                // Settings submission applies the theme and closes the overlay.
                self.ctx.settings.theme = self.settings_panel.theme;
                self.settings_panel = SettingsPanel::default();
            }
            _ => {}
        }
        None
    }

    fn palette(&self) -> ThemePalette {
        ThemePalette::for_theme(self.ctx.settings.theme)
    }

    fn draw(&mut self, area: Rect, frame: &mut ratatui::Frame) {
        let palette = self.palette();
        frame.render_widget(Clear, area);
        frame.render_widget(
            Block::default().style(Style::default().fg(palette.fg).bg(palette.bg)),
            area,
        );

        self.ctx.normalize_selection();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area);

        let header = Paragraph::new(Text::from(self.header_lines()))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(header, layout[0]);

        self.draw_previews(frame, layout[1]);

        let footer = Paragraph::new(Text::from(self.footer_lines()))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::TOP));
        frame.render_widget(footer, layout[2]);

        if self.settings_panel.open {
            self.draw_settings_panel(area, frame);
        }

        if self.search_panel.open {
            self.draw_search_panel(area, frame);
        }

        if self.detail_panel.open {
            self.draw_detail_panel(area, frame);
        }
    }

    fn header_lines(&self) -> Vec<Line<'static>> {
        let mut spans = vec![Span::styled(
            "Bookstand",
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if self.ctx.criteria.is_identity() {
            spans.push(Span::raw(format!(
                " — {} books",
                self.catalog.books().len()
            )));
        } else {
            spans.push(Span::raw(format!(
                " — {}/{} matches",
                self.ctx.matches.len(),
                self.catalog.books().len()
            )));
        }
        spans.push(Span::raw(format!(
            "  [{}]",
            self.ctx.settings.theme.as_str()
        )));
        vec![Line::from(spans)]
    }

    fn footer_lines(&self) -> Vec<Line<'static>> {
        let palette = self.palette();
        let remaining = self.ctx.remaining();
        let more_style = if remaining > 0 {
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.dim)
        };

        vec![
            Line::from(Span::styled(show_more_label(remaining), more_style)),
            Line::from(vec![
                Span::styled("↑/↓", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" select  "),
                Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" details  "),
                Span::styled("/", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" search  "),
                Span::styled("s", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" settings  "),
                Span::styled("m", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" show more  "),
                Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" quit"),
            ]),
        ]
    }

    fn draw_previews(&self, frame: &mut ratatui::Frame, area: Rect) {
        let palette = self.palette();
        let block = Block::default().borders(Borders::ALL).title("Previews");

        if self.ctx.visible_count() == 0 {
            let mut lines = vec![Line::raw("No matches.")];
            let query = self.ctx.criteria.title.trim();
            if !query.is_empty() {
                lines.push(Line::raw(""));
                lines.push(Line::raw(format!("Title query: {query}")));
                lines.push(Line::raw("Tip: press / to edit filters."));
            }
            let paragraph = Paragraph::new(Text::from(lines))
                .block(block)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let max_width = area.width.saturating_sub(6) as usize;
        // One batched build per frame; the list widget renders the whole slice.
        let items: Vec<ListItem> = self
            .ctx
            .visible_matches()
            .iter()
            .filter_map(|&idx| self.catalog.book(idx))
            .map(|book| {
                let author = self.catalog.author_name(&book.author).unwrap_or("");
                let mut lines: Vec<Line> = wrap_text(&book.title, max_width.max(8))
                    .into_iter()
                    .map(|l| Line::styled(l, Style::default().add_modifier(Modifier::BOLD)))
                    .collect();
                lines.push(Line::styled(
                    preview_subtitle(author, book.published_year()),
                    Style::default().fg(palette.dim),
                ));
                ListItem::new(Text::from(lines))
            })
            .collect();

        let highlight_style = Style::default()
            .fg(palette.bg)
            .bg(palette.accent)
            .add_modifier(Modifier::BOLD);

        let list = List::new(items)
            .block(block)
            .highlight_style(highlight_style)
            .highlight_symbol("> ")
            .highlight_spacing(HighlightSpacing::Always);

        let mut state = ListState::default();
        state.select(Some(self.ctx.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_search_panel(&self, area: Rect, frame: &mut ratatui::Frame) {
        let popup_area = centered_rect(72, 72, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title(Span::styled(
            "Search",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(block.clone(), popup_area);

        let inner = block.inner(popup_area);
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(inner);

        let title_focus = self.search_panel.focus == SearchFocus::Title;
        let title_style = if title_focus {
            Style::default()
                .fg(self.palette().accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let query_lines = vec![Line::from(vec![
            Span::styled("Title: ", title_style),
            Span::raw(self.search_panel.query.clone()),
        ])];
        let query = Paragraph::new(Text::from(query_lines))
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Left);
        frame.render_widget(query, sections[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(sections[1]);

        self.draw_selector_list(
            body[0],
            frame,
            SelectorListView {
                title: "Author",
                entries: &self.author_entries(),
                choice: &self.search_panel.author_choice,
                cursor: self.search_panel.author_cursor,
                focus: self.search_panel.focus == SearchFocus::Authors,
            },
        );
        self.draw_selector_list(
            body[1],
            frame,
            SelectorListView {
                title: "Genre",
                entries: &self.genre_entries(),
                choice: &self.search_panel.genre_choice,
                cursor: self.search_panel.genre_cursor,
                focus: self.search_panel.focus == SearchFocus::Genres,
            },
        );

        let help_lines = vec![
            Line::from(vec![
                Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" focus  "),
                Span::styled("↑/↓", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" move  "),
                Span::styled("Space", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" choose"),
            ]),
            Line::from(vec![
                Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" apply  "),
                Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" cancel  "),
                Span::styled("Ctrl+u", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" clear"),
            ]),
        ];
        let help = Paragraph::new(Text::from(help_lines))
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Left);
        frame.render_widget(help, sections[2]);
    }

    fn draw_selector_list(
        &self,
        area: Rect,
        frame: &mut ratatui::Frame,
        view: SelectorListView<'_>,
    ) {
        let SelectorListView {
            title,
            entries,
            choice,
            cursor,
            focus,
        } = view;
        let palette = self.palette();
        let title_style = if focus {
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default()
        };

        let items: Vec<ListItem> = entries
            .iter()
            .map(|entry| {
                let prefix = if entry.selector == *choice { "●" } else { " " };
                ListItem::new(Line::raw(format!("{prefix} {}", entry.label)))
            })
            .collect();

        let highlight_style = if focus {
            Style::default()
                .fg(palette.bg)
                .bg(palette.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.bg).bg(palette.dim)
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(if focus {
                        Style::default().fg(palette.accent)
                    } else {
                        Style::default()
                    })
                    .title(Span::styled(title.to_string(), title_style)),
            )
            .highlight_style(highlight_style)
            .highlight_symbol("> ")
            .highlight_spacing(HighlightSpacing::Always);

        let mut state = ListState::default();
        if !entries.is_empty() {
            state.select(Some(cursor.min(entries.len() - 1)));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_settings_panel(&self, area: Rect, frame: &mut ratatui::Frame) {
        let popup_area = centered_rect(45, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title(Span::styled(
            "Settings",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(block.clone(), popup_area);

        let inner = block.inner(popup_area);
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(2)])
            .split(inner);

        let rows = vec![Line::from(vec![
            Span::styled("Theme: ", Style::default().add_modifier(Modifier::BOLD)),
            option_chip("day", self.settings_panel.theme == Theme::Day, true),
            Span::raw(" "),
            option_chip("night", self.settings_panel.theme == Theme::Night, true),
        ])];
        let body = Paragraph::new(Text::from(rows)).alignment(Alignment::Left);
        frame.render_widget(body, sections[0]);

        let help_lines = vec![Line::from(vec![
            Span::styled("←/→", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" change  "),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" apply  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ])];
        let help = Paragraph::new(Text::from(help_lines))
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Left);
        frame.render_widget(help, sections[1]);
    }

    fn draw_detail_panel(&self, area: Rect, frame: &mut ratatui::Frame) {
        let Some(book) = self.detail_panel.book.and_then(|idx| self.catalog.book(idx)) else {
            return;
        };

        let palette = self.palette();
        let popup_area = centered_rect(80, 80, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title(Span::styled(
            book.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(block.clone(), popup_area);

        let inner = block.inner(popup_area);
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(inner);

        // Stand-in for the cover art; the data only carries a URL.
        let cover = cover_placeholder(sections[0].width, sections[0].height, &book.image);
        let cover = Paragraph::new(cover)
            .style(Style::default().fg(palette.dim))
            .alignment(Alignment::Center);
        frame.render_widget(cover, sections[0]);

        let author = self.catalog.author_name(&book.author).unwrap_or("");
        let genres = book
            .genres
            .iter()
            .filter_map(|g| self.catalog.genre_name(g))
            .collect::<Vec<_>>()
            .join(", ");

        let mut lines = vec![
            Line::from(Span::styled(
                detail_subtitle(author, book.published_year()),
                Style::default()
                    .fg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
        ];
        if !genres.is_empty() {
            lines.push(Line::from(vec![
                Span::styled("Genres: ", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(genres),
            ]));
            lines.push(Line::raw(""));
        }
        lines.push(Line::raw(book.description.clone()));

        let body = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Left);
        frame.render_widget(body, sections[1]);

        let help = Paragraph::new(Line::from(vec![
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" close"),
        ]))
        .alignment(Alignment::Left);
        frame.render_widget(help, sections[2]);
    }
}

#[derive(Debug, Clone, Default)]
struct SearchPanel {
    open: bool,
    focus: SearchFocus,
    query: String,
    author_choice: Selector,
    genre_choice: Selector,
    author_cursor: usize,
    genre_cursor: usize,
}

impl SearchPanel {
    /// Seeds the draft from the last-applied criteria, cursors resting on
    /// the seeded choices.
    fn from_criteria(
        criteria: &FilterCriteria,
        authors: &[SelectorEntry],
        genres: &[SelectorEntry],
    ) -> Self {
        Self {
            open: false,
            focus: SearchFocus::Title,
            query: criteria.title.clone(),
            author_choice: criteria.author.clone(),
            genre_choice: criteria.genre.clone(),
            author_cursor: cursor_for(&criteria.author, authors),
            genre_cursor: cursor_for(&criteria.genre, genres),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum SearchFocus {
    #[default]
    Title,
    Authors,
    Genres,
}

impl SearchFocus {
    fn next(self) -> Self {
        match self {
            SearchFocus::Title => SearchFocus::Authors,
            SearchFocus::Authors => SearchFocus::Genres,
            SearchFocus::Genres => SearchFocus::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            SearchFocus::Title => SearchFocus::Genres,
            SearchFocus::Authors => SearchFocus::Title,
            SearchFocus::Genres => SearchFocus::Authors,
        }
    }
}

#[derive(Debug, Clone)]
struct SettingsPanel {
    open: bool,
    theme: Theme,
}

impl Default for SettingsPanel {
    fn default() -> Self {
        Self {
            open: false,
            theme: Theme::Night,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct DetailPanel {
    open: bool,
    book: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SelectorEntry {
    label: String,
    selector: Selector,
}

struct SelectorListView<'a> {
    title: &'a str,
    entries: &'a [SelectorEntry],
    choice: &'a Selector,
    cursor: usize,
    focus: bool,
}

fn cursor_for(choice: &Selector, entries: &[SelectorEntry]) -> usize {
    entries
        .iter()
        .position(|entry| entry.selector == *choice)
        .unwrap_or(0)
}

fn selector_entries(table: &[NamedEntry]) -> Vec<SelectorEntry> {
    let mut out = vec![SelectorEntry {
        label: "Any".to_string(),
        selector: Selector::Any,
    }];
    for entry in table {
        out.push(SelectorEntry {
            label: entry.name.clone(),
            selector: Selector::Selected(entry.id.clone()),
        });
    }
    out
}

/// Color tokens for one theme. Pure function of the theme, so switching
/// night and back restores the original values exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub fg: Color,
    pub bg: Color,
    pub accent: Color,
    pub dim: Color,
}

impl ThemePalette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Day => Self {
                fg: Color::Black,
                bg: Color::White,
                accent: Color::Blue,
                dim: Color::DarkGray,
            },
            Theme::Night => Self {
                fg: Color::White,
                bg: Color::Black,
                accent: Color::Yellow,
                dim: Color::Gray,
            },
        }
    }
}

/// Startup theme from the terminal's advertised colors. Defaults to night.
pub fn detect_system_theme() -> Theme {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|value| theme_from_colorfgbg(&value))
        .unwrap_or(Theme::Night)
}

/// `COLORFGBG` convention: last field is the background color index.
fn theme_from_colorfgbg(value: &str) -> Option<Theme> {
    let bg = value.split(';').next_back()?.trim().parse::<u8>().ok()?;
    match bg {
        0..=6 | 8 => Some(Theme::Night),
        _ => Some(Theme::Day),
    }
}

fn show_more_label(remaining: usize) -> String {
    format!("Show more ({remaining})")
}

fn preview_subtitle(author: &str, year: Option<&str>) -> String {
    match (author.is_empty(), year) {
        (false, Some(year)) => format!("{author} · {year}"),
        (false, None) => author.to_string(),
        (true, Some(year)) => year.to_string(),
        (true, None) => String::new(),
    }
}

fn detail_subtitle(author: &str, year: Option<&str>) -> String {
    match year {
        Some(year) => format!("{author} ({year})").trim_start().to_string(),
        None => author.to_string(),
    }
}

fn cover_placeholder(width: u16, height: u16, label: &str) -> String {
    let width = width.max(10);
    let height = height.max(3);
    let inner_w = (width - 2) as usize;
    let inner_h = (height - 2) as usize;

    let label = label.trim();
    let label = if label.is_empty() { "no cover" } else { label };

    let mut out = String::new();
    out.push('┌');
    out.push_str(&"─".repeat(inner_w));
    out.push('┐');

    for y in 0..inner_h {
        out.push('\n');
        out.push('│');
        if y == inner_h / 2 {
            let mut label = label.to_string();
            if label.chars().count() > inner_w {
                label = label.chars().take(inner_w).collect();
            }
            let label_len = label.chars().count();
            let pad_left = inner_w.saturating_sub(label_len) / 2;
            let pad_right = inner_w.saturating_sub(label_len).saturating_sub(pad_left);
            out.push_str(&"░".repeat(pad_left));
            out.push_str(&label);
            out.push_str(&"░".repeat(pad_right));
        } else {
            out.push_str(&"░".repeat(inner_w));
        }
        out.push('│');
    }

    out.push('\n');
    out.push('└');
    out.push_str(&"─".repeat(inner_w));
    out.push('┘');
    out
}

fn option_chip(label: &str, selected: bool, row_selected: bool) -> Span<'static> {
    let base = if selected && row_selected {
        Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
    } else if selected {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    Span::styled(label.to_string(), base)
}

fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0usize;

    for word in text
        .split_whitespace()
        .flat_map(|word| split_wide_word(word, max_width))
    {
        let word_width = UnicodeWidthStr::width(word.as_str());
        let sep_width = if line.is_empty() { 0 } else { 1 };

        if line_width + sep_width + word_width > max_width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            line_width = 0;
        }
        if !line.is_empty() {
            line.push(' ');
            line_width += 1;
        }
        line.push_str(&word);
        line_width += word_width;
    }

    if !line.is_empty() {
        lines.push(line);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Breaks a word wider than the pane into pieces of at most `max_width`
/// columns. Words that already fit come back whole.
fn split_wide_word(word: &str, max_width: usize) -> Vec<String> {
    if UnicodeWidthStr::width(word) <= max_width {
        return vec![word.to_string()];
    }

    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut piece_width = 0usize;
    for ch in word.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if piece_width + ch_width > max_width && !piece.is_empty() {
            pieces.push(std::mem::take(&mut piece));
            piece_width = 0;
        }
        piece.push(ch);
        piece_width += ch_width;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

fn setup_terminal() -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
    terminal::enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen).context("enter alt screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("create terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    terminal::disable_raw_mode().context("disable raw mode")?;
    crossterm::execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("leave alt screen")?;
    Ok(())
}

fn panic_to_string(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {s}")
    } else {
        "panic: (unknown payload)".to_string()
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstand_test::{make_catalog, make_context};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn make_ui(n: usize, page_size: usize) -> Ui {
        let catalog = make_catalog(n, page_size);
        let ctx = make_context(&catalog, Theme::Night);
        Ui::new(catalog, ctx)
    }

    #[test]
    fn palette_round_trip_restores_tokens() {
        let day = ThemePalette::for_theme(Theme::Day);
        let _night = ThemePalette::for_theme(Theme::Night);
        assert_eq!(ThemePalette::for_theme(Theme::Day), day);
        assert_ne!(ThemePalette::for_theme(Theme::Night), day);
    }

    #[test]
    fn colorfgbg_parsing() {
        assert_eq!(theme_from_colorfgbg("15;0"), Some(Theme::Night));
        assert_eq!(theme_from_colorfgbg("0;15"), Some(Theme::Day));
        assert_eq!(theme_from_colorfgbg("12;default;7"), Some(Theme::Day));
        assert_eq!(theme_from_colorfgbg("15;8"), Some(Theme::Night));
        assert_eq!(theme_from_colorfgbg("garbage"), None);
        assert_eq!(theme_from_colorfgbg(""), None);
    }

    #[test]
    fn show_more_label_shows_remaining() {
        assert_eq!(show_more_label(13), "Show more (13)");
        assert_eq!(show_more_label(0), "Show more (0)");
    }

    #[test]
    fn subtitles_tolerate_missing_parts() {
        assert_eq!(preview_subtitle("Ada Zero", Some("1900")), "Ada Zero · 1900");
        assert_eq!(preview_subtitle("Ada Zero", None), "Ada Zero");
        assert_eq!(preview_subtitle("", Some("1900")), "1900");
        assert_eq!(preview_subtitle("", None), "");

        assert_eq!(detail_subtitle("Ada Zero", Some("1900")), "Ada Zero (1900)");
        assert_eq!(detail_subtitle("", Some("1900")), "(1900)");
        assert_eq!(detail_subtitle("Ada Zero", None), "Ada Zero");
    }

    #[test]
    fn selector_entries_start_with_any() {
        let catalog = make_catalog(3, 12);
        let entries = selector_entries(catalog.authors());
        assert_eq!(entries[0].label, "Any");
        assert_eq!(entries[0].selector, Selector::Any);
        assert_eq!(entries[1].label, "Ada Zero");
        assert_eq!(
            entries[1].selector,
            Selector::Selected("a0".to_string())
        );
    }

    #[test]
    fn show_more_key_advances_until_exhausted() {
        let mut ui = make_ui(25, 12);
        assert_eq!(ui.ctx.visible_count(), 12);

        ui.handle_main_key(key(KeyCode::Char('m')));
        assert_eq!(ui.ctx.page, 2);
        assert_eq!(ui.ctx.visible_count(), 24);

        ui.handle_main_key(key(KeyCode::Char('m')));
        assert_eq!(ui.ctx.page, 3);
        assert_eq!(ui.ctx.visible_count(), 25);
        assert_eq!(ui.ctx.remaining(), 0);

        // Disabled control: no further page advance.
        ui.handle_main_key(key(KeyCode::Char('m')));
        assert_eq!(ui.ctx.page, 3);
    }

    #[test]
    fn search_submit_filters_and_resets_page() {
        let mut ui = make_ui(25, 12);
        ui.handle_main_key(key(KeyCode::Char('m')));
        assert_eq!(ui.ctx.page, 2);

        ui.handle_main_key(key(KeyCode::Char('/')));
        assert!(ui.search_panel.open);
        for ch in "book 3".chars() {
            ui.handle_search_panel_key(key(KeyCode::Char(ch)));
        }
        ui.handle_search_panel_key(key(KeyCode::Enter));

        assert!(!ui.search_panel.open);
        assert_eq!(ui.ctx.page, 1);
        assert_eq!(ui.ctx.matches, vec![3]);
    }

    #[test]
    fn search_cancel_leaves_criteria_untouched() {
        let mut ui = make_ui(10, 12);
        ui.handle_main_key(key(KeyCode::Char('/')));
        for ch in "zebra".chars() {
            ui.handle_search_panel_key(key(KeyCode::Char(ch)));
        }
        ui.handle_search_panel_key(key(KeyCode::Esc));

        assert!(!ui.search_panel.open);
        assert!(ui.ctx.criteria.is_identity());
        assert_eq!(ui.ctx.matches.len(), 10);
    }

    #[test]
    fn search_selector_choice_applies_on_submit() {
        let mut ui = make_ui(12, 12);
        ui.handle_main_key(key(KeyCode::Char('/')));
        ui.handle_search_panel_key(key(KeyCode::Tab));
        assert_eq!(ui.search_panel.focus, SearchFocus::Authors);

        // Move past "Any" onto the first author and choose it.
        ui.handle_search_panel_key(key(KeyCode::Down));
        ui.handle_search_panel_key(key(KeyCode::Char(' ')));
        ui.handle_search_panel_key(key(KeyCode::Enter));

        assert_eq!(
            ui.ctx.criteria.author,
            Selector::Selected("a0".to_string())
        );
        assert_eq!(ui.ctx.matches, vec![0, 3, 6, 9]);
    }

    #[test]
    fn reopened_search_cursors_rest_on_applied_choices() {
        let mut ui = make_ui(12, 12);
        let criteria = FilterCriteria {
            author: Selector::Selected("a1".to_string()),
            genre: Selector::Selected("g1".to_string()),
            title: String::new(),
        };
        let results = filter_catalog(ui.catalog.books(), &criteria);
        ui.ctx.reset_and_apply(criteria, results);

        ui.handle_main_key(key(KeyCode::Char('/')));
        assert!(ui.search_panel.open);
        // Entries are "Any" first, so the second table row sits at index 2.
        assert_eq!(ui.search_panel.author_cursor, 2);
        assert_eq!(ui.search_panel.genre_cursor, 2);
        assert_eq!(
            ui.search_panel.author_choice,
            Selector::Selected("a1".to_string())
        );
    }

    #[test]
    fn zero_match_query_renders_empty_state() {
        let mut ui = make_ui(10, 12);
        ui.handle_main_key(key(KeyCode::Char('/')));
        for ch in "zebra".chars() {
            ui.handle_search_panel_key(key(KeyCode::Char(ch)));
        }
        ui.handle_search_panel_key(key(KeyCode::Enter));

        assert_eq!(ui.ctx.visible_count(), 0);
        assert!(ui.ctx.matches.is_empty());
    }

    #[test]
    fn settings_submit_applies_theme_and_closes() {
        let mut ui = make_ui(5, 12);
        assert_eq!(ui.ctx.settings.theme, Theme::Night);

        ui.handle_main_key(key(KeyCode::Char('s')));
        assert!(ui.settings_panel.open);
        ui.handle_settings_panel_key(key(KeyCode::Right));
        ui.handle_settings_panel_key(key(KeyCode::Enter));

        assert!(!ui.settings_panel.open);
        assert_eq!(ui.ctx.settings.theme, Theme::Day);
    }

    #[test]
    fn settings_cancel_discards_draft() {
        let mut ui = make_ui(5, 12);
        ui.handle_main_key(key(KeyCode::Char('s')));
        ui.handle_settings_panel_key(key(KeyCode::Right));
        ui.handle_settings_panel_key(key(KeyCode::Esc));

        assert!(!ui.settings_panel.open);
        assert_eq!(ui.ctx.settings.theme, Theme::Night);
    }

    #[test]
    fn activating_selection_opens_detail_for_that_book() {
        let mut ui = make_ui(5, 12);
        ui.handle_main_key(key(KeyCode::Down));
        ui.handle_main_key(key(KeyCode::Enter));

        assert!(ui.detail_panel.open);
        assert_eq!(ui.detail_panel.book, Some(1));

        ui.handle_detail_panel_key(key(KeyCode::Esc));
        assert!(!ui.detail_panel.open);
    }

    #[test]
    fn unknown_id_is_silent_noop() {
        let mut ui = make_ui(5, 12);
        ui.show_detail_by_id("no-such-book");
        assert!(!ui.detail_panel.open);
        assert_eq!(ui.detail_panel.book, None);
    }

    #[test]
    fn detail_lookup_covers_books_outside_matches() {
        let mut ui = make_ui(10, 12);
        // Narrow matches to one book, then open a different one by id.
        let criteria = FilterCriteria {
            title: "book 0".to_string(),
            ..FilterCriteria::default()
        };
        let results = filter_catalog(ui.catalog.books(), &criteria);
        ui.ctx.reset_and_apply(criteria, results);
        assert_eq!(ui.ctx.matches, vec![0]);

        ui.show_detail_by_id("b7");
        assert!(ui.detail_panel.open);
        assert_eq!(ui.detail_panel.book, Some(7));
    }

    #[test]
    fn esc_on_main_screen_quits() {
        let mut ui = make_ui(5, 12);
        assert_eq!(ui.handle_main_key(key(KeyCode::Esc)), Some(UiExit::Quit));
    }

    #[test]
    fn clear_resets_search_draft() {
        let mut ui = make_ui(5, 12);
        ui.handle_main_key(key(KeyCode::Char('/')));
        for ch in "abc".chars() {
            ui.handle_search_panel_key(key(KeyCode::Char(ch)));
        }
        ui.handle_search_panel_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert!(ui.search_panel.query.is_empty());
        assert_eq!(ui.search_panel.author_choice, Selector::Any);
    }

    #[test]
    fn cover_placeholder_centers_label() {
        let box_text = cover_placeholder(20, 5, "cover.jpg");
        assert!(box_text.contains("cover.jpg"));
        assert!(box_text.starts_with('┌'));
        assert!(box_text.ends_with('┘'));
    }

    #[test]
    fn wrap_text_respects_width() {
        let lines = wrap_text("a bb ccc dddd", 4);
        assert!(lines.iter().all(|l| UnicodeWidthStr::width(l.as_str()) <= 4));
        assert_eq!(lines.join(" "), "a bb ccc dddd");
    }

    #[test]
    fn wrap_text_splits_words_wider_than_the_pane() {
        let lines = wrap_text("Frankenstein", 8);
        assert_eq!(lines, vec!["Frankens".to_string(), "tein".to_string()]);
        assert!(lines.iter().all(|l| UnicodeWidthStr::width(l.as_str()) <= 8));
    }

    #[test]
    fn centered_rect_stays_inside_the_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(50, 50, area);
        assert_eq!((popup.width, popup.height), (50, 25));
        assert_eq!(popup.x, 25);
        assert!(popup.y >= 12 && popup.y + popup.height <= area.height);
    }
}
