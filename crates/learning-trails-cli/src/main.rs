use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use learning_trails_config::Config;
use learning_trails_engine::response::MemoryPageStatus;
use learning_trails_engine::styling::Rgba;
use learning_trails_engine::{
    AssessmentState, AttributedStringStyle, FileStore, LearningAssessmentManager, LearningResponse,
    LearningTrail, Localizer, ParseOptions, StringTable, io,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::collections::HashMap;
use std::{
    env,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
};

mod render;

struct App {
    trail_path: PathBuf,
    options: ParseOptions,
    strings: Option<StringTable>,
    style: AttributedStringStyle,
    trail: LearningTrail,
    store: FileStore,
    manager: LearningAssessmentManager<MemoryPageStatus>,
    step_list_state: ListState,
    /// Responses of the selected step, keyed by block identifier.
    responses: HashMap<String, LearningResponse>,
    status: Option<String>,
}

impl App {
    fn new(config: Config) -> Result<Self> {
        let options = ParseOptions {
            localization_enabled: config.localization_enabled,
            step_title_in_header: config.step_title_in_header,
            authoring_support_enabled: config.authoring_support_enabled,
        };
        let strings = match &config.strings_path {
            Some(path) if config.localization_enabled => Some(io::load_string_table(path)?),
            _ => None,
        };

        let mut trail = io::load_trail(
            &config.trail_path,
            &options,
            strings.as_ref().map(|s| s as &dyn Localizer),
        )?;
        let mut store = FileStore::open(&config.state_path)?;
        trail.load_response_state(&store);
        let start = trail.load_active_page_index(&store).unwrap_or(0);
        if !trail.is_state_loaded(&store) {
            trail.mark_state_loaded(&mut store);
        }

        let mut app = Self {
            trail_path: config.trail_path,
            options,
            strings,
            style: AttributedStringStyle::trail(config.font_size, Rgba::SYSTEM_BLUE),
            trail,
            store,
            manager: LearningAssessmentManager::new(MemoryPageStatus::default()),
            step_list_state: ListState::default(),
            responses: HashMap::new(),
            status: None,
        };

        if !app.trail.steps.is_empty() {
            app.select_step(start);
        }

        Ok(app)
    }

    fn selected_step(&self) -> usize {
        self.step_list_state.selected().unwrap_or(0)
    }

    fn select_step(&mut self, index: usize) {
        self.step_list_state.select(Some(index));
        self.trail.save_active_page_index(&mut self.store, index);
        self.load_responses();
    }

    fn load_responses(&mut self) {
        self.responses.clear();
        let Some(step) = self.trail.step(self.selected_step()) else {
            return;
        };
        for block in step.response_blocks() {
            if let Some(mut response) = step.response_for(block) {
                if let Err(e) = response.load_state(&self.store) {
                    log::debug!("{e}");
                }
                self.responses.insert(block.identifier.clone(), response);
            }
        }
    }

    fn next_step(&mut self) {
        let count = self.trail.steps.len();
        if count > 0 {
            self.select_step((self.selected_step() + 1) % count);
        }
    }

    fn previous_step(&mut self) {
        let count = self.trail.steps.len();
        if count > 0 {
            self.select_step((self.selected_step() + count - 1) % count);
        }
    }

    /// Opens every group on the step when any is closed, otherwise closes all.
    fn toggle_groups(&mut self) {
        let index = self.selected_step();
        let Some(step) = self.trail.step_mut(index) else {
            return;
        };
        let groups: Vec<(String, bool)> = step
            .blocks()
            .into_iter()
            .filter(|b| b.is_group())
            .map(|b| (b.identifier.clone(), b.is_disclosed))
            .collect();
        let disclose = groups.iter().any(|(_, disclosed)| !disclosed);
        for (identifier, _) in groups {
            step.set_group_disclosed(&identifier, disclose);
        }
    }

    /// The first response on the step that can still change.
    fn active_response_id(&self) -> Option<String> {
        let step = self.trail.step(self.selected_step())?;
        step.response_blocks()
            .into_iter()
            .map(|b| b.identifier.clone())
            .find(|id| self.responses.get(id).is_some_and(|r| !r.is_confirmed))
    }

    fn toggle_option(&mut self, option: usize) {
        let Some(id) = self.active_response_id() else {
            return;
        };
        let Some(response) = self.responses.get_mut(&id) else {
            return;
        };
        let selected = response.options.get(option).is_some_and(|o| o.is_selected);
        if !response.select_option(option, !selected) {
            return;
        }
        response.save_state(&mut self.store);
        if !response.is_confirm_required {
            let response = response.clone();
            self.submit(&response);
        }
    }

    fn confirm(&mut self) {
        let Some(id) = self.active_response_id() else {
            return;
        };
        let Some(response) = self.responses.get_mut(&id) else {
            return;
        };
        if response.selected_indexes().is_empty() {
            self.status = Some("Select an answer first".to_string());
            return;
        }
        response.confirm();
        response.save_state(&mut self.store);
        let response = response.clone();
        self.submit(&response);
    }

    fn submit(&mut self, response: &LearningResponse) {
        let index = self.selected_step();
        self.manager
            .update_assessment_state_for(&mut self.trail, index, response);
        self.status = Some(format!("Trail: {:?}", self.trail.assessment_state()));
    }

    fn reload(&mut self) -> Result<()> {
        let localizer = self.strings.as_ref().map(|s| s as &dyn Localizer);
        let updated = io::reload_trail(&mut self.trail, &self.trail_path, &self.options, localizer)?;
        self.status = Some(if self.options.authoring_support_enabled {
            format!("Reloaded steps {updated:?}")
        } else {
            "Reloading needs authoring_support_enabled".to_string()
        });
        self.load_responses();
        Ok(())
    }

    fn save(&self) -> Result<()> {
        self.store.save()?;
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    // Determine trail from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config = if args.len() == 2 {
        let mut config = Config::new(&args[1]);
        config.expand_paths();
        config
    } else if args.len() == 1 {
        match Config::load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                eprintln!("Error: No trail provided and no config file found");
                eprintln!("Usage: {} <trail.xml>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                eprintln!("Usage: {} <trail.xml>", args[0]);
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [trail.xml]", args[0]);
        process::exit(1);
    };

    let mut app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: Could not open trail: {e}");
            process::exit(1);
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    app.save()
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            app.status = None;
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_step(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_step(),
                KeyCode::Enter | KeyCode::Char(' ') => app.toggle_groups(),
                KeyCode::Char('c') => app.confirm(),
                KeyCode::Char('r') => {
                    if let Err(e) = app.reload() {
                        app.status = Some(format!("Reload failed: {e}"));
                    }
                }
                KeyCode::Char(c @ '1'..='9') => {
                    let option = c as usize - '1' as usize;
                    app.toggle_option(option);
                }
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)].as_ref())
        .split(f.area());

    // Step list panel
    let step_items: Vec<ListItem> = app
        .trail
        .steps
        .iter()
        .map(|step| {
            let mark = match step.assessment_state {
                AssessmentState::CompletedSuccessfully => "✓ ",
                AssessmentState::PartiallyCompleted => "… ",
                _ => "  ",
            };
            let title = step.title.as_deref().unwrap_or(&step.identifier);
            let kind = step.step_type.display_name();
            let display_text = if kind.is_empty() {
                format!("{mark}{title}")
            } else {
                format!("{mark}{title} ({kind})")
            };
            ListItem::new(vec![Line::from(vec![Span::raw(display_text)])])
        })
        .collect();

    let steps_list = List::new(step_items)
        .block(Block::default().borders(Borders::ALL).title(app.trail.name.clone()))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(steps_list, chunks[0], &mut app.step_list_state);

    // Content panel
    let content_text = match app.trail.step(app.selected_step()) {
        Some(step) => render::step_lines(step, &app.style, &app.responses),
        None => vec![Line::from("This trail has no steps")],
    };

    let content = Paragraph::new(content_text)
        .block(Block::default().borders(Borders::ALL).title("Step"))
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(content, chunks[1]);

    // Instructions
    let help_text = Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("↑/k ↓/j: Step | "),
        Span::raw("Enter/Space: Groups | 1-9: Answer | c: Submit | r: Reload"),
    ]);
    let mut help_lines = vec![help_text];
    if let Some(status) = &app.status {
        help_lines.push(Line::from(status.clone()));
    }

    let help = Paragraph::new(help_lines).block(Block::default());

    // Place help at bottom
    let bottom_chunk = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    f.render_widget(help, bottom_chunk[1]);
}
