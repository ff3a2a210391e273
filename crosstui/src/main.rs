use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use minicross::Direction::{Across, Down};
use minicross::{CellStatus, CellView, PlayOptions, PlayState, SquareStyle, Step, format_time};
use ratatui::{
  DefaultTerminal, Frame,
  buffer::Buffer,
  layout::{Constraint, Flex, Layout, Rect},
  style::{Color, Modifier, Style, Stylize},
  text::Line,
  widgets::{Block, Padding, Paragraph, Widget, Wrap},
};
use ratatui_macros::{line, span};

const SQUARE_WIDTH: u16 = 7;
const SQUARE_HEIGHT: u16 = 3;
const SQUARE_GAP: u16 = 1;

/// How often the screen is redrawn while waiting for input, so the clock keeps moving.
const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

/// Solve a mini crossword in your terminal
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
  /// A `.puz` or JSON puzzle file
  path: PathBuf,

  /// Don't mark letters right or wrong as they are typed
  #[arg(long)]
  no_auto_check: bool,
}

fn main() -> io::Result<()> {
  let args = Args::parse();
  let options = PlayOptions {
    auto_check: !args.no_auto_check,
    ..PlayOptions::default()
  };
  let app = App::new(args.path, options);

  let terminal = ratatui::init();
  let result = app.run(terminal);
  ratatui::restore();
  result
}

fn square_style(style: SquareStyle, status: CellStatus) -> Style {
  let base_style = match style {
    SquareStyle::Standard => Style::new().bg(Color::White),
    SquareStyle::Cursor => Style::new().bg(Color::LightRed),
    SquareStyle::Word => Style::new().bg(Color::LightYellow),
  };
  let fg = match status {
    CellStatus::Unknown => Color::Black,
    CellStatus::Correct => Color::Green,
    CellStatus::Incorrect => Color::Red,
  };
  base_style.fg(fg).add_modifier(Modifier::BOLD)
}

#[derive(Debug)]
pub struct App {
  path: PathBuf,
  options: PlayOptions,
  /// The game, or why the puzzle couldn't be loaded.
  game: Result<PlayState, String>,
  show_clues: bool,
  running: bool,
}

impl App {
  fn new(path: PathBuf, options: PlayOptions) -> Self {
    let game = Self::load(&path, options);
    Self {
      path,
      options,
      game,
      show_clues: false,
      running: true,
    }
  }

  fn load(path: &Path, options: PlayOptions) -> Result<PlayState, String> {
    PlayState::open(path, options).map_err(|e| format!("Couldn't load {}: {}", path.display(), e))
  }

  fn retry(&mut self) {
    self.game = Self::load(&self.path, self.options);
  }

  pub fn run(mut self, mut terminal: DefaultTerminal) -> io::Result<()> {
    self.running = true;
    while self.running {
      terminal.draw(|frame| self.draw(frame))?;
      self.handle_crossterm_events()?;
    }
    Ok(())
  }

  fn draw(&self, frame: &mut Frame) {
    frame.render_widget(self, frame.area());
  }

  /// Reads the crossterm events and updates the state of [`App`]. Returns without an
  /// event after [REDRAW_INTERVAL] so the timer can be redrawn.
  fn handle_crossterm_events(&mut self) -> io::Result<()> {
    if !event::poll(REDRAW_INTERVAL)? {
      return Ok(());
    }
    match event::read()? {
      // it's important to check KeyEventKind::Press to avoid handling key release events
      Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
      _ => {}
    }
    Ok(())
  }

  /// Handles the key events and updates the state of [`App`].
  fn on_key_event(&mut self, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match (ctrl, key.code) {
      (_, KeyCode::Esc) | (true, KeyCode::Char('c' | 'C')) => {
        self.quit();
        return;
      }
      (true, KeyCode::Char('l' | 'L')) => {
        self.show_clues = !self.show_clues;
        return;
      }
      _ => {}
    }

    if self.game.is_err() {
      if key.code == KeyCode::Char('r') {
        self.retry();
      }
      return;
    }
    let Ok(game) = &mut self.game else {
      return;
    };

    match (ctrl, key.code) {
      (true, KeyCode::Char('r' | 'R')) => game.reveal(),
      (true, KeyCode::Char('x' | 'X')) => game.clear(),
      (true, KeyCode::Char('a' | 'A')) => game.set_auto_check(!game.auto_check()),
      (true, _) => {}
      (_, KeyCode::Char(' ') | KeyCode::Enter) => game.toggle_direction(),
      (_, KeyCode::Char(c)) => game.enter_letter(c),
      (_, KeyCode::Backspace) => game.backspace(),
      (_, KeyCode::Tab) => game.jump_clue(false),
      (_, KeyCode::BackTab) => game.jump_clue(true),
      (_, KeyCode::Up) => game.move_cursor(Step::Up),
      (_, KeyCode::Down) => game.move_cursor(Step::Down),
      (_, KeyCode::Left) => game.move_cursor(Step::Left),
      (_, KeyCode::Right) => game.move_cursor(Step::Right),
      _ => {}
    }
  }

  /// Set running to false to quit the application.
  fn quit(&mut self) {
    self.running = false;
  }

  fn render_square(&self, view: &CellView, square_area: Rect, buf: &mut Buffer) {
    if view.block {
      Block::new()
        .style(Style::new().bg(Color::Black))
        .render(square_area, buf);
      return;
    }

    let number = view.number.map(|n| n.to_string()).unwrap_or_default();
    let letter = view.user_letter.map(String::from).unwrap_or_default();
    Paragraph::new(vec![
      Line::from(number).left_aligned(),
      Line::from(letter).centered(),
    ])
    .block(Block::new().style(square_style(view.style, view.status)))
    .render(square_area, buf);
  }

  fn render_game(&self, game: &PlayState, area: Rect, buf: &mut Buffer) {
    let [puzzle_area, side_area] =
      Layout::horizontal([Constraint::Percentage(100), Constraint::Length(45)]).areas(area);

    let views = game.cell_views();
    let grid = game.grid();
    let puzzle_area = center(
      puzzle_area,
      Constraint::Length(span_of(grid.width(), SQUARE_WIDTH)),
      Constraint::Length(span_of(grid.height(), SQUARE_HEIGHT)),
    );

    let mut square_area = Rect {
      x: puzzle_area.x,
      y: puzzle_area.y,
      width: SQUARE_WIDTH,
      height: SQUARE_HEIGHT,
    };
    for row in &views {
      for view in row {
        self.render_square(view, square_area, buf);
        square_area.x = square_area.x.saturating_add(SQUARE_WIDTH + SQUARE_GAP);
      }
      square_area.x = puzzle_area.x;
      square_area.y = square_area.y.saturating_add(SQUARE_HEIGHT + SQUARE_GAP);
    }

    let [clue_area, list_area, status_area] = Layout::vertical([
      Constraint::Length(9),
      Constraint::Percentage(100),
      Constraint::Length(4),
    ])
    .areas(side_area);

    let (clue_title, clue_text) = match game.current_clue() {
      Some(entry) => (format!("{} {}", entry.number, entry.direction), entry.text.clone()),
      None => ("Current clue".to_string(), String::new()),
    };
    Paragraph::new(clue_text)
      .wrap(Wrap { trim: true })
      .block(
        Block::bordered()
          .title(Line::from(clue_title).centered())
          .padding(Padding::uniform(1)),
      )
      .render(clue_area, buf);

    if self.show_clues {
      let lines: Vec<Line> = game
        .clue_list()
        .into_iter()
        .map(|listing| {
          let marker = match listing.direction {
            Across => "A",
            Down => "D",
          };
          let line = line![format!("{:>2}{} ", listing.number, marker).bold(), listing.text];
          if listing.active { line.reversed() } else { line }
        })
        .collect();
      Paragraph::new(lines)
        .block(Block::bordered().title(Line::from("Clues").centered()))
        .render(list_area, buf);
    }

    let mut status = vec![line![
      span!(Modifier::BOLD; "{}", format_time(game.elapsed())),
      if game.auto_check() { "  auto-check on" } else { "  auto-check off" }
    ]];
    if let Some(message) = game.completion_message() {
      status.push(Line::from(message).green());
    }
    Paragraph::new(status)
      .wrap(Wrap { trim: true })
      .block(Block::bordered())
      .render(status_area, buf);
  }

  fn render_error(&self, message: &str, area: Rect, buf: &mut Buffer) {
    let area = center(area, Constraint::Length(60), Constraint::Length(8));
    Paragraph::new(vec![
      Line::from(message.to_string()).red(),
      Line::default(),
      line!["Press ", "r".bold(), " to try again or ", "Esc".bold(), " to quit"],
    ])
    .wrap(Wrap { trim: true })
    .block(Block::bordered().padding(Padding::horizontal(1)))
    .render(area, buf);
  }
}

impl Widget for &App {
  fn render(self, area: Rect, buf: &mut Buffer) {
    let [title_area, main_area] =
      Layout::vertical([Constraint::Length(2), Constraint::Percentage(100)]).areas(area);

    let puzzle_title = match &self.game {
      Ok(game) => game.document().title.clone(),
      Err(_) => String::new(),
    };
    let title = line!["Mini Crossword".bold().blue(), ": ".bold(), puzzle_title.bold()].centered();
    title.render(title_area, buf);

    match &self.game {
      Ok(game) => self.render_game(game, main_area, buf),
      Err(message) => self.render_error(message, main_area, buf),
    }
  }
}

/// The terminal cells taken up by `count` squares of `size` with gaps between them.
fn span_of(count: usize, size: u16) -> u16 {
  u16::try_from(count)
    .unwrap_or(u16::MAX)
    .saturating_mul(size + SQUARE_GAP)
}

/// https://ratatui.rs/recipes/layout/center-a-widget/
fn center(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
  let [area] = Layout::horizontal([horizontal])
    .flex(Flex::Center)
    .areas(area);
  let [area] = Layout::vertical([vertical]).flex(Flex::Center).areas(area);
  area
}
