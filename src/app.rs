//! App state and core application logic
//!
//! Manages the screen state machine and navigation stack. Everything that
//! talks to the network goes through the owned `SessionController`; the
//! app only turns keys into controller intents and keeps list selections.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::models::{Region, TitleSummary};
use crate::session::debounce::MIN_QUERY_LEN;
use crate::session::SessionController;

// =============================================================================
// App State Enum
// =============================================================================

/// Application state enum representing current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Search box with live results, trending when the box is empty
    #[default]
    Home,
    /// Title metadata plus availability for the current region
    Detail,
    /// Titles similar to the one on the detail screen
    Recommendations,
    /// Filterable country list
    RegionPicker,
}

// =============================================================================
// Input Mode
// =============================================================================

/// Current input mode for keyboard handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Text input mode (search box focused)
    Editing,
}

// =============================================================================
// Selection State (per-view)
// =============================================================================

/// Selection state for list views
#[derive(Debug, Clone, Default)]
pub struct ListState {
    /// Currently selected index
    pub selected: usize,
    /// Scroll offset for viewport
    pub offset: usize,
    /// Total number of items
    pub len: usize,
}

impl ListState {
    pub fn new(len: usize) -> Self {
        Self {
            selected: 0,
            offset: 0,
            len,
        }
    }

    pub fn up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            if self.selected < self.offset {
                self.offset = self.selected;
            }
        }
    }

    pub fn down(&mut self) {
        if self.len > 0 && self.selected < self.len - 1 {
            self.selected += 1;
        }
    }

    pub fn first(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }

    pub fn last(&mut self) {
        if self.len > 0 {
            self.selected = self.len - 1;
        }
    }

    /// Update offset to keep selected item visible
    pub fn scroll_into_view(&mut self, visible_height: usize) {
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if visible_height > 0 && self.selected >= self.offset + visible_height {
            self.offset = self.selected - visible_height + 1;
        }
    }

    pub fn reset(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }

    /// Update length (e.g., when new results come in)
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if len == 0 {
            self.selected = 0;
            self.offset = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

// =============================================================================
// Text Input
// =============================================================================

/// Single-line text input. `cursor` counts characters, not bytes.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub text: String,
    pub cursor: usize,
}

impl TextInput {
    fn byte_index(&self, cursor: usize) -> usize {
        self.text
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Insert character at cursor
    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Delete character before cursor
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
        true
    }

    /// Delete character at cursor
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.char_len() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
        true
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.char_len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Text split at the cursor, for rendering
    pub fn split(&self) -> (&str, &str) {
        self.text.split_at(self.byte_index(self.cursor))
    }
}

// =============================================================================
// Region Picker
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct RegionPickerState {
    pub filter: TextInput,
    pub list: ListState,
}

impl RegionPickerState {
    /// Regions matching the filter by code or name
    pub fn matches(&self) -> Vec<Region> {
        Region::filter(&self.filter.text)
    }

    pub fn selected(&self) -> Option<Region> {
        self.matches().get(self.list.selected).copied()
    }

    fn refresh(&mut self) {
        let len = self.matches().len();
        self.list.set_len(len);
    }

    /// Reopen with an empty filter and `current` selected
    fn open(&mut self, current: Region) {
        self.filter.clear();
        self.refresh();
        self.list.reset();
        if let Some(i) = self.matches().iter().position(|r| *r == current) {
            self.list.selected = i;
        }
    }
}

// =============================================================================
// Main Application State
// =============================================================================

/// Main application state
#[derive(Debug)]
pub struct App {
    /// Current state/screen
    pub state: AppState,
    /// Navigation history stack
    pub nav_stack: Vec<AppState>,
    /// Whether the app is running
    pub running: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Transient message shown until the next key
    pub error: Option<String>,

    pub session: SessionController,
    pub search: TextInput,
    pub home_list: ListState,
    pub recommendations_list: ListState,
    pub region_picker: RegionPickerState,
    /// Title shown on the detail screen
    pub detail_id: Option<u64>,
}

impl App {
    pub fn new(session: SessionController) -> Self {
        Self {
            state: AppState::Home,
            nav_stack: Vec::new(),
            running: true,
            input_mode: InputMode::Normal,
            error: None,
            session,
            search: TextInput::default(),
            home_list: ListState::default(),
            recommendations_list: ListState::default(),
            region_picker: RegionPickerState::default(),
            detail_id: None,
        }
    }

    /// Session start: region detection and the trending list
    pub fn start(&mut self) {
        self.session.start();
        self.session.open_home();
    }

    /// Apply finished requests and resync list lengths. Call once per frame.
    pub fn tick(&mut self) -> usize {
        let applied = self.session.drain();
        if applied > 0 {
            self.sync_lists();
        }
        applied
    }

    fn sync_lists(&mut self) {
        let home = self.home_titles().len();
        self.home_list.set_len(home);
        let recommendations = self
            .session
            .recommendations()
            .data
            .as_ref()
            .map(|r| r.titles.len())
            .unwrap_or(0);
        self.recommendations_list.set_len(recommendations);
    }

    /// Is the search box showing results rather than trending?
    pub fn is_searching(&self) -> bool {
        self.search.text.trim().chars().count() >= MIN_QUERY_LEN
    }

    /// Titles listed on the home screen
    pub fn home_titles(&self) -> &[TitleSummary] {
        let state = if self.is_searching() {
            self.session.search()
        } else {
            self.session.trending()
        };
        state.data.as_deref().unwrap_or(&[])
    }

    pub fn recommended_titles(&self) -> &[TitleSummary] {
        self.session
            .recommendations()
            .data
            .as_ref()
            .map(|r| r.titles.as_slice())
            .unwrap_or(&[])
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Navigate to a new state, pushing current to stack
    pub fn navigate(&mut self, state: AppState) {
        if self.state != state {
            self.nav_stack.push(self.state);
            self.state = state;
        }
        self.input_mode = InputMode::Normal;
    }

    /// Go back to previous state, releasing whatever the screen was waiting on
    pub fn back(&mut self) -> bool {
        if self.input_mode == InputMode::Editing {
            self.input_mode = InputMode::Normal;
            return true;
        }

        let Some(prev) = self.nav_stack.pop() else {
            return false;
        };
        match self.state {
            AppState::Detail => {
                self.session.close_detail();
                self.detail_id = None;
            }
            AppState::Recommendations => {
                self.session.close_recommendations();
            }
            AppState::Home | AppState::RegionPicker => {}
        }
        self.state = prev;
        true
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.error = Some(msg.into());
    }

    /// Focus search input
    pub fn focus_search(&mut self) {
        if self.state == AppState::Home {
            self.input_mode = InputMode::Editing;
        }
    }

    fn open_detail(&mut self, title_id: u64) {
        self.detail_id = Some(title_id);
        self.session.open_detail(title_id);
    }

    fn open_region_picker(&mut self) {
        self.region_picker.open(self.session.region());
        self.navigate(AppState::RegionPicker);
        self.input_mode = InputMode::Editing;
    }

    fn search_edited(&mut self) {
        self.session.submit_query(&self.search.text);
        self.home_list.reset();
        self.sync_lists();
    }

    // -------------------------------------------------------------------------
    // Keyboard Event Handling
    // -------------------------------------------------------------------------

    /// Handle keyboard event, returns true if event was consumed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.error = None;

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return true;
        }

        match (self.input_mode, self.state) {
            (InputMode::Editing, AppState::RegionPicker) => self.handle_picker_key(key),
            (InputMode::Editing, _) => self.handle_editing_key(key),
            (InputMode::Normal, _) => self.handle_normal_key(key),
        }
    }

    /// Keys while the search box is focused. Every edit goes to the debouncer.
    fn handle_editing_key(&mut self, key: KeyEvent) -> bool {
        let edited = match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Down => {
                self.input_mode = InputMode::Normal;
                return true;
            }
            KeyCode::Char(c) => {
                self.search.insert(c);
                true
            }
            KeyCode::Backspace => self.search.backspace(),
            KeyCode::Delete => self.search.delete(),
            KeyCode::Left => {
                self.search.cursor_left();
                false
            }
            KeyCode::Right => {
                self.search.cursor_right();
                false
            }
            KeyCode::Home => {
                self.search.cursor_home();
                false
            }
            KeyCode::End => {
                self.search.cursor_end();
                false
            }
            _ => return false,
        };
        if edited {
            self.search_edited();
        }
        true
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => {
                self.quit();
                return true;
            }
            KeyCode::Esc => return self.back(),
            _ => {}
        }

        match self.state {
            AppState::Home => self.handle_home_key(key),
            AppState::Detail => self.handle_detail_key(key),
            AppState::Recommendations => self.handle_recommendations_key(key),
            AppState::RegionPicker => self.handle_picker_key(key),
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('/') => {
                self.focus_search();
                true
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.home_list.selected == 0 {
                    self.focus_search();
                } else {
                    self.home_list.up();
                }
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.home_list.down();
                true
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.home_list.first();
                true
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.home_list.last();
                true
            }
            KeyCode::Enter => {
                let Some(id) = self.home_titles().get(self.home_list.selected).map(|t| t.id) else {
                    return false;
                };
                self.open_detail(id);
                self.navigate(AppState::Detail);
                true
            }
            KeyCode::Char('c') => {
                self.open_region_picker();
                true
            }
            KeyCode::Char('R') => {
                self.session.refresh_trending();
                true
            }
            _ => false,
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('r') => {
                let Some(id) = self.detail_id else {
                    return false;
                };
                self.session.open_recommendations(id);
                self.recommendations_list.reset();
                self.sync_lists();
                self.navigate(AppState::Recommendations);
                true
            }
            KeyCode::Char('c') => {
                self.open_region_picker();
                true
            }
            KeyCode::Enter => {
                // Retry whatever failed for the same title and region
                if let Some(id) = self.detail_id {
                    self.session.open_detail(id);
                }
                true
            }
            _ => false,
        }
    }

    fn handle_recommendations_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.recommendations_list.up();
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.recommendations_list.down();
                true
            }
            KeyCode::Enter => {
                let Some(id) = self
                    .recommended_titles()
                    .get(self.recommendations_list.selected)
                    .map(|t| t.id)
                else {
                    return false;
                };
                // Swap the detail screen underneath for the picked title
                self.back();
                self.open_detail(id);
                true
            }
            _ => false,
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.back()
            }
            KeyCode::Up => {
                self.region_picker.list.up();
                true
            }
            KeyCode::Down => {
                self.region_picker.list.down();
                true
            }
            KeyCode::Enter => {
                let Some(region) = self.region_picker.selected() else {
                    return false;
                };
                if let Err(e) = self.session.set_region(region.code()) {
                    self.set_error(e.to_string());
                }
                self.input_mode = InputMode::Normal;
                self.back();
                true
            }
            KeyCode::Char(c) => {
                self.region_picker.filter.insert(c);
                self.region_picker.list.reset();
                self.region_picker.refresh();
                true
            }
            KeyCode::Backspace => {
                self.region_picker.filter.backspace();
                self.region_picker.list.reset();
                self.region_picker.refresh();
                true
            }
            _ => false,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
