//! State of the interactive browser, separate from the terminal so it can be
//! driven by tests.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;

use nt_core::ArticleSource;
use nt_view::{
    AnalysisTicket, ArticleDetailView, ArticleListView, ArticleTicket, FetchOutcome, FilterFormController,
    FilterState, FormField, ListOutcome, ListTicket,
};

/// Work the driver has to start on behalf of the app.
pub enum Command {
    FetchList(ListTicket),
    FetchArticle(ArticleTicket),
    FetchAnalysis(AnalysisTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Form,
    List,
    AddressPrompt,
}

pub struct App {
    pub filter: FilterState,
    pub form: FilterFormController,
    pub list: ArticleListView,
    pub detail: ArticleDetailView,
    pub screen: Screen,
    pub focus: Focus,
    pub selected: usize,
    pub address_input: String,
    pub should_quit: bool,
}

impl App {
    /// Mounts the list page at `address` and returns the initial fetch.
    pub fn new(source: Arc<dyn ArticleSource>, address: &str) -> (Self, Vec<Command>) {
        let filter = FilterState::from_address(address);
        let form = FilterFormController::new(&filter);
        let mut app = Self {
            filter,
            form,
            list: ArticleListView::new(Arc::clone(&source)),
            detail: ArticleDetailView::new(source),
            screen: Screen::List,
            focus: Focus::List,
            selected: 0,
            address_input: String::new(),
            should_quit: false,
        };
        let commands = app.observe_filter();
        (app, commands)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Vec::new();
        }

        match (self.screen, self.focus) {
            (_, Focus::AddressPrompt) => self.handle_address_key(key),
            (Screen::Detail, _) => self.handle_detail_key(key),
            (Screen::List, Focus::Form) => self.handle_form_key(key),
            (Screen::List, Focus::List) => self.handle_list_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Tab => self.form.focus_next(),
            KeyCode::BackTab => self.form.focus_prev(),
            KeyCode::Left if !self.form.focus().is_text() => self.form.cycle(false),
            KeyCode::Right | KeyCode::Char(' ') if !self.form.focus().is_text() => self.form.cycle(true),
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => self.form.reset(),
            KeyCode::Char(c) => self.form.input_char(c),
            KeyCode::Backspace => {
                // Nothing left to delete: go back to the previous filter
                if !self.form.backspace() && self.filter.back() {
                    return self.observe_filter();
                }
            }
            KeyCode::Esc => self.focus = Focus::List,
            KeyCode::Enter => {
                let mut committed = None;
                if self.form.submit(|criteria| committed = Some(criteria)).is_ok() {
                    self.focus = Focus::List;
                    if let Some(criteria) = committed {
                        if self.filter.commit(criteria) {
                            return self.observe_filter();
                        }
                    }
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('/') | KeyCode::Char('f') => {
                self.form.set_focus(FormField::Query);
                self.focus = Focus::Form;
            }
            KeyCode::Char('g') => {
                self.address_input = self.filter.address().to_string();
                self.focus = Focus::AddressPrompt;
            }
            KeyCode::Char('b') | KeyCode::Backspace => {
                if self.filter.back() {
                    return self.observe_filter();
                }
            }
            KeyCode::Char('r') => {
                self.selected = 0;
                return self.list.refresh().map(Command::FetchList).into_iter().collect();
            }
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.list.articles().len();
                if len > 0 {
                    self.selected = (self.selected + 1).min(len - 1);
                }
            }
            KeyCode::Enter | KeyCode::Char('o') => {
                if let Some(article) = self.list.articles().get(self.selected) {
                    let id = article.id;
                    self.screen = Screen::Detail;
                    return self.detail.open(id).map(Command::FetchArticle).into_iter().collect();
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('a') => {
                return self.detail.load_analysis().map(Command::FetchAnalysis).into_iter().collect();
            }
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Backspace => {
                self.detail.close();
                self.screen = Screen::List;
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_address_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Esc => self.focus = Focus::List,
            KeyCode::Char(c) => self.address_input.push(c),
            KeyCode::Backspace => {
                self.address_input.pop();
            }
            KeyCode::Enter => {
                self.focus = Focus::List;
                let address = std::mem::take(&mut self.address_input);
                // Accept a full link as well as a bare query string
                let query = address.split_once('?').map(|(_, q)| q).unwrap_or(&address);
                if self.filter.navigate(query) {
                    return self.observe_filter();
                }
            }
            _ => {}
        }
        Vec::new()
    }

    /// Brings the form and the list in line with the active filter.
    fn observe_filter(&mut self) -> Vec<Command> {
        self.form.sync_from(&self.filter);
        self.selected = 0;
        self.list.observe(self.filter.criteria()).map(Command::FetchList).into_iter().collect()
    }

    pub fn on_list(&mut self, outcome: ListOutcome) {
        if self.list.complete(outcome) {
            self.selected = self.selected.min(self.list.articles().len().saturating_sub(1));
        }
    }

    pub fn on_article(&mut self, outcome: FetchOutcome<nt_core::ArticleId, nt_core::Article>) {
        self.detail.complete_article(outcome);
    }

    pub fn on_analysis(&mut self, outcome: FetchOutcome<nt_core::ArticleId, nt_core::AnalysisResult>) {
        self.detail.complete_analysis(outcome);
    }
}
