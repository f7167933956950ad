use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use futures::StreamExt;
use std::io::{self, Stdout};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tui::backend::CrosstermBackend;
use tui::Terminal;

use nt_core::{AnalysisResult, Article, ArticleId, ArticleSource, Error};
use nt_view::{FetchOutcome, ListOutcome};

use crate::app::{App, Command};

enum Completion {
    List(ListOutcome),
    Article(FetchOutcome<ArticleId, Article>),
    Analysis(FetchOutcome<ArticleId, AnalysisResult>),
}

/// Restores the terminal when dropped, including on error paths.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn new() -> nt_core::Result<Self> {
        enable_raw_mode().map_err(|e| Error::Terminal(format!("failed to enable raw mode: {}", e)))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| Error::Terminal(format!("failed to enter alternate screen: {}", e)))?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// The most recent task per kind of fetch. Starting a new one aborts the
/// previous task, which drops its request unless another ticket shares it.
#[derive(Default)]
struct Tasks {
    list: Option<JoinHandle<()>>,
    article: Option<JoinHandle<()>>,
    analysis: Option<JoinHandle<()>>,
}

impl Tasks {
    fn dispatch(&mut self, commands: Vec<Command>, tx: &mpsc::UnboundedSender<Completion>) {
        for command in commands {
            let tx = tx.clone();
            match command {
                Command::FetchList(ticket) => {
                    replace(&mut self.list, tokio::spawn(async move {
                        let _ = tx.send(Completion::List(ticket.resolve().await));
                    }));
                }
                Command::FetchArticle(ticket) => {
                    replace(&mut self.article, tokio::spawn(async move {
                        let _ = tx.send(Completion::Article(ticket.resolve().await));
                    }));
                }
                Command::FetchAnalysis(ticket) => {
                    replace(&mut self.analysis, tokio::spawn(async move {
                        let _ = tx.send(Completion::Analysis(ticket.resolve().await));
                    }));
                }
            }
        }
    }
}

fn replace(slot: &mut Option<JoinHandle<()>>, task: JoinHandle<()>) {
    if let Some(previous) = slot.replace(task) {
        if !previous.is_finished() {
            tracing::debug!("Aborting superseded fetch");
            previous.abort();
        }
    }
}

/// Runs the interactive browser until the user quits.
pub async fn run(source: Arc<dyn ArticleSource>, address: &str) -> anyhow::Result<()> {
    let mut guard = TerminalGuard::new()?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut tasks = Tasks::default();
    let mut events = EventStream::new();

    let (mut app, commands) = App::new(source, address);
    tasks.dispatch(commands, &tx);

    while !app.should_quit {
        guard.terminal.draw(|f| crate::ui::draw(f, &app))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    let commands = app.handle_key(key);
                    tasks.dispatch(commands, &tx);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(done) = rx.recv() => match done {
                Completion::List(outcome) => app.on_list(outcome),
                Completion::Article(outcome) => app.on_article(outcome),
                Completion::Analysis(outcome) => app.on_analysis(outcome),
            },
        }
    }

    Ok(())
}
