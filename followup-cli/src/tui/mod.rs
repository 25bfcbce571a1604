//! Terminal shell: pick a spreadsheet, export it, run the driver and watch its output

pub mod app;
pub mod child;
pub mod view;
pub mod widgets;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;

use crate::config::DataDir;
use app::{Effect, Msg, State};
use child::ChildEvent;

const TICK: Duration = Duration::from_millis(50);

pub async fn run(data_dir: DataDir) -> Result<()> {
    let start_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut state = State::new(data_dir, start_dir);

    log::info!("UI started, data directory {}", state.data_dir.root().display());

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut state).await;
    ratatui::restore();

    result
}

async fn event_loop(terminal: &mut DefaultTerminal, state: &mut State) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<ChildEvent>();

    loop {
        while let Ok(child_event) = rx.try_recv() {
            state.update(Msg::Child(child_event));
        }

        terminal.draw(|frame| view::render(frame, state))?;

        if !event::poll(TICK)? {
            tokio::task::yield_now().await;
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match state.update(Msg::Key(key)) {
            Effect::None => {}
            Effect::Quit => return Ok(()),
            Effect::SpawnDriver => match child::driver_command(&state.data_dir) {
                Ok(command) => {
                    log::info!("Starting driver");
                    child::spawn(command, tx.clone());
                }
                Err(e) => {
                    state.update(Msg::Child(ChildEvent::SpawnFailed(e.to_string())));
                }
            },
        }
    }
}
