mod tui;
mod ui;

use std::fs::File;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use color_eyre::eyre::{eyre, Result, WrapErr};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEventKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use audio_drill::app::{App, AppOptions};
use audio_drill::audio::SimulatedAudio;
use audio_drill::config::Config;
use audio_drill::data;
use audio_drill::playback::AudioEvent;

type DrillApp = App<SimulatedAudio>;

#[tokio::main]
async fn main() -> Result<()> {
    tui::install_hooks()?;

    let config = Config::from_env().map_err(|e| eyre!("{:#}", e))?;
    init_logging(&config)?;

    let store = data::load_deck(config.deck.as_deref()).map_err(|e| eyre!("{:#}", e))?;
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let (audio_tx, audio_rx) = mpsc::unbounded_channel();
    let audio = SimulatedAudio::new(
        audio_tx,
        config.load_delay,
        config.prompt_duration,
        config.verify_assets,
    );
    let options = AppOptions {
        autoplay: config.autoplay,
    };
    let mut app = App::new(store, audio, rng, options)?;

    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let reader = spawn_input_reader(input_tx);

    let mut terminal = tui::init()?;
    let res = run_app(&mut terminal, &mut app, input_rx, audio_rx).await;
    app.shutdown();
    tui::restore()?;

    let _ = reader.join();
    log::info!(
        "session over: {} responses, mean {:?}",
        app.total_responses(),
        app.mean_reaction_time()
    );
    res
}

fn init_logging(config: &Config) -> Result<()> {
    let file = File::create(&config.log_file)
        .wrap_err_with(|| format!("failed to open log file {}", config.log_file.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

// crossterm input is blocking, so it gets its own thread. It stops as soon
// as the receiving side is gone.
fn spawn_input_reader(tx: UnboundedSender<Event>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(Duration::from_millis(16)) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        log::error!("failed to read terminal input: {}", e);
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    log::error!("failed to poll terminal input: {}", e);
                    break;
                }
            }
        }
    })
}

async fn run_app(
    terminal: &mut tui::Tui,
    app: &mut DrillApp,
    mut input_rx: UnboundedReceiver<Event>,
    mut audio_rx: UnboundedReceiver<AudioEvent>,
) -> Result<()> {
    loop {
        let view = app.view();
        terminal.draw(|frame| ui::render(&view, frame))?;

        tokio::select! {
            input = input_rx.recv() => match input {
                Some(ev) => {
                    if !handle_input(app, ev)? {
                        break;
                    }
                }
                None => break,
            },
            Some(audio) = audio_rx.recv() => app.handle_audio(audio),
        }
    }
    Ok(())
}

/// Returns `false` when the user asked to quit.
fn handle_input(app: &mut DrillApp, ev: Event) -> Result<bool> {
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Press => return handle_key(app, key),
        Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
            app.primary_action(Utc::now())?;
        }
        _ => {}
    }
    Ok(true)
}

fn handle_key(app: &mut DrillApp, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char(' ') => {
            app.primary_action(Utc::now())?;
        }
        KeyCode::Char('r') => {
            if let Err(e) = app.replay() {
                log::debug!("replay refused: {}", e);
            }
        }
        KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
        _ => {}
    }
    Ok(true)
}
