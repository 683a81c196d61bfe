use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use std::time::Duration;
use tracing::info;
use workgrid::row::{sample_rows, Row};
use workgrid::{App, AppConfig, AppEvent, Args, ConfigManager, GridOptions, GridState, Theme};

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

/// Grid settings from the config file, overridden by command-line flags.
fn grid_options(args: &Args, config: &AppConfig) -> Result<GridOptions> {
    let mut options = config.grid_options()?;
    if let Some(min_rows) = args.min_rows {
        if min_rows == 0 {
            return Err(eyre!("--min-rows must be greater than 0"));
        }
        options.min_rows = min_rows;
    }
    if let Some(delimiter) = args.delimiter {
        options.delimiter = delimiter;
    }
    Ok(options)
}

fn initial_rows(args: &Args) -> Vec<Row> {
    if args.empty {
        Vec::new()
    } else {
        sample_rows()
    }
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: &AppConfig) -> Result<()> {
    let options = grid_options(args, config)?;
    let grid = GridState::with_rows(initial_rows(args), options)?;

    let theme = Theme::from_config(&config.theme)
        .or_else(|e| Theme::from_config(&AppConfig::default().theme).map_err(|_| e))?;

    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new_with_config(tx.clone(), theme, config, grid);
    if args.debug {
        app.enable_debug();
    }
    if let Some(path) = &args.export_file {
        app.set_export_path(path.clone());
    }
    render(&mut terminal, &mut app)?;
    if let Some(path) = &args.path {
        tx.send(AppEvent::Import(path.clone(), args.format))?;
    }

    let poll_interval = Duration::from_millis(config.ui.event_poll_interval_ms);
    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => {
                    if key.is_press() {
                        tx.send(AppEvent::Key(key))?
                    }
                }
                crossterm::event::Event::Mouse(mouse) => tx.send(AppEvent::Mouse(mouse))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    AppEvent::Crash(msg) => {
                        return Err(eyre!(msg));
                    }
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    info!("exiting");
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let manager = ConfigManager::new(workgrid::APP_NAME)?;
        match manager.write_default_config(args.force) {
            Ok(path) => {
                println!("Configuration written to {}", path.display());
                return Ok(Some(()));
            }
            Err(e) => {
                eprintln!("Error generating config: {}", e);
                std::process::exit(1);
            }
        }
    }
    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    let config = AppConfig::load(workgrid::APP_NAME)?;

    let manager = ConfigManager::new(workgrid::APP_NAME)?;
    let log_dir = manager.ensure_subdir("logs")?;
    let _log_guard = workgrid::logging::init(&log_dir, args.debug || config.debug.enabled)?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let terminal = ratatui::try_init().map_err(|e| {
        eyre!(
            "workgrid requires an interactive terminal (TTY). No terminal detected: {}",
            e
        )
    })?;
    crossterm::execute!(std::io::stdout(), EnableMouseCapture)?;
    let result = run(terminal, &args, &config);
    let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
