mod app;
mod background;
mod config;
mod editor;
mod error;
mod event;
mod host;
mod legacy;
mod logger;
mod notes;
mod store;
mod ui;

use std::env;
use std::fs;
use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use app::App;
use config::{Config, Theme};
use event::run_app;
use legacy::{run_legacy, LegacyPopup};
use store::FileStore;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const LOAD_TIMEOUT: Duration = Duration::from_secs(2);

fn print_help() {
    println!("stickit {}", VERSION);
    println!("Sticky notes for the terminal");
    println!();
    println!("USAGE:");
    println!("    stickit [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
    println!("    -c, --config     Print config file path");
    println!("    -d, --dir        Print data directory path");
    println!("    --legacy         Open the single-note popup");
    println!("    --reset          Reset config to defaults");
    println!();
    println!("KEYS:");
    println!("    a add   e edit   p pin   c color   x delete   d delete several");
    println!("    b background image   B remove image   w open in window   q quit");
}

fn reset_config() {
    let config_path = Config::config_path();

    println!("Resetting stickit configuration...");
    println!();

    if config_path.exists() {
        match fs::remove_file(&config_path) {
            Ok(_) => println!("  Deleted: {}", config_path.display()),
            Err(e) => eprintln!("  Failed to remove config: {}", e),
        }
    } else {
        println!("  Config file not found (skipped)");
    }

    let _config = Config::load_or_create();
    println!("  Created: {}", config_path.display());
    println!();
    println!("Reset complete! Notes were not touched.");
}

enum Launch {
    Panel,
    Legacy,
}

type Term = Terminal<CrosstermBackend<Stdout>>;

fn setup_terminal() -> io::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn restore_terminal(terminal: &mut Term) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()
}

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let mut launch = Launch::Panel;

    if args.len() > 1 {
        match args[1].as_str() {
            "-v" | "--version" => {
                println!("stickit {}", VERSION);
                return Ok(());
            }
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            "-c" | "--config" => {
                println!("{}", Config::config_path().display());
                return Ok(());
            }
            "-d" | "--dir" => {
                println!("{}", Config::load().data_path().display());
                return Ok(());
            }
            "--reset" => {
                reset_config();
                return Ok(());
            }
            "--legacy" => launch = Launch::Legacy,
            arg => {
                eprintln!("Unknown option: {}", arg);
                eprintln!("Run 'stickit --help' for usage information");
                return Ok(());
            }
        }
    }

    let config = Config::load_or_create();
    logger::init(&config.log_path(), config.log_level_filter());

    match launch {
        Launch::Legacy => {
            let theme = Theme::default();
            let mut popup = LegacyPopup::open(Box::new(FileStore::new(config.sync_path())));
            let mut terminal = setup_terminal()?;
            let result = run_legacy(&mut terminal, &mut popup, &theme);
            restore_terminal(&mut terminal)?;
            if let Err(err) = result {
                log::error!("legacy popup failed: {}", err);
                eprintln!("Error: {err:?}");
            }
        }
        Launch::Panel => {
            let mut terminal = setup_terminal()?;
            // The picker queries the terminal, which needs raw mode.
            let mut app = App::new(config);
            app.wait_for_load(LOAD_TIMEOUT);

            let result = run_app(&mut terminal, &mut app);
            app.shutdown();
            restore_terminal(&mut terminal)?;
            if let Err(err) = result {
                log::error!("event loop failed: {}", err);
                eprintln!("Error: {err:?}");
            }
        }
    }

    Ok(())
}
