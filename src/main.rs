//! Entry point: argument handling, logger setup, autostart, and the main
//! event loop. Everything else lives in its own module; this file is
//! intentionally thin, matching how the teacher kept startup plumbing out
//! of the window-management logic.
#[macro_use]
extern crate lazy_static;

mod atoms;
mod client;
mod commands;
mod config;
mod display;
mod error;
mod events;
mod focus;
mod gestures;
mod geometry;
mod input;
mod input_grabs;
mod layout;
mod lifecycle;
mod monitor;
mod rules;
mod wm;

use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

use x11::xlib::XNextEvent;

use error::WmError;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage_and_exit(prog: &str) -> ! {
    eprintln!("usage: {} [-v]", prog);
    std::process::exit(1);
}

/// Runs `/etc/rdwm/autostart.sh` if present, then every regular file
/// directly under `$HOME/.config/rdwm/`, each detached and in the
/// background. Matches dwm-derivative autostart conventions: best-effort,
/// failures are logged and otherwise ignored.
fn run_autostart() {
    let system_script = Path::new("/etc/rdwm/autostart.sh");
    if system_script.is_file() {
        spawn_detached(system_script);
    }

    if let Ok(home) = env::var("HOME") {
        let user_dir = Path::new(&home).join(".config/rdwm");
        if let Ok(entries) = fs::read_dir(&user_dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file() {
                    spawn_detached(&path);
                }
            }
        }
    }
}

fn spawn_detached(path: &Path) {
    match Command::new(path).spawn() {
        Ok(_) => log::debug!("autostart: ran {:?}", path),
        Err(e) => log::warn!("autostart: failed to run {:?}: {}", path, e),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder().format_timestamp(None).init();

    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => {}
        2 if args[1] == "-v" => {
            println!("rdwm-{}", VERSION);
            return Ok(());
        }
        _ => {
            let err = WmError::InvalidUsage(args.get(1).cloned().unwrap_or_default());
            log::error!("{}", err);
            print_usage_and_exit(&args[0]);
        }
    }

    log::info!("rdwm {} starting", VERSION);

    let mut wm = wm::bootstrap()?;
    lifecycle::scan(&mut wm);
    run_autostart();

    log::info!("entering event loop");
    while wm.running {
        let mut ev = unsafe { std::mem::zeroed() };
        unsafe {
            XNextEvent(wm.display.dpy, &mut ev);
        }
        events::dispatch_one(&mut wm, &ev);
    }

    lifecycle::cleanup(&mut wm);
    log::info!("exiting");
    Ok(())
}
