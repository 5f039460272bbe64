//! Keystroke Recorder - records timed attempts at typing a target phrase.

use anyhow::Result;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use keystroke_recorder::{
    export::{output_path, sanitize_user_name, CsvExporter},
    keyboard::{KeyboardListener, RawKeyEvent},
    report::{summary_path, SessionReport},
    session::Phase,
    Clock, Config, Outcome, Session,
};

fn read_user_name(default_user: &str) -> String {
    print!("Enter your full name (no spaces): ");
    let _ = io::stdout().flush();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(_) => sanitize_user_name(&line, default_user),
        Err(_) => default_user.to_string(),
    }
}

fn arm_prompt(session: &Session) {
    if session.requires_arm() {
        println!("Press ENTER to arm the next attempt.");
    }
}

/// Print the console notification for an outcome
fn notify(session: &Session, outcome: Outcome) {
    match outcome {
        Outcome::Armed => println!("Ready. Type the phrase: {}", session.target_phrase()),
        Outcome::Aborted => {
            println!("Backspace pressed, restarting attempt.");
            arm_prompt(session);
        }
        Outcome::Mismatch => println!("Mistyped :( attempt discarded."),
        Outcome::Discarded | Outcome::Rejected => println!("Attempt discarded."),
        Outcome::Committed { attempt_number, finished } => {
            println!(
                "CORRECT attempt {}/{} recorded.",
                attempt_number,
                session.store().capacity()
            );
            if !finished {
                arm_prompt(session);
            }
        }
        Outcome::Dropped => {
            println!("Event buffer full, keystroke not recorded.");
        }
        Outcome::Quit => println!("ESC pressed, exiting."),
        Outcome::Ignored | Outcome::Pressed(_) | Outcome::Released(_) => {}
    }
    if outcome.is_failure() {
        arm_prompt(session);
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Using default configuration: {}", e);
            Config::default()
        }
    };

    println!("=================================================");
    println!(" Keystroke Recorder");
    println!(" Target phrase: {}", config.session.target_phrase);
    println!(" Attempts: {}", config.session.attempts);
    println!(" ESC = quit, BACKSPACE = restart attempt");
    println!("=================================================");

    let user = read_user_name(&config.output.default_user);
    let csv_path = output_path(&config.output.directory, &user);
    println!("Data will be saved to: {}\n", csv_path.display());

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        ctrlc::set_handler(move || interrupted.store(true, Ordering::SeqCst))?;
    }

    let clock = Clock::start();
    let mut session = Session::new(&config, clock);
    let (event_tx, event_rx) = mpsc::channel::<RawKeyEvent>();
    let mut listener = KeyboardListener::new(clock, event_tx);
    let poll_interval = config.poll_interval();

    arm_prompt(&session);

    while session.is_running() {
        if interrupted.load(Ordering::SeqCst) {
            let outcome = session.quit();
            notify(&session, outcome);
            break;
        }

        listener.poll();
        while let Ok(event) = event_rx.try_recv() {
            let outcome = session.process_event(&event);
            notify(&session, outcome);
            if !session.is_running() {
                break;
            }
        }

        thread::sleep(poll_interval);
    }

    let mut exporter = CsvExporter::new(&csv_path, &user);
    match session.flush(&mut exporter) {
        Ok(rows) => println!(
            "\nData written to {} ({} attempts, {} rows)",
            csv_path.display(),
            session.store().len(),
            rows
        ),
        Err(e) => println!("\nCould not write {}: {}", csv_path.display(), e),
    }

    if config.output.write_summary {
        let path = summary_path(&config.output.directory, &user);
        match SessionReport::new(&session, &user).export_json(&path) {
            Ok(()) => println!("Summary written to {}", path.display()),
            Err(e) => println!("Could not write {}: {}", path.display(), e),
        }
    }

    let stats = session.stats();
    if session.phase() == Phase::Finished {
        println!("All {} attempts recorded.", session.store().len());
    }
    if stats.dropped_events > 0 {
        println!("{} keystrokes were dropped (event buffer full).", stats.dropped_events);
    }

    Ok(())
}
