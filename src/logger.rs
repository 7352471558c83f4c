use std::{
    fmt::Display,
    io::{stdout, Write},
    sync::atomic::{AtomicBool, Ordering::SeqCst},
};

static CBCS: AtomicBool = AtomicBool::new(false);

pub fn ansi<T: Display, U: Display>(x: T, y: U) -> String {
    format!("\x1b[{y}m{x}\x1b[0m{}", esc())
}

pub fn clear_colours() {
    print!("{}", esc());
}

/// Switches highlighted values to the colour-blind friendly palette.
pub fn set_cbcs(val: bool) {
    CBCS.store(val, SeqCst)
}

pub fn num_cs() -> i32 {
    if CBCS.load(SeqCst) {
        35
    } else {
        36
    }
}

fn esc() -> &'static str {
    if CBCS.load(SeqCst) {
        "\x1b[38;5;225m"
    } else {
        ""
    }
}

/// Single-line progress of a verification run, overwritten in place.
pub fn report_verify_progress(game: usize, games: usize, transitions: usize, refreshes: usize) {
    let num_cs = num_cs();
    // two perspective updates per transition
    let pct = refreshes as f32 / (2 * transitions.max(1)) as f32;

    print!(
        "game {}/{} | transitions {} | refreshed {}%     \r",
        ansi(game, num_cs),
        ansi(games, num_cs),
        ansi(transitions, num_cs),
        ansi(format!("{:.1}", pct * 100.0), 35),
    );
    let _ = stdout().flush();
}

pub fn report_verify_finished(games: usize, transitions: usize, refreshes: usize, seconds: f32) {
    let num_cs = num_cs();
    let per_sec = transitions as f32 / seconds.max(f32::EPSILON);

    println!(
        "verified {} games | {} transitions | {} refreshes | {} updates/sec | time {}s",
        ansi(games, num_cs),
        ansi(transitions, num_cs),
        ansi(refreshes, num_cs),
        ansi(format!("{per_sec:.0}"), num_cs),
        ansi(format!("{seconds:.1}"), num_cs),
    );
}
