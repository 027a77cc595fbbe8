mod buffer;
mod config;
mod normalizer;
mod output;
mod parsers;
mod rules;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use config::{RunKind, RunToken};
use crossbeam::channel::{Sender, unbounded};
use memchr::memchr_iter;
use memmap2::Mmap;
use session::{EngineEvent, RunOutcome, Session};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Turns raw engine output into a clean, timestamped operational log.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Engine output to read; `-` or nothing reads stdin.
    #[arg(value_name = "FILE", conflicts_with = "command")]
    file: Option<String>,

    /// Run this engine command and follow its stdout and stderr instead.
    #[arg(last = true, value_name = "COMMAND")]
    command: Vec<String>,

    #[arg(short, long, default_value = "stdout")]
    output: String,

    #[arg(long, value_enum, default_value_t = RunKind::Generate)]
    run_kind: RunKind,

    /// Entries collected before each write.
    #[arg(long, default_value = "256")]
    batch_size: usize,

    #[arg(long)]
    benchmark: bool,

    /// Debug-level diagnostics on stderr (overrides RUST_LOG).
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    let start_time = Instant::now();
    let mut writer = output::create_writer(&args.output)?;

    let mut session = Session::new();
    let run = session.begin_run(args.run_kind);
    let mut pending = session.buffer().entries().to_vec();

    // channel carrying engine lines from the reader thread
    let (tx, rx) = unbounded::<EngineEvent>();
    let input = if !args.command.is_empty() {
        Input::Command(args.command.clone())
    } else {
        match args.file.as_deref() {
            Some(path) if path != "-" => Input::File(path.to_string()),
            _ => Input::Stdin,
        }
    };
    let reader_handle = std::thread::spawn(move || drive_engine(&input, run, &tx));

    let batch_size = args.batch_size.max(1);
    let banner = pending.len();
    let pumped = session.pump(&rx, |entry| {
        pending.push(entry.clone());
        if pending.len() >= batch_size {
            writer.write_batch(&pending)?;
            pending.clear();
        }
        Ok(())
    })?;
    let total_entries = banner + pumped;
    writer.write_batch(&pending)?;
    writer.finish()?;

    let total_lines = reader_handle
        .join()
        .map_err(|_| anyhow::anyhow!("reader thread panicked"))?;

    if args.benchmark {
        print_benchmark_results(total_lines, total_entries, start_time.elapsed());
    }

    Ok(())
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

enum Input {
    Command(Vec<String>),
    File(String),
    Stdin,
}

/// Feeds one run's lines into `tx`. Any failure to read the engine ends the
/// run as `Crashed`. Returns the number of raw lines delivered.
fn drive_engine(input: &Input, run: RunToken, tx: &Sender<EngineEvent>) -> usize {
    let result = match input {
        Input::Command(command) => feed_command(command, run, tx),
        Input::File(path) => feed_file(path, run, tx),
        Input::Stdin => feed_reader(io::stdin().lock(), run, tx),
    };
    match result {
        Ok(lines) => lines,
        Err(err) => {
            tracing::error!(error = %err, "engine log channel failed");
            let _ = tx.send(EngineEvent::finished(run, RunOutcome::Crashed(format!("{err:#}"))));
            0
        }
    }
}

fn feed_file(path: &str, run: RunToken, tx: &Sender<EngineEvent>) -> Result<usize> {
    let file = File::open(path).with_context(|| format!("opening {path}"))?;
    if file.metadata()?.len() == 0 {
        return Ok(0);
    }
    // SAFETY: the map is read-only and dropped before this function returns.
    let mmap = unsafe { Mmap::map(&file)? };

    let mut lines = 0;
    let mut start = 0;
    for nl in memchr_iter(b'\n', &mmap) {
        send_line(&mmap[start..nl], run, tx)?;
        lines += 1;
        start = nl + 1;
    }
    if start < mmap.len() {
        send_line(&mmap[start..], run, tx)?;
        lines += 1;
    }
    Ok(lines)
}

fn feed_command(command: &[String], run: RunToken, tx: &Sender<EngineEvent>) -> Result<usize> {
    let (program, args) = command
        .split_first()
        .context("empty engine command")?;
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("starting {program}"))?;
    tracing::info!(%program, pid = child.id(), "engine started");

    // stderr gets its own thread so neither pipe can fill up and stall the child
    let stderr_handle = child.stderr.take().map(|stderr| {
        let tx = tx.clone();
        std::thread::spawn(move || feed_reader(BufReader::new(stderr), run, &tx))
    });

    let stdout_lines = match child.stdout.take() {
        Some(stdout) => feed_reader(BufReader::new(stdout), run, tx),
        None => Ok(0),
    };
    let stderr_lines = match stderr_handle {
        Some(handle) => handle
            .join()
            .map_err(|_| anyhow::anyhow!("stderr reader panicked"))
            .and_then(|lines| lines),
        None => Ok(0),
    };
    // reap the child before surfacing any read error
    let status = child.wait()?;
    let lines = stdout_lines? + stderr_lines?;

    let outcome = if status.success() {
        RunOutcome::Succeeded
    } else {
        RunOutcome::Failed(format!("engine exited with {status}"))
    };
    tx.send(EngineEvent::finished(run, outcome))
        .context("log consumer hung up")?;
    Ok(lines)
}

fn feed_reader<R: BufRead>(mut reader: R, run: RunToken, tx: &Sender<EngineEvent>) -> Result<usize> {
    let mut lines = 0;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = buf.strip_suffix(b"\n").unwrap_or(&buf);
        send_line(line, run, tx)?;
        lines += 1;
    }
    Ok(lines)
}

fn send_line(bytes: &[u8], run: RunToken, tx: &Sender<EngineEvent>) -> Result<()> {
    let raw = String::from_utf8_lossy(bytes);
    tx.send(EngineEvent::line(run, raw))
        .context("log consumer hung up")
}

fn print_benchmark_results(total_lines: usize, total_entries: usize, duration: std::time::Duration) {
    let duration_secs = duration.as_secs_f64();
    let throughput_lines = total_lines as f64 / duration_secs;

    eprintln!("\n=== BENCHMARK RESULTS ===");
    eprintln!("Raw lines: {}", total_lines);
    eprintln!("Displayed entries: {}", total_entries);
    eprintln!("Processing time: {:.3}s", duration_secs);
    eprintln!("Throughput: {:.0} lines/s", throughput_lines);
    if total_lines > 0 {
        eprintln!(
            "Kept: {:.1}%",
            (total_entries as f64 / total_lines as f64) * 100.0
        );
    }
}
