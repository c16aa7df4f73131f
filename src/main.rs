use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use voice_fixtures::args::Args;
use voice_fixtures::batch::{print_banner, print_summary, run_all, verify_outputs, write_manifest};
use voice_fixtures::catalog::COMMANDS;
use voice_fixtures::convert::Converter;
use voice_fixtures::error::BatchError;
use voice_fixtures::probe::Ffprobe;
use voice_fixtures::transcode::{Ffmpeg, TargetFormat};
use voice_fixtures::tts::GoogleTts;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let stop = Arc::new(AtomicBool::new(false));
    // The pipeline blocks on HTTP and child processes; keep it off the signal-watching task.
    let mut job = tokio::task::spawn_blocking({
        let stop = Arc::clone(&stop);
        move || run(args, &stop)
    });

    let joined = tokio::select! {
        joined = &mut job => joined,
        _ = tokio::signal::ctrl_c() => {
            stop.store(true, Ordering::SeqCst);
            info!("Interrupt received, waiting for the current item to unwind");
            tokio::select! {
                joined = &mut job => joined,
                _ = tokio::signal::ctrl_c() => {
                    println!("\n\nAborted by user");
                    std::process::exit(130);
                }
            }
        }
    };

    if stop.load(Ordering::SeqCst) {
        println!("\n\nAborted by user");
        return ExitCode::from(130);
    }
    match joined {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            report_failure(&e);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("Generator task panicked: {}", e);
            eprintln!("\n❌ Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args, stop: &AtomicBool) -> anyhow::Result<()> {
    let synthesizer = GoogleTts::new(&args.tts_url, &args.lang, args.slow)?;
    let converter = Converter::new(
        synthesizer,
        Ffmpeg::new(&args.ffmpeg),
        Ffprobe::new(&args.ffprobe),
        TargetFormat::RECOGNIZER,
    );

    let mut stdout = std::io::stdout();
    print_banner(&mut stdout)?;
    let report = run_all(&converter, COMMANDS, &args.output_dir, stop, &mut stdout)?;

    if args.verify {
        verify_outputs(&report, converter.format())?;
    }
    if args.manifest {
        let path = write_manifest(&report)?;
        info!("Manifest: {}", path.display());
    }

    print_summary(&report, &mut stdout)?;
    Ok(())
}

fn report_failure(err: &anyhow::Error) {
    let missing = err
        .downcast_ref::<BatchError>()
        .is_some_and(BatchError::is_missing_dependency);
    if missing {
        eprintln!("\n❌ Missing dependency: {err:#}");
        eprintln!("\nThis tool needs ffmpeg (and ffprobe) on PATH:");
        eprintln!("  brew install ffmpeg");
        eprintln!("  sudo apt install ffmpeg");
        eprintln!("\nOr point --ffmpeg / --ffprobe at the binaries.");
    } else {
        eprintln!("\n❌ Error: {err:?}");
    }
}
