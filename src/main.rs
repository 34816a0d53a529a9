// padseq - Headless pattern player
//
// Usage: padseq [disk-dir] [--song N] [--bars N]
//
// Opens (or creates) a disk, binds its pads to the samples it holds and plays
// the first pattern, or song N, through the default audio device.

use padseq::project::Disk;
use padseq::{AudioOutput, Mixer, SampleEngine, Sequencer};
use std::path::PathBuf;
use std::time::Duration;

/// Frame loop period; the clock thread keeps time, this only has to keep up
const FRAME_SLEEP: Duration = Duration::from_millis(1);

const USAGE: &str = "Usage: padseq [disk-dir] [--song N] [--bars N]";

#[derive(Debug, Default)]
struct Args {
    disk: Option<PathBuf>,
    song: Option<usize>,
    bars: Option<u64>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, String> {
        let mut parsed = Args::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--song" => parsed.song = Some(number(&arg, args.next())?),
                "--bars" => parsed.bars = Some(number(&arg, args.next())?),
                "-h" | "--help" => return Err(USAGE.to_string()),
                flag if flag.starts_with("--") => return Err(format!("Unknown option {}", flag)),
                path => parsed.disk = Some(PathBuf::from(path)),
            }
        }
        Ok(parsed)
    }
}

fn number<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T, String> {
    value
        .as_deref()
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| format!("{} expects a number", flag))
}

fn default_disk() -> Result<PathBuf, String> {
    dirs::data_dir()
        .map(|dir| dir.join("padseq").join("disk"))
        .ok_or_else(|| "No data directory on this system, pass a disk path".to_string())
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let disk_dir = match args.disk {
        Some(dir) => dir,
        None => default_disk()?,
    };
    let (disk, project) = Disk::open_or_create(&disk_dir)?;

    let (output, mut mixer) = AudioOutput::start(1.0)?;

    let mut engine = SampleEngine::new(output.sample_rate());
    engine.set_volume(project.global.volume);
    engine.load_sounds(&disk.sample_dir())?;
    let failed = engine.prepare_pads(&project.pads);
    if !failed.is_empty() {
        log::warn!("{} pad samples could not be loaded: {:?}", failed.len(), failed);
    }

    let mut sequencer = Sequencer::new(project.bank.clone(), project.global.sequencer_settings());

    match args.song {
        Some(index) => {
            let song = project
                .song(index)
                .ok_or_else(|| format!("Song {} is unused", index))?;
            log::info!("Playing song {} '{}' at {} BPM", index, song.name, song.bpm);
            sequencer.play_song(song);
        }
        None => {
            log::info!(
                "Playing pattern {} at {} BPM, swing {}",
                sequencer.pattern_label(),
                sequencer.tempo(),
                sequencer.swing_label()
            );
            sequencer.start();
        }
    }

    let mut last_sync = 0;
    loop {
        let tick = sequencer.update();

        if tick.new_tick {
            engine.dispatch(sequencer.triggered(), &project.pads, &mut mixer);
        }
        if tick.metronome {
            engine.play_metronome(sequencer.position().beat, &mut mixer);
        }
        if sequencer.take_error() {
            engine.play_error(&mut mixer);
        }

        if sequencer.bar_syncs() != last_sync {
            last_sync = sequencer.bar_syncs();
            log::info!("{} pattern {}", sequencer.counter(), sequencer.pattern_label());

            if args.bars.is_some_and(|limit| last_sync >= limit) {
                sequencer.stop();
            }
        }

        if !sequencer.is_playing() {
            break;
        }
        std::thread::sleep(FRAME_SLEEP);
    }

    // Let the tail of the last hits ring out
    std::thread::sleep(Duration::from_millis(500));
    mixer.stop_all();
    log::info!("Stopped after {} pattern loops", last_sync);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}\n{}", message, USAGE);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
