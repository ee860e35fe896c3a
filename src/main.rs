use clap::{crate_version, Parser};
use midi_blocks::file::{Division, Parameters};
use midi_blocks::sink::timeline;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[clap(
    version = crate_version!(),
    about = "Prints the events of the first track of a Standard MIDI File."
)]
struct Args {
    /// The .mid file to read.
    path: PathBuf,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = dump(&args.path) {
        eprintln!("{}: {}", args.path.display(), e);
        std::process::exit(1)
    }
}

fn dump(path: &Path) -> midi_blocks::Result<()> {
    let track = midi_blocks::load(path)?;
    let header = track.header();
    let Division::QuarterNote(ticks) = header.division();
    println!(
        "format {:?}, {} track(s), {} ticks per quarter",
        header.format(),
        header.track_count(),
        ticks
    );
    for timed in timeline(track.events()) {
        let event = timed.event();
        let detail = match event.parameters() {
            Parameters::Note { note, velocity } => format!("note {} velocity {}", note, velocity),
            Parameters::Program(program) => format!("program {}", program),
            Parameters::Meta(meta) => format!("{:?}", meta),
            Parameters::Other(bytes) => format!("{:02X?}", bytes),
        };
        println!(
            "{:>8} {:>9.3} ch{:<2} {:?} {}",
            timed.tick(),
            timed.beats(ticks),
            event.channel(),
            event.event_type(),
            detail
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    #[test]
    fn args() {
        Args::command().debug_assert();
        let args = Args::try_parse_from(["mididump", "song.mid"]).unwrap();
        assert_eq!(PathBuf::from("song.mid"), args.path);
        let e = Args::try_parse_from(["mididump"]).err().unwrap();
        assert_eq!(ErrorKind::MissingRequiredArgument, e.kind());
    }
}
