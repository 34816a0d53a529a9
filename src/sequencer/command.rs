// Sequencer commands - One variant per user action
// Input layers translate key/pad events into these and hand them to `execute`

use super::player::Sequencer;
use super::song::Song;
use crate::clock::Clock;

/// Actions the presentation layer can request
#[derive(Debug, Clone, PartialEq)]
pub enum SequencerCommand {
    Start,
    Stop,
    TogglePlay,
    ToggleRecord,
    ToggleMetronome,
    ToggleDelete,
    /// Relative tempo change in BPM
    NudgeTempo(f64),
    SetBpm(f64),
    SetQuantize(usize),
    StepQuantize(i32),
    NavigatePattern(i32),
    Record { track: usize, pitch: u8 },
    Delete { track: usize, whole: bool },
    GridEdit {
        track: usize,
        pulse: usize,
        on: bool,
        pitch: u8,
    },
    SetSwing(u8),
    PlaySong(Song),
    ClearError,
}

impl<C: Clock> Sequencer<C> {
    /// Apply a command
    pub fn execute(&mut self, command: SequencerCommand) {
        log::debug!("Sequencer command: {:?}", command);

        match command {
            SequencerCommand::Start => self.start(),
            SequencerCommand::Stop => self.stop(),
            SequencerCommand::TogglePlay => self.toggle_play(),
            SequencerCommand::ToggleRecord => self.toggle_record(),
            SequencerCommand::ToggleMetronome => self.toggle_metronome(),
            SequencerCommand::ToggleDelete => self.toggle_delete(),
            SequencerCommand::NudgeTempo(delta) => self.set_tempo(delta),
            SequencerCommand::SetBpm(bpm) => self.set_bpm(bpm),
            SequencerCommand::SetQuantize(index) => self.set_quantize(index),
            SequencerCommand::StepQuantize(delta) => self.step_quantize(delta),
            SequencerCommand::NavigatePattern(delta) => self.navigate_pattern(delta),
            SequencerCommand::Record { track, pitch } => self.record(track, pitch),
            SequencerCommand::Delete { track, whole } => self.delete(track, whole),
            SequencerCommand::GridEdit {
                track,
                pulse,
                on,
                pitch,
            } => self.grid_edit(track, pulse, on, pitch),
            SequencerCommand::SetSwing(amount) => self.set_swing(amount),
            SequencerCommand::PlaySong(song) => self.play_song(&song),
            SequencerCommand::ClearError => {
                self.take_error();
            }
        }
    }

    /// A pad hit: records, or deletes when delete mode is on.
    ///
    /// Returns the command that was applied, if any (nothing while not recording).
    pub fn pad_hit(&mut self, track: usize, pitch: u8) -> Option<SequencerCommand> {
        if !self.is_playing() || !self.is_recording() {
            return None;
        }

        let command = if self.delete_mode() {
            SequencerCommand::Delete {
                track,
                whole: false,
            }
        } else {
            SequencerCommand::Record { track, pitch }
        };
        self.execute(command.clone());
        Some(command)
    }
}
