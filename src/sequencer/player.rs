// Sequencer player - Transport, record/play buffers and song chaining
// Runs inside the caller's frame loop; only the clock lives on another thread

use super::pattern::{Cell, Pattern, PatternBank, PatternError, TRACKS};
use super::quantize::{Resolution, quantize};
use super::song::{Playlist, Song};
use super::swing::{Swing, render_play};
use super::transport::{Position, TransportState};
use crate::clock::{
    Clock, ClockGenerator, PPQN, PulseReceiver, SharedTempo, pulse_channel, tempo::clamp_bpm,
};

/// Highest pitch ladder index a cell can hold
pub const MAX_PITCH: u8 = 24;

/// Settings restored from disk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerSettings {
    pub bpm: f64,
    pub metronome: bool,
    pub resolution: Resolution,
}

impl Default for SequencerSettings {
    fn default() -> Self {
        Self {
            bpm: 90.0,
            metronome: true,
            resolution: Resolution::Quarter,
        }
    }
}

/// Result of one `Sequencer::update`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickUpdate {
    /// A pulse is due: dispatch the play buffer at the current position
    pub new_tick: bool,
    /// The pulse starts a beat and the metronome is on
    pub metronome: bool,
}

/// Record and play copies of the active pattern
#[derive(Debug, Clone)]
struct Buffers {
    record: Pattern,
    play: Pattern,
}

/// The sequencer state machine.
///
/// Owns the pattern bank and, while a used pattern is selected, its
/// record/play buffers. User edits only ever touch the record buffer; the
/// play buffer is rebuilt from it (with swing) at start, stop, every bar
/// wrap and after explicit grid edits.
pub struct Sequencer<C: Clock = ClockGenerator> {
    bank: PatternBank,
    active: usize,
    queued: Option<usize>,
    buffers: Option<Buffers>,

    position: Position,
    tempo: SharedTempo,
    resolution: Resolution,

    playing: bool,
    recording: bool,
    metronome: bool,
    delete_mode: bool,
    error: bool,

    playlist: Option<Playlist>,

    clock: C,
    pulses: PulseReceiver,
    /// Pulses received but not yet played
    pending_ticks: u32,
    /// The position advance for the last played pulse is still owed
    step_pending: bool,
    bar_syncs: u64,
}

impl Sequencer<ClockGenerator> {
    /// Sequencer driven by a real clock thread
    pub fn new(bank: PatternBank, settings: SequencerSettings) -> Self {
        let tempo = SharedTempo::new(settings.bpm);
        let (sender, receiver) = pulse_channel();
        let clock = ClockGenerator::new(tempo.clone(), sender);
        Self::with_clock(clock, receiver, tempo, bank, settings)
    }
}

impl<C: Clock> Sequencer<C> {
    /// Sequencer driven by any clock writing to `pulses`
    pub fn with_clock(
        clock: C,
        pulses: PulseReceiver,
        tempo: SharedTempo,
        bank: PatternBank,
        settings: SequencerSettings,
    ) -> Self {
        tempo.set(settings.bpm);

        let mut sequencer = Self {
            bank,
            active: 0,
            queued: None,
            buffers: None,
            position: Position::default(),
            tempo,
            resolution: settings.resolution,
            playing: false,
            recording: false,
            metronome: settings.metronome,
            delete_mode: false,
            error: false,
            playlist: None,
            clock,
            pulses,
            pending_ticks: 0,
            step_pending: false,
            bar_syncs: 0,
        };
        sequencer.load_active();
        sequencer
    }

    // ========== Transport ==========

    /// Start playing the active pattern from the top.
    ///
    /// An unused pattern raises the error flag instead.
    pub fn start(&mut self) {
        if self.playing {
            return;
        }
        if self.buffers.is_none() {
            log::warn!("Pattern {} is unused, refusing to play", self.active);
            self.error = true;
            return;
        }

        self.position = Position::default();
        self.pending_ticks = 0;
        self.step_pending = false;
        self.pulses.clear();
        self.sync_play();

        if let Err(e) = self.clock.start() {
            log::error!("Could not start clock: {}", e);
            self.error = true;
            return;
        }

        self.playing = true;
        log::info!(
            "Playing pattern {} at {:.1} BPM",
            self.active,
            self.tempo.get()
        );
    }

    /// Stop the clock, rewind and rebuild both buffers.
    ///
    /// Leaving a song restores the pattern selected before it started.
    pub fn stop(&mut self) {
        self.clock.stop();

        match self.playlist.take() {
            Some(playlist) => self.select(playlist.return_to),
            None => {
                self.commit();
                self.load_active();
            }
        }

        self.playing = false;
        self.recording = false;
        self.queued = None;
        self.position = Position::default();
        self.pending_ticks = 0;
        self.step_pending = false;
        self.pulses.clear();
        log::info!("Stopped");
    }

    pub fn toggle_play(&mut self) {
        if self.playing {
            self.stop();
        } else {
            self.start();
        }
    }

    /// Play a song's patterns in order, or stop if already playing.
    pub fn play_song(&mut self, song: &Song) {
        if self.playing {
            self.stop();
            return;
        }

        self.tempo.set(song.bpm);
        self.playlist = Some(Playlist::new(&song.steps, self.active));

        if self.advance_song() {
            log::info!("Song '{}' started", song.name);
            self.start();
            if !self.playing {
                self.stop();
            }
        } else {
            log::warn!("Song '{}' has no playable steps", song.name);
            self.error = true;
        }
    }

    /// Recording can only be armed while playing
    pub fn toggle_record(&mut self) {
        if self.playing {
            self.recording = !self.recording;
        }
    }

    pub fn toggle_metronome(&mut self) {
        self.metronome = !self.metronome;
    }

    pub fn toggle_delete(&mut self) {
        self.delete_mode = !self.delete_mode;
    }

    /// Nudge the tempo; clamped to 40..=300 BPM and visible to the clock at once
    pub fn set_tempo(&mut self, delta: f64) {
        self.tempo.set(self.tempo.get() + delta);
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.tempo.set(clamp_bpm(bpm));
    }

    pub fn set_quantize(&mut self, index: usize) {
        self.resolution = Resolution::from_index(index);
    }

    pub fn step_quantize(&mut self, delta: i32) {
        self.resolution = self.resolution.offset_by(delta);
    }

    /// Move to another pattern.
    ///
    /// Stopped: switch immediately. Playing: queue the change for the next
    /// bar wrap, stepping from the already queued pattern if there is one.
    pub fn navigate_pattern(&mut self, delta: i32) {
        if self.playing {
            let from = self.queued.unwrap_or(self.active);
            self.queued = Some(self.offset_index(from, delta));
        } else {
            let target = self.offset_index(self.active, delta);
            self.select(target);
        }
    }

    // ========== Editing ==========

    /// Record a hit on `track` at the quantized position
    pub fn record(&mut self, track: usize, pitch: u8) {
        let tick = self.quantized_pulse();
        if let Some(cell) = self.record_cell(track, tick) {
            *cell = Cell::hit(pitch.min(MAX_PITCH));
        }
    }

    /// Clear the hit at the quantized position (or the whole track)
    pub fn delete(&mut self, track: usize, whole: bool) {
        let tick = self.quantized_pulse();
        if let Some(cell) = self.record_cell(track, tick) {
            *cell = Cell::default();
        }
        if whole {
            if let Some(buffers) = self.buffers.as_mut() {
                buffers.record.clear_track(track);
            }
        }
        self.sync_play();
    }

    /// Set or clear one cell directly; clearing keeps the stored pitch
    pub fn grid_edit(&mut self, track: usize, pulse: usize, on: bool, pitch: u8) {
        if let Some(cell) = self.record_cell(track, pulse) {
            cell.triggered = on;
            if on {
                cell.pitch = pitch.min(MAX_PITCH);
            }
        }
        self.sync_play();
    }

    /// Store the active pattern's swing.
    ///
    /// Takes effect immediately while stopped, at the next bar wrap while playing.
    pub fn set_swing(&mut self, amount: u8) {
        if !self.bank.is_used(self.active) {
            return;
        }
        if let Some(meta) = self.bank.meta_mut(self.active) {
            meta.swing = Swing::new(amount);
        }
        if !self.playing {
            self.sync_play();
        }
    }

    // ========== Pattern management ==========

    pub fn init_pattern(&mut self, index: usize, bars: usize) -> Result<(), PatternError> {
        self.edit_bank(|bank| bank.init(index, bars))
    }

    pub fn copy_pattern(&mut self, src: usize, dst: usize) -> Result<(), PatternError> {
        self.edit_bank(|bank| bank.copy(src, dst))
    }

    pub fn reset_pattern(&mut self, index: usize) -> Result<(), PatternError> {
        self.edit_bank(|bank| bank.reset(index))
    }

    pub fn rename_pattern(&mut self, index: usize, name: &str) -> Result<(), PatternError> {
        self.edit_bank(|bank| bank.rename(index, name))
    }

    /// Replace every pattern, selecting slot 0
    pub fn load_bank(&mut self, bank: PatternBank) {
        if self.playing {
            self.stop();
        }
        self.bank = bank;
        self.active = 0;
        self.queued = None;
        self.load_active();
    }

    /// Write the record buffer back into the bank
    pub fn commit(&mut self) {
        if let Some(buffers) = &self.buffers {
            self.bank.store(self.active, buffers.record.clone());
        }
    }

    // ========== Frame update ==========

    /// Advance by at most one pulse. Call once per frame.
    ///
    /// The position advance for a played pulse happens at the start of the
    /// following call, so the caller dispatches the pulse it was told about.
    pub fn update(&mut self) -> TickUpdate {
        if self.step_pending {
            self.step_pending = false;
            self.end_step();
        }

        let arrived = self.pulses.poll();
        if !self.playing {
            self.pending_ticks = 0;
            return TickUpdate::default();
        }

        self.pending_ticks = self.pending_ticks.saturating_add(arrived);
        if self.pending_ticks == 0 {
            return TickUpdate::default();
        }
        self.pending_ticks -= 1;
        self.step_pending = true;

        log::trace!("Tick {}", self.position);
        TickUpdate {
            new_tick: true,
            metronome: self.metronome && self.position.pulse % PPQN == 0,
        }
    }

    fn end_step(&mut self) {
        let Some(length) = self.pattern_len() else {
            return;
        };
        if !self.position.advance(length) {
            return;
        }

        self.sync_play();
        self.bar_syncs += 1;

        if self.playlist.is_some() {
            self.advance_song();
        } else if let Some(next) = self.queued.take() {
            if self.bank.is_used(next) {
                log::info!("Switching to pattern {}", next);
                self.select(next);
            } else {
                log::warn!("Queued pattern {} is unused, stopping", next);
                self.stop();
            }
        }
    }

    /// Select the next used song step, stopping at the end of the list
    fn advance_song(&mut self) -> bool {
        let next = self
            .playlist
            .as_mut()
            .and_then(|playlist| playlist.next_used(&self.bank));

        match next {
            Some(index) => {
                log::info!("Song step: pattern {}", index);
                self.select(index);
                true
            }
            None => {
                self.stop();
                false
            }
        }
    }

    // ========== Display ==========

    pub fn position(&self) -> Position {
        self.position
    }

    /// bar.beat.pulse counter
    pub fn counter(&self) -> String {
        self.position.to_string()
    }

    /// Active pattern number, or the queued one marked with `*`
    pub fn pattern_label(&self) -> String {
        match self.queued {
            Some(queued) => format!("{}*", queued),
            None => self.active.to_string(),
        }
    }

    pub fn quantize_label(&self) -> &'static str {
        self.resolution.label()
    }

    pub fn swing_label(&self) -> &'static str {
        self.bank.swing(self.active).label()
    }

    pub fn tempo(&self) -> f64 {
        self.tempo.get()
    }

    pub fn shared_tempo(&self) -> &SharedTempo {
        &self.tempo
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn active_pattern(&self) -> usize {
        self.active
    }

    pub fn queued_pattern(&self) -> Option<usize> {
        self.queued
    }

    pub fn state(&self) -> TransportState {
        match (self.playing, self.playlist.is_some(), self.recording) {
            (false, _, _) => TransportState::Stopped,
            (true, true, _) => TransportState::SongPlaying,
            (true, false, true) => TransportState::Recording,
            (true, false, false) => TransportState::Playing,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn metronome_enabled(&self) -> bool {
        self.metronome
    }

    pub fn delete_mode(&self) -> bool {
        self.delete_mode
    }

    /// Sticky error flag raised by rejected transport requests
    pub fn error(&self) -> bool {
        self.error
    }

    /// Read and clear the error flag
    pub fn take_error(&mut self) -> bool {
        std::mem::take(&mut self.error)
    }

    /// Record-to-play copies made at bar wraps since creation
    pub fn bar_syncs(&self) -> u64 {
        self.bar_syncs
    }

    pub fn bank(&self) -> &PatternBank {
        &self.bank
    }

    pub fn record_buffer(&self) -> Option<&Pattern> {
        self.buffers.as_ref().map(|b| &b.record)
    }

    pub fn play_buffer(&self) -> Option<&Pattern> {
        self.buffers.as_ref().map(|b| &b.play)
    }

    /// Tracks to sound at the current pulse
    pub fn triggered(&self) -> impl Iterator<Item = (usize, Cell)> + '_ {
        let pulse = self.position.pulse;
        self.buffers
            .iter()
            .flat_map(move |b| b.play.triggered_at(pulse))
    }

    /// Current position snapped to the selected resolution
    pub fn quantized_pulse(&self) -> usize {
        self.pattern_len()
            .map(|len| quantize(self.resolution, self.position, len))
            .unwrap_or(0)
    }

    // ========== Internals ==========

    fn pattern_len(&self) -> Option<usize> {
        self.buffers.as_ref().map(|b| b.record.len())
    }

    fn record_cell(&mut self, track: usize, pulse: usize) -> Option<&mut Cell> {
        if track >= TRACKS {
            return None;
        }
        self.buffers.as_mut()?.record.cell_mut(track, pulse)
    }

    fn offset_index(&self, from: usize, delta: i32) -> usize {
        let max = self.bank.len().saturating_sub(1) as i64;
        (from as i64 + delta as i64).clamp(0, max) as usize
    }

    /// Make `index` active, keeping the outgoing record buffer
    fn select(&mut self, index: usize) {
        self.commit();
        self.active = index;
        self.load_active();
    }

    /// Fresh buffers for the active slot (none if unused)
    fn load_active(&mut self) {
        let swing = self.bank.swing(self.active);
        self.buffers = self.bank.get(self.active).map(|pattern| {
            let mut play = pattern.clone();
            render_play(pattern, swing, &mut play);
            Buffers {
                record: pattern.clone(),
                play,
            }
        });
    }

    /// Rebuild the play buffer from the record buffer
    fn sync_play(&mut self) {
        let swing = self.bank.swing(self.active);
        if let Some(buffers) = self.buffers.as_mut() {
            render_play(&buffers.record, swing, &mut buffers.play);
        }
    }

    fn edit_bank(
        &mut self,
        edit: impl FnOnce(&mut PatternBank) -> Result<(), PatternError>,
    ) -> Result<(), PatternError> {
        if self.playing {
            return Err(PatternError::Playing);
        }
        self.commit();
        let result = edit(&mut self.bank);
        self.load_active();
        result
    }
}

impl<C: Clock> Drop for Sequencer<C> {
    fn drop(&mut self) {
        self.clock.stop();
    }
}
