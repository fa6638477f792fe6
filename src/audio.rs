//! Music and sound effects
//!
//! Track selection lives in [`Jukebox`], which is plain data and decides what
//! the music element should do. Browsers refuse playback before the first user
//! gesture, so requests made earlier are parked in a single slot and replayed
//! on unlock. Sound effects are procedurally generated with the Web Audio API.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Menu theme
pub const MENU_THEME: &str = "assets/main_menu_theme.mp3";

/// Number of in-game tracks (`assets/music1.mp3` ..= `assets/music17.mp3`)
pub const GAME_TRACK_COUNT: usize = 17;

/// Music the game asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusicRequest {
    Menu,
    /// Random in-game track
    Game,
    /// Score milestone; switch tracks unless the draw repeats the current one
    Milestone,
    /// "Next" button; always a different track
    Next,
}

/// What the music element should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MusicCommand {
    Play { src: String },
    /// Continue the loaded source
    Resume,
    Pause,
    SetMuted(bool),
}

/// Currently loaded source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Loaded {
    Menu,
    Track(usize),
}

/// Menu theme plus the in-game rotation
#[derive(Debug, Clone)]
pub struct Playlist {
    pub menu: String,
    pub tracks: Vec<String>,
}

impl Default for Playlist {
    fn default() -> Self {
        Self {
            menu: MENU_THEME.to_string(),
            tracks: (1..=GAME_TRACK_COUNT)
                .map(|i| format!("assets/music{i}.mp3"))
                .collect(),
        }
    }
}

/// Picks tracks and gates playback behind the first user interaction
#[derive(Debug, Clone)]
pub struct Jukebox {
    playlist: Playlist,
    loaded: Option<Loaded>,
    enabled: bool,
    muted: bool,
    unlocked: bool,
    pending: Option<MusicRequest>,
    rng: Pcg32,
}

impl Jukebox {
    pub fn new(playlist: Playlist, enabled: bool, seed: u64) -> Self {
        Self {
            playlist,
            loaded: None,
            enabled,
            muted: false,
            unlocked: false,
            pending: None,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Source currently loaded into the music element
    pub fn current_src(&self) -> Option<&str> {
        match self.loaded? {
            Loaded::Menu => Some(&self.playlist.menu),
            Loaded::Track(i) => self.playlist.tracks.get(i).map(String::as_str),
        }
    }

    /// First user gesture seen: replay the parked request, once
    pub fn unlock(&mut self) -> Option<MusicCommand> {
        if self.unlocked {
            return None;
        }
        self.unlocked = true;
        log::debug!("Audio unlocked by user interaction");
        let pending = self.pending.take()?;
        self.request(pending)
    }

    /// Ask for music; parks the request (latest wins) until unlocked
    pub fn request(&mut self, request: MusicRequest) -> Option<MusicCommand> {
        if !self.unlocked {
            self.pending = Some(request);
            return None;
        }
        if !self.enabled {
            return self.loaded.map(|_| MusicCommand::Pause);
        }

        let next = match request {
            MusicRequest::Menu => Loaded::Menu,
            MusicRequest::Game => Loaded::Track(self.random_track()?),
            MusicRequest::Milestone => {
                let pick = Loaded::Track(self.random_track()?);
                if Some(pick) == self.loaded {
                    return None;
                }
                pick
            }
            MusicRequest::Next => Loaded::Track(self.different_track()?),
        };
        self.load(next)
    }

    /// Music setting changed; resumes the menu theme when re-enabled
    pub fn set_enabled(&mut self, enabled: bool) -> Option<MusicCommand> {
        self.enabled = enabled;
        log::info!("Music {}", if enabled { "enabled" } else { "disabled" });
        if enabled {
            self.request(MusicRequest::Menu)
        } else {
            self.loaded.take().map(|_| MusicCommand::Pause)
        }
    }

    /// Hold the current track (run paused)
    pub fn pause(&self) -> Option<MusicCommand> {
        self.loaded.map(|_| MusicCommand::Pause)
    }

    /// Continue the held track unless music is off or muted
    pub fn resume(&self) -> Option<MusicCommand> {
        (self.enabled && self.unlocked && !self.muted && self.loaded.is_some())
            .then_some(MusicCommand::Resume)
    }

    /// Silence and forget the current track, and any parked request
    pub fn stop(&mut self) -> Option<MusicCommand> {
        self.pending = None;
        self.loaded.take().map(|_| MusicCommand::Pause)
    }

    pub fn toggle_mute(&mut self) -> MusicCommand {
        self.muted = !self.muted;
        MusicCommand::SetMuted(self.muted)
    }

    fn load(&mut self, next: Loaded) -> Option<MusicCommand> {
        self.loaded = Some(next);
        let src = self.current_src()?.to_string();
        log::info!("Playing {src}");
        Some(MusicCommand::Play { src })
    }

    fn random_track(&mut self) -> Option<usize> {
        let len = self.playlist.tracks.len();
        (len > 0).then(|| self.rng.random_range(0..len))
    }

    fn different_track(&mut self) -> Option<usize> {
        let current = match self.loaded {
            Some(Loaded::Track(i)) => Some(i),
            _ => None,
        };
        if self.playlist.tracks.len() < 2 {
            return self.random_track();
        }
        loop {
            let pick = self.random_track()?;
            if Some(pick) != current {
                return Some(pick);
            }
        }
    }
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    Jump,
    /// One of the resume countdown numbers
    CountdownBeep,
    /// Countdown reached GO!
    Go,
    GameOver,
    /// Live score passed the personal best
    HighScore,
}

/// Oscillator shape for a synthesized note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Triangle,
}

/// One scheduled tone of a sound effect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    /// Offset from the trigger (s)
    pub at: f64,
    /// Time until the tone is cut (s)
    pub len: f64,
    pub freq: f32,
    /// Pitch at the end of the note, if it slides
    pub glide_to: Option<f32>,
    pub wave: Wave,
    /// Peak gain before master volume
    pub level: f32,
}

impl Note {
    const fn tone(at: f64, len: f64, freq: f32, wave: Wave, level: f32) -> Self {
        Self {
            at,
            len,
            freq,
            glide_to: None,
            wave,
            level,
        }
    }

    const fn glide(mut self, to: f32) -> Self {
        self.glide_to = Some(to);
        self
    }
}

const JUMP: [Note; 1] = [Note::tone(0.0, 0.18, 250.0, Wave::Square, 0.15).glide(700.0)];
const COUNTDOWN_BEEP: [Note; 1] = [Note::tone(0.0, 0.3, 440.0, Wave::Sine, 0.3)];
const GO: [Note; 1] = [Note::tone(0.0, 0.3, 880.0, Wave::Sine, 0.3)];
/// Thud into the obstacle, then a falling minor third
const GAME_OVER: [Note; 3] = [
    Note::tone(0.0, 0.22, 220.0, Wave::Square, 0.2).glide(90.0),
    Note::tone(0.25, 0.35, 294.0, Wave::Triangle, 0.3),
    Note::tone(0.6, 0.6, 247.0, Wave::Triangle, 0.3).glide(196.0),
];
/// C major arpeggio up to the octave
const HIGH_SCORE: [Note; 4] = [
    Note::tone(0.0, 0.3, 523.0, Wave::Triangle, 0.25),
    Note::tone(0.08, 0.3, 659.0, Wave::Triangle, 0.25),
    Note::tone(0.16, 0.3, 784.0, Wave::Triangle, 0.25),
    Note::tone(0.24, 0.3, 1047.0, Wave::Triangle, 0.25),
];

impl SoundEffect {
    /// The tones that make up this effect, in start order
    pub fn notes(self) -> &'static [Note] {
        match self {
            SoundEffect::Jump => &JUMP,
            SoundEffect::CountdownBeep => &COUNTDOWN_BEEP,
            SoundEffect::Go => &GO,
            SoundEffect::GameOver => &GAME_OVER,
            SoundEffect::HighScore => &HIGH_SCORE,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{AudioManager, MusicPlayer};

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use web_sys::{AudioContext, HtmlAudioElement, OscillatorType};

    use super::{MusicCommand, Note, SoundEffect, Wave};

    /// The page's looping `<audio>` element
    pub struct MusicPlayer {
        element: Option<HtmlAudioElement>,
    }

    impl MusicPlayer {
        pub fn from_document(document: &web_sys::Document, id: &str) -> Self {
            let element = document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlAudioElement>().ok());
            if element.is_none() {
                log::warn!("No <audio id=\"{id}\"> element - music disabled");
            }
            Self { element }
        }

        pub fn apply(&self, command: MusicCommand) {
            let Some(audio) = &self.element else { return };
            match command {
                MusicCommand::Play { src } => {
                    audio.set_src(&src);
                    audio.set_loop(true);
                    if let Err(e) = audio.play() {
                        log::warn!("Music play blocked: {e:?}");
                    }
                }
                MusicCommand::Resume => {
                    if let Err(e) = audio.play() {
                        log::warn!("Music resume failed: {e:?}");
                    }
                }
                MusicCommand::Pause => {
                    let _ = audio.pause();
                }
                MusicCommand::SetMuted(muted) => audio.set_muted(muted),
            }
        }
    }

    /// Procedural sound effects
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
        muted: bool,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - sound effects disabled");
            }
            Self {
                ctx,
                volume: 0.6,
                muted: false,
            }
        }

        /// Resume audio context (required after user gesture)
        pub fn resume(&self) {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }

        pub fn set_muted(&mut self, muted: bool) {
            self.muted = muted;
        }

        pub fn play(&self, effect: SoundEffect) {
            if self.muted || self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            for note in effect.notes() {
                self.schedule(ctx, note);
            }
        }

        /// Start one tone with a short exponential decay to silence
        fn schedule(&self, ctx: &AudioContext, note: &Note) {
            let Ok(osc) = ctx.create_oscillator() else { return };
            let Ok(gain) = ctx.create_gain() else { return };
            osc.set_type(match note.wave {
                Wave::Sine => OscillatorType::Sine,
                Wave::Square => OscillatorType::Square,
                Wave::Triangle => OscillatorType::Triangle,
            });
            if osc.connect_with_audio_node(&gain).is_err()
                || gain.connect_with_audio_node(&ctx.destination()).is_err()
            {
                return;
            }

            let t = ctx.current_time() + note.at;
            let fade = (note.len * 0.85).max(0.05);
            gain.gain().set_value_at_time(self.volume * note.level, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + fade)
                .ok();
            osc.frequency().set_value_at_time(note.freq, t).ok();
            if let Some(to) = note.glide_to {
                osc.frequency()
                    .exponential_ramp_to_value_at_time(to, t + fade)
                    .ok();
            }

            osc.start_with_when(t).ok();
            osc.stop_with_when(t + note.len).ok();
        }
    }
}
