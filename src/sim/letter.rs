//! Typewriter reveal of the letter, one chunk (line or paragraph) at a time

use serde::{Deserialize, Serialize};

use super::{SimRng, sample};
use crate::consts::TICKS_PER_SEC;

/// What happens once a chunk has been fully typed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealMode {
    /// Wait for an explicit "Next" action
    #[default]
    Step,
    /// Pause, then move on by itself
    Continuous,
}

/// Typing cadence, in ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealTiming {
    /// Base delay between characters
    pub char_base: f32,
    /// Extra random delay added on top of the base (uniform in [0, jitter))
    pub char_jitter: f32,
    /// Pause after a chunk finishes typing
    pub chunk_pause: u32,
}

impl RevealTiming {
    pub fn from_millis(char_delay_ms: f32, char_jitter_ms: f32, chunk_pause_ms: f32) -> Self {
        let to_ticks = |ms: f32| ms / 1000.0 * TICKS_PER_SEC;
        Self {
            char_base: to_ticks(char_delay_ms),
            char_jitter: to_ticks(char_jitter_ms),
            chunk_pause: to_ticks(chunk_pause_ms).ceil() as u32,
        }
    }
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self::from_millis(45.0, 40.0, 700.0)
    }
}

/// Reveal progress over a fixed list of chunks
#[derive(Debug, Clone)]
pub struct LetterSequencer {
    chunks: Vec<String>,
    /// Character (not byte) count per chunk
    chunk_chars: Vec<usize>,
    chunk_index: usize,
    char_index: usize,
    mode: RevealMode,
    timing: RevealTiming,
    /// Ticks until the next timed step
    wait: u32,
}

impl LetterSequencer {
    /// Start revealing `chunks` from the first character of the first chunk
    pub fn start(chunks: Vec<String>, mode: RevealMode, timing: RevealTiming) -> Self {
        let chunk_chars = chunks.iter().map(|c| c.chars().count()).collect();
        Self {
            chunks,
            chunk_chars,
            chunk_index: 0,
            char_index: 0,
            mode,
            timing,
            wait: 0,
        }
    }

    pub fn mode(&self) -> RevealMode {
        self.mode
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk_index(&self) -> usize {
        self.chunk_index
    }

    pub fn char_index(&self) -> usize {
        self.char_index
    }

    /// Every chunk has been advanced past
    pub fn is_done(&self) -> bool {
        self.chunk_index >= self.chunks.len()
    }

    /// The active chunk has been typed out completely
    pub fn chunk_complete(&self) -> bool {
        match self.chunk_chars.get(self.chunk_index) {
            Some(&len) => self.char_index >= len,
            None => true,
        }
    }

    /// On the final chunk (or past it)
    pub fn on_last_chunk(&self) -> bool {
        self.chunk_index + 1 >= self.chunks.len()
    }

    /// Step mode, chunk typed, pause over: the "Next" affordance should show
    pub fn awaiting_advance(&self) -> bool {
        self.mode == RevealMode::Step && !self.is_done() && self.chunk_complete() && self.wait == 0
    }

    /// Visible part of the active chunk
    pub fn current_text(&self) -> &str {
        let Some(chunk) = self.chunks.get(self.chunk_index) else {
            return "";
        };
        chunk
            .char_indices()
            .nth(self.char_index)
            .map(|(i, _)| &chunk[..i])
            .unwrap_or(chunk)
    }

    /// Chunks already advanced past, in full
    pub fn finished_chunks(&self) -> &[String] {
        &self.chunks[..self.chunk_index.min(self.chunks.len())]
    }

    /// Reveal one more character of the active chunk.
    ///
    /// Returns `true` once the sequencer is terminal; calls in that state (and
    /// on an already complete chunk) change nothing.
    pub fn advance_char(&mut self) -> bool {
        if self.is_done() {
            return true;
        }
        if !self.chunk_complete() {
            self.char_index += 1;
        }
        false
    }

    /// Move to the start of the next chunk (possibly the terminal state)
    pub fn advance_chunk(&mut self) {
        if self.is_done() {
            return;
        }
        self.chunk_index += 1;
        self.char_index = 0;
        self.wait = 0;
    }

    /// Finish typing the active chunk immediately
    pub fn skip_chunk(&mut self) {
        if let Some(&len) = self.chunk_chars.get(self.chunk_index) {
            self.char_index = len;
            self.wait = 0;
        }
    }

    /// Timer-driven step, called once per tick.
    ///
    /// Types at a jittered per-character cadence, pauses at chunk ends and, in
    /// continuous mode, rolls on to the next chunk. Returns `true` on the tick
    /// the sequencer becomes terminal.
    pub fn tick(&mut self, rng: &mut SimRng) -> bool {
        if self.is_done() {
            return false;
        }
        if self.wait > 0 {
            self.wait -= 1;
            return false;
        }

        if !self.chunk_complete() {
            self.advance_char();
            self.wait = if self.chunk_complete() {
                self.timing.chunk_pause
            } else {
                self.next_char_delay(rng)
            };
            return false;
        }

        match self.mode {
            RevealMode::Continuous => {
                self.advance_chunk();
                self.is_done()
            }
            RevealMode::Step => false,
        }
    }

    fn next_char_delay(&self, rng: &mut SimRng) -> u32 {
        let base = self.timing.char_base;
        let delay = sample(rng, (base, base + self.timing.char_jitter));
        // Delay of d ticks means d-1 idle ticks before the next step
        (delay.round().max(1.0) as u32) - 1
    }
}
