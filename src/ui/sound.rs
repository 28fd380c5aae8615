/// Sound engine: procedural arcade sound effects via rodio.
///
/// Every effect is synthesized once at init into an in-memory WAV buffer;
/// playback is fire-and-forget on a detached Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use crate::sim::event::GameEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Chomp,
    Power,
    Die,
    Win,
    QuizStart,
    QuizCorrect,
    QuizWrong,
    LevelUp,
}

impl Sfx {
    pub const ALL: [Sfx; 8] = [
        Sfx::Chomp, Sfx::Power, Sfx::Die, Sfx::Win,
        Sfx::QuizStart, Sfx::QuizCorrect, Sfx::QuizWrong, Sfx::LevelUp,
    ];
}

/// Which effect, if any, accompanies an event.
pub fn sfx_for(event: &GameEvent) -> Option<Sfx> {
    match event {
        GameEvent::DotEaten { .. } | GameEvent::GhostEaten { .. } => Some(Sfx::Chomp),
        GameEvent::PowerPelletEaten { .. } => Some(Sfx::Power),
        GameEvent::PlayerCaught { .. } => Some(Sfx::Die),
        GameEvent::MazeCleared | GameEvent::CurriculumComplete => Some(Sfx::Win),
        GameEvent::QuizTriggered { .. } => Some(Sfx::QuizStart),
        GameEvent::AnswerCorrect => Some(Sfx::QuizCorrect),
        GameEvent::AnswerWrong => Some(Sfx::QuizWrong),
        GameEvent::TierAdvanced => Some(Sfx::LevelUp),
        GameEvent::GhostRevived { .. } | GameEvent::FrightenedEnded => None,
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::synth;
    use super::Sfx;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        /// Indexed like `Sfx::ALL`.
        buffers: Vec<Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("No audio output: {e}");
                    return None;
                }
            };
            let buffers = Sfx::ALL
                .iter()
                .map(|&s| Arc::new(synth::make_wav(&synth::render(s))))
                .collect();
            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, sfx: Sfx) {
            let Some(idx) = Sfx::ALL.iter().position(|&s| s == sfx) else { return };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(self.buffers[idx].as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Synthesis: oscillators, envelopes, WAV encoding
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
mod synth {
    use std::f32::consts::TAU;

    use super::Sfx;

    pub const SAMPLE_RATE: u32 = 22050;

    #[derive(Clone, Copy)]
    enum Wave {
        Sine,
        Square,
        Saw,
        Triangle,
    }

    impl Wave {
        /// One sample at oscillator phase `p` (cycles, any real).
        fn at(self, p: f32) -> f32 {
            let frac = p - p.floor();
            match self {
                Wave::Sine => (p * TAU).sin(),
                Wave::Square => if frac < 0.5 { 1.0 } else { -1.0 },
                Wave::Saw => 2.0 * frac - 1.0,
                Wave::Triangle => 1.0 - 4.0 * (frac - 0.5).abs(),
            }
        }
    }

    #[derive(Clone, Copy)]
    enum Ramp {
        Linear,
        Exponential,
    }

    /// Frequency glide `f0 → f1` with gain fading `gain → 0` over `dur` s.
    fn sweep(wave: Wave, f0: f32, f1: f32, ramp: Ramp, dur: f32, gain: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * dur) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = match ramp {
                    Ramp::Linear => f0 + (f1 - f0) * t,
                    Ramp::Exponential => f0 * (f1 / f0).powf(t),
                };
                phase += freq / SAMPLE_RATE as f32;
                wave.at(phase) * gain * (1.0 - t)
            })
            .collect()
    }

    /// Stepped melody: each `(freq, start)` holds until the next start;
    /// one linear fade spans the whole `dur`.
    fn steps(wave: Wave, notes: &[(f32, f32)], dur: f32, gain: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * dur) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let secs = i as f32 / SAMPLE_RATE as f32;
                let freq = notes
                    .iter()
                    .rev()
                    .find(|(_, start)| secs >= *start)
                    .map_or(notes[0].0, |(f, _)| *f);
                phase += freq / SAMPLE_RATE as f32;
                wave.at(phase) * gain * (1.0 - i as f32 / n as f32)
            })
            .collect()
    }

    pub fn render(sfx: Sfx) -> Vec<f32> {
        match sfx {
            Sfx::Chomp => sweep(Wave::Sine, 300.0, 100.0, Ramp::Exponential, 0.1, 0.3),
            Sfx::Power => sweep(Wave::Square, 600.0, 1200.0, Ramp::Linear, 0.3, 0.15),
            Sfx::Die => sweep(Wave::Saw, 500.0, 50.0, Ramp::Exponential, 0.5, 0.3),
            Sfx::QuizStart => sweep(Wave::Sine, 440.0, 880.0, Ramp::Linear, 0.5, 0.3),
            Sfx::QuizWrong => sweep(Wave::Saw, 150.0, 100.0, Ramp::Linear, 0.3, 0.3),
            Sfx::QuizCorrect => steps(
                Wave::Triangle,
                &[(523.25, 0.0), (659.25, 0.1), (783.99, 0.2)],
                0.4,
                0.35,
            ),
            Sfx::LevelUp => steps(
                Wave::Square,
                &[(440.0, 0.0), (554.0, 0.1), (659.0, 0.2), (880.0, 0.4)],
                1.0,
                0.15,
            ),
            Sfx::Win => steps(
                Wave::Triangle,
                &[(523.0, 0.0), (659.0, 0.1), (784.0, 0.2), (1047.0, 0.3)],
                0.7,
                0.35,
            ),
        }
    }

    /// 16-bit mono PCM WAV.
    pub fn make_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        let block_align = CHANNELS * BITS / 8;
        let byte_rate = SAMPLE_RATE * block_align as u32;
        let data_size = samples.len() as u32 * block_align as u32;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&CHANNELS.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&BITS.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_map_to_effects() {
        assert_eq!(sfx_for(&GameEvent::DotEaten { x: 0, y: 0 }), Some(Sfx::Chomp));
        assert_eq!(sfx_for(&GameEvent::TierAdvanced), Some(Sfx::LevelUp));
        assert_eq!(sfx_for(&GameEvent::CurriculumComplete), Some(Sfx::Win));
        assert_eq!(sfx_for(&GameEvent::FrightenedEnded), None);
    }

    #[test]
    fn every_effect_renders_bounded_audio() {
        for sfx in Sfx::ALL {
            let samples = synth::render(sfx);
            assert!(!samples.is_empty(), "{sfx:?}");
            assert!(samples.iter().all(|s| s.abs() <= 1.0), "{sfx:?}");
        }
    }

    #[test]
    fn wav_header_sizes() {
        let wav = synth::make_wav(&[0.0, 0.5, -0.5]);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + 6);
        assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 6);
    }
}
