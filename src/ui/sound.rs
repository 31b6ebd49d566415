/// Sound engine: procedural chiptune effects and a looping music track via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Effects are fire-and-forget (detached sinks); the music sink is kept
/// so it can be paused and re-leveled.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use crate::sim::event::GameEvent;

/// Named effect cues the simulation can trigger.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cue {
    Jump,
    Death,
    Pickup,
    Hit,
    Collision,
}

/// Which cue (if any) a simulation event plays.
pub fn cue_for(event: &GameEvent) -> Option<Cue> {
    match event {
        GameEvent::Jumped | GameEvent::DoubleJumped => Some(Cue::Jump),
        GameEvent::CollectiblePicked { .. } | GameEvent::SignRead => Some(Cue::Pickup),
        GameEvent::EnemyStomped => Some(Cue::Hit),
        GameEvent::PlayerHurt { .. } => Some(Cue::Collision),
        GameEvent::PlayerDied | GameEvent::PlayerDrowned => Some(Cue::Death),
        GameEvent::LevelComplete { .. } => None,
    }
}

#[cfg_attr(not(feature = "sound"), allow(dead_code))]
mod synth {
    use std::f32::consts::TAU;

    pub const SAMPLE_RATE: u32 = 22050;

    fn tone(freq: f32, duration: f32, volume: f32, mut env: impl FnMut(f32) -> f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let square = if (t * freq * TAU).sin() >= 0.0 { 1.0 } else { -1.0 };
                let wave = (t * freq * TAU).sin() * 0.6 + square * 0.4;
                wave * env(i as f32 / n as f32) * volume
            })
            .collect()
    }

    /// Jump: quick upward sweep.
    pub fn gen_jump() -> Vec<f32> {
        let duration = 0.14;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 300.0 + t * 500.0;
                phase += freq / SAMPLE_RATE as f32;
                (phase * TAU).sin() * (1.0 - t) * 0.3
            })
            .collect()
    }

    /// Pickup: two bright notes, B5 then E6.
    pub fn gen_pickup() -> Vec<f32> {
        let mut samples = tone(988.0, 0.05, 0.25, |p| 1.0 - p * 0.5);
        samples.extend(tone(1319.0, 0.12, 0.25, |p| 1.0 - p));
        samples
    }

    /// Hit: short stomp thud with a noise burst.
    pub fn gen_hit() -> Vec<f32> {
        let duration = 0.1;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut lcg: u32 = 0x5eed;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let freq = 220.0 - t * 120.0;
                lcg = lcg.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (lcg >> 16) as f32 / 32768.0 - 1.0;
                ((ti * freq * TAU).sin() * 0.6 + noise * 0.4) * (1.0 - t).powf(1.5) * 0.35
            })
            .collect()
    }

    /// Collision: harsh low buzz.
    pub fn gen_collision() -> Vec<f32> {
        let mut samples = tone(160.0, 0.08, 0.3, |_| 1.0);
        samples.extend(tone(120.0, 0.16, 0.3, |p| 1.0 - p));
        samples
    }

    /// Death: descending four-note phrase with a tail fade.
    pub fn gen_death() -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in &[392.0_f32, 330.0, 262.0, 196.0] {
            samples.extend(tone(freq, 0.14, 0.28, |p| 1.0 - p * 0.4));
        }
        let total = samples.len();
        let fade_len = total / 3;
        for (k, s) in samples[total - fade_len..].iter_mut().enumerate() {
            *s *= 1.0 - k as f32 / fade_len as f32;
        }
        samples
    }

    /// Background loop: a simple eight-bar bass and lead in C major.
    pub fn gen_music() -> Vec<f32> {
        const BEAT: f32 = 0.18;
        let lead = [
            523.0_f32, 659.0, 784.0, 659.0, 698.0, 880.0, 784.0, 659.0,
            587.0, 698.0, 880.0, 698.0, 659.0, 784.0, 523.0, 0.0,
        ];
        let bass = [131.0_f32, 175.0, 147.0, 131.0];
        let mut samples = Vec::new();
        for (i, &freq) in lead.iter().enumerate() {
            let root = bass[i / 4];
            let n = (SAMPLE_RATE as f32 * BEAT) as usize;
            for k in 0..n {
                let t = k as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (k as f32 / n as f32) * 0.6;
                let melody = if freq > 0.0 { (t * freq * TAU).sin() * env } else { 0.0 };
                let low = (t * root * TAU).sin();
                samples.push(melody * 0.18 + low * 0.12);
            }
        }
        samples
    }

    /// Wrap mono f32 samples in a 16-bit PCM WAV container.
    pub fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * num_channels as u32 * bits_per_sample as u32 / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

    use super::synth::*;
    use super::Cue;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        music: Option<Sink>,
        sfx_jump: Arc<Vec<u8>>,
        sfx_death: Arc<Vec<u8>>,
        sfx_pickup: Arc<Vec<u8>>,
        sfx_hit: Arc<Vec<u8>>,
        sfx_collision: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output device, sound disabled: {e}");
                    return None;
                }
            };

            let music = start_music(&handle);
            if music.is_none() {
                log::warn!("music track could not be started");
            }

            Some(SoundEngine {
                _stream: stream,
                handle,
                music,
                sfx_jump: Arc::new(make_wav(&gen_jump())),
                sfx_death: Arc::new(make_wav(&gen_death())),
                sfx_pickup: Arc::new(make_wav(&gen_pickup())),
                sfx_hit: Arc::new(make_wav(&gen_hit())),
                sfx_collision: Arc::new(make_wav(&gen_collision())),
            })
        }

        pub fn play(&self, cue: Cue, volume: f32) {
            if volume <= 0.0 { return; }
            let buf = match cue {
                Cue::Jump => &self.sfx_jump,
                Cue::Death => &self.sfx_death,
                Cue::Pickup => &self.sfx_pickup,
                Cue::Hit => &self.sfx_hit,
                Cue::Collision => &self.sfx_collision,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                if let Ok(src) = Decoder::new(Cursor::new(buf.as_ref().clone())) {
                    sink.set_volume(volume);
                    sink.append(src);
                    sink.detach();
                }
            }
        }

        pub fn set_music_volume(&self, volume: f32) {
            if let Some(music) = &self.music {
                music.set_volume(volume);
            }
        }

        pub fn pause_music(&self) {
            if let Some(music) = &self.music { music.pause(); }
        }

        pub fn resume_music(&self) {
            if let Some(music) = &self.music { music.play(); }
        }
    }

    fn start_music(handle: &OutputStreamHandle) -> Option<Sink> {
        let sink = Sink::try_new(handle).ok()?;
        let looped = Decoder::new_looped(Cursor::new(make_wav(&gen_music()))).ok()?;
        sink.append(looped);
        Some(sink)
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: no-ops when the sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _cue: Cue, _volume: f32) {}
    pub fn set_music_volume(&self, _volume: f32) {}
    pub fn pause_music(&self) {}
    pub fn resume_music(&self) {}
}

#[cfg(test)]
mod tests {
    use super::synth::*;
    use super::*;
    use crate::domain::entity::CollectibleKind;

    #[test]
    fn wav_header_matches_payload() {
        let samples = vec![0.0_f32; 100];
        let wav = make_wav(&samples);
        assert_eq!(wav.len(), 44 + 200);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(u32::from_le_bytes([wav[4], wav[5], wav[6], wav[7]]), 36 + 200);
        assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 200);
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let wav = make_wav(&[2.0, -2.0]);
        assert_eq!(i16::from_le_bytes([wav[44], wav[45]]), 32767);
        assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), -32767);
    }

    #[test]
    fn generators_stay_in_range() {
        for samples in [gen_jump(), gen_pickup(), gen_hit(), gen_collision(), gen_death(), gen_music()] {
            assert!(!samples.is_empty());
            assert!(samples.iter().all(|s| s.abs() <= 1.0));
        }
    }

    #[test]
    fn events_map_to_cues() {
        assert_eq!(cue_for(&GameEvent::DoubleJumped), Some(Cue::Jump));
        assert_eq!(
            cue_for(&GameEvent::CollectiblePicked { kind: CollectibleKind::Beer }),
            Some(Cue::Pickup),
        );
        assert_eq!(cue_for(&GameEvent::EnemyStomped), Some(Cue::Hit));
        assert_eq!(cue_for(&GameEvent::PlayerHurt { lives_left: 2 }), Some(Cue::Collision));
        assert_eq!(cue_for(&GameEvent::PlayerDrowned), Some(Cue::Death));
        assert_eq!(cue_for(&GameEvent::LevelComplete { time: 1.0, new_best: true }), None);
    }
}
