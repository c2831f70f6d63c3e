/// Sound effects, synthesized at startup and played through rodio.
///
/// Every effect is a short mono clip rendered into an in-memory WAV buffer.
/// Playback is fire-and-forget on a detached Sink.
///
/// Without the `sound` feature, `SoundEngine` is a silent stub.

use lavadash::sim::event::GameEvent;

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rand::Rng;
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_coin: Arc<Vec<u8>>,
        sfx_all_coins: Arc<Vec<u8>>,
        sfx_burn: Arc<Vec<u8>>,
        sfx_win: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output, sound disabled: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_coin: Arc::new(make_wav(&gen_coin())),
                sfx_all_coins: Arc::new(make_wav(&gen_all_coins())),
                sfx_burn: Arc::new(make_wav(&gen_burn())),
                sfx_win: Arc::new(make_wav(&gen_win())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            match rodio::Decoder::new(Cursor::new(buf.as_ref().clone())) {
                Ok(src) => {
                    sink.append(src);
                    sink.detach();
                }
                Err(e) => log::debug!("sound decode failed: {e}"),
            }
        }

        pub fn play_coin(&self) { self.play(&self.sfx_coin); }
        pub fn play_all_coins(&self) { self.play(&self.sfx_all_coins); }
        pub fn play_burn(&self) { self.play(&self.sfx_burn); }
        pub fn play_win(&self) { self.play(&self.sfx_win); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators (mono f32 samples)
    // ════════════════════════════════════════════════════════════

    fn samples_for(seconds: f32) -> usize {
        (SAMPLE_RATE as f32 * seconds) as usize
    }

    /// One note per entry, with a sine + overtone voice and decaying envelope.
    fn notes(seq: &[(f32, f32)], overtone: f32, volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &(freq, dur) in seq {
            let n = samples_for(dur);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * (1.0 - overtone)
                    + (t * freq * 2.0 * TAU).sin() * overtone;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    /// Coin: quick two-note ping.
    fn gen_coin() -> Vec<f32> {
        notes(&[(1319.0, 0.04), (1760.0, 0.07)], 0.3, 0.25) // E6, A6
    }

    /// Last coin: rising triad.
    fn gen_all_coins() -> Vec<f32> {
        notes(&[(784.0, 0.06), (988.0, 0.06), (1175.0, 0.14)], 0.3, 0.3)
    }

    /// Burn: falling tone buried in crackling noise.
    fn gen_burn() -> Vec<f32> {
        let n = samples_for(0.45);
        let mut rng = rand::rng();
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 420.0 - t * 300.0;
                phase += freq * TAU / SAMPLE_RATE as f32;
                let noise: f32 = rng.random_range(-1.0..1.0);
                let env = (1.0 - t).powf(1.5);
                (phase.sin() * 0.45 + noise * 0.55) * env * 0.3
            })
            .collect()
    }

    /// Game complete: fanfare with a held top note.
    fn gen_win() -> Vec<f32> {
        notes(
            &[(523.0, 0.1), (659.0, 0.1), (784.0, 0.1), (1047.0, 0.35)],
            0.35,
            0.3,
        )
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder (16-bit PCM mono)
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
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
            let val = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }
        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API (no-ops when the sound feature is off)
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_coin(&self) {}
    pub fn play_all_coins(&self) {}
    pub fn play_burn(&self) {}
    pub fn play_win(&self) {}
}

impl SoundEngine {
    /// Play the effect for a simulation event, if it has one.
    pub fn play_event(&self, event: &GameEvent) {
        match event {
            GameEvent::CoinCollected { .. } => self.play_coin(),
            GameEvent::AllCoinsCollected => self.play_all_coins(),
            GameEvent::PlayerBurned { .. } => self.play_burn(),
            _ => {}
        }
    }
}
