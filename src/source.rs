//! Frame source boundary: the emulation engine seen from the pipeline.
//!
//! The pipeline only ever reads from a source — one snapshot per tick. The
//! built-in [`TestPatternSource`] stands in for a real emulator core and
//! produces an animated raster pattern on a background thread.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded};

/// Horizontal pixels per raw frame line.
pub const FRAME_WIDTH: usize = 418;
/// Raster lines per raw frame.
pub const FRAME_HEIGHT: usize = 284;
/// Bytes per pixel (RGBA8).
pub const BYTES_PER_PIXEL: usize = 4;
/// Total byte extent of one raw frame, row-major, no padding.
pub const FRAME_BYTES: usize = FRAME_WIDTH * FRAME_HEIGHT * BYTES_PER_PIXEL;

/// Video timing standard of the emulated machine. Decides the border
/// geometry around the visible canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingStandard {
    /// Wider and taller border.
    Pal,
    /// Narrower border.
    Ntsc,
}

impl TimingStandard {
    pub const ALL: &'static [Self] = &[Self::Pal, Self::Ntsc];
    const NAMES: &'static [&'static str] = &["pal", "ntsc"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pal => "pal",
            Self::Ntsc => "ntsc",
        }
    }
}

impl std::fmt::Display for TimingStandard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for TimingStandard {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        for standard in Self::ALL {
            if raw == standard.as_str() {
                return Ok(*standard);
            }
        }
        Err(serde::de::Error::unknown_variant(&raw, Self::NAMES))
    }
}

/// Read-only view of the emulation engine, polled once per tick.
pub trait FrameSource {
    /// Latest fully-rendered raw frame, or `None` when the engine has not
    /// produced one yet. The returned slice is `FRAME_BYTES` long.
    fn current_frame(&self) -> Option<&[u8]>;

    /// Timing standard currently emulated.
    fn timing_standard(&self) -> TimingStandard;

    /// Whether the emulated machine is halted (pipeline dims the display).
    fn is_halted(&self) -> bool;
}

/// Synthetic frame source producing an animated test pattern at ~50 Hz.
///
/// A background thread renders frames and hands the latest one over a
/// bounded channel; `refresh` swaps it into the cached snapshot, so
/// `current_frame` never blocks the tick thread.
pub struct TestPatternSource {
    latest: Option<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
    standard: TimingStandard,
    halted: bool,
}

impl TestPatternSource {
    pub fn new(standard: TimingStandard) -> Self {
        let (tx, rx) = bounded::<Vec<u8>>(1);
        spawn_pattern_thread(tx);
        Self {
            latest: None,
            rx,
            standard,
            halted: false,
        }
    }

    /// Pull the newest produced frame into the cached snapshot, if any.
    pub fn refresh(&mut self) {
        while let Ok(frame) = self.rx.try_recv() {
            self.latest = Some(frame);
        }
    }

    pub fn set_halted(&mut self, halted: bool) {
        self.halted = halted;
    }

    pub fn set_timing_standard(&mut self, standard: TimingStandard) {
        self.standard = standard;
    }
}

impl FrameSource for TestPatternSource {
    fn current_frame(&self) -> Option<&[u8]> {
        self.latest.as_deref()
    }

    fn timing_standard(&self) -> TimingStandard {
        self.standard
    }

    fn is_halted(&self) -> bool {
        self.halted
    }
}

fn spawn_pattern_thread(tx: Sender<Vec<u8>>) {
    thread::spawn(move || {
        let mut phase: u32 = 0;
        loop {
            let frame = render_pattern(phase);
            match tx.try_send(frame) {
                // Full channel: the consumer has not taken the previous frame
                // yet. Drop this one; stale frames are never queued.
                Ok(()) | Err(crossbeam_channel::TrySendError::Full(_)) => {}
                Err(crossbeam_channel::TrySendError::Disconnected(_)) => break,
            }
            phase = phase.wrapping_add(1);
            thread::sleep(Duration::from_millis(20));
        }
    });
}

/// Scrolling color bars with a moving scanline highlight.
fn render_pattern(phase: u32) -> Vec<u8> {
    let mut buf = vec![0u8; FRAME_BYTES];
    for y in 0..FRAME_HEIGHT {
        for x in 0..FRAME_WIDTH {
            let bar = ((x + phase as usize) / 52) % 8;
            let (r, g, b) = match bar {
                0 => (236, 236, 236),
                1 => (236, 236, 0),
                2 => (0, 236, 236),
                3 => (0, 236, 0),
                4 => (236, 0, 236),
                5 => (236, 0, 0),
                6 => (0, 0, 236),
                _ => (16, 16, 16),
            };
            let highlight = (y + phase as usize) % FRAME_HEIGHT < 4;
            let i = (y * FRAME_WIDTH + x) * BYTES_PER_PIXEL;
            buf[i] = if highlight { 255 } else { r };
            buf[i + 1] = if highlight { 255 } else { g };
            buf[i + 2] = if highlight { 255 } else { b };
            buf[i + 3] = 255;
        }
    }
    buf
}
