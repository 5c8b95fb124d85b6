//! Transport readout shown under the canvas.

use mediasyncer_core::time::format_frame_counter;
use mediasyncer_core::{format_clock, FrameRate};

use crate::looping::ABRange;
use crate::transport::SEEK_SLIDER_MAX;

/// Which transport controls accept input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlsState {
    pub play: bool,
    pub step: bool,
    pub seek: bool,
    pub speed: bool,
    pub looping: bool,
    pub clear_grid: bool,
    pub clear_split: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransportReadout {
    /// Seek slider position, `0..=1000`
    pub slider: f64,
    /// `MM:SS.cc / MM:SS.cc`
    pub timecode: String,
    /// `frame / total`
    pub frame_counter: String,
    /// `A MM:SS.cc → B MM:SS.cc`
    pub ab: String,
    pub controls: ControlsState,
}

impl Default for TransportReadout {
    fn default() -> Self {
        Self {
            slider: 0.0,
            timecode: format!("{} / {}", format_clock(0.0), format_clock(0.0)),
            frame_counter: "0 / 0".to_string(),
            ab: ABRange::default().readout(None),
            controls: ControlsState::default(),
        }
    }
}

impl TransportReadout {
    /// Refresh from the master clock. Slider and timecode are left alone
    /// while `seeking` so a scrub or a pending jump does not flicker.
    pub fn update(
        &mut self,
        clock: Option<(f64, f64)>,
        seeking: bool,
        rate: FrameRate,
        ab: &ABRange,
        controls: ControlsState,
    ) {
        self.controls = controls;
        let Some((time, duration)) = clock else {
            let controls = self.controls;
            *self = Self {
                controls,
                ..Self::default()
            };
            return;
        };
        self.ab = ab.readout(Some(duration));
        if seeking {
            return;
        }
        self.slider = if duration > 0.0 {
            (time / duration * SEEK_SLIDER_MAX).clamp(0.0, SEEK_SLIDER_MAX)
        } else {
            0.0
        };
        self.timecode = format!("{} / {}", format_clock(time), format_clock(duration));
        self.frame_counter = format_frame_counter(time, duration, rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_from_clock() {
        let mut readout = TransportReadout::default();
        let ab = ABRange::default();
        readout.update(Some((5.0, 10.0)), false, FrameRate::FPS_30, &ab, ControlsState::default());
        assert_eq!(readout.slider, 500.0);
        assert_eq!(readout.timecode, "00:05.00 / 00:10.00");
        assert_eq!(readout.frame_counter, "150 / 300");
        assert_eq!(readout.ab, "A 00:00.00 → B 00:10.00");
    }

    #[test]
    fn test_seeking_freezes_slider() {
        let mut readout = TransportReadout::default();
        let ab = ABRange::default();
        readout.update(Some((5.0, 10.0)), false, FrameRate::FPS_30, &ab, ControlsState::default());
        readout.update(Some((9.0, 10.0)), true, FrameRate::FPS_30, &ab, ControlsState::default());
        assert_eq!(readout.slider, 500.0);
        assert_eq!(readout.timecode, "00:05.00 / 00:10.00");
    }

    #[test]
    fn test_no_master_resets() {
        let mut readout = TransportReadout::default();
        let ab = ABRange::default();
        readout.update(Some((5.0, 10.0)), false, FrameRate::FPS_30, &ab, ControlsState::default());
        let controls = ControlsState {
            clear_grid: true,
            ..Default::default()
        };
        readout.update(None, false, FrameRate::FPS_30, &ab, controls);
        assert_eq!(readout.slider, 0.0);
        assert_eq!(readout.timecode, "00:00.00 / 00:00.00");
        assert!(readout.controls.clear_grid);
    }
}
