use std::fmt;
use std::os::fd::RawFd;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::controller::policy::PositionPolicy;
use crate::error::WingError;
use crate::input::source::{EventDecoder, InputBackend, InputSource};
use crate::output::{Actuator, ActuatorBackend, LedDesc, LedSlot};

/// Static description of one touch widget and its LEDs
#[derive(Debug, Clone, Copy)]
pub struct ControllerSpec<'a> {
    pub label: &'a str,
    pub input_path: &'a Path,
    pub name_prefix: &'a str,
    pub leds: &'a [LedDesc],
}

/// One touch widget (buttons, slider or wheel) bound to its LEDs.
///
/// Owns the input source (decoder plus descriptor) and a fixed set of LED
/// lines. Events are interpreted by the policy `P`.
pub struct Controller<D, L, P> {
    label: String,
    input_path: PathBuf,
    source: Option<InputSource<D>>,
    leds: Box<[LedSlot<L>]>,
    policy: P,
}

impl<D, L, P> fmt::Debug for Controller<D, L, P>
where
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("label", &self.label)
            .field("input_path", &self.input_path)
            .field("open", &self.source.is_some())
            .field("leds", &self.leds.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl<D, L, P> Controller<D, L, P>
where
    D: EventDecoder,
    L: Actuator,
    P: PositionPolicy,
{
    /// Open the input device, validate it and acquire every LED line.
    ///
    /// Either every resource is acquired or none is held when this returns.
    pub fn initialize<B, O>(
        spec: &ControllerSpec<'_>,
        input: &B,
        outputs: &mut O,
        policy: P,
    ) -> Result<Self, WingError>
    where
        B: InputBackend<Decoder = D>,
        O: ActuatorBackend<Line = L>,
    {
        info!(
            "Initializing {} on {} with {} leds",
            spec.label,
            spec.input_path.display(),
            spec.leds.len()
        );

        let source = InputSource::open(input, spec.input_path, spec.name_prefix)?;

        // Declared after `source`, so on early return the lines go first
        let mut leds = Vec::with_capacity(spec.leds.len());
        for (index, desc) in spec.leds.iter().enumerate() {
            match outputs.request(desc) {
                Ok(line) => leds.push(LedSlot::new(*desc, line)),
                Err(e) => {
                    error!(
                        "can't get gpio line {} for {} led {}: {}",
                        desc.pin, spec.label, index, e
                    );
                    return Err(WingError::Actuator {
                        index,
                        pin: desc.pin,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!("{} ready", spec.label);
        Ok(Self {
            label: spec.label.to_string(),
            input_path: spec.input_path.to_path_buf(),
            source: Some(source),
            leds: leds.into_boxed_slice(),
            policy,
        })
    }

    /// Dispatch every queued event through the policy
    pub fn drain(&mut self) -> Result<usize, WingError> {
        let Self {
            source,
            leds,
            policy,
            input_path,
            ..
        } = self;

        let Some(source) = source.as_mut() else {
            return Err(WingError::Device {
                path: input_path.clone(),
                reason: "controller already torn down".to_string(),
            });
        };
        source.drain(|event| policy.on_event(&mut leds[..], event))
    }

    pub fn raw_fd(&self) -> Option<RawFd> {
        self.source.as_ref().map(|source| source.raw_fd())
    }

    /// Release LEDs, then the decoder and its descriptor
    pub fn teardown(mut self) {
        info!("Removing {}", self.label);
        self.release();
    }
}

impl<D, L, P> Controller<D, L, P> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn leds(&self) -> &[LedSlot<L>] {
        &self.leds
    }

    pub fn leds_mut(&mut self) -> &mut [LedSlot<L>] {
        &mut self.leds
    }

    fn release(&mut self) {
        let released = self
            .leds
            .iter_mut()
            .map(|led| led.release())
            .filter(|released| *released)
            .count();
        if released > 0 {
            debug!("{}: released {} led lines", self.label, released);
        }
        if self.source.take().is_some() {
            debug!("{}: closed {}", self.label, self.input_path.display());
        }
    }
}

impl<D, L, P> Drop for Controller<D, L, P> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::policy::{Accumulator, BarGraph, KeyMirror, Position};
    use crate::input::event::InputEvent;
    use crate::output::NoLeds;
    use crate::testing::{FakeInput, FakeLines, Step};

    const SLIDER: &str = "/dev/input/atmel_ptc1";
    const PINS: [u32; 4] = [41, 64, 113, 122];

    fn desc() -> Vec<LedDesc> {
        PINS.iter()
            .enumerate()
            .map(|(i, pin)| LedDesc::new(i as u32, *pin))
            .collect()
    }

    fn spec<'a>(leds: &'a [LedDesc]) -> ControllerSpec<'a> {
        ControllerSpec {
            label: "slider",
            input_path: Path::new(SLIDER),
            name_prefix: "atmel_ptc",
            leds,
        }
    }

    #[test]
    fn initialize_acquires_everything() {
        let leds = desc();
        let input = FakeInput::new().with_device(SLIDER, "atmel_ptc", Vec::new());
        let mut lines = FakeLines::new();

        let slider = Controller::initialize(&spec(&leds), &input, &mut lines, BarGraph::with_divisor(8)).unwrap();

        assert_eq!(slider.leds().len(), 4);
        assert!(slider.leds().iter().all(|led| led.is_acquired()));
        assert!(slider.raw_fd().is_some());
        assert_eq!(lines.live(), 4);
        assert_eq!(input.open_descriptors(), 1);
    }

    #[test]
    fn bad_path_leaves_nothing_behind() {
        let leds = desc();
        let input = FakeInput::new();
        let mut lines = FakeLines::new();

        let err = Controller::initialize(&spec(&leds), &input, &mut lines, BarGraph::with_divisor(8)).unwrap_err();

        assert!(matches!(err, WingError::Open { .. }));
        assert_eq!(lines.live(), 0);
        assert_eq!(lines.requested(), 0);
        assert_eq!(input.open_descriptors(), 0);
    }

    #[test]
    fn identity_mismatch_leaves_nothing_behind() {
        let leds = desc();
        let input = FakeInput::new().with_device(SLIDER, "vc4-hdmi", Vec::new());
        let mut lines = FakeLines::new();

        let err = Controller::initialize(&spec(&leds), &input, &mut lines, BarGraph::with_divisor(8)).unwrap_err();

        assert!(matches!(err, WingError::Device { .. }));
        assert_eq!(lines.requested(), 0);
        assert_eq!(input.open_descriptors(), 0);
    }

    #[test]
    fn nth_line_failure_unwinds_every_earlier_line() {
        let leds = desc();
        for (n, pin) in PINS.iter().enumerate() {
            let input = FakeInput::new().with_device(SLIDER, "atmel_ptc", Vec::new());
            let mut lines = FakeLines::new().failing_request(*pin);

            let err = Controller::initialize(&spec(&leds), &input, &mut lines, BarGraph::with_divisor(8)).unwrap_err();

            match err {
                WingError::Actuator { index, pin: failed, .. } => {
                    assert_eq!(index, n);
                    assert_eq!(failed, *pin);
                }
                other => panic!("unexpected error: {other}"),
            }
            assert_eq!(lines.requested(), n);
            assert_eq!(lines.live(), 0);
            assert_eq!(input.open_descriptors(), 0);
        }
    }

    #[test]
    fn teardown_releases_each_resource_once() {
        let leds = desc();
        let input = FakeInput::new().with_device(SLIDER, "atmel_ptc", Vec::new());
        let mut lines = FakeLines::new();
        let mut slider = Controller::initialize(&spec(&leds), &input, &mut lines, BarGraph::with_divisor(8)).unwrap();

        // partially released already
        slider.leds_mut()[1].release();
        slider.leds_mut()[3].release();
        slider.teardown();

        assert_eq!(lines.live(), 0);
        for pin in PINS {
            assert_eq!(lines.releases(pin), 1);
        }
        assert_eq!(input.open_descriptors(), 0);
    }

    #[test]
    fn drop_is_teardown() {
        let leds = desc();
        let input = FakeInput::new().with_device(SLIDER, "atmel_ptc", Vec::new());
        let mut lines = FakeLines::new();
        let slider = Controller::initialize(&spec(&leds), &input, &mut lines, BarGraph::with_divisor(8)).unwrap();

        drop(slider);

        assert_eq!(lines.live(), 0);
        assert_eq!(input.open_descriptors(), 0);
    }

    #[test]
    fn drain_applies_burst_through_policy() {
        let leds = desc();
        let burst = vec![
            Step::Event(InputEvent::absolute(0, 0)),
            Step::Event(InputEvent::absolute(0, 9)),
            Step::Event(InputEvent::absolute(0, 17)),
        ];
        let input = FakeInput::new().with_device(SLIDER, "atmel_ptc", burst);
        let mut lines = FakeLines::new();
        let mut slider = Controller::initialize(&spec(&leds), &input, &mut lines, BarGraph::with_divisor(8)).unwrap();

        assert_eq!(slider.drain().unwrap(), 3);

        // 17 / 8 = 2
        let lit: Vec<bool> = PINS.iter().map(|pin| lines.level(*pin) == Some(true)).collect();
        assert_eq!(lit, vec![true, true, true, false]);
    }

    #[test]
    fn accumulator_controller_needs_no_lines() {
        let input = FakeInput::new().with_device(
            "/dev/input/event1",
            "atmel_ptc x",
            vec![Step::Event(InputEvent::absolute(0, 44))],
        );
        let position = Position::new();
        let spec = ControllerSpec {
            label: "slider x",
            input_path: Path::new("/dev/input/event1"),
            name_prefix: "atmel_ptc",
            leds: &[],
        };

        let mut slider_x = Controller::initialize(&spec, &input, &mut NoLeds, Accumulator::new(position.clone())).unwrap();
        slider_x.drain().unwrap();

        assert_eq!(position.get(), 44);
        assert!(slider_x.leds().is_empty());
    }

    #[test]
    fn buttons_controller_mirrors_keys() {
        let leds = [LedDesc::new(0, 103), LedDesc::new(1, 104)];
        let input = FakeInput::new().with_device(
            "/dev/input/atmel_ptc0",
            "atmel_ptc buttons",
            vec![
                Step::Event(InputEvent::key(0x108, 1)),
                Step::Event(InputEvent::key(0x109, 1)),
                Step::Event(InputEvent::key(0x108, 0)),
            ],
        );
        let mut lines = FakeLines::new();
        let spec = ControllerSpec {
            label: "buttons",
            input_path: Path::new("/dev/input/atmel_ptc0"),
            name_prefix: "atmel_ptc",
            leds: &leds,
        };

        let mut buttons = Controller::initialize(&spec, &input, &mut lines, KeyMirror::new(vec![0x108, 0x109])).unwrap();
        assert_eq!(buttons.drain().unwrap(), 3);

        assert_eq!(lines.level(103), Some(false));
        assert_eq!(lines.level(104), Some(true));
    }
}
