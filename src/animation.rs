//! Interpolated presentation parameters.
//!
//! Each parameter tracks (current, target, step). Advancing snaps to the
//! target exactly once the remaining distance fits in one step, so settlement
//! is detectable with a plain equality check and never drifts.

use crate::error::Error;

/// One interpolated scalar.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnimationParam {
    current: f32,
    target: f32,
    step: f32,
}

impl AnimationParam {
    pub fn settled_at(value: f32) -> Self {
        Self {
            current: value,
            target: value,
            step: 0.0,
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Retarget the parameter, reaching `target` after `steps` ticks.
    ///
    /// # Errors
    /// `steps == 0` is rejected with [`Error::Configuration`] and leaves the
    /// parameter untouched.
    pub fn set_target(&mut self, target: f32, steps: u32) -> Result<(), Error> {
        if steps == 0 {
            return Err(Error::Configuration(
                "animation target requires at least one step".into(),
            ));
        }
        self.target = target;
        self.step = (target - self.current) / steps as f32;
        Ok(())
    }

    /// Jump to `value` immediately.
    pub fn snap_to(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
    }

    /// Advance one tick toward the target.
    pub fn tick(&mut self) {
        if self.current == self.target {
            return;
        }
        if (self.target - self.current).abs() <= self.step.abs() {
            // Exact snap; equality below is what settlement detection reads.
            self.current = self.target;
            self.step = 0.0;
        } else {
            let before = self.current;
            self.current += self.step;
            // A step below the value's float resolution makes no progress;
            // snap so the parameter cannot animate forever.
            if self.current == before {
                self.current = self.target;
                self.step = 0.0;
            }
        }
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }
}

/// Which parameter a retarget applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Param {
    AngleX,
    AngleY,
    AngleZ,
    EyeX,
    EyeY,
    EyeZ,
    Alpha,
}

/// The full set of interpolated presentation parameters: three rotation
/// angles, three eye axes, and the display opacity.
#[derive(Debug, Clone, Default)]
pub struct AnimationState {
    angle_x: AnimationParam,
    angle_y: AnimationParam,
    angle_z: AnimationParam,
    eye_x: AnimationParam,
    eye_y: AnimationParam,
    eye_z: AnimationParam,
    alpha: AnimationParam,
}

impl AnimationState {
    /// State used at power-on: zoomed out and fully transparent, so the first
    /// transition flies the display in.
    pub fn powered_on() -> Self {
        let mut state = Self::default();
        state.eye_z.snap_to(6.0);
        state
    }

    fn param_mut(&mut self, param: Param) -> &mut AnimationParam {
        match param {
            Param::AngleX => &mut self.angle_x,
            Param::AngleY => &mut self.angle_y,
            Param::AngleZ => &mut self.angle_z,
            Param::EyeX => &mut self.eye_x,
            Param::EyeY => &mut self.eye_y,
            Param::EyeZ => &mut self.eye_z,
            Param::Alpha => &mut self.alpha,
        }
    }

    pub fn param(&self, param: Param) -> &AnimationParam {
        match param {
            Param::AngleX => &self.angle_x,
            Param::AngleY => &self.angle_y,
            Param::AngleZ => &self.angle_z,
            Param::EyeX => &self.eye_x,
            Param::EyeY => &self.eye_y,
            Param::EyeZ => &self.eye_z,
            Param::Alpha => &self.alpha,
        }
    }

    /// See [`AnimationParam::set_target`].
    pub fn set_target(&mut self, param: Param, target: f32, steps: u32) -> Result<(), Error> {
        self.param_mut(param).set_target(target, steps)
    }

    /// Advance every parameter by one tick.
    pub fn tick(&mut self) {
        for p in [
            Param::AngleX,
            Param::AngleY,
            Param::AngleZ,
            Param::EyeX,
            Param::EyeY,
            Param::EyeZ,
            Param::Alpha,
        ] {
            self.param_mut(p).tick();
        }
    }

    /// True when no parameter has interpolation left to do.
    pub fn is_settled(&self) -> bool {
        self.angle_x.is_settled()
            && self.angle_y.is_settled()
            && self.angle_z.is_settled()
            && self.eye_x.is_settled()
            && self.eye_y.is_settled()
            && self.eye_z.is_settled()
            && self.alpha.is_settled()
    }

    /// Stored display opacity (halt dimming never writes through this).
    pub fn alpha(&self) -> f32 {
        self.alpha.current()
    }

    pub fn pose(&self) -> crate::geometry::CameraPose {
        crate::geometry::CameraPose {
            angle_x: self.angle_x.current(),
            angle_y: self.angle_y.current(),
            angle_z: self.angle_z.current(),
            eye_x: self.eye_x.current(),
            eye_y: self.eye_y.current(),
            eye_z: self.eye_z.current(),
        }
    }

    // Transition presets. Step counts are frame counts at nominal refresh.

    /// Cancel all motion and show the display head-on, fully opaque.
    pub fn snap_to_front(&mut self) {
        self.angle_x.snap_to(0.0);
        self.angle_y.snap_to(0.0);
        self.angle_z.snap_to(0.0);
        self.eye_x.snap_to(0.0);
        self.eye_y.snap_to(0.0);
        self.eye_z.snap_to(0.0);
        self.alpha.snap_to(1.0);
    }

    /// Fly the display in from far away.
    pub fn zoom(&mut self) -> Result<(), Error> {
        self.eye_z.snap_to(6.0);
        self.eye_z.set_target(0.0, 120)?;
        self.alpha.set_target(1.0, 120)
    }

    /// One full turn around the vertical axis.
    pub fn rotate(&mut self) -> Result<(), Error> {
        let from = self.angle_y.current();
        self.angle_y.snap_to(from - 360.0);
        self.angle_y.set_target(from, 60)
    }

    /// Ramp opacity up without moving the camera.
    pub fn fade_in(&mut self) -> Result<(), Error> {
        self.alpha.snap_to(0.0);
        self.alpha.set_target(1.0, 30)
    }
}
