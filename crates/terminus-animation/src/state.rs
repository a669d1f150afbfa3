//! Explicit animation state and its per-tick update.

use glam::{Vec2, Vec3};
use terminus_config::{AnimationConfig, ArbitrationPolicy};
use terminus_shading::ShadingInputs;

use crate::event::AnimationEvent;
use crate::fade::CloudFade;
use crate::oscillator::CloudOscillator;

/// Opacity writes performed during one tick.
///
/// When both fields are set the fade wrote last and is what gets rendered;
/// the oscillator value is otherwise invisible.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub fade_write: Option<f32>,
    pub oscillator_write: Option<f32>,
    /// The fade reached its target during this tick.
    pub fade_completed: bool,
    pub clicks: u32,
}

/// Everything that changes over time in the scene.
#[derive(Clone, Debug)]
pub struct AnimationState {
    /// Planet Euler angles (x, y) in radians.
    pub planet_rotation: Vec2,
    /// Cloud shell Euler angles (x, y) in radians.
    pub cloud_rotation: Vec2,
    /// Opacity the cloud material renders with.
    pub cloud_opacity: f32,
    /// World-space light position, shared by the sun marker and its light.
    pub light_position: Vec3,
    /// Latest pointer in display UV space.
    pub pointer_uv: Vec2,
    /// Eased toward `pointer_target`; nothing visible reads it yet.
    pub smoothed_pointer: Vec2,
    pub pointer_target: Vec2,
    /// Seconds since the first tick's clock origin.
    pub time: f64,
    /// Viewport size in physical pixels.
    pub resolution: Vec2,
    oscillator: CloudOscillator,
    fade: Option<CloudFade>,
    planet_step: Vec2,
    cloud_step: Vec2,
    fade_target: f32,
    fade_duration: f64,
    smoothing: f32,
    policy: ArbitrationPolicy,
}

impl AnimationState {
    pub fn new(config: &AnimationConfig, resolution: Vec2) -> Self {
        let pointer = Vec2::from(config.initial_pointer_uv);
        Self {
            planet_rotation: Vec2::ZERO,
            cloud_rotation: Vec2::ZERO,
            cloud_opacity: config.initial_opacity,
            light_position: Vec3::ZERO,
            pointer_uv: pointer,
            smoothed_pointer: pointer,
            pointer_target: pointer,
            time: 0.0,
            resolution,
            oscillator: CloudOscillator::new(
                config.initial_opacity,
                config.initial_fading_in,
                config.opacity_min,
                config.opacity_max,
                config.opacity_step,
            ),
            fade: None,
            planet_step: Vec2::from(config.planet_rotation_step),
            cloud_step: Vec2::from(config.cloud_rotation_step),
            fade_target: config.fade_target,
            fade_duration: config.fade_duration_s,
            smoothing: config.pointer_smoothing,
            policy: config.arbitration,
        }
    }

    pub fn policy(&self) -> ArbitrationPolicy {
        self.policy
    }

    pub fn oscillator(&self) -> &CloudOscillator {
        &self.oscillator
    }

    pub fn active_fade(&self) -> Option<&CloudFade> {
        self.fade.as_ref()
    }

    /// Snapshot of what the planet shader reads this tick.
    pub fn shading_inputs(&self) -> ShadingInputs {
        ShadingInputs {
            time: self.time as f32,
            light_position: self.light_position,
            pointer_uv: self.pointer_uv,
            resolution: self.resolution,
        }
    }

    /// Applies an event that does not depend on the clock.
    ///
    /// Pointer moves and resizes take effect immediately, so the light
    /// follows the pointer on every redraw whether or not a tick is due.
    /// Returns `false` for clicks, which start a fade and must wait for a
    /// tick to supply the clock.
    pub fn apply_input(&mut self, event: &AnimationEvent) -> bool {
        match *event {
            AnimationEvent::PointerMoved { uv, light_position } => {
                self.pointer_uv = uv;
                self.light_position = light_position;
                true
            }
            AnimationEvent::Resized { width, height } => {
                self.resolution = Vec2::new(width as f32, height as f32);
                true
            }
            AnimationEvent::Clicked => false,
        }
    }

    /// Applies the queued events, then advances one tick at clock `now`.
    ///
    /// Depends only on `self`, `now` and `events`.
    pub fn tick(&mut self, now: f64, events: &[AnimationEvent]) -> TickReport {
        let mut report = TickReport::default();
        self.time = now;

        for event in events {
            if !self.apply_input(event) {
                report.clicks += 1;
                self.start_fade(now);
            }
        }

        self.planet_rotation += self.planet_step;
        self.cloud_rotation += self.cloud_step;

        match self.policy {
            ArbitrationPolicy::SuspendOscillator => self.arbitrate_suspend(now, &mut report),
            ArbitrationPolicy::LastWriterWins => self.arbitrate_race(now, &mut report),
        }

        self.smoothed_pointer = self.smoothed_pointer.lerp(self.pointer_target, self.smoothing);
        report
    }

    fn start_fade(&mut self, now: f64) {
        if self.fade.is_some() {
            log::debug!("click during active fade, restarting from {:.3}", self.cloud_opacity);
        } else {
            log::info!(
                "cloud fade started: {:.3} -> {:.3} over {:.2}s",
                self.cloud_opacity,
                self.fade_target,
                self.fade_duration
            );
        }
        self.fade = Some(CloudFade::new(
            self.cloud_opacity,
            self.fade_target,
            now,
            self.fade_duration,
        ));
    }

    /// While a fade runs it owns the opacity. On completion the oscillator
    /// picks up at the fade target heading down.
    fn arbitrate_suspend(&mut self, now: f64, report: &mut TickReport) {
        if let Some(fade) = &self.fade {
            let value = fade.sample(now);
            self.cloud_opacity = value;
            report.fade_write = Some(value);
            if fade.is_complete(now) {
                self.oscillator.resume_from(value, false);
                self.fade = None;
                report.fade_completed = true;
                log::info!("cloud fade completed at {value:.3}");
            }
            return;
        }
        let value = self.oscillator.step();
        self.cloud_opacity = value;
        report.oscillator_write = Some(value);
    }

    /// The oscillator keeps stepping underneath and the fade overwrites it
    /// while active. Once the fade ends the oscillator's own value returns.
    fn arbitrate_race(&mut self, now: f64, report: &mut TickReport) {
        let value = self.oscillator.step();
        self.cloud_opacity = value;
        report.oscillator_write = Some(value);

        if let Some(fade) = &self.fade {
            let value = fade.sample(now);
            self.cloud_opacity = value;
            report.fade_write = Some(value);
            if fade.is_complete(now) {
                self.fade = None;
                report.fade_completed = true;
                log::info!("cloud fade completed at {value:.3}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(policy: ArbitrationPolicy) -> AnimationState {
        let config = AnimationConfig {
            arbitration: policy,
            ..AnimationConfig::default()
        };
        AnimationState::new(&config, Vec2::new(1280.0, 720.0))
    }

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn test_rotations_accumulate_per_tick() {
        let mut state = state_with(ArbitrationPolicy::SuspendOscillator);
        for i in 0..10 {
            state.tick(i as f64 * DT, &[]);
        }
        assert!((state.planet_rotation - Vec2::new(0.02, 0.05)).length() < 1e-5);
        assert!((state.cloud_rotation - Vec2::new(0.02, 0.03)).length() < 1e-5);
        assert!(state.cloud_rotation.y < state.planet_rotation.y);
    }

    #[test]
    fn test_pointer_event_snaps_light() {
        let mut state = state_with(ArbitrationPolicy::SuspendOscillator);
        let light = Vec3::new(0.4, -0.3, 1.0);
        state.tick(
            0.0,
            &[AnimationEvent::PointerMoved {
                uv: Vec2::new(0.2, 0.8),
                light_position: light,
            }],
        );
        assert_eq!(state.light_position, light);
        let inputs = state.shading_inputs();
        assert_eq!(inputs.light_position, light);
        assert_eq!(inputs.pointer_uv, Vec2::new(0.2, 0.8));
    }

    #[test]
    fn test_last_pointer_event_in_a_tick_wins() {
        let mut state = state_with(ArbitrationPolicy::SuspendOscillator);
        let events = [
            AnimationEvent::PointerMoved {
                uv: Vec2::new(0.1, 0.1),
                light_position: Vec3::X,
            },
            AnimationEvent::PointerMoved {
                uv: Vec2::new(0.9, 0.9),
                light_position: Vec3::Y,
            },
        ];
        state.tick(0.0, &events);
        assert_eq!(state.light_position, Vec3::Y);
        assert_eq!(state.pointer_uv, Vec2::new(0.9, 0.9));
    }

    #[test]
    fn test_resize_updates_resolution() {
        let mut state = state_with(ArbitrationPolicy::SuspendOscillator);
        state.tick(
            0.0,
            &[AnimationEvent::Resized {
                width: 640,
                height: 480,
            }],
        );
        assert_eq!(state.shading_inputs().resolution, Vec2::new(640.0, 480.0));
    }

    #[test]
    fn test_oscillator_drives_opacity_without_clicks() {
        let mut state = state_with(ArbitrationPolicy::SuspendOscillator);
        let mut saw_max = false;
        for i in 0..1_000 {
            let report = state.tick(i as f64 * DT, &[]);
            assert_eq!(report.fade_write, None);
            assert!((0.1..=0.3).contains(&state.cloud_opacity));
            saw_max |= state.cloud_opacity == 0.3;
        }
        assert!(saw_max);
    }

    #[test]
    fn test_fade_endpoint_is_exact_one_second_after_click() {
        let mut state = state_with(ArbitrationPolicy::SuspendOscillator);
        for i in 0..30 {
            state.tick(i as f64 * DT, &[]);
        }
        let click_time = 0.5;
        state.tick(click_time, &[AnimationEvent::Clicked]);
        assert!(state.active_fade().is_some());

        let report = state.tick(click_time + 1.0, &[]);
        assert_eq!(state.cloud_opacity, 0.4);
        assert_eq!(report.fade_write, Some(0.4));
        assert_eq!(report.oscillator_write, None);
        assert!(report.fade_completed);
        assert!(state.active_fade().is_none());
    }

    #[test]
    fn test_suspend_pauses_oscillator_during_fade() {
        let mut state = state_with(ArbitrationPolicy::SuspendOscillator);
        state.tick(0.0, &[AnimationEvent::Clicked]);
        let frozen = state.oscillator().value();
        let mut prev = state.cloud_opacity;
        for i in 1..60 {
            let report = state.tick(i as f64 * DT, &[]);
            assert_eq!(report.oscillator_write, None);
            assert!(state.cloud_opacity >= prev);
            prev = state.cloud_opacity;
        }
        assert_eq!(state.oscillator().value(), frozen);
    }

    #[test]
    fn test_suspend_resumes_downward_from_target() {
        let mut state = state_with(ArbitrationPolicy::SuspendOscillator);
        state.tick(0.0, &[AnimationEvent::Clicked]);
        state.tick(1.0, &[]);
        assert_eq!(state.cloud_opacity, 0.4);

        let mut now = 1.0 + DT;
        let report = state.tick(now, &[]);
        let value = report.oscillator_write.expect("oscillator resumes");
        assert!((value - 0.399).abs() < 1e-6);
        assert!(!state.oscillator().is_fading_in());

        let mut ticks = 0;
        while !state.oscillator().is_fading_in() {
            now += DT;
            state.tick(now, &[]);
            ticks += 1;
            assert!(ticks < 1_000);
        }
        assert!(now > 1.0 + DT);
        assert_eq!(state.cloud_opacity, 0.1);
    }

    #[test]
    fn test_click_during_fade_restarts_from_current_opacity() {
        let mut state = state_with(ArbitrationPolicy::SuspendOscillator);
        state.tick(0.0, &[AnimationEvent::Clicked]);
        state.tick(0.5, &[]);
        let mid = state.cloud_opacity;
        state.tick(0.5, &[AnimationEvent::Clicked]);
        let fade = state.active_fade().expect("fade restarted");
        assert_eq!(fade.started_at(), 0.5);
        assert_eq!(fade.sample(0.5), mid);
        state.tick(1.5, &[]);
        assert_eq!(state.cloud_opacity, 0.4);
    }

    #[test]
    fn test_last_writer_wins_fade_overwrites_oscillator() {
        let mut state = state_with(ArbitrationPolicy::LastWriterWins);
        state.tick(0.0, &[AnimationEvent::Clicked]);
        let report = state.tick(0.5, &[]);

        let fade = report.fade_write.expect("fade active");
        let oscillator = report.oscillator_write.expect("oscillator always writes");
        assert_eq!(state.cloud_opacity, fade);
        assert_ne!(state.cloud_opacity, oscillator);
        assert!((fade - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_last_writer_wins_shows_target_for_one_tick() {
        let mut state = state_with(ArbitrationPolicy::LastWriterWins);
        state.tick(0.0, &[AnimationEvent::Clicked]);

        let mut at_target = Vec::new();
        let mut highest = 0.0f32;
        for i in 1..=120 {
            let report = state.tick(i as f64 / 60.0, &[]);
            highest = highest.max(state.cloud_opacity);
            if state.cloud_opacity == 0.4 {
                at_target.push(i);
                assert!(report.fade_completed);
            }
        }
        assert_eq!(highest, 0.4);
        assert_eq!(at_target, vec![60]);
        assert!(state.active_fade().is_none());
        assert_eq!(state.cloud_opacity, state.oscillator().value());
    }

    #[test]
    fn test_last_writer_wins_keeps_oscillator_cadence() {
        let mut raced = state_with(ArbitrationPolicy::LastWriterWins);
        let mut plain = state_with(ArbitrationPolicy::LastWriterWins);
        for i in 0..120 {
            let now = i as f64 / 60.0;
            let events: &[AnimationEvent] = if i == 10 { &[AnimationEvent::Clicked] } else { &[] };
            raced.tick(now, events);
            plain.tick(now, &[]);
            assert_eq!(raced.oscillator().value(), plain.oscillator().value());
        }
        assert_eq!(raced.cloud_opacity, plain.cloud_opacity);
    }

    #[test]
    fn test_apply_input_moves_light_without_a_tick() {
        let mut state = state_with(ArbitrationPolicy::SuspendOscillator);
        let rotation = state.planet_rotation;
        let light = Vec3::new(-0.2, 0.5, 1.0);
        assert!(state.apply_input(&AnimationEvent::PointerMoved {
            uv: Vec2::new(0.3, 0.6),
            light_position: light,
        }));
        assert!(state.apply_input(&AnimationEvent::Resized {
            width: 320,
            height: 200,
        }));
        assert_eq!(state.light_position, light);
        assert_eq!(state.shading_inputs().resolution, Vec2::new(320.0, 200.0));
        assert_eq!(state.planet_rotation, rotation);
    }

    #[test]
    fn test_apply_input_defers_clicks() {
        let mut state = state_with(ArbitrationPolicy::SuspendOscillator);
        assert!(!state.apply_input(&AnimationEvent::Clicked));
        assert!(state.active_fade().is_none());
    }

    #[test]
    fn test_smoothed_pointer_converges_to_target() {
        let mut state = state_with(ArbitrationPolicy::SuspendOscillator);
        state.smoothed_pointer = Vec2::ZERO;
        state.tick(0.0, &[]);
        assert!((state.smoothed_pointer - Vec2::splat(0.05)).length() < 1e-6);
        for i in 1..200 {
            state.tick(i as f64 * DT, &[]);
        }
        assert!((state.smoothed_pointer - Vec2::splat(0.5)).length() < 1e-4);
    }

    #[test]
    fn test_time_tracks_clock() {
        let mut state = state_with(ArbitrationPolicy::SuspendOscillator);
        state.tick(2.25, &[]);
        assert_eq!(state.shading_inputs().time, 2.25);
    }
}
