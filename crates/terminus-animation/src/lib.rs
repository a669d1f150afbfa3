//! Time-varying scene state and the per-tick update that drives it.
//!
//! Input handlers never touch [`AnimationState`] directly. They push
//! [`AnimationEvent`]s onto an [`EventQueue`] which the frame loop drains
//! once per tick and hands to [`AnimationState::tick`], so input and
//! animation are ordered deterministically.

pub mod event;
pub mod fade;
pub mod oscillator;
pub mod state;

pub use event::{AnimationEvent, EventQueue, EventSender};
pub use fade::CloudFade;
pub use oscillator::CloudOscillator;
pub use state::{AnimationState, TickReport};
