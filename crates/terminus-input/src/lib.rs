//! Pointer input: frame-coherent mouse state and screen-to-NDC/UV mapping.

pub mod mouse;
pub mod pointer;

pub use mouse::MouseState;
pub use pointer::PointerSample;
