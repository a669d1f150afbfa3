//! Scene lights: ambient fill, a directional key light, the sun marker's point
//! light and a fixed spot light, plus their packed GPU uniform.

pub mod directional;
pub mod point;
pub mod rig;
pub mod spot;

pub use directional::DirectionalLight;
pub use point::{PointLight, distance_attenuation};
pub use rig::{AmbientLight, LightRig, LightRigUniform, OutputOptions};
pub use spot::{SpotLight, cone_attenuation};
