pub mod core;
pub mod rendering;

pub use self::core::{load_or_create_config, DemoConfig};
pub use rendering::{ShaderPaths, WindowConfig};
