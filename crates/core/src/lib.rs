pub mod error;
pub mod intent;
pub mod models;
pub mod policy;
pub mod quality;
pub mod secrets;

pub use error::{FormatError, InspectionError};
pub use intent::classify;
pub use models::*;
pub use policy::{inspect, PolicyEngine};
pub use quality::{check_quality, check_quality_with, parse_playbook, Node, Play, Task};
pub use secrets::{find_secrets, mask_template_references};
