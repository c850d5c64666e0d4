pub mod compass;
pub mod location;
pub mod target;
pub mod time;
pub mod track;
pub mod twilight;

pub use compass::*;
pub use location::*;
pub use target::*;
pub use time::*;
pub use track::*;
pub use twilight::*;
