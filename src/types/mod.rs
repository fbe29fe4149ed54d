mod level;
mod region;

pub use level::Level;
pub use region::Region;
