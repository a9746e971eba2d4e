pub mod siting;
pub mod toy;

pub use siting::SitingModel;
pub use toy::ToyLp;
