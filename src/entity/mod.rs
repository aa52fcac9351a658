pub mod bee;
pub mod den;
pub mod flower;
pub mod hive;

pub use bee::Bee;
pub use den::Den;
pub use flower::Flower;
pub use hive::Hive;
