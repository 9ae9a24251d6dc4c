//! Domain types for the marker pipeline.
//!
//! The derived vocabulary that classification produces: object types,
//! train type/status/punctuality, Luas lines, icon categories, and the
//! normalized marker itself.

mod icon;
mod luas;
mod marker;
mod object_type;
mod train;

pub use icon::IconCategory;
pub use luas::LuasLine;
pub use marker::{FavouriteKey, Marker, MarkerKind};
pub use object_type::ObjectType;
pub use train::{Punctuality, PunctualityBucket, TrainStatus, TrainType};
