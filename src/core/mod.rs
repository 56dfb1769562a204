pub mod convert;
pub mod cover;
pub mod paths;
pub mod playlist;
pub mod tags;
