//! Closed host shapes: the stone and the band.

pub mod band;
pub mod seat;
pub mod silhouette;
pub mod stone;

pub use band::{build_band, build_band_seated, BandMesh, BandMetrics, BandSeating, TopRows};
pub use seat::{merge_stations, SeatLoop, SeatPatch, SeatWindow, WindowStations};
pub use silhouette::Silhouette;
pub use stone::{build_stone, build_stone_seated, StoneMesh, StoneProfile};
