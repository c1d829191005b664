//! Rule engine of a track-drawing board game played on a map of London.
//!
//! Four lines (red, blue, green, purple) are drawn one after the other from their start
//! stations. Each card drawn decides which neighbouring station the current line may
//! reach next; every claimed track blocks the tracks that cross it. Once every line is
//! finished, the board is scored on area coverage, river crossings, shared stations and
//! tourist sites.

pub mod board;
pub mod card;
mod claim;
pub mod config;
pub mod definition;
pub mod error;
pub mod geometry;
pub mod london;
pub mod manager;
pub mod region;
mod resolver;
pub mod score;
pub mod track_color;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate smallvec;
