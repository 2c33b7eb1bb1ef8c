extern crate byteorder;
extern crate itertools;
#[macro_use] extern crate log;

#[cfg(test)] #[macro_use] extern crate proptest;
#[cfg(test)] extern crate tempfile;

pub mod shapefile;
