pub mod png_io;

pub use png_io::{read_png, write_png};
