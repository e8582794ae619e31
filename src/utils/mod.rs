mod io_utils;
mod readers;
mod util;

pub use io_utils::{create_writer, write_json};
pub use readers::{fetch_reference, open_genome_reader, open_reads_reader};
pub use util::{fraction, handle_error_and_exit, Result};
