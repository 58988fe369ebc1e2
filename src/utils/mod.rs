pub mod environment;
pub mod paths;
pub mod terminal;

pub use environment::get_purple_dir;
pub use paths::{
    escape_filename, format_path_with_tilde, normalize_name, unescape_filename,
    validate_file_size,
};
pub use terminal::sanitize_for_terminal;
