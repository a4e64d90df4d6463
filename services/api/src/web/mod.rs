pub mod rest;
pub mod state;

// Re-export the handlers to make them easily accessible to the binary that
// builds the web server router.
pub use rest::{math_tutor_handler, solve_math_handler, upload_image_handler};
