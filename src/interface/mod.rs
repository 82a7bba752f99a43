pub mod prompts;

pub use prompts::{confirm_overwrite, has_existing_output, prompt_yes_no};
