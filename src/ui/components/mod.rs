mod alert;
mod input;
mod key_result;
mod search_input;

pub use alert::render_alert;
pub use input::{InputResult, TextInput};
pub use key_result::KeyResult;
pub use search_input::{SearchEvent, SearchInput};
