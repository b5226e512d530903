pub mod constants;
pub mod numeric;
pub mod progress;
pub mod states;

pub use constants::*;
pub use numeric::round_to;
pub use progress::ProgressReporter;
pub use states::{state_code, state_fips, state_name, title_case};
