//! Command implementations for the CLI.

mod archives;
mod clock;
mod current;
mod info;
mod period;
mod update;

pub use archives::cmd_archives;
pub use clock::{cmd_gettime, cmd_settime};
pub use current::cmd_current;
pub use info::cmd_info;
pub use period::{cmd_getperiod, cmd_setperiod};
pub use update::cmd_update;
