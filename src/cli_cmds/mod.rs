mod config_cmds;
mod status;

pub use config_cmds::{cmd_config_init, cmd_config_path};
pub use status::{cmd_check, cmd_status};
