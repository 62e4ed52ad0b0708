use quilt_lib::addon::is_development_env;
use quilt_lib::consts::ADDON_ENV_VAR;

use crate::output::print_stat;

pub fn cmd_info() {
  println!("quilt {}", env!("CARGO_PKG_VERSION"));
  println!("Environment:");
  let value = std::env::var(ADDON_ENV_VAR).unwrap_or_else(|_| "(unset)".to_string());
  print_stat(ADDON_ENV_VAR, &value);
  print_stat("Development mode", if is_development_env() { "yes" } else { "no" });
}
