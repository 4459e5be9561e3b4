mod env;
mod tc;
pub(crate) mod util;
