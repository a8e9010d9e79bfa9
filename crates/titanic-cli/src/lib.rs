pub mod logging;
pub mod serve;
pub mod train;
pub mod util;
