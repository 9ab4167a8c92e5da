// Team-assembly engine: squad sampling, starting-XI selection, and the
// time-boxed search that drives them.

pub mod lineup;
pub mod player;
pub mod report;
pub mod sampler;
pub mod search;
pub mod squad;
