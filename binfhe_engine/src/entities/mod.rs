mod bootstrapping_key;
mod key_switch_key;
mod lwe;
mod rgsw;

pub use bootstrapping_key::*;
pub use key_switch_key::*;
pub use lwe::*;
pub use rgsw::*;
