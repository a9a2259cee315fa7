pub mod checkpoint;
pub mod outcome;
pub mod pairing;
pub mod registry;
