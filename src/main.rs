use tiletb::loopback::{test_loopback, test_loopback_reordered};
use tiletb::model::LoopbackTile;

// Specify tests to be executed
tiletb::run_with_model!(LoopbackTile::new(); test_loopback, test_loopback_reordered);
