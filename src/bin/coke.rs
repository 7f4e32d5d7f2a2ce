//! # coke
//!
//! Run tasks declared in the nearest `Cokefile`.
//!
//! - List tasks: `coke`
//! - Run tasks: `coke build test`, or by alias: `coke bd`
//! - Another manifest: `coke -f ci/Cokefile deploy`

fn main() {
    env_logger::init();
    coco::coke::run_coke();
}
