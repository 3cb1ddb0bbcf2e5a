//! Per-topic scene modules.
//!
//! Each topic owns its variant enum, its string-id decoding (done once at the
//! dispatch boundary) and its bespoke draw code. The shared lifecycle — the
//! animation driver, parameter merging, surface ownership — lives outside
//! these modules and is never repeated here.

pub(crate) mod basic_arithmetic;
pub(crate) mod bezier;
pub(crate) mod monte_carlo;
pub(crate) mod random_walk;
pub(crate) mod trigonometry;
