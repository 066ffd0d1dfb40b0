//! Unit tests for the `rush_wire` codec and message types.

mod support;
