//! Cross-module test suite
//!
//! Unit tests live next to the code they cover; the tests here drive several
//! stages together: the filter/aggregate pipeline over real files, full
//! publish cycles against a recording transport and against a real git
//! mirror, and property checks.

#[cfg(test)]
mod support;
