//! Source scanners, one per grammar.
//!
//! - `js`: JS/TS parsing through swc
//! - `php`: PHP token stream
//! - `twig`: Twig token stream

pub mod js;
pub mod php;
pub mod twig;
