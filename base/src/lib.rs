//! The `base` crate defines the PMX-related things which are useful
//! in both a virtual machine and other associated tools.  The idea is
//! that if you want to write an assembler, it would depend on the
//! base crate but would not need to depend on the machine itself.

pub mod charset;
pub mod instruction;
pub mod prelude;
