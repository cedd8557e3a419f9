//! Slovak personal income tax return (DPFO typ B) engine.
//!
//! [`tax::calculate`] turns a [`core::TaxFormData`] into every computed row of
//! the return. The [`xml`] module writes the filled return for filing and
//! reads a previously filed one back into a form.

pub mod cmd;
pub mod core;
pub mod tax;
pub mod xml;
