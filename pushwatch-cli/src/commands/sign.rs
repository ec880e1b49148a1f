//! Sign a payload the way a webhook sender would.

use super::read_body;
use crate::error::CliResult;
use pushwatch_core::{Algorithm, sign};
use std::path::Path;

pub fn execute(secret: &str, algorithm: Algorithm, payload: Option<&Path>) -> CliResult<()> {
    let body = read_body(payload)?;
    println!("{}", sign(secret, &body, algorithm));
    Ok(())
}
