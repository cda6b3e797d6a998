// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use thiserror::Error as DError;

#[derive(Debug, Clone, DError)]
pub enum ErrorKind {
    #[error("Invalid value for {0} at line {1}")]
    InvalidValue(&'static str, u64),

    #[error("Missing column {0} at line {1}")]
    MissingColumn(&'static str, u64),
}
