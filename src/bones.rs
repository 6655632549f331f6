//! Main module for bonelex functionality

pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod formats;
pub mod grammars;
pub mod indentation;
pub mod keywords;
pub mod testing;
