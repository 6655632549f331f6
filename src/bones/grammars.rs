//! Grammars built on the transition engine
//!
//! - [`template`]: the indentation-sensitive template language
//! - [`markup`]: conventional tag/attribute/comment/CDATA markup

pub mod markup;
pub mod template;
