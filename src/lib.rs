pub mod api;
pub mod combinator;
pub mod element;
pub mod error;
pub mod grammar;
pub mod locator;
pub mod parser;
pub mod replacer;
pub mod utils;
mod serialization;

pub use api::{rewrite, RewriteResult};
pub use combinator::{Forward, Join, List, OneOrMore, Optional, Or};
pub use element::{Element, Span};
pub use error::{GrammarError, RangeError, ReplaceError, RewriteError};
pub use grammar::{Grammar, TypeName};
pub use locator::{Block, BlockLocator, LineLocator, Locator};
pub use parser::{
    Bool, Empty, Number, Parser, Pattern, Plain, Rule, Space, StringLiteral, Symbol, Word,
    WordDot,
};
pub use replacer::{Edit, Replacer};
pub use serialization::DiagnosticRecord;
