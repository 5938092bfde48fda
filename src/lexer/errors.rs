use crate::token::TokenError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LexError {
    #[error("tokenizer produced an invalid token stream: {0}")]
    Token(#[from] TokenError),
}
