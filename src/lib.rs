//! Stylefix: token-cursor style checking with changeset-based fixes
//!
//! Rules look at a finalized token stream, never at a syntax tree. Each rule
//! registers the token kinds it cares about, walks the stream with the
//! navigator from the triggering position and, when it finds a violation,
//! plans its fix as verified replacements of whole token texts.
//!
//! # Architecture
//!
//! - [`TokenStore`]: immutable token sequence with bracket links.
//! - [`nav`]: stateless cursor helpers (scans, line bounds, block bounds).
//! - [`rules`]: the rule catalog, each rule a thin client of the navigator.
//! - [`Fixer`]: per-position edit buffer with all-or-nothing changesets.
//! - [`Driver`]: dispatch of positions to rules and of fixes to the fixer.
//!
//! # Safety
//!
//! - Every edit verifies the text it expects before replacing it
//! - Conflicting changesets are dropped whole and retried on the next pass
//! - Navigation is bounded; pathological input yields an internal
//!   diagnostic instead of a hang
//! - Atomic file writes (tempfile + fsync + rename)
//!
//! # Example
//!
//! ```
//! use stylefix::{fix_source, Config};
//!
//! let outcome = fix_source("<?php\n\n$a  =  5;\n", &Config::default()).unwrap();
//! assert_eq!(outcome.text, "<?php\n\n$a = 5;\n");
//! ```

pub mod config;
pub mod driver;
pub mod fixer;
pub mod lexer;
pub mod nav;
pub mod rules;
pub mod token;

// Re-exports
pub use config::{discover, load_from_path, load_from_str, Config, ConfigError};
pub use driver::{
    check_source, fix_source, Diagnostic, Driver, FileReport, FixOutcome, FixPolicy, Outcome,
};
pub use fixer::{atomic_write, Edit, EditResult, EditVerification, FixError, Fixer, LineEnding};
pub use lexer::{tokenize, LexError};
pub use nav::{NavError, StepBudget};
pub use rules::{catalog, registry, Rule, RuleSettings, Verdict, Violation, RULE_CODES};
pub use token::{Keyword, Operator, Token, TokenError, TokenKind, TokenStore};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing output on stderr.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `debug` with `verbose`.
/// Safe to call multiple times.
pub fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let default = if verbose { "stylefix=debug" } else { "warn" };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
        let _ = tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .try_init();
    });
}
