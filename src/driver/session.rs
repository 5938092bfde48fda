use crate::config::Config;
use crate::driver::{Driver, FileReport, FixPolicy};
use crate::fixer::Fixer;
use crate::lexer::{tokenize, LexError};
use tracing::{debug, warn};

/// Result of a multi-pass fix run over one source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixOutcome {
    pub text: String,
    /// Fix passes run, the last one included even when it changed nothing.
    pub passes: usize,
    /// Changesets committed over all passes.
    pub fixes_applied: usize,
    /// Check of the final text.
    pub report: FileReport,
}

impl FixOutcome {
    pub fn is_changed(&self, original: &str) -> bool {
        self.text != original
    }
}

/// Tokenize `source` once and report every enabled rule, without fixing.
pub fn check_source(source: &str, config: &Config) -> Result<FileReport, LexError> {
    let store = tokenize(source)?;
    let driver = Driver::from_config(config, FixPolicy::ReportOnly);
    Ok(driver.run(&store, None))
}

/// Fix `source` until a pass commits nothing or the pass limit is reached.
///
/// Every pass works on a fresh token store of the previous pass's output, so
/// a changeset rejected for conflicting with an earlier one is planned again
/// against the updated text.
pub fn fix_source(source: &str, config: &Config) -> Result<FixOutcome, LexError> {
    let driver = Driver::from_config(config, FixPolicy::from_config(config));
    let mut text = source.to_string();
    let mut passes = 0;
    let mut fixes_applied = 0;

    while passes < config.engine.max_passes {
        passes += 1;
        let store = tokenize(&text)?;
        let mut fixer = Fixer::with_line_ending(&store, config.engine.line_ending);
        driver.run(&store, Some(&mut fixer));

        let committed = fixer.committed();
        debug!(pass = passes, committed, edits = fixer.edits_applied(), "fix pass finished");
        if committed == 0 {
            break;
        }
        fixes_applied += committed;
        text = fixer.materialize();

        if passes == config.engine.max_passes {
            warn!(passes, "fix pass limit reached before the text settled");
        }
    }

    let report = driver.run(&tokenize(&text)?, None);
    Ok(FixOutcome {
        text,
        passes,
        fixes_applied,
        report,
    })
}
