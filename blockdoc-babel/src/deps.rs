//! Initialize-once dependencies of the Markdown path.
//!
//! The Markdown writer needs compiled patterns before its first call. They
//! live behind a [`FormattingDeps`] handle that exporters receive at
//! construction: the first caller builds the runtime, concurrent callers wait
//! for that same result, and a failed build is reported to the caller and
//! retried on the next call instead of being remembered.

use crate::error::{ConversionError, Result};
use log::debug;
use once_cell::sync::OnceCell;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fmt;

/// Compiled resources used when writing Markdown.
#[derive(Debug)]
pub struct MarkdownRuntime {
    escape: Regex,
    line_start: Regex,
    whitespace: Regex,
}

impl MarkdownRuntime {
    pub fn load() -> Result<Self> {
        Ok(Self {
            escape: compile(r"[\\`*_\[\]~]|&#?[0-9A-Za-z]+;|<[A-Za-z/!?]")?,
            line_start: compile(r"(?m)^( {0,3})([#>+=-]|[0-9]{1,9}[.)])")?,
            whitespace: compile(r"[ \t\r\n\x0c]+")?,
        })
    }

    /// Backslash-escapes characters Markdown would read as syntax, including
    /// entity references and the openings of raw HTML and autolinks.
    pub fn escape<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.escape.replace_all(text, r"\$0")
    }

    /// Escapes what would open a heading, quote, list item, thematic break or
    /// setext underline at the start of a line.
    pub fn escape_line_starts<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.line_start.replace_all(text, |caps: &Captures| {
            let marker = &caps[2];
            let split = marker.len() - 1;
            format!("{}{}\\{}", &caps[1], &marker[..split], &marker[split..])
        })
    }

    /// Collapses whitespace runs to single spaces.
    pub fn collapse<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.whitespace.replace_all(text, " ")
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| ConversionError::Initialization(format!("invalid pattern {pattern}: {e}")))
}

type Initializer = dyn Fn() -> Result<MarkdownRuntime> + Send + Sync;

/// Shared handle to the lazily built [`MarkdownRuntime`].
pub struct FormattingDeps {
    runtime: OnceCell<MarkdownRuntime>,
    init: Box<Initializer>,
}

impl FormattingDeps {
    pub fn new() -> Self {
        Self::with_initializer(MarkdownRuntime::load)
    }

    /// Uses `init` instead of [`MarkdownRuntime::load`].
    pub fn with_initializer(
        init: impl Fn() -> Result<MarkdownRuntime> + Send + Sync + 'static,
    ) -> Self {
        Self {
            runtime: OnceCell::new(),
            init: Box::new(init),
        }
    }

    /// The runtime, building it on first use.
    pub fn get(&self) -> Result<&MarkdownRuntime> {
        self.runtime.get_or_try_init(|| {
            debug!("initializing markdown runtime");
            (self.init)()
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.runtime.get().is_some()
    }
}

impl Default for FormattingDeps {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormattingDeps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormattingDeps")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
