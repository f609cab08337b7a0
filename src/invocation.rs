//! Entry point selection from the invoked program name
//!
//! The same executable serves as the `cachenv` control command and, through
//! interception links, as a stand-in for every memoized command.

use crate::environment::CONTROL_NAME;
use std::ffi::OsString;
use std::path::Path;

/// How the executable was invoked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Invoked as `cachenv`; carries the full argv for the CLI parser
    Control(Vec<OsString>),
    /// Invoked through an interception link
    Intercepted { command: String, args: Vec<OsString> },
}

impl Invocation {
    /// Classify an argv by the file name of its first element
    pub fn detect<I>(argv: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        let argv: Vec<OsString> = argv.into_iter().collect();
        let program = argv
            .first()
            .and_then(|arg0| Path::new(arg0).file_name())
            .map(|name| name.to_string_lossy().into_owned());

        match program {
            Some(name) if name != CONTROL_NAME => Self::Intercepted {
                command: name,
                args: argv.into_iter().skip(1).collect(),
            },
            _ => Self::Control(argv),
        }
    }
}
