//! Source locations and raw call-stack capture.
//!
//! Contracts record where they were declared and where an implementation was
//! bound; violations record the stack at the moment of failure. The capture
//! primitives here are deliberately small: `#[track_caller]` yields the first
//! source position outside the library, and [`Stack`] holds raw backtrace
//! text from which the library's own frames can be elided.

use std::backtrace::Backtrace;
use std::fmt;

use serde::Serialize;

/// A source-code site: where a contract was declared, or where an
/// implementation was bound to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    file: &'static str,
    line: u32,
    column: u32,
}

impl Location {
    /// Sentinel for contracts declared inside the library itself, such as the
    /// unconstrained root contract.
    pub const INTERNAL: Location = Location {
        file: "",
        line: 0,
        column: 0,
    };

    /// Capture the source location of the caller.
    ///
    /// Every public construction entry point is `#[track_caller]`, so the
    /// chain bottoms out at the first frame outside the library.
    #[track_caller]
    pub fn call_site() -> Self {
        let caller = std::panic::Location::caller();
        Location {
            file: caller.file(),
            line: caller.line(),
            column: caller.column(),
        }
    }

    pub fn is_internal(&self) -> bool {
        self.file.is_empty()
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_internal() {
            f.write_str("<contract library internal>")
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

/// Symbol prefixes for frames that belong to the unwind/capture plumbing
/// rather than to user code.
const ELIDED_PREFIXES: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "backtrace::",
    "rust_",
    "__rust",
    "_start",
];

fn is_library_frame(symbol: &str) -> bool {
    symbol.contains("pacta::") || ELIDED_PREFIXES.iter().any(|p| symbol.starts_with(p))
}

/// Raw stack text captured at the moment a contract error is constructed.
#[derive(Debug, Clone)]
pub struct Stack {
    raw: String,
}

impl Stack {
    /// Capture the current call stack. Capture always succeeds; on platforms
    /// without backtrace support the result simply yields no usable frames.
    pub fn capture() -> Self {
        Stack {
            raw: Backtrace::force_capture().to_string(),
        }
    }

    /// The unprocessed backtrace text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The trace from the first frame outside the library onward, or an empty
    /// string when the platform yields nothing usable.
    pub fn user_frames(&self) -> String {
        let mut frames: Vec<(String, Vec<&str>)> = Vec::new();
        for line in self.raw.lines() {
            let trimmed = line.trim_start();
            let head = trimmed.split_once(": ").filter(|(index, _)| {
                !index.is_empty() && index.chars().all(|c| c.is_ascii_digit())
            });
            if let Some((_, symbol)) = head {
                frames.push((symbol.trim().to_owned(), vec![line]));
            } else if let Some(last) = frames.last_mut() {
                last.1.push(line);
            }
        }
        match frames.iter().position(|(symbol, _)| !is_library_frame(symbol)) {
            Some(first_user) => frames[first_user..]
                .iter()
                .flat_map(|(_, lines)| lines.iter().copied())
                .collect::<Vec<_>>()
                .join("\n"),
            None => String::new(),
        }
    }
}

/// Compose the user-facing trace for an error: `Name: message` on the first
/// line, then the caller's frames. Degrades to the header alone when no
/// frames are available.
pub(crate) fn compose_stack(name: &str, message: &str, raw: &Stack) -> String {
    let frames = raw.user_frames();
    if frames.is_empty() {
        format!("{name}: {message}")
    } else {
        format!("{name}: {message}\n{frames}")
    }
}
