use is_terminal::IsTerminal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorLevel {
    None,
    Ansi16,
    Ansi256,
    Truecolor,
}

/// What the stdout terminal can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCaps {
    pub color_level: ColorLevel,
    pub is_tty_stdout: bool,
    pub supports_hyperlinks: bool,
}

fn level_from_flags(has_basic: bool, has_256: bool, has_16m: bool) -> ColorLevel {
    if has_16m {
        ColorLevel::Truecolor
    } else if has_256 {
        ColorLevel::Ansi256
    } else if has_basic {
        ColorLevel::Ansi16
    } else {
        ColorLevel::None
    }
}

fn map_color_level(level: Option<supports_color::ColorLevel>) -> ColorLevel {
    match level {
        Some(l) => level_from_flags(l.has_basic, l.has_256, l.has_16m),
        None => ColorLevel::None,
    }
}

impl TerminalCaps {
    pub fn detect() -> Self {
        TerminalCaps {
            color_level: map_color_level(supports_color::on(supports_color::Stream::Stdout)),
            is_tty_stdout: std::io::stdout().is_terminal(),
            supports_hyperlinks: supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout),
        }
    }

    /// Capabilities of a pipe or file: nothing but plain text.
    pub fn plain() -> Self {
        TerminalCaps {
            color_level: ColorLevel::None,
            is_tty_stdout: false,
            supports_hyperlinks: false,
        }
    }

    pub fn color(&self) -> bool {
        self.is_tty_stdout && self.color_level != ColorLevel::None
    }

    pub fn hyperlinks(&self) -> bool {
        self.is_tty_stdout && self.supports_hyperlinks
    }
}
