use std::{env, fmt::Display};

use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter};

/// Set to `debug` to also see the gateway's exchanges with the backend
pub const LOG_VAR: &str = "PRENOTA_LOG";

/// Workspace crates and the label their lines are printed with
const LOCAL_TARGETS: [(&str, Target); 5] = [
    ("prenota", Target::Main),
    ("prenota_core", Target::Core),
    ("prenota_gateway", Target::Gateway),
    ("prenota_panel", Target::Panel),
    ("prenota_server", Target::Server),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    Normal,
    Debug,
}

impl Verbosity {
    fn from_var(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("debug") => Self::Debug,
            _ => Self::Normal,
        }
    }

    /// Local crates log from this level up, others only warnings and errors
    fn local_filter(self) -> LevelFilter {
        match self {
            Self::Normal => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
        }
    }
}

pub fn init_logger() {
    let verbosity = Verbosity::from_var(env::var(LOG_VAR).ok().as_deref());

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let target = Target::of(record.target());
            let now = chrono::Local::now();

            out.finish(format_args!(
                "{:^5} {} {:^8} {}",
                badge(record.level()),
                now.format("%H:%M:%S").to_string().bright_black(),
                target.label(record.target()),
                message
            ))
        })
        .filter(move |meta| match Target::of(meta.target()) {
            Target::External => meta.level() <= Level::Warn,
            _ => meta.level() <= verbosity.local_filter(),
        })
        .chain(std::io::stdout())
        .apply()
        .expect("logging is initialized")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    External,
    Main,
    Server,
    Gateway,
    Panel,
    Core,
}

impl Target {
    fn of(target: &str) -> Self {
        let module = target.split("::").next().unwrap_or_default();

        LOCAL_TARGETS
            .iter()
            .find(|(name, _)| *name == module)
            .map(|(_, target)| *target)
            .unwrap_or(Self::External)
    }

    fn label(self, target: &str) -> ColoredString {
        match self {
            Target::External => target.split("::").next().unwrap_or_default().clear(),
            Target::Main => "PRENOTA".bright_white(),
            Target::Server => "SERVER".bright_green(),
            Target::Gateway => "GATEWAY".bright_cyan(),
            Target::Panel => "PANEL".bright_purple(),
            Target::Core => "CORE".blue(),
        }
    }
}

fn badge(level: Level) -> impl Display {
    match level {
        Level::Error => " ERR ".black().on_red().bold(),
        Level::Warn => " WRN ".black().on_yellow().bold(),
        Level::Info => " INF ".black().on_blue().bold(),
        Level::Debug => " DBG ".white().on_black(),
        Level::Trace => " TRC ".normal(),
    }
}
