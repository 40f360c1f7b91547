/// Presenter tree configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Config {
    /// If true, removing a child from a slot or popup list it does not occupy is reported as an
    /// error instead of being ignored.
    pub strict: bool,
}

impl Config {
    /// The lenient default configuration.
    pub fn new() -> Config {
        Config::default()
    }

    /// Returns a copy with strict membership checks enabled or disabled.
    pub fn strict(self, strict: bool) -> Config {
        Config { strict, ..self }
    }
}
