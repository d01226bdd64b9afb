/// Ambient reads the pipeline needs from its host: where the page is and
/// which languages the user prefers.
pub trait EnvironmentProvider: Send + Sync {
    fn location(&self) -> String;
    fn preferred_languages(&self) -> Vec<String>;
}

/// Location given on the command line, languages from the OS.
pub struct DesktopEnvironment {
    location: String,
}

impl DesktopEnvironment {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }
}

impl EnvironmentProvider for DesktopEnvironment {
    fn location(&self) -> String {
        self.location.clone()
    }

    fn preferred_languages(&self) -> Vec<String> {
        sys_locale::get_locales().collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    pub location: String,
    pub languages: Vec<String>,
}

impl StaticEnvironment {
    pub fn at(location: &str) -> Self {
        Self {
            location: location.to_string(),
            languages: vec!["en-US".to_string()],
        }
    }
}

impl EnvironmentProvider for StaticEnvironment {
    fn location(&self) -> String {
        self.location.clone()
    }

    fn preferred_languages(&self) -> Vec<String> {
        self.languages.clone()
    }
}
